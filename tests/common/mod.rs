//! Shared fixtures: a throwaway certificate authority and a scripted HTTPS
//! server standing in for GitHub.

#![allow(dead_code)]

use gh_release_client::github::{
    Authority, GitHubApiAuthority, GitHubHttp, GitHubUploadAuthority, RecordingAuditor, Repository,
    Timeouts,
};
use gh_release_client::{GitHubToken, PrivilegedGitHub, ReleaseTrustStore};
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tokio_rustls::TlsAcceptor;

/// Token used by every privileged test client
pub const TOKEN: &str = "ghp_test_token_0123456789";

/// Budget short enough to keep timeout tests quick
pub const SHORT: Duration = Duration::from_millis(100);

/// Upper bound on any single test exchange
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Certificate authority and `localhost`/`127.0.0.1` leaf signed by it
pub struct TestPki {
    ca_pem: String,
    leaf: CertificateDer<'static>,
    leaf_key: Vec<u8>,
}

impl TestPki {
    pub fn new() -> Self {
        let ca_key = KeyPair::generate().expect("ca key");
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).expect("ca params");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "gh-release test CA");
        let ca = ca_params.self_signed(&ca_key).expect("ca certificate");

        let leaf_key = KeyPair::generate().expect("leaf key");
        let mut leaf_params =
            CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])
                .expect("leaf params");
        leaf_params
            .distinguished_name
            .push(DnType::CommonName, "localhost");
        let leaf = leaf_params
            .signed_by(&leaf_key, &ca, &ca_key)
            .expect("leaf certificate");

        Self {
            ca_pem: ca.pem(),
            leaf: leaf.der().clone(),
            leaf_key: leaf_key.serialize_der(),
        }
    }

    /// Trust store containing only the throwaway CA
    pub fn trust_store(&self) -> ReleaseTrustStore {
        ReleaseTrustStore::from_pem(self.ca_pem.as_bytes()).expect("ca trust store")
    }

    fn acceptor(&self) -> TlsAcceptor {
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.leaf_key.clone()));
        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![self.leaf.clone()], key)
        .expect("server config");
        TlsAcceptor::from(Arc::new(config))
    }
}

/// How the fake server treats each connection
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Read the request, answer with `status` and `body`
    Respond { status: u16, body: String },
    /// Declare more body than is sent, then close the connection
    Truncated { status: u16, body: String },
    /// Read the request, never answer
    StallBeforeResponse,
    /// Send headers and part of the body, then go quiet
    StallMidBody { status: u16, body: String },
    /// Read the request head, never read its body
    StallBeforeReadingBody,
    /// Answer by request method: `(method, status, body)`; 404 otherwise
    ByMethod(Vec<(&'static str, u16, String)>),
}

impl Behaviour {
    pub fn respond(status: u16, body: &str) -> Self {
        Behaviour::Respond {
            status,
            body: body.to_string(),
        }
    }
}

/// A request as the fake server received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// Scripted HTTPS server on 127.0.0.1; stops when dropped
pub struct FakeServer {
    addr: SocketAddr,
    requests: Requests,
    task: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start(pki: &TestPki, behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let acceptor = pki.acceptor();
        let requests = Requests::default();

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            let mut connections = JoinSet::new();
            while let Ok((stream, _)) = listener.accept().await {
                connections.spawn(serve(
                    stream,
                    acceptor.clone(),
                    behaviour.clone(),
                    Arc::clone(&recorded),
                ));
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn authority(&self) -> Authority {
        authority_for(self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A port that completes TCP connects but never answers the TLS handshake
pub struct SilentListener {
    addr: SocketAddr,
    _listener: TcpListener,
}

impl SilentListener {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        Self {
            addr: listener.local_addr().expect("local addr"),
            _listener: listener,
        }
    }

    pub fn authority(&self) -> Authority {
        authority_for(self.addr)
    }
}

fn authority_for(addr: SocketAddr) -> Authority {
    format!("127.0.0.1:{}", addr.port())
        .parse()
        .expect("valid authority")
}

async fn serve(stream: TcpStream, acceptor: TlsAcceptor, behaviour: Behaviour, requests: Requests) {
    let Ok(tls) = acceptor.accept(stream).await else {
        return;
    };
    let mut stream = BufReader::new(tls);

    let mut request_line = String::new();
    if stream.read_line(&mut request_line).await.is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        match stream.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let mut request = RecordedRequest {
        method,
        target,
        headers,
        body: Vec::new(),
    };

    if let Behaviour::StallBeforeReadingBody = behaviour {
        record(&requests, request);
        return std::future::pending::<()>().await;
    }

    let request_method = request.method.clone();
    let length = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    request.body = vec![0; length];
    if stream.read_exact(&mut request.body).await.is_err() {
        return;
    }
    record(&requests, request);

    let behaviour = match behaviour {
        Behaviour::ByMethod(routes) => routes
            .into_iter()
            .find(|(method, _, _)| *method == request_method)
            .map(|(_, status, body)| Behaviour::Respond { status, body })
            .unwrap_or_else(|| Behaviour::respond(404, r#"{"message":"Not Found"}"#)),
        other => other,
    };

    match behaviour {
        Behaviour::Respond { status, body } => {
            let _ = stream.write_all(head(status, body.len()).as_bytes()).await;
            let _ = stream.write_all(body.as_bytes()).await;
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
        }
        Behaviour::Truncated { status, body } => {
            let _ = stream
                .write_all(head(status, body.len() + 100).as_bytes())
                .await;
            let _ = stream.write_all(body.as_bytes()).await;
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
        }
        Behaviour::StallMidBody { status, body } => {
            let _ = stream
                .write_all(head(status, body.len() + 100).as_bytes())
                .await;
            let _ = stream.write_all(body.as_bytes()).await;
            let _ = stream.flush().await;
            std::future::pending::<()>().await;
        }
        Behaviour::StallBeforeResponse
        | Behaviour::StallBeforeReadingBody
        | Behaviour::ByMethod(_) => {
            std::future::pending::<()>().await;
        }
    }
}

fn head(status: u16, content_length: usize) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json; charset=utf-8\r\ncontent-length: {content_length}\r\nconnection: close\r\n\r\n"
    )
}

fn record(requests: &Requests, request: RecordedRequest) {
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);
}

/// Unauthenticated client against `api`
pub fn http_client(
    api: Authority,
    trust: &ReleaseTrustStore,
    timeouts: Timeouts,
    auditor: Arc<RecordingAuditor>,
) -> GitHubHttp {
    GitHubHttp::with_auditor(
        GitHubApiAuthority(api),
        Repository::new("owner", "repo"),
        trust,
        timeouts,
        auditor,
    )
    .expect("client")
}

/// Privileged client against `api` and `upload`
pub fn privileged_client(
    api: Authority,
    upload: Authority,
    trust: &ReleaseTrustStore,
    timeouts: Timeouts,
    auditor: Arc<RecordingAuditor>,
) -> PrivilegedGitHub {
    http_client(api, trust, timeouts, auditor).privileged(
        GitHubUploadAuthority(upload),
        GitHubToken::new(TOKEN).expect("token"),
    )
}

/// Timeouts with one phase shortened
pub fn timeouts(connect: Duration, first_byte: Duration, end_to_end: Duration) -> Timeouts {
    Timeouts {
        connect,
        first_byte,
        end_to_end,
    }
}

/// A 1024-byte file of pseudo-random content
pub fn artifact_file() -> (tempfile::NamedTempFile, Vec<u8>) {
    use std::io::Write;

    let mut state: u32 = 0x2545_f491;
    let bytes: Vec<u8> = (0..1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        })
        .collect();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&bytes).expect("write artifact");
    file.flush().expect("flush artifact");
    (file, bytes)
}
