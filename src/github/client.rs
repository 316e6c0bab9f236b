//! One HTTPS exchange with GitHub under connect, first-byte and end-to-end
//! budgets.

use super::audit::{self, AuditEvent, Auditor, NoopAuditor};
use super::authority::{GitHubApiAuthority, Repository};
use super::body::RequestBody;
use super::failure::{ExchangeError, Failure, Headers, Outcome, ResponseError};
use super::models::ReleaseSummary;
use crate::error::{ClientBuildError, VersionError};
use crate::pki::ReleaseTrustStore;
use crate::version::VersionNumber;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// GitHub REST API version pinned on every request
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// `User-Agent` sent on every request
pub const USER_AGENT: &str = "gh-release-client";

const API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_JSON: &str = "application/vnd.github+json";
pub(crate) const JSON: &str = "application/json";

/// Time budgets for one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// DNS resolution, TCP connect and TLS handshake
    pub connect: Duration,
    /// From the request body being handed off until response headers arrive
    pub first_byte: Duration,
    /// The whole exchange, request body and response body included
    pub end_to_end: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            first_byte: Duration::from_secs(30),
            end_to_end: Duration::from_secs(30),
        }
    }
}

/// A request to send through [`GitHubHttp::send`]
#[derive(Debug)]
pub struct GitHubRequest {
    method: Method,
    uri: Url,
    headers: HeaderMap,
    body: RequestBody,
}

impl GitHubRequest {
    /// Request with the given method and no payload
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET` request
    pub fn get(uri: Url) -> Self {
        Self::new(Method::GET, uri)
    }

    /// `POST` request
    pub fn post(uri: Url) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Set a header, replacing any earlier value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the payload
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Target URI
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Method
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// A complete response with the expected status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Request URI
    pub uri: Url,
    /// Response status
    pub status: StatusCode,
    /// Response headers, lower-case names in received order
    pub headers: Headers,
    /// Response body, lossily decoded as UTF-8
    pub body: String,
    raw: Bytes,
}

impl ResponseEnvelope {
    /// Response body exactly as received
    pub fn raw_body(&self) -> &[u8] {
        &self.raw
    }

    /// Deserialize the raw body, classifying any error as `ResponseHandling`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Outcome<T> {
        serde_json::from_slice(&self.raw).map_err(|e| self.handling_failure(e.into()))
    }

    /// `ResponseHandling` failure for this response
    pub fn handling_failure(&self, cause: ResponseError) -> Failure {
        Failure::ResponseHandling {
            uri: self.uri.clone(),
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            cause: Arc::new(cause),
        }
    }
}

/// A complete response of any status
struct Received {
    status: StatusCode,
    headers: Headers,
    raw: Bytes,
}

impl Received {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// Timeout-phased HTTPS client bound to one repository.
///
/// Immutable after construction and cheap to clone. Each operation performs a
/// single exchange, records exactly one [`AuditEvent`], and returns an
/// [`Outcome`]. Nothing is retried.
#[derive(Clone)]
pub struct GitHubHttp {
    client: reqwest::Client,
    api: GitHubApiAuthority,
    repository: Repository,
    timeouts: Timeouts,
    auditor: Arc<dyn Auditor>,
}

impl fmt::Debug for GitHubHttp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubHttp")
            .field("api", &self.api)
            .field("repository", &self.repository)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl GitHubHttp {
    /// Create a client that trusts only `trust` and audits nothing
    pub fn new(
        api: GitHubApiAuthority,
        repository: Repository,
        trust: &ReleaseTrustStore,
        timeouts: Timeouts,
    ) -> Result<Self, ClientBuildError> {
        Self::with_auditor(api, repository, trust, timeouts, Arc::new(NoopAuditor))
    }

    /// Create a client reporting every exchange to `auditor`
    pub fn with_auditor(
        api: GitHubApiAuthority,
        repository: Repository,
        trust: &ReleaseTrustStore,
        timeouts: Timeouts,
        auditor: Arc<dyn Auditor>,
    ) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        let client = reqwest::Client::builder()
            .use_preconfigured_tls(trust.client_config()?)
            .connect_timeout(timeouts.connect)
            .http1_only()
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api,
            repository,
            timeouts,
            auditor,
        })
    }

    /// API authority requests are sent to
    pub fn api(&self) -> &GitHubApiAuthority {
        &self.api
    }

    /// Repository releases are read from and published to
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Budgets applied to every exchange
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Version of the most recent release, `None` when there is none yet.
    ///
    /// Unauthenticated `GET /repos/{owner}/{repo}/releases?per_page=1`.
    pub async fn latest_release_version(&self) -> Outcome<Option<VersionNumber>> {
        let uri = self.api.0.url(
            &["repos", self.repository.owner(), self.repository.name(), "releases"],
            &[("per_page", "1")],
        );

        let request = GitHubRequest::get(uri)
            .header(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
        let response = self.send(request, StatusCode::OK).await?;
        let releases: Vec<ReleaseSummary> = response.json()?;

        match releases.into_iter().next() {
            None => Ok(None),
            Some(latest) => {
                let version = latest
                    .tag_name
                    .parse::<VersionNumber>()
                    .map_err(|e| response.handling_failure(e.into()))?;
                if !version.is_release() {
                    return Err(
                        response.handling_failure(VersionError::DevelopmentVersion.into())
                    );
                }
                Ok(Some(version))
            }
        }
    }

    /// Perform one exchange and require `expected` as the response status.
    ///
    /// Never panics; every way the exchange can go wrong is a [`Failure`].
    pub async fn send(
        &self,
        request: GitHubRequest,
        expected: StatusCode,
    ) -> Outcome<ResponseEnvelope> {
        let uri = request.uri.clone();
        let deadline = Instant::now() + self.timeouts.end_to_end;
        log::debug!("{} {}", request.method, uri);

        let result = match tokio::time::timeout_at(deadline, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::EndToEndTimedOut(self.timeouts.end_to_end)),
        };

        match result {
            Ok(received) => {
                let body = received.text();
                audit::dispatch(
                    self.auditor.as_ref(),
                    &AuditEvent::RequestCompleted {
                        uri: uri.clone(),
                        status_code: received.status,
                        headers: received.headers.clone(),
                        response_body: body.clone(),
                    },
                );
                log::debug!("{} responded {}", uri, received.status);

                if received.status != expected {
                    return Err(Failure::InvalidResponseCode {
                        uri,
                        expected,
                        actual: received.status,
                        headers: received.headers,
                        body,
                    });
                }
                Ok(ResponseEnvelope {
                    uri,
                    status: received.status,
                    headers: received.headers,
                    body,
                    raw: received.raw,
                })
            }
            Err(error) => {
                let cause = Arc::new(error);
                audit::dispatch(
                    self.auditor.as_ref(),
                    &AuditEvent::RequestFailed {
                        uri: uri.clone(),
                        cause: Arc::clone(&cause),
                    },
                );
                let failure = self.classify(uri, cause, deadline);
                log::warn!("{}", failure);
                Err(failure)
            }
        }
    }

    async fn exchange(&self, request: GitHubRequest) -> Result<Received, ExchangeError> {
        let prepared = request.body.prepare().await?;

        let mut builder = self
            .client
            .request(request.method, request.uri)
            .headers(request.headers);
        if let Some(length) = prepared.content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }

        let first_byte = self.timeouts.first_byte;
        let sent = prepared.sent;
        let mut send = pin!(builder.body(prepared.body).send());
        let response = tokio::select! {
            biased;
            response = &mut send => response?,
            () = async {
                let _ = sent.await;
                tokio::time::sleep(first_byte).await;
            } => return Err(ExchangeError::FirstByteTimedOut(first_byte)),
        };

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let raw = response.bytes().await?;

        Ok(Received {
            status,
            headers,
            raw,
        })
    }

    fn classify(&self, uri: Url, cause: Arc<ExchangeError>, deadline: Instant) -> Failure {
        if Instant::now() >= deadline || matches!(*cause, ExchangeError::EndToEndTimedOut(_)) {
            return Failure::EndToEndTimeout {
                uri,
                duration: self.timeouts.end_to_end,
                cause,
            };
        }

        match &*cause {
            ExchangeError::FirstByteTimedOut(_) => Failure::FirstByteTimeout {
                uri,
                duration: self.timeouts.first_byte,
                cause,
            },
            ExchangeError::Transport(error) if error.is_connect() && error.is_timeout() => {
                Failure::ConnectTimeout {
                    uri,
                    duration: self.timeouts.connect,
                    cause,
                }
            }
            _ => Failure::RequestSubmitting { uri, cause },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts_are_thirty_seconds() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(30));
        assert_eq!(timeouts.first_byte, Duration::from_secs(30));
        assert_eq!(timeouts.end_to_end, Duration::from_secs(30));
    }

    #[test]
    fn test_response_envelope_json_shape_mismatch() {
        let envelope = ResponseEnvelope {
            uri: Url::parse("https://api.github.com/repos/o/r/releases").expect("valid url"),
            status: StatusCode::OK,
            headers: vec![],
            body: "{}".to_string(),
            raw: Bytes::from_static(b"{}"),
        };

        let failure = envelope
            .json::<Vec<ReleaseSummary>>()
            .expect_err("object is not an array");
        match failure {
            Failure::ResponseHandling { status, body, cause, .. } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, "{}");
                assert!(matches!(&*cause, ResponseError::Json(e) if e.is_data()));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn test_response_envelope_json_rejects_invalid_utf8() {
        let raw = Bytes::from_static(b"[{\"tag_name\":\"4.\xff\"}]");
        let envelope = ResponseEnvelope {
            uri: Url::parse("https://api.github.com/repos/o/r/releases").expect("valid url"),
            status: StatusCode::OK,
            headers: vec![],
            body: String::from_utf8_lossy(&raw).into_owned(),
            raw,
        };

        let failure = envelope
            .json::<Vec<ReleaseSummary>>()
            .expect_err("invalid utf-8 is not json");
        match failure {
            Failure::ResponseHandling { body, cause, .. } => {
                assert!(body.contains('\u{fffd}'));
                assert!(matches!(&*cause, ResponseError::Json(e) if e.is_syntax()));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert_eq!(envelope.raw_body()[16], 0xff);
    }

    #[tokio::test]
    async fn test_client_builds_with_empty_trust_store() {
        let api = GitHubApiAuthority("api.github.com".parse().expect("valid authority"));
        let client = GitHubHttp::new(
            api,
            Repository::new("o", "r"),
            &ReleaseTrustStore::empty(),
            Timeouts::default(),
        );
        assert!(client.is_ok());
    }
}
