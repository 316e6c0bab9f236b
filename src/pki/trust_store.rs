//! Immutable trust anchors and the TLS client configuration built from them.

use crate::error::TrustStoreError;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use rustls::{ClientConfig, RootCertStore};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Certificate authorities GitHub's API and upload hosts chain to.
const GITHUB_ROOTS_PEM: &[u8] = include_bytes!("certs/github-roots.pem");

static PRODUCTION: OnceLock<ReleaseTrustStore> = OnceLock::new();

/// Set of certificate authorities trusted when talking to GitHub.
///
/// Cloning is cheap and shares the same anchors; a store is never mutated
/// after construction.
#[derive(Clone)]
pub struct ReleaseTrustStore {
    roots: Arc<RootCertStore>,
}

impl ReleaseTrustStore {
    /// The store pinned to GitHub's certificate authorities.
    ///
    /// Parsed once per process and shared by every caller afterwards.
    pub fn production() -> Result<Self, TrustStoreError> {
        if let Some(store) = PRODUCTION.get() {
            return Ok(store.clone());
        }
        let store = Self::from_pem(GITHUB_ROOTS_PEM)?;
        Ok(PRODUCTION.get_or_init(|| store).clone())
    }

    /// Build a store from PEM-encoded CA certificates.
    ///
    /// Text outside `BEGIN`/`END` markers is ignored. Input without a single
    /// certificate is rejected; use [`ReleaseTrustStore::empty`] to build a
    /// store that trusts nothing.
    pub fn from_pem(pem: &[u8]) -> Result<Self, TrustStoreError> {
        let certificates = CertificateDer::pem_slice_iter(pem).collect::<Result<Vec<_>, _>>()?;
        if certificates.is_empty() {
            return Err(TrustStoreError::NoCertificates);
        }

        let mut roots = RootCertStore::empty();
        for certificate in certificates {
            roots.add(certificate).map_err(TrustStoreError::Anchor)?;
        }

        Ok(Self {
            roots: Arc::new(roots),
        })
    }

    /// A store that trusts no certificate authority at all.
    ///
    /// Every TLS handshake made with it fails.
    pub fn empty() -> Self {
        Self {
            roots: Arc::new(RootCertStore::empty()),
        }
    }

    /// Number of trust anchors in the store
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the store trusts nothing
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// TLS client configuration validating servers against this store only.
    ///
    /// Uses the ring provider explicitly so no process-wide provider needs
    /// installing.
    pub(crate) fn client_config(&self) -> Result<ClientConfig, TrustStoreError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(TrustStoreError::Tls)?
            .with_root_certificates(Arc::clone(&self.roots))
            .with_no_client_auth();
        Ok(config)
    }
}

impl fmt::Debug for ReleaseTrustStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseTrustStore")
            .field("anchors", &self.roots.len())
            .finish()
    }
}
