//! Pinned TLS trust for release automation.
//!
//! Release runs validate GitHub's certificates against a fixed set of
//! certificate authorities bundled with this crate rather than whatever the
//! build host happens to trust.

mod trust_store;

pub use trust_store::ReleaseTrustStore;
