//! Version numbers for published releases.
//!
//! Releases are tagged `<major>.<minor>`; the next release increments the
//! minor component of the latest published one.

mod number;

pub use number::VersionNumber;
