//! Parsing, formatting and incrementing of release version numbers.

use crate::error::VersionError;
use std::fmt;
use std::str::FromStr;

/// Version of the project being released.
///
/// Only [`VersionNumber::Release`] values can be published; a development
/// build carries [`VersionNumber::Development`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionNumber {
    /// Unreleased development build
    Development,
    /// Published `<major>.<minor>` version
    Release {
        /// Major component
        major: u32,
        /// Minor component
        minor: u32,
    },
}

impl VersionNumber {
    /// Create a release version
    pub const fn release(major: u32, minor: u32) -> Self {
        Self::Release { major, minor }
    }

    /// Whether this version may be published
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release { .. })
    }

    /// The version following this one: same major, minor plus one.
    pub fn next(&self) -> Result<Self, VersionError> {
        match *self {
            Self::Development => Err(VersionError::DevelopmentVersion),
            Self::Release { major, minor } => {
                let minor = minor.checked_add(1).ok_or_else(|| VersionError::InvalidVersion {
                    version: self.to_string(),
                    reason: "minor component overflows".to_string(),
                })?;
                Ok(Self::Release { major, minor })
            }
        }
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Release { major, minor } => write!(f, "{major}.{minor}"),
        }
    }
}

impl FromStr for VersionNumber {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "development" {
            return Ok(Self::Development);
        }

        let invalid = |reason: &str| VersionError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| invalid("expected <major>.<minor>"))?;

        Ok(Self::Release {
            major: parse_component(major).ok_or_else(|| invalid("major is not a number"))?,
            minor: parse_component(minor).ok_or_else(|| invalid("minor is not a number"))?,
        })
    }
}

// u32::from_str tolerates a leading '+', tags must not
fn parse_component(component: &str) -> Option<u32> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}
