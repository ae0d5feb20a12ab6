//! `major.minor` version numbers and the compatibility gate.
//!
//! Config files may declare the version of the layout they follow. A file is
//! compatible with an expected version when the majors are equal and the
//! file's minor is at least the expected minor: a file may carry more fields
//! than the application knows about, never fewer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionSpec {
    pub major: u32,
    pub minor: u32,
}

/// Result of comparing a found version against an expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    Ok,
    MajorMismatch,
    MinorTooLow,
}

impl Compatibility {
    pub fn is_ok(self) -> bool {
        matches!(self, Compatibility::Ok)
    }
}

/// Error returned when a version string is not `N`, `N.M` or `N.M.P`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version number {0:?}, expected <major>.<minor>")]
pub struct InvalidVersion(pub String);

impl VersionSpec {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Check whether a file declaring `found` may be loaded by an
    /// application expecting `self`.
    pub fn check(&self, found: &VersionSpec) -> Compatibility {
        if found.major != self.major {
            Compatibility::MajorMismatch
        } else if found.minor < self.minor {
            Compatibility::MinorTooLow
        } else {
            Compatibility::Ok
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for VersionSpec {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || InvalidVersion(s.to_string());
        let mut parts = trimmed.split('.');
        let major = parts.next().unwrap_or_default();
        let minor = parts.next();
        let patch = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }
        let parse = |part: &str| -> Result<u32, InvalidVersion> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let major = parse(major)?;
        let minor = match minor {
            Some(minor) => parse(minor)?,
            None => 0,
        };
        // Patch level is validated but plays no part in the gate.
        if let Some(patch) = patch {
            parse(patch)?;
        }
        Ok(Self { major, minor })
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
