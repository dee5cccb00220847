//! Semantic version stamp of the persisted index
//!
//! Each regeneration bumps the patch component of the previously persisted
//! version. A missing or unparseable prior version restarts at `1.0.0`.
//! The next version is a pure function of the prior version string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// `major.minor.patch` version of an Index Document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component, bumped on every regeneration
    pub patch: u64,
}

impl IndexVersion {
    /// Version assigned to the first build, or after an unparseable prior
    pub const INITIAL: IndexVersion = IndexVersion::new(1, 0, 0);

    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        IndexVersion {
            major,
            minor,
            patch,
        }
    }

    /// The version that follows this one (`a.b.c` -> `a.b.(c+1)`)
    ///
    /// Saturates instead of overflowing the patch component.
    pub fn bump_patch(self) -> Self {
        IndexVersion {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }

    /// Compute the version of the next build
    ///
    /// - `Some("a.b.c")` parseable -> `a.b.(c+1)`
    /// - `None` -> `1.0.0`
    /// - unparseable -> `1.0.0`, with the parse error returned for diagnostics
    pub fn next_after(previous: Option<&str>) -> (IndexVersion, Option<Error>) {
        match previous {
            None => (IndexVersion::INITIAL, None),
            Some(raw) => match raw.parse::<IndexVersion>() {
                Ok(v) => (v.bump_patch(), None),
                Err(e) => (IndexVersion::INITIAL, Some(e)),
            },
        }
    }
}

impl Default for IndexVersion {
    fn default() -> Self {
        IndexVersion::INITIAL
    }
}

impl FromStr for IndexVersion {
    type Err = Error;

    /// Parse exactly three dot-separated unsigned integers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVersion(s.to_string());
        let mut parts = s.trim().split('.');
        let mut component = || -> Result<u64, Error> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u64>().map_err(|_| invalid())
        };
        let major = component()?;
        let minor = component()?;
        let patch = component()?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(IndexVersion::new(major, minor, patch))
    }
}

impl fmt::Display for IndexVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for IndexVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IndexVersion> for String {
    fn from(v: IndexVersion) -> Self {
        v.to_string()
    }
}
