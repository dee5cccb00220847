//! Record identifier type
//!
//! Every medication is keyed by a catalog identifier that doubles as the
//! stem of its backing file (`<id>.json`). Identifiers are validated so they
//! can never address a file outside the catalog directory.
//!
//! ## Validation
//!
//! Identifiers must:
//! - Be 1-128 bytes
//! - Contain only ASCII alphanumerics, dash, underscore, dot
//! - Not start with a dot

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum length of a record identifier in bytes
pub const MAX_RECORD_ID_LENGTH: usize = 128;

/// Extension of record and index files
pub const JSON_EXTENSION: &str = "json";

/// Stable, immutable catalog identifier of one medication
///
/// # Examples
///
/// ```
/// use medcat_core::RecordId;
///
/// let id = RecordId::new("MOH_1234").unwrap();
/// assert_eq!(id.file_name(), "MOH_1234.json");
/// assert_eq!(RecordId::from_file_name("MOH_1234.json").unwrap(), id);
///
/// assert!(RecordId::new("../etc/passwd").is_err());
/// assert!(RecordId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a new RecordId, validating the input
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(RecordId(id))
    }

    /// Validate an identifier
    pub fn validate(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidIdentifier("identifier cannot be empty".into()));
        }
        if id.len() > MAX_RECORD_ID_LENGTH {
            return Err(Error::InvalidIdentifier(format!(
                "identifier too long: {} bytes (max {})",
                id.len(),
                MAX_RECORD_ID_LENGTH
            )));
        }
        if id.starts_with('.') {
            return Err(Error::InvalidIdentifier(format!(
                "identifier cannot start with '.': {}",
                id
            )));
        }
        if let Some((position, c)) = id
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(Error::InvalidIdentifier(format!(
                "invalid character '{}' at position {} in {:?}",
                c, position, id
            )));
        }
        Ok(())
    }

    /// Derive the identifier from a record file name (`<id>.json`)
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let stem = file_name
            .strip_suffix(".json")
            .ok_or_else(|| Error::InvalidIdentifier(format!("not a JSON file: {}", file_name)))?;
        RecordId::new(stem)
    }

    /// File name of the backing document
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, JSON_EXTENSION)
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordId::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        RecordId::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
