//! Error types for the medication catalog
//!
//! This module defines the error taxonomy shared by every crate in the
//! workspace. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! | Variant | Raised by | Fatal? |
//! |---------|-----------|--------|
//! | `NotFound` | direct single-record reads | yes, for that read |
//! | `MalformedRecord` | record parsing | only for direct reads; skipped during builds |
//! | `PreconditionFailed` | index build when the store root is missing | yes |
//! | `InvalidVersion` | prior index version parsing | never, recovered by resetting to `1.0.0` |

use std::io;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the medication catalog
#[derive(Debug, Error)]
pub enum Error {
    /// No record exists for the identifier
    #[error("Record not found: {id}")]
    NotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// A record document failed to parse
    #[error("Malformed record {source_ref}: {reason}")]
    MalformedRecord {
        /// File name (or other source reference) of the bad document
        source_ref: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A precondition for the operation does not hold
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A version string is not `major.minor.patch`
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// An identifier cannot be mapped to a record file
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tabular or JSON export failed
    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl Error {
    /// Construct a `NotFound` error
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    /// Construct a `MalformedRecord` error
    pub fn malformed(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        Error::MalformedRecord {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error only concerns a single record
    ///
    /// Per-record errors are isolated during bulk builds instead of aborting them.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            Error::MalformedRecord { .. } | Error::NotFound { .. } | Error::IoError(_)
        )
    }
}
