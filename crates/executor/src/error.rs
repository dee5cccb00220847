//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Lossless**: No error information is lost in conversion from internal errors

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Not Found | `MedicationNotFound` | No record for the identifier |
/// | Validation | `InvalidInput`, `MalformedRecord` | Bad input or bad stored document |
/// | State | `PreconditionFailed`, `InvalidConfig` | Catalog not usable as configured |
/// | System | `Io`, `Serialization`, `Export`, `Internal` | Infrastructure errors |
///
/// # Example
///
/// ```ignore
/// use medcat_executor::{Command, Error, Executor};
///
/// match executor.execute(Command::Get { id: "MOH_1".into() }) {
///     Ok(output) => { /* handle success */ }
///     Err(Error::MedicationNotFound { id }) => {
///         println!("Medication '{}' not found", id);
///     }
///     Err(e) => {
///         println!("Error: {}", e);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// No record exists for the identifier
    #[error("medication not found: {id}")]
    MedicationNotFound { id: String },

    // ==================== Validation Errors ====================
    /// Invalid input
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A stored record does not parse
    #[error("malformed record {source_ref}: {reason}")]
    MalformedRecord { source_ref: String, reason: String },

    // ==================== State Errors ====================
    /// Catalog directory missing or similar
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// Configuration could not be parsed
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ==================== System Errors ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Export failed
    #[error("export error: {reason}")]
    Export { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}
