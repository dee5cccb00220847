//! Error conversion from internal error types.
//!
//! This module provides conversions from catalog errors to the executor's
//! [`Error`] type.

use crate::Error;
use medcat_core::Error as CatalogError;

/// Convert a catalog error to an executor Error.
///
/// This preserves all error details while mapping to the appropriate
/// executor error variant.
impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { id } => Error::MedicationNotFound { id },
            CatalogError::MalformedRecord { source_ref, reason } => {
                Error::MalformedRecord { source_ref, reason }
            }
            CatalogError::PreconditionFailed(reason) => Error::PreconditionFailed { reason },
            CatalogError::InvalidVersion(v) => Error::InvalidInput {
                reason: format!("invalid version: {}", v),
            },
            CatalogError::InvalidIdentifier(reason) => Error::InvalidInput { reason },
            CatalogError::IoError(e) => Error::Io {
                reason: e.to_string(),
            },
            CatalogError::SerializationError(reason) => Error::Serialization { reason },
            CatalogError::InvalidConfig(reason) => Error::InvalidConfig { reason },
            CatalogError::ExportError(reason) => Error::Export { reason },
        }
    }
}

/// Convert a catalog result to an executor result.
pub fn convert_result<T>(r: medcat_core::Result<T>) -> crate::Result<T> {
    r.map_err(Error::from)
}
