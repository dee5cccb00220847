//! Core types for the medication catalog
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy
//! - Record / JsonPath: Record documents and null-safe nested extraction
//! - RecordId: Validated catalog identifier
//! - IndexVersion: Semantic version stamp of the persisted index
//! - IndexDocument / IndexEntry / PackageEntry: Derived index types and their persisted formats

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod json;
pub mod types;
pub mod version;

pub use error::{Error, Result};
pub use index::{FieldMap, IndexDocument, IndexEntry, IndexFormat, PackageEntry, SOURCE_REF_FIELD};
pub use json::{get_at_path, lookup, JsonPath, PathParseError, PathSegment, Record};
pub use types::{RecordId, JSON_EXTENSION, MAX_RECORD_ID_LENGTH};
pub use version::IndexVersion;
