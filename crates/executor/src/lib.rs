//! # Medication Catalog Executor
//!
//! The public API of the medication catalog. It provides:
//! - [`Executor`] - opens a catalog directory and runs commands against it
//! - [`Command`]/[`Output`] - the serializable serving interface
//! - [`Error`] - structured, serializable errors
//!
//! ## Quick Start
//!
//! ```text
//! use medcat_executor::{CatalogConfig, Command, Executor, Output};
//!
//! let executor = Executor::open(CatalogConfig::for_dir("catalog"))?;
//! executor.execute(Command::RebuildIndex)?;
//!
//! let page = executor.execute(Command::List {
//!     search: Some("para".into()),
//!     field: None,
//!     status: Some("active".into()),
//!     category: None,
//!     limit: Some(10),
//!     offset: None,
//! })?;
//! ```
//!
//! ## Commands
//!
//! | Command | Touches |
//! |---------|---------|
//! | List, Get, Facets, Stats | loaded index (Get and manufacturer facets also read records) |
//! | Upsert, Remove, ApplyChange, ApplyBatch | Record Store |
//! | RebuildIndex, ReloadIndex | index file and loaded index |
//! | Export | export file |

#![warn(missing_docs)]

mod command;
mod convert;
mod error;
mod executor;
mod output;
mod types;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;
pub use types::*;

// Re-export the types commands and outputs carry
pub use medcat_core::{IndexDocument, IndexEntry, Record, RecordId};
pub use medcat_engine::{
    BuildReport, CatalogConfig, ChangeBatch, ChangeEvent, FacetKind, HealthReport, IndexStats,
    MirrorAction, CONFIG_FILE_NAME,
};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
