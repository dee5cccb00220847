//! Medcat - file-backed medication catalog
//!
//! Medcat keeps one JSON document per medication in a catalog directory,
//! derives a compact searchable index from those documents, and serves
//! search, filtering, pagination, facets and exports from that index.
//!
//! # Quick Start
//!
//! ```ignore
//! use medcat::{CatalogConfig, Command, Executor, Output};
//!
//! let executor = Executor::open(CatalogConfig::for_dir("catalog"))?;
//! executor.execute(Command::RebuildIndex)?;
//!
//! let page = executor.execute(Command::List {
//!     search: Some("par".into()),
//!     field: None,
//!     status: Some("active".into()),
//!     category: None,
//!     limit: Some(20),
//!     offset: None,
//! })?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which dispatches typed
//! [`Command`]s and returns typed [`Output`]s. Index building, querying and
//! record storage live in internal crates and are not exposed here.

// Re-export the public API from medcat-executor
pub use medcat_executor::*;
