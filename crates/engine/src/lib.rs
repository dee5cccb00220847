//! Catalog engine
//!
//! This crate turns a Record Store into a queryable catalog:
//! - projection: versioned tables mapping records to entries and export rows
//! - builder: scan, project, version and persist the Index Document
//! - query: search, filters, pagination and facets over index entries
//! - catalog_index: the loaded, hot-reloadable index behind the serving API
//! - export: CSV and JSON renderings with deterministic column order
//! - mirror: applies external change events to the store
//! - config: `catalog.toml`
//!
//! Building and serving are separate: writes to the store never touch the
//! loaded index until the next build and reload.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod catalog_index;
pub mod config;
pub mod export;
pub mod mirror;
pub mod projection;
pub mod query;

pub use builder::{read_previous_version, BuildOutcome, BuildReport, IndexBuilder, SkippedRecord};
pub use catalog_index::{CatalogIndex, HealthReport, IndexStats};
pub use config::{CatalogConfig, CONFIG_FILE_NAME};
pub use export::{ExportRow, ExportWriter, DEFAULT_LIST_DELIMITER, PRIORITY_COLUMNS};
pub use mirror::{
    apply_batch, apply_change, decode_image, remove, upsert, AttributeValue, ChangeBatch,
    ChangeEvent, ChangeImages, ChangeKind, Image, MirrorAction,
};
pub use projection::{
    flatten_value, FieldSource, FieldSpec, ProjectionTable, CURRENT_PROJECTION_VERSION,
};
pub use query::{
    count_matches, facets, matches, query, searchable_text, FacetKind, ListQuery, QueryPage,
    DEFAULT_LIMIT, DEFAULT_SEARCH_FIELD,
};
