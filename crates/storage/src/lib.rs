//! Storage layer for the medication catalog
//!
//! This crate implements the Record Store:
//! - RecordStore: trait over per-identifier JSON documents
//! - FsRecordStore: one `<id>.json` file per record in a catalog directory
//! - MemoryRecordStore: BTreeMap-backed store with the same ordering
//! - write_atomic: temp + fsync + rename replacement used for every write

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atomic;
pub mod memory;
pub mod record_store;

pub use atomic::write_atomic;
pub use memory::MemoryRecordStore;
pub use record_store::{FsRecordStore, RecordStore, ScannedRecord};
