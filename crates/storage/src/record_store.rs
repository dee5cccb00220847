//! Record Store: one JSON document per catalog identifier
//!
//! ## Layout
//!
//! `<root>/<id>.json` holds the record for `id`. Generated outputs that share
//! the directory (the index file, the packaging index) are excluded by name.
//! When a record prefix is configured, only files whose stem starts with it
//! are records.
//!
//! ## Consistency
//!
//! The store is shared with external writers (the change mirror). Nothing is
//! cached: every listing and read goes back to the filesystem. Writes replace
//! files atomically so a concurrent reader never sees a torn document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use medcat_core::{Error, Record, RecordId, Result};
use tracing::debug;

use crate::atomic::write_atomic;

/// One record file encountered by a scan
#[derive(Debug)]
pub struct ScannedRecord {
    /// File name of the document
    pub source_ref: String,
    /// Parsed record, or why it could not be read
    pub record: Result<Record>,
}

/// Access to the authoritative record documents
///
/// Implementations must be safe to share between threads. `write` and
/// `delete` are idempotent: repeating them leaves the store unchanged.
pub trait RecordStore: Send + Sync {
    /// Identifiers of all records, ascending by file name
    fn list_identifiers(&self) -> Result<Vec<RecordId>>;

    /// Read one record
    ///
    /// Returns `NotFound` for unknown identifiers and `MalformedRecord` when
    /// the document does not parse.
    fn read(&self, id: &RecordId) -> Result<Record>;

    /// Create or replace a record (last write wins)
    fn write(&self, id: &RecordId, record: &Record) -> Result<()>;

    /// Remove a record, returning whether it existed
    fn delete(&self, id: &RecordId) -> Result<bool>;

    /// Whether a record exists for the identifier
    fn exists(&self, id: &RecordId) -> Result<bool>;

    /// Every record with its parse outcome, ascending by file name
    ///
    /// Fails only when the store itself is unavailable; per-record problems
    /// are reported inside the returned entries.
    fn scan(&self) -> Result<Vec<ScannedRecord>>;

    /// Source reference (file name) recorded in index entries
    fn source_ref(&self, id: &RecordId) -> String {
        id.file_name()
    }

    /// Human-readable location of the store
    fn location(&self) -> String;

    /// Number of JSON documents held, including non-record files
    fn count_files(&self) -> Result<usize> {
        Ok(self.list_identifiers()?.len())
    }
}

/// Reject records whose own `id` disagrees with the key they are stored under
pub(crate) fn check_record_id(id: &RecordId, record: &Record) -> Result<()> {
    if !record.is_object() {
        return Err(Error::malformed(
            id.file_name(),
            "document is not a JSON object",
        ));
    }
    match record.id() {
        Some(own) if own != id.as_str() => Err(Error::InvalidIdentifier(format!(
            "record id {:?} does not match key {:?}",
            own,
            id.as_str()
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// FsRecordStore
// =============================================================================

/// Filesystem-backed Record Store
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    root: PathBuf,
    record_prefix: Option<String>,
    excluded: Vec<String>,
}

impl FsRecordStore {
    /// Open an existing catalog directory
    ///
    /// Returns `PreconditionFailed` if the directory does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::PreconditionFailed(format!(
                "catalog directory {} does not exist",
                root.display()
            )));
        }
        Ok(Self::unchecked(root))
    }

    /// Open a catalog directory, creating it if missing
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self::unchecked(root))
    }

    fn unchecked(root: PathBuf) -> Self {
        FsRecordStore {
            root,
            record_prefix: None,
            excluded: Vec::new(),
        }
    }

    /// Only treat files whose stem starts with `prefix` as records
    pub fn with_record_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.record_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    /// Exclude a co-located generated file from record listings
    pub fn exclude(mut self, file_name: impl Into<String>) -> Self {
        self.excluded.push(file_name.into());
        self
    }

    /// Catalog directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::PreconditionFailed(format!(
                "catalog directory {} does not exist",
                self.root.display()
            )))
        }
    }

    fn path_for(&self, id: &RecordId) -> PathBuf {
        self.root.join(id.file_name())
    }

    fn json_file_names(&self) -> Result<Vec<String>> {
        self.ensure_root()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn is_record_file(&self, name: &str) -> bool {
        if self.excluded.iter().any(|ex| ex == name) {
            return false;
        }
        match &self.record_prefix {
            Some(prefix) => name.starts_with(prefix.as_str()),
            None => true,
        }
    }

    /// Record file names, ascending
    pub fn record_file_names(&self) -> Result<Vec<String>> {
        Ok(self
            .json_file_names()?
            .into_iter()
            .filter(|name| self.is_record_file(name))
            .collect())
    }

    /// Number of `*.json` files in the directory, records or not
    pub fn count_json_files(&self) -> Result<usize> {
        Ok(self.json_file_names()?.len())
    }
}

impl RecordStore for FsRecordStore {
    fn list_identifiers(&self) -> Result<Vec<RecordId>> {
        Ok(self
            .record_file_names()?
            .iter()
            .filter_map(|name| RecordId::from_file_name(name).ok())
            .collect())
    }

    fn read(&self, id: &RecordId) -> Result<Record> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found(id.as_str()))
            }
            Err(e) => return Err(e.into()),
        };
        Record::from_slice(&id.file_name(), &bytes)
    }

    fn write(&self, id: &RecordId, record: &Record) -> Result<()> {
        check_record_id(id, record)?;
        let text = record.to_json_string_pretty()?;
        write_atomic(&self.path_for(id), text.as_bytes())?;
        debug!(id = %id, "record written");
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                debug!(id = %id, "record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, id: &RecordId) -> Result<bool> {
        Ok(self.path_for(id).is_file())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn count_files(&self) -> Result<usize> {
        self.count_json_files()
    }

    fn scan(&self) -> Result<Vec<ScannedRecord>> {
        let names = self.record_file_names()?;
        let mut scanned = Vec::with_capacity(names.len());
        for name in names {
            let record = match fs::read(self.root.join(&name)) {
                Ok(bytes) => Record::from_slice(&name, &bytes),
                Err(e) => Err(e.into()),
            };
            scanned.push(ScannedRecord {
                source_ref: name,
                record,
            });
        }
        Ok(scanned)
    }
}
