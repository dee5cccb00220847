//! In-memory Record Store
//!
//! Keeps serialized documents in a `BTreeMap` keyed by file name so listing
//! order matches the filesystem store. Useful for tests and for ephemeral
//! catalogs; `insert_raw` allows seeding documents that do not parse.

use std::collections::BTreeMap;

use medcat_core::{Error, Record, RecordId, Result};
use parking_lot::RwLock;

use crate::record_store::{check_record_id, RecordStore, ScannedRecord};

/// Record Store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    docs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under a file name, bypassing validation
    pub fn insert_raw(&self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.docs.write().insert(file_name.into(), bytes.into());
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn list_identifiers(&self) -> Result<Vec<RecordId>> {
        Ok(self
            .docs
            .read()
            .keys()
            .filter_map(|name| RecordId::from_file_name(name).ok())
            .collect())
    }

    fn read(&self, id: &RecordId) -> Result<Record> {
        let name = id.file_name();
        let docs = self.docs.read();
        let bytes = docs.get(&name).ok_or_else(|| Error::not_found(id.as_str()))?;
        Record::from_slice(&name, bytes)
    }

    fn write(&self, id: &RecordId, record: &Record) -> Result<()> {
        check_record_id(id, record)?;
        let bytes = serde_json::to_vec(record.as_inner())?;
        self.docs.write().insert(id.file_name(), bytes);
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        Ok(self.docs.write().remove(&id.file_name()).is_some())
    }

    fn exists(&self, id: &RecordId) -> Result<bool> {
        Ok(self.docs.read().contains_key(&id.file_name()))
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn count_files(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn scan(&self) -> Result<Vec<ScannedRecord>> {
        Ok(self
            .docs
            .read()
            .iter()
            .map(|(name, bytes)| ScannedRecord {
                source_ref: name.clone(),
                record: Record::from_slice(name, bytes),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_and_delete() {
        let store = MemoryRecordStore::new();
        let id = RecordId::new("A1").unwrap();
        let record = Record::from_value(json!({"id": "A1", "status": "Active"}));

        store.write(&id, &record).unwrap();
        assert_eq!(store.read(&id).unwrap(), record);
        assert_eq!(store.len(), 1);

        assert!(store.delete(&id).unwrap());
        assert!(matches!(store.read(&id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_scan_is_name_ordered() {
        let store = MemoryRecordStore::new();
        store.insert_raw("b.json", r#"{"id": "b"}"#);
        store.insert_raw("a.json", r#"{"id": "a"}"#);
        store.insert_raw("c.json", "not json");

        let scanned = store.scan().unwrap();
        let names: Vec<_> = scanned.iter().map(|s| s.source_ref.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
        assert!(scanned[2].record.is_err());
    }
}
