//! Test modules for the executor crate.

pub mod catalog;
pub mod serialization;

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use crate::{CatalogConfig, Executor};

/// Catalog directory seeded with the two-record scenario plus one bad file.
pub(crate) fn seeded_catalog() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "A1.json",
        json!({"id": "A1", "name": "Aspirin", "status": "Active", "category": "Analgesic",
               "manufacturer": {"name": "Bayer"},
               "packaging": [{"package_id": "A1-20", "size": 20}]}),
    );
    write(
        temp_dir.path(),
        "A2.json",
        json!({"id": "A2", "name": "Amoxicillin", "status": "Discontinued",
               "category": "Antibiotic", "manufacturer": {"name": "Teva"}}),
    );
    std::fs::write(temp_dir.path().join("BAD.json"), "{").unwrap();
    temp_dir
}

fn write(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), value.to_string()).unwrap();
}

/// Executor over a seeded catalog, with the index already built.
pub(crate) fn create_test_executor() -> (TempDir, Executor) {
    let temp_dir = seeded_catalog();
    let executor = Executor::open(CatalogConfig::for_dir(temp_dir.path())).unwrap();
    executor.execute(crate::Command::RebuildIndex).unwrap();
    (temp_dir, executor)
}
