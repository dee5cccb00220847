//! Shared fixtures for catalog workflow tests.

use std::path::Path;

use medcat::{CatalogConfig, Command, Executor};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Catalog directory with three well-formed records.
pub fn catalog_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        json!({"id": "MOH_1", "name": "Paracetamol 500mg", "status": "Active",
               "category": "Analgesics", "manufacturer": {"name": "Acme Pharma"},
               "packaging": [{"package_id": "MOH_1-20", "size": 20},
                             {"package_id": "MOH_1-100", "size": 100}]}),
    );
    write(
        temp_dir.path(),
        json!({"id": "MOH_2", "name": "Ibuprofen 400mg", "status": "Active",
               "category": "Analgesics", "manufacturer": {"name": "Generix"}}),
    );
    write(
        temp_dir.path(),
        json!({"id": "MOH_3", "name": "Amoxicillin 250mg", "status": "Discontinued",
               "category": "Antibiotics", "manufacturer": {"name": "Acme Pharma"}}),
    );
    temp_dir
}

pub fn write(dir: &Path, record: Value) {
    let id = record["id"].as_str().unwrap().to_string();
    std::fs::write(dir.join(format!("{}.json", id)), record.to_string()).unwrap();
}

/// Executor over a fresh catalog with the index built.
pub fn create_executor() -> (TempDir, Executor) {
    let temp_dir = catalog_dir();
    let executor = Executor::open(CatalogConfig::for_dir(temp_dir.path())).unwrap();
    executor.execute(Command::RebuildIndex).unwrap();
    (temp_dir, executor)
}

/// Command listing everything with default paging.
pub fn list_all() -> Command {
    Command::List {
        search: None,
        field: None,
        status: None,
        category: None,
        limit: None,
        offset: None,
    }
}
