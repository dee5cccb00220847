//! Integration tests for building and persisting the catalog index
//!
//! These tests run the builder against on-disk catalogs and verify:
//! - Malformed record resilience and total/entry consistency
//! - Version monotonicity across rebuilds
//! - Projection idempotence
//! - Legacy index documents as the previous version
//! - Packaging index and exports produced from the same catalog

use std::fs;
use std::path::Path;
use std::sync::Arc;

use medcat_core::{IndexDocument, IndexFormat, IndexVersion};
use medcat_engine::{
    read_previous_version, CatalogConfig, ExportWriter, IndexBuilder, ProjectionTable,
};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn write_record(dir: &Path, id: &str, body: serde_json::Value) {
    fs::write(dir.join(format!("{}.json", id)), body.to_string()).unwrap();
}

fn catalog_with_records(n: usize) -> (TempDir, CatalogConfig) {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..n {
        let id = format!("MOH_{:03}", i);
        write_record(
            temp_dir.path(),
            &id,
            json!({
                "id": id,
                "name": format!("Medication {}", i),
                "status": if i % 2 == 0 { "active" } else { "discontinued" },
                "category": "Analgesic",
                "codes": {"atc5": {"code": format!("N02BE{:02}", i)}},
                "packaging": [{"package_id": format!("P{}", i), "size": 10}]
            }),
        );
    }
    let config = CatalogConfig::for_dir(temp_dir.path());
    (temp_dir, config)
}

fn builder_for(config: &CatalogConfig) -> IndexBuilder {
    IndexBuilder::new(Arc::new(config.open_store().unwrap()))
}

#[test]
fn test_malformed_record_is_skipped() {
    let (temp_dir, config) = catalog_with_records(9);
    fs::write(temp_dir.path().join("MOH_999.json"), "{\"id\": \"MOH_999\",").unwrap();

    let outcome = builder_for(&config)
        .build_and_persist(&config.index_path(), None)
        .unwrap();

    assert_eq!(outcome.document.total(), 9);
    assert_eq!(outcome.report.scanned, 10);
    assert_eq!(outcome.report.skipped.len(), 1);
    assert_eq!(outcome.report.skipped[0].source_ref, "MOH_999.json");

    let persisted =
        IndexDocument::from_json_str(&fs::read_to_string(config.index_path()).unwrap()).unwrap();
    assert_eq!(persisted.total(), persisted.entries().len());
    assert!(persisted.is_consistent());
}

#[test]
fn test_rebuild_is_idempotent_and_bumps_patch() {
    let (_temp_dir, config) = catalog_with_records(5);
    let builder = builder_for(&config);

    let first = builder.build_and_persist(&config.index_path(), None).unwrap();
    let second = builder.build_and_persist(&config.index_path(), None).unwrap();
    let third = builder.build_and_persist(&config.index_path(), None).unwrap();

    assert_eq!(first.document.version(), "1.0.0");
    assert_eq!(second.document.version(), "1.0.1");
    assert_eq!(third.document.version(), "1.0.2");
    assert_eq!(first.document.entries(), third.document.entries());
}

#[test]
fn test_index_file_is_not_indexed() {
    let (_temp_dir, config) = catalog_with_records(3);
    let builder = builder_for(&config);
    builder.build_and_persist(&config.index_path(), None).unwrap();
    let again = builder.build_and_persist(&config.index_path(), None).unwrap();

    assert_eq!(again.report.scanned, 3);
    assert!(again.document.find("catalog_index").is_none());
}

#[test]
fn test_empty_catalog_builds_empty_index() {
    let (_temp_dir, config) = catalog_with_records(0);
    let outcome = builder_for(&config)
        .build_and_persist(&config.index_path(), None)
        .unwrap();
    assert_eq!(outcome.document.total(), 0);
    assert!(outcome.document.entries().is_empty());
}

#[test]
fn test_missing_catalog_dir_is_precondition_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config = CatalogConfig::for_dir(temp_dir.path().join("missing"));
    assert!(matches!(
        config.open_store(),
        Err(medcat_core::Error::PreconditionFailed(_))
    ));
}

#[test]
fn test_legacy_index_resets_version() {
    let (_temp_dir, config) = catalog_with_records(2);
    fs::write(
        config.index_path(),
        json!({"catalog": {
            "name": "OpenMed Catalog",
            "version": "1.0",
            "lastUpdated": "2024-01-01T00:00:00",
            "totalMedications": 1,
            "medications": [{"moh": "MOH_001", "product": {"name": "Old"}}]
        }})
        .to_string(),
    )
    .unwrap();

    let previous =
        IndexDocument::from_json_str(&fs::read_to_string(config.index_path()).unwrap()).unwrap();
    assert_eq!(previous.format(), IndexFormat::Legacy);
    assert_eq!(read_previous_version(&config.index_path()).as_deref(), Some("1.0"));

    let outcome = builder_for(&config)
        .build_and_persist(&config.index_path(), None)
        .unwrap();
    assert_eq!(outcome.report.version, IndexVersion::INITIAL);
    assert_eq!(outcome.document.projection_version(), Some(2));
}

#[test]
fn test_record_prefix_limits_records() {
    let (temp_dir, mut config) = catalog_with_records(2);
    write_record(temp_dir.path(), "schema", json!({"id": "schema"}));
    config.record_prefix = Some("MOH_".to_string());

    let outcome = builder_for(&config)
        .build_and_persist(&config.index_path(), None)
        .unwrap();
    assert_eq!(outcome.document.total(), 2);
}

#[test]
fn test_packages_index_and_export() {
    let (_temp_dir, config) = catalog_with_records(3);
    let builder = builder_for(&config).with_packaging(ProjectionTable::packaging());

    let outcome = builder
        .build_and_persist(&config.index_path(), Some(&config.packages_path()))
        .unwrap();
    assert_eq!(outcome.packages.len(), 3);

    let persisted: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(config.packages_path()).unwrap()).unwrap();
    assert_eq!(persisted[0]["catalog_id"], json!("MOH_000"));

    let mut csv = Vec::new();
    ExportWriter::new()
        .write_csv(&outcome.packages, &mut csv)
        .unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("catalog_id,name,"));
    assert!(csv.lines().next().unwrap().ends_with(",filename"));

    // generated files are not records on the next scan
    let again = builder
        .build_and_persist(&config.index_path(), Some(&config.packages_path()))
        .unwrap();
    assert_eq!(again.report.scanned, 3);
}

#[test]
fn test_full_export_rows() {
    let (_temp_dir, config) = catalog_with_records(2);
    let rows = builder_for(&config)
        .project_all(&ProjectionTable::catalog_export())
        .unwrap();
    assert_eq!(rows.len(), 2);

    let mut out = Vec::new();
    ExportWriter::new().write_csv(&rows, &mut out).unwrap();
    let header = String::from_utf8(out).unwrap().lines().next().unwrap().to_string();
    assert!(header.starts_with("id,name,category,atc_code,atc4_code,atc5_code,moh_code,"));
    assert!(header.ends_with(",filename"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_total_matches_entries(valid in 0usize..12, broken in 0usize..4) {
        let (temp_dir, config) = catalog_with_records(valid);
        for i in 0..broken {
            fs::write(temp_dir.path().join(format!("ZZ_{}.json", i)), "[1, 2").unwrap();
        }
        let outcome = builder_for(&config).build(None).unwrap();
        prop_assert_eq!(outcome.document.total(), valid);
        prop_assert_eq!(outcome.document.entries().len(), valid);
        prop_assert_eq!(outcome.report.skipped.len(), broken);
    }
}
