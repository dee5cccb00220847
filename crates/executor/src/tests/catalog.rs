//! Tests for the read, index and export commands.

use serde_json::json;

use super::{create_test_executor, seeded_catalog};
use crate::{CatalogConfig, Command, Error, Executor, ExportFormat, ExportTarget, FacetKind, Output};

fn list(search: Option<&str>, status: Option<&str>, limit: Option<i64>) -> Command {
    Command::List {
        search: search.map(str::to_string),
        field: None,
        status: status.map(str::to_string),
        category: None,
        limit,
        offset: None,
    }
}

fn page_ids(output: Output) -> Vec<String> {
    match output {
        Output::MedicationPage { medications, .. } => medications
            .iter()
            .filter_map(|m| m.id().map(str::to_string))
            .collect(),
        other => panic!("Expected MedicationPage, got {:?}", other),
    }
}

#[test]
fn test_rebuild_reports_skipped_record() {
    let temp_dir = seeded_catalog();
    let executor = Executor::open(CatalogConfig::for_dir(temp_dir.path())).unwrap();

    match executor.execute(Command::RebuildIndex).unwrap() {
        Output::Built(report) => {
            assert_eq!(report.indexed, 2);
            assert_eq!(report.skipped.len(), 1);
            assert_eq!(report.packages, 1);
            assert_eq!(report.version.to_string(), "1.0.0");
        }
        other => panic!("Expected Built, got {:?}", other),
    }
    assert!(temp_dir.path().join("catalog_index.json").is_file());
    assert!(temp_dir.path().join("packages_index.json").is_file());
}

#[test]
fn test_list_search_and_status() {
    let (_dir, executor) = create_test_executor();

    assert_eq!(page_ids(executor.execute(list(Some("am"), None, None)).unwrap()), ["A2"]);
    assert_eq!(page_ids(executor.execute(list(None, Some("active"), None)).unwrap()), ["A1"]);
    assert!(page_ids(executor.execute(list(None, None, Some(0))).unwrap()).is_empty());
}

#[test]
fn test_list_echoes_window() {
    let (_dir, executor) = create_test_executor();
    match executor.execute(list(None, None, None)).unwrap() {
        Output::MedicationPage {
            total,
            matched,
            limit,
            offset,
            ..
        } => {
            assert_eq!(total, 2);
            assert_eq!(matched, 2);
            assert_eq!(limit, 100);
            assert_eq!(offset, 0);
        }
        other => panic!("Expected MedicationPage, got {:?}", other),
    }
}

#[test]
fn test_list_total_is_page_length() {
    let (_dir, executor) = create_test_executor();
    match executor.execute(list(None, None, Some(1))).unwrap() {
        Output::MedicationPage {
            medications,
            total,
            matched,
            ..
        } => {
            assert_eq!(medications.len(), 1);
            assert_eq!(total, 1);
            assert_eq!(matched, 2);
        }
        other => panic!("Expected MedicationPage, got {:?}", other),
    }
}

#[test]
fn test_get_and_not_found() {
    let (_dir, executor) = create_test_executor();

    match executor.execute(Command::Get { id: "A1".into() }).unwrap() {
        Output::Record(value) => assert_eq!(value["manufacturer"]["name"], json!("Bayer")),
        other => panic!("Expected Record, got {:?}", other),
    }
    assert_eq!(
        executor.execute(Command::Get { id: "Z9".into() }),
        Err(Error::MedicationNotFound { id: "Z9".into() })
    );
    assert!(matches!(
        executor.execute(Command::Get { id: "BAD".into() }),
        Err(Error::MalformedRecord { .. })
    ));
}

#[test]
fn test_facets() {
    let (_dir, executor) = create_test_executor();
    assert_eq!(
        executor
            .execute(Command::Facets {
                kind: FacetKind::Category
            })
            .unwrap(),
        Output::Values(vec!["Analgesic".into(), "Antibiotic".into()])
    );
    assert_eq!(
        executor
            .execute(Command::Facets {
                kind: FacetKind::Manufacturer
            })
            .unwrap(),
        Output::Values(vec!["Bayer".into(), "Teva".into()])
    );
}

#[test]
fn test_stats_and_health() {
    let (_dir, executor) = create_test_executor();

    match executor.execute(Command::Stats).unwrap() {
        Output::Stats(stats) => {
            assert_eq!(stats.total, 2);
            assert_eq!(stats.version, "1.0.0");
            assert_eq!(stats.projection_version, Some(2));
        }
        other => panic!("Expected Stats, got {:?}", other),
    }

    match executor.execute(Command::Health).unwrap() {
        Output::Health(health) => {
            assert_eq!(health.status, "healthy");
            // A1, A2 and BAD are records; the two generated files are not
            assert_eq!(health.medications_count, 3);
            assert_eq!(health.total_files, 5);
        }
        other => panic!("Expected Health, got {:?}", other),
    }
}

#[test]
fn test_describe_lists_commands() {
    let (_dir, executor) = create_test_executor();
    match executor.execute(Command::Describe).unwrap() {
        Output::Describe(info) => {
            assert!(!info.version.is_empty());
            assert_eq!(info.commands.len(), Command::NAMES.len());
            assert!(info.commands.iter().any(|c| c == "RebuildIndex"));
        }
        other => panic!("Expected Describe, got {:?}", other),
    }
}

#[test]
fn test_reload_picks_up_external_build() {
    let (dir, executor) = create_test_executor();
    let other = Executor::open(CatalogConfig::for_dir(dir.path())).unwrap();
    other.execute(Command::RebuildIndex).unwrap();

    match executor.execute(Command::ReloadIndex).unwrap() {
        Output::Stats(stats) => assert_eq!(stats.version, "1.0.1"),
        other => panic!("Expected Stats, got {:?}", other),
    }
}

#[test]
fn test_open_missing_catalog_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = Executor::open(CatalogConfig::for_dir(dir.path().join("nope")));
    assert!(matches!(result, Err(Error::PreconditionFailed { .. })));
}

#[test]
fn test_corrupt_index_is_rebuilt_from_initial_version() {
    let temp_dir = seeded_catalog();
    std::fs::write(temp_dir.path().join("catalog_index.json"), "{ truncated").unwrap();

    let executor = Executor::open(CatalogConfig::for_dir(temp_dir.path())).unwrap();
    match executor.execute(Command::Stats).unwrap() {
        Output::Stats(stats) => assert_eq!(stats.total, 0),
        other => panic!("Expected Stats, got {:?}", other),
    }
    assert!(executor.execute(Command::ReloadIndex).is_err());

    match executor.execute(Command::RebuildIndex).unwrap() {
        Output::Built(report) => {
            assert_eq!(report.version.to_string(), "1.0.0");
            assert_eq!(report.previous_version, None);
        }
        other => panic!("Expected Built, got {:?}", other),
    }
    assert_eq!(page_ids(executor.execute(list(None, None, None)).unwrap()), ["A1", "A2"]);
}

#[test]
fn test_json_export_into_catalog_dir_is_rejected() {
    let (dir, executor) = create_test_executor();
    let inside = dir.path().join("export.json");

    let result = executor.execute(Command::Export {
        target: ExportTarget::Catalog,
        format: ExportFormat::Json,
        path: inside.display().to_string(),
    });
    assert!(matches!(result, Err(Error::InvalidInput { .. })));
    assert!(!inside.exists());

    // CSV is never scanned as a record
    let csv = dir.path().join("export.csv");
    executor
        .execute(Command::Export {
            target: ExportTarget::Catalog,
            format: ExportFormat::Csv,
            path: csv.display().to_string(),
        })
        .unwrap();

    match executor.execute(Command::RebuildIndex).unwrap() {
        Output::Built(report) => assert_eq!(report.skipped.len(), 1),
        other => panic!("Expected Built, got {:?}", other),
    }
}

#[test]
fn test_export_targets() {
    let (dir, executor) = create_test_executor();
    let out = tempfile::tempdir().unwrap();

    let cases = [
        (ExportTarget::Index, ExportFormat::Csv, 2),
        (ExportTarget::Catalog, ExportFormat::Json, 2),
        (ExportTarget::Packages, ExportFormat::Csv, 1),
    ];
    for (target, format, expected) in cases {
        let path = out.path().join(format!("{:?}.{}", target, format));
        let output = executor
            .execute(Command::Export {
                target,
                format,
                path: path.display().to_string(),
            })
            .unwrap();
        match output {
            Output::Exported { rows, .. } => assert_eq!(rows, expected),
            other => panic!("Expected Exported, got {:?}", other),
        }
        assert!(path.is_file());
    }

    let csv = std::fs::read_to_string(out.path().join("Index.csv")).unwrap();
    assert!(csv.starts_with("id,name,category,"));
    drop(dir);
}
