//! Build, query, mirror and export through the facade.

use crate::common::*;
use medcat::{
    ChangeBatch, Command, Error, ExportFormat, ExportTarget, FacetKind, MirrorAction, Output,
    RecordId,
};
use serde_json::json;

fn page_ids(output: Output) -> (Vec<String>, usize) {
    match output {
        Output::MedicationPage {
            medications, total, ..
        } => (
            medications
                .iter()
                .filter_map(|e| e.id().map(str::to_string))
                .collect(),
            total,
        ),
        other => panic!("Expected MedicationPage output, got {:?}", other),
    }
}

#[test]
fn build_then_search_by_name_and_status() {
    let (_dir, executor) = create_executor();

    let output = executor
        .execute(Command::List {
            search: Some("MG".into()),
            field: None,
            status: Some("active".into()),
            category: None,
            limit: None,
            offset: None,
        })
        .unwrap();

    let (ids, total) = page_ids(output);
    assert_eq!(ids, vec!["MOH_1", "MOH_2"]);
    assert_eq!(total, 2);
}

#[test]
fn manufacturer_facet_is_sorted_and_distinct() {
    let (_dir, executor) = create_executor();

    let output = executor
        .execute(Command::Facets {
            kind: FacetKind::Manufacturer,
        })
        .unwrap();

    assert_eq!(
        output,
        Output::Values(vec!["Acme Pharma".into(), "Generix".into()])
    );
}

#[test]
fn get_missing_medication_is_not_found() {
    let (_dir, executor) = create_executor();

    let err = executor
        .execute(Command::Get { id: "MOH_404".into() })
        .unwrap_err();

    assert!(matches!(err, Error::MedicationNotFound { .. }));
}

#[test]
fn mirrored_changes_show_after_rebuild() {
    let (_dir, executor) = create_executor();

    let batch: ChangeBatch = serde_json::from_value(json!({
        "Records": [
            {"eventName": "INSERT", "dynamodb": {"NewImage": {
                "id": {"S": "MOH_4"},
                "name": {"S": "Cetirizine 10mg"},
                "status": {"S": "Active"},
                "category": {"S": "Antihistamines"}
            }}},
            {"eventName": "REMOVE", "dynamodb": {"OldImage": {"id": {"S": "MOH_3"}}}}
        ]
    }))
    .unwrap();

    let applied = executor
        .execute(Command::ApplyBatch {
            events: batch.records,
        })
        .unwrap();
    assert_eq!(applied, Output::Applied { applied: 2, total: 2 });

    // Served index is unchanged until rebuilt
    let (before, _) = page_ids(executor.execute(list_all()).unwrap());
    assert_eq!(before, vec!["MOH_1", "MOH_2", "MOH_3"]);

    executor.execute(Command::RebuildIndex).unwrap();
    let (after, total) = page_ids(executor.execute(list_all()).unwrap());
    assert_eq!(after, vec!["MOH_1", "MOH_2", "MOH_4"]);
    assert_eq!(total, 3);
}

#[test]
fn remove_missing_record_returns_false() {
    let (_dir, executor) = create_executor();

    let output = executor
        .execute(Command::Remove { id: "MOH_404".into() })
        .unwrap();

    assert_eq!(output, Output::Bool(false));
}

#[test]
fn apply_change_reports_mirror_action() {
    let (_dir, executor) = create_executor();

    let batch: ChangeBatch = serde_json::from_value(json!({
        "Records": [{"eventName": "REMOVE", "dynamodb": {"OldImage": {"id": {"S": "MOH_2"}}}}]
    }))
    .unwrap();
    let event = batch.records.into_iter().next().unwrap();

    let output = executor.execute(Command::ApplyChange { event }).unwrap();

    assert_eq!(
        output,
        Output::Mirrored(MirrorAction::Removed {
            id: RecordId::new("MOH_2").unwrap(),
            existed: true,
        })
    );
}

#[test]
fn rebuild_bumps_version() {
    let (_dir, executor) = create_executor();

    let first = match executor.execute(Command::Stats).unwrap() {
        Output::Stats(stats) => stats.version,
        other => panic!("Expected Stats output, got {:?}", other),
    };
    executor.execute(Command::RebuildIndex).unwrap();
    let second = match executor.execute(Command::Stats).unwrap() {
        Output::Stats(stats) => stats.version,
        other => panic!("Expected Stats output, got {:?}", other),
    };

    assert_eq!(first, "1.0.0");
    assert_eq!(second, "1.0.1");
}

#[test]
fn export_packages_writes_one_row_per_package() {
    let (dir, executor) = create_executor();
    let path = dir.path().join("out").join("packages.csv");

    let output = executor
        .execute(Command::Export {
            target: ExportTarget::Packages,
            format: ExportFormat::Csv,
            path: path.to_string_lossy().to_string(),
        })
        .unwrap();

    match output {
        Output::Exported { rows, .. } => assert_eq!(rows, 2),
        other => panic!("Expected Exported output, got {:?}", other),
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn paged_list_reports_page_length_and_match_count() {
    let (_dir, executor) = create_executor();

    let output = executor
        .execute(Command::List {
            search: None,
            field: None,
            status: None,
            category: Some("analgesics".into()),
            limit: Some(1),
            offset: Some(1),
        })
        .unwrap();

    match output {
        Output::MedicationPage {
            medications,
            total,
            matched,
            ..
        } => {
            assert_eq!(medications[0].id(), Some("MOH_2"));
            assert_eq!(total, 1);
            assert_eq!(matched, 2);
        }
        other => panic!("Expected MedicationPage output, got {:?}", other),
    }
}

#[test]
fn corrupt_index_file_is_regenerated() {
    let dir = catalog_dir();
    std::fs::write(dir.path().join("catalog_index.json"), "{ truncated").unwrap();

    let executor = medcat::Executor::open(medcat::CatalogConfig::for_dir(dir.path())).unwrap();
    match executor.execute(Command::RebuildIndex).unwrap() {
        Output::Built(report) => assert_eq!(report.version.to_string(), "1.0.0"),
        other => panic!("Expected Built output, got {:?}", other),
    }
}
