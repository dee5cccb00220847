//! Serialization round-trip tests for Command, Output and Error.
//!
//! These tests verify the wire shape transports rely on and that values
//! survive JSON encoding.

use serde_json::json;

use crate::{Command, Error, ExportFormat, ExportTarget, FacetKind, Output};

/// Helper to test round-trip serialization of a Command.
fn test_command_round_trip(cmd: Command) {
    let json = serde_json::to_string(&cmd).expect("Failed to serialize command");
    let restored: Command = serde_json::from_str(&json).expect("Failed to deserialize command");
    assert_eq!(cmd, restored, "Command round-trip failed for: {}", json);
}

#[test]
fn test_command_unit_variants() {
    for cmd in [
        Command::Stats,
        Command::Health,
        Command::Describe,
        Command::RebuildIndex,
        Command::ReloadIndex,
    ] {
        test_command_round_trip(cmd);
    }
}

#[test]
fn test_command_list_omits_absent_fields() {
    let cmd = Command::List {
        search: Some("par".into()),
        field: None,
        status: None,
        category: None,
        limit: Some(5),
        offset: None,
    };
    assert_eq!(
        serde_json::to_value(&cmd).unwrap(),
        json!({"List": {"search": "par", "limit": 5}})
    );
    test_command_round_trip(cmd);
}

#[test]
fn test_command_from_transport_json() {
    let cmd: Command = serde_json::from_value(json!({"Facets": {"kind": "manufacturer"}})).unwrap();
    assert_eq!(
        cmd,
        Command::Facets {
            kind: FacetKind::Manufacturer
        }
    );

    let cmd: Command = serde_json::from_value(json!({"Export": {"path": "out.csv"}})).unwrap();
    assert_eq!(
        cmd,
        Command::Export {
            target: ExportTarget::Catalog,
            format: ExportFormat::Csv,
            path: "out.csv".into()
        }
    );
}

#[test]
fn test_command_rejects_unknown_fields() {
    let result: Result<Command, _> =
        serde_json::from_value(json!({"Get": {"id": "A1", "extra": true}}));
    assert!(result.is_err());
}

#[test]
fn test_command_names_match_wire_tags() {
    let cmd = Command::Remove { id: "A1".into() };
    let value = serde_json::to_value(&cmd).unwrap();
    assert!(value.get(cmd.name()).is_some());
    assert!(Command::NAMES.contains(&cmd.name()));
    assert!(cmd.is_write());
    assert!(!Command::Stats.is_write());
}

#[test]
fn test_output_round_trip() {
    let output = Output::Applied {
        applied: 2,
        total: 3,
    };
    let json = serde_json::to_string(&output).unwrap();
    assert_eq!(serde_json::from_str::<Output>(&json).unwrap(), output);
}

#[test]
fn test_error_round_trip() {
    let err = Error::MalformedRecord {
        source_ref: "A.json".into(),
        reason: "EOF".into(),
    };
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(serde_json::from_str::<Error>(&json).unwrap(), err);
    assert_eq!(err.to_string(), "malformed record A.json: EOF");
}
