//! ArgMatches → Command conversion.
//!
//! Translates clap's parsed arguments into the appropriate action:
//! - Catalog commands → `CliAction::Execute(Command)`
//! - `init-config` → `CliAction::InitConfig`, handled before the catalog opens

use std::io::Read;
use std::str::FromStr;

use clap::ArgMatches;
use medcat_executor::{ChangeBatch, Command, ExportFormat, ExportTarget, FacetKind};
use serde_json::Value;

/// The result of parsing user input.
#[derive(Debug)]
pub enum CliAction {
    /// A command to run through the executor.
    Execute(Command),
    /// Write a default config file.
    InitConfig,
}

/// Convert top-level ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command given".to_string())?;

    let cmd = match name {
        "init-config" => return Ok(CliAction::InitConfig),
        "build" => Command::RebuildIndex,
        "export" => parse_export(sub)?,
        "list" => parse_list(sub),
        "get" => Command::Get {
            id: required(sub, "id")?,
        },
        "facets" => {
            let kind = FacetKind::from_str(&required(sub, "kind")?)?;
            Command::Facets { kind }
        }
        "stats" => Command::Stats,
        "health" => Command::Health,
        "describe" => Command::Describe,
        "upsert" => {
            let id = required(sub, "id")?;
            let record = read_json_from_source(&required(sub, "file")?)?;
            Command::Upsert { id, record }
        }
        "remove" => Command::Remove {
            id: required(sub, "id")?,
        },
        "apply" => {
            let json = read_json_from_source(&required(sub, "file")?)?;
            let batch: ChangeBatch = serde_json::from_value(json)
                .map_err(|e| format!("Invalid change notification: {}", e))?;
            Command::ApplyBatch {
                events: batch.records,
            }
        }
        other => return Err(format!("Unknown command: {}", other)),
    };

    Ok(CliAction::Execute(cmd))
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}

fn parse_list(matches: &ArgMatches) -> Command {
    Command::List {
        search: matches.get_one::<String>("search").cloned(),
        field: matches.get_one::<String>("field").cloned(),
        status: matches.get_one::<String>("status").cloned(),
        category: matches.get_one::<String>("category").cloned(),
        limit: matches.get_one::<i64>("limit").copied(),
        offset: matches.get_one::<i64>("offset").copied(),
    }
}

fn parse_export(matches: &ArgMatches) -> Result<Command, String> {
    let target = match matches.get_one::<String>("target") {
        Some(t) => ExportTarget::from_str(t)?,
        None => ExportTarget::default(),
    };
    let format = match matches.get_one::<String>("format") {
        Some(f) => ExportFormat::from_str(f)?,
        None => ExportFormat::default(),
    };
    Ok(Command::Export {
        target,
        format,
        path: required(matches, "output")?,
    })
}

// =========================================================================
// File reading helper
// =========================================================================

/// Read a JSON document from a file or stdin.
///
/// If `source` is "-", reads from stdin.
fn read_json_from_source(source: &str) -> Result<Value, String> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("Failed to read '{}': {}", source, e))?
    };

    serde_json::from_str(&content).map_err(|e| format!("Invalid JSON in '{}': {}", source, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn action(args: &[&str]) -> Result<CliAction, String> {
        let matches = build_cli().try_get_matches_from(args).unwrap();
        matches_to_action(&matches)
    }

    fn command(args: &[&str]) -> Command {
        match action(args).unwrap() {
            CliAction::Execute(cmd) => cmd,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_list_flags() {
        let cmd = command(&[
            "medcat", "list", "--search", "par", "--status", "active", "--limit", "5",
        ]);
        assert_eq!(
            cmd,
            Command::List {
                search: Some("par".into()),
                field: None,
                status: Some("active".into()),
                category: None,
                limit: Some(5),
                offset: None,
            }
        );
    }

    #[test]
    fn test_list_accepts_negative_offset() {
        match command(&["medcat", "list", "--offset", "-3"]) {
            Command::List { offset, .. } => assert_eq!(offset, Some(-3)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_facets_plural_kind() {
        assert_eq!(
            command(&["medcat", "facets", "manufacturers"]),
            Command::Facets {
                kind: FacetKind::Manufacturer
            }
        );
        assert!(action(&["medcat", "facets", "colours"]).is_err());
    }

    #[test]
    fn test_export_defaults() {
        assert_eq!(
            command(&["medcat", "export", "out.csv"]),
            Command::Export {
                target: ExportTarget::default(),
                format: ExportFormat::default(),
                path: "out.csv".into(),
            }
        );
    }

    #[test]
    fn test_export_cli_default_matches_command_default() {
        let from_cli = command(&["medcat", "export", "out.csv"]);
        let from_json: Command =
            serde_json::from_value(serde_json::json!({"Export": {"path": "out.csv"}})).unwrap();
        assert_eq!(from_cli, from_json);
        assert!(matches!(
            from_cli,
            Command::Export {
                target: ExportTarget::Catalog,
                ..
            }
        ));
    }

    #[test]
    fn test_init_config_is_not_a_command() {
        assert!(matches!(
            action(&["medcat", "init-config"]).unwrap(),
            CliAction::InitConfig
        ));
    }

    #[test]
    fn test_upsert_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.json");
        std::fs::write(&path, r#"{"name": "Paracetamol"}"#).unwrap();
        let path = path.to_string_lossy().to_string();

        match command(&["medcat", "upsert", "A1", &path]) {
            Command::Upsert { id, record } => {
                assert_eq!(id, "A1");
                assert_eq!(record["name"], "Paracetamol");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_apply_reads_change_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"{"Records": [{"eventName": "REMOVE", "dynamodb": {"OldImage": {"id": {"S": "A1"}}}}]}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().to_string();

        match command(&["medcat", "apply", &path]) {
            Command::ApplyBatch { events } => assert_eq!(events.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let path = path.to_string_lossy().to_string();

        assert!(action(&["medcat", "upsert", "A1", &path]).is_err());
    }
}
