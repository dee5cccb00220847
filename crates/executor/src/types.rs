//! Supporting types for commands and outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rows an export writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTarget {
    /// Entries of the loaded index
    Index,
    /// Full export table over every record
    #[default]
    Catalog,
    /// One row per packaging option
    Packages,
}

/// Output encoding of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty JSON array of objects
    Json,
}

impl FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "index" => Ok(ExportTarget::Index),
            "catalog" => Ok(ExportTarget::Catalog),
            "packages" => Ok(ExportTarget::Packages),
            other => Err(format!("unknown export target '{}'", other)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

/// Service name, version and supported commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Crate version
    pub version: String,
    /// Names of every command the executor accepts
    pub commands: Vec<String>,
}
