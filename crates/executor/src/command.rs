//! Command enum defining all catalog operations.
//!
//! Commands are the "instruction set" of the catalog service. Every request
//! the serving layer can make is represented as a variant of this enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON by any transport
//! - **Typed**: No generic fallback, every operation has explicit types
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};
use serde_json::Value;

use medcat_engine::{ChangeEvent, FacetKind};

use crate::types::{ExportFormat, ExportTarget};

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Commands | Description |
/// |----------|----------|-------------|
/// | Read | List, Get, Facets, Stats | Served from the loaded index |
/// | Service | Health, Describe | Liveness and metadata |
/// | Write | Upsert, Remove, ApplyChange, ApplyBatch | Record Store mutations |
/// | Index | RebuildIndex, ReloadIndex, Export | Build, refresh and export |
///
/// Writes go to the Record Store only. The loaded index reflects them after
/// the next `RebuildIndex`.
///
/// # Example
///
/// ```ignore
/// use medcat_executor::Command;
///
/// let cmd = Command::List {
///     search: Some("par".into()),
///     field: None,
///     status: Some("active".into()),
///     category: None,
///     limit: Some(20),
///     offset: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Read (4) ====================
    /// Search, filter and paginate index entries.
    /// Returns: `Output::MedicationPage`
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search: Option<String>,
        /// Field searched; `name` when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        /// Page size; the configured default when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<i64>,
    },

    /// Read one full record.
    /// Returns: `Output::Record`
    Get { id: String },

    /// Distinct values of a facet.
    /// Returns: `Output::Values`
    Facets { kind: FacetKind },

    /// Totals and version of the loaded index.
    /// Returns: `Output::Stats`
    Stats,

    // ==================== Service (2) ====================
    /// Store reachability and file counts.
    /// Returns: `Output::Health`
    Health,

    /// Service name, version and command list.
    /// Returns: `Output::Describe`
    Describe,

    // ==================== Write (4) ====================
    /// Create or replace a record.
    /// Returns: `Output::Written`
    Upsert { id: String, record: Value },

    /// Delete a record.
    /// Returns: `Output::Bool` (true if the record existed)
    Remove { id: String },

    /// Apply one change event from the upstream database.
    /// Returns: `Output::Mirrored`
    ApplyChange { event: ChangeEvent },

    /// Apply several change events, skipping failures.
    /// Returns: `Output::Applied`
    ApplyBatch { events: Vec<ChangeEvent> },

    // ==================== Index (3) ====================
    /// Rebuild and persist the index, then serve it.
    /// Returns: `Output::Built`
    RebuildIndex,

    /// Re-read the persisted index.
    /// Returns: `Output::Stats`
    ReloadIndex,

    /// Write entries, records or packages to a file.
    /// Returns: `Output::Exported`
    Export {
        #[serde(default)]
        target: ExportTarget,
        #[serde(default)]
        format: ExportFormat,
        path: String,
    },
}

impl Command {
    /// Names of every command, in declaration order
    pub const NAMES: [&'static str; 13] = [
        "List",
        "Get",
        "Facets",
        "Stats",
        "Health",
        "Describe",
        "Upsert",
        "Remove",
        "ApplyChange",
        "ApplyBatch",
        "RebuildIndex",
        "ReloadIndex",
        "Export",
    ];

    /// Variant name, as used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::List { .. } => "List",
            Command::Get { .. } => "Get",
            Command::Facets { .. } => "Facets",
            Command::Stats => "Stats",
            Command::Health => "Health",
            Command::Describe => "Describe",
            Command::Upsert { .. } => "Upsert",
            Command::Remove { .. } => "Remove",
            Command::ApplyChange { .. } => "ApplyChange",
            Command::ApplyBatch { .. } => "ApplyBatch",
            Command::RebuildIndex => "RebuildIndex",
            Command::ReloadIndex => "ReloadIndex",
            Command::Export { .. } => "Export",
        }
    }

    /// Whether the command changes the store or the index files
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Upsert { .. }
                | Command::Remove { .. }
                | Command::ApplyChange { .. }
                | Command::ApplyBatch { .. }
                | Command::RebuildIndex
                | Command::Export { .. }
        )
    }
}
