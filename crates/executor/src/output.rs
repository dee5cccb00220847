//! Output enum for command execution results.
//!
//! Every command produces exactly one output type. This mapping is deterministic:
//! the same command always produces the same output variant (though the values
//! may differ based on catalog state).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use medcat_core::IndexEntry;
use medcat_engine::{BuildReport, HealthReport, IndexStats, MirrorAction};

use crate::types::ServiceInfo;

/// Successful command execution results.
///
/// Each [`Command`](crate::Command) variant maps to exactly one `Output` variant.
///
/// # Example
///
/// ```text
/// use medcat_executor::{Command, Output, Executor};
///
/// let result = executor.execute(Command::Facets { kind: FacetKind::Category })?;
///
/// match result {
///     Output::Values(categories) => println!("{} categories", categories.len()),
///     _ => unreachable!("Facets always returns Values"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    // ==================== Primitive Results ====================
    /// Boolean result
    Bool(bool),

    /// Sorted distinct values
    Values(Vec<String>),

    // ==================== Read Results ====================
    /// One page of index entries
    MedicationPage {
        /// Entries in the window
        medications: Vec<IndexEntry>,
        /// Entries in this page
        total: usize,
        /// Matching entries before pagination
        matched: usize,
        /// Page size applied
        limit: i64,
        /// Page start applied
        offset: i64,
    },

    /// One full record
    Record(Value),

    /// Loaded index summary
    Stats(IndexStats),

    // ==================== Service ====================
    /// Store health
    Health(HealthReport),

    /// Service metadata
    Describe(ServiceInfo),

    // ==================== Write Results ====================
    /// Record written under this identifier
    Written {
        /// Record identifier
        id: String,
    },

    /// Result of one change event
    Mirrored(MirrorAction),

    /// Result of a change batch
    Applied {
        /// Events applied
        applied: usize,
        /// Events received
        total: usize,
    },

    // ==================== Index Results ====================
    /// Build diagnostics
    Built(BuildReport),

    /// Export written
    Exported {
        /// Destination file
        path: String,
        /// Rows written
        rows: usize,
    },
}
