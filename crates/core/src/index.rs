//! Index Document, Index Entry and Package Entry types
//!
//! The Index Document is persisted as
//!
//! ```json
//! { "catalog_index": {
//!     "version": "1.0.3",
//!     "generated_at": "2024-05-01T10:00:00.000000Z",
//!     "total_medications": 2,
//!     "projection_version": 2,
//!     "medications": [ { "id": "A1", ... }, ... ] } }
//! ```
//!
//! Older generators wrote a `catalog` envelope with camelCase metadata
//! (`lastUpdated`, `totalMedications`). Both envelopes are readable; only the
//! current one is written. Entries are kept as ordered JSON objects so that
//! index files produced with a different field set load without loss.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::version::IndexVersion;

/// Ordered field map shared by entries and export rows
pub type FieldMap = Map<String, Value>;

/// Field naming the source file of an entry
pub const SOURCE_REF_FIELD: &str = "filename";

// =============================================================================
// IndexEntry
// =============================================================================

/// Compact per-record summary used for listing and search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexEntry(FieldMap);

impl IndexEntry {
    /// Wrap an already projected field map
    pub fn from_map(fields: FieldMap) -> Self {
        IndexEntry(fields)
    }

    /// Raw field lookup
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Field lookup that only yields strings
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Catalog identifier
    pub fn id(&self) -> Option<&str> {
        self.text("id")
    }

    /// Display name
    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// Registration status (open set: active, discontinued, ...)
    pub fn status(&self) -> Option<&str> {
        self.text("status")
    }

    /// Therapeutic category
    pub fn category(&self) -> Option<&str> {
        self.text("category")
    }

    /// File name of the source record
    pub fn source_ref(&self) -> Option<&str> {
        self.text(SOURCE_REF_FIELD)
    }

    /// Borrow the field map
    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }

    /// Take the field map
    pub fn into_map(self) -> FieldMap {
        self.0
    }
}

impl AsRef<FieldMap> for IndexEntry {
    fn as_ref(&self) -> &FieldMap {
        &self.0
    }
}

// =============================================================================
// PackageEntry
// =============================================================================

/// One packaging option of a record, carrying its parent's identity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageEntry(FieldMap);

impl PackageEntry {
    /// Wrap an already projected field map
    pub fn from_map(fields: FieldMap) -> Self {
        PackageEntry(fields)
    }

    /// Identifier of the parent record
    pub fn catalog_id(&self) -> Option<&str> {
        self.0.get("catalog_id").and_then(Value::as_str)
    }

    /// Raw field lookup
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Borrow the field map
    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

impl AsRef<FieldMap> for PackageEntry {
    fn as_ref(&self) -> &FieldMap {
        &self.0
    }
}

// =============================================================================
// IndexDocument
// =============================================================================

/// Which envelope an Index Document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    /// `catalog_index` envelope
    #[default]
    Current,
    /// `catalog` envelope written by older generators
    Legacy,
}

/// Versioned container of all Index Entries
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    version: String,
    generated_at: String,
    total: usize,
    projection_version: Option<u32>,
    entries: Vec<IndexEntry>,
    format: IndexFormat,
}

impl IndexDocument {
    /// Assemble a freshly built document stamped with the current time
    ///
    /// `total` is always the number of entries.
    pub fn new(version: IndexVersion, projection_version: u32, entries: Vec<IndexEntry>) -> Self {
        IndexDocument {
            version: version.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            total: entries.len(),
            projection_version: Some(projection_version),
            entries,
            format: IndexFormat::Current,
        }
    }

    /// An empty document, as served before any index has been built
    pub fn empty() -> Self {
        IndexDocument {
            version: String::new(),
            generated_at: String::new(),
            total: 0,
            projection_version: None,
            entries: Vec::new(),
            format: IndexFormat::Current,
        }
    }

    /// Override the generation timestamp
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    /// Raw version string as persisted
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parsed version, if the stored string is `major.minor.patch`
    pub fn parsed_version(&self) -> Result<IndexVersion> {
        self.version.parse()
    }

    /// ISO-8601 generation timestamp as persisted
    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    /// Declared number of medications
    pub fn total(&self) -> usize {
        self.total
    }

    /// Projection table version that produced the entries
    ///
    /// `None` for documents written before projection tables were versioned.
    pub fn projection_version(&self) -> Option<u32> {
        self.projection_version
    }

    /// Entries in store order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Envelope the document was read from
    pub fn format(&self) -> IndexFormat {
        self.format
    }

    /// Whether the declared total matches the entry count
    pub fn is_consistent(&self) -> bool {
        self.total == self.entries.len()
    }

    /// Find an entry by catalog identifier
    pub fn find(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.id() == Some(id))
    }

    /// Parse either envelope
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_envelope(serde_json::from_str(s)?)
    }

    /// Parse either envelope from raw bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_envelope(serde_json::from_slice(bytes)?)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self> {
        Ok(match envelope {
            Envelope::Current { catalog_index: body } => IndexDocument {
                version: body.version,
                generated_at: body.generated_at,
                total: body.total_medications.unwrap_or(body.medications.len()),
                projection_version: body.projection_version,
                entries: body.medications,
                format: IndexFormat::Current,
            },
            Envelope::Legacy { catalog: body } => IndexDocument {
                version: body.version,
                generated_at: body.last_updated,
                total: body.total_medications.unwrap_or(body.medications.len()),
                projection_version: None,
                entries: body.medications,
                format: IndexFormat::Legacy,
            },
        })
    }

    /// Serialize to the current envelope, pretty-printed
    pub fn to_json_string(&self) -> Result<String> {
        let envelope = CurrentEnvelopeRef {
            catalog_index: CurrentBodyRef {
                version: &self.version,
                generated_at: &self.generated_at,
                total_medications: self.total,
                projection_version: self.projection_version,
                medications: &self.entries,
            },
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }
}

impl Default for IndexDocument {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Wire formats
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Current { catalog_index: CurrentBody },
    Legacy { catalog: LegacyBody },
}

#[derive(Deserialize)]
struct CurrentBody {
    #[serde(default)]
    version: String,
    #[serde(default)]
    generated_at: String,
    #[serde(default)]
    total_medications: Option<usize>,
    #[serde(default)]
    projection_version: Option<u32>,
    #[serde(default)]
    medications: Vec<IndexEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBody {
    #[serde(default)]
    version: String,
    #[serde(default)]
    last_updated: String,
    #[serde(default)]
    total_medications: Option<usize>,
    #[serde(default)]
    medications: Vec<IndexEntry>,
}

#[derive(Serialize)]
struct CurrentEnvelopeRef<'a> {
    catalog_index: CurrentBodyRef<'a>,
}

#[derive(Serialize)]
struct CurrentBodyRef<'a> {
    version: &'a str,
    generated_at: &'a str,
    total_medications: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection_version: Option<u32>,
    medications: &'a [IndexEntry],
}
