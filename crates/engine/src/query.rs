//! Query Engine: search, filter, paginate and facet over index entries
//!
//! Stages run in a fixed order, each narrowing the previous one:
//!
//! 1. search: case-insensitive substring on one field (default `name`)
//! 2. status: case-insensitive equality
//! 3. category: case-insensitive equality
//! 4. pagination: half-open window `[offset, offset + limit)`
//!
//! Nothing here fails. Absent fields, unknown search fields and
//! out-of-range windows all produce empty results.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use medcat_core::IndexEntry;

/// Field searched when a query names none
pub const DEFAULT_SEARCH_FIELD: &str = "name";

/// Page size when a query names none
pub const DEFAULT_LIMIT: i64 = 100;

/// Filters and window for one list request
///
/// Empty strings are treated as absent filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Substring to look for
    pub search: Option<String>,
    /// Field the search applies to
    pub field: String,
    /// Required status
    pub status: Option<String>,
    /// Required category
    pub category: Option<String>,
    /// Maximum entries returned; zero or less yields an empty page
    pub limit: i64,
    /// Entries skipped before the page starts; negative counts as zero
    pub offset: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            search: None,
            field: DEFAULT_SEARCH_FIELD.to_string(),
            status: None,
            category: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    /// Query matching everything, first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `term` in the current search field
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Search a different field
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Keep only entries with this status
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Keep only entries in this category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Page size
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Page start
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of matching entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Entries inside the window, in index order
    pub entries: Vec<IndexEntry>,
    /// Number of entries in this page
    pub total: usize,
    /// Number of matching entries before pagination
    pub matched: usize,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Text a search term is matched against
///
/// Strings are used as-is, lists are joined with a single space, and
/// absent or `null` values are empty.
pub fn searchable_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| searchable_text(Some(v)))
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => other.to_string(),
    }
}

fn equals_ignore_case(value: Option<&str>, wanted: &str) -> bool {
    value.map_or(false, |v| v.to_lowercase() == wanted.to_lowercase())
}

/// Whether an entry passes the search and filter stages
pub fn matches(entry: &IndexEntry, query: &ListQuery) -> bool {
    if let Some(term) = non_empty(&query.search) {
        let text = searchable_text(entry.field(&query.field)).to_lowercase();
        if !text.contains(&term.to_lowercase()) {
            return false;
        }
    }
    if let Some(status) = non_empty(&query.status) {
        if !equals_ignore_case(entry.status(), status) {
            return false;
        }
    }
    if let Some(category) = non_empty(&query.category) {
        if !equals_ignore_case(entry.category(), category) {
            return false;
        }
    }
    true
}

/// Number of entries passing the search and filter stages
pub fn count_matches(entries: &[IndexEntry], query: &ListQuery) -> usize {
    entries.iter().filter(|e| matches(e, query)).count()
}

/// Run all four stages
pub fn query(entries: &[IndexEntry], query: &ListQuery) -> QueryPage {
    let filtered: Vec<&IndexEntry> = entries.iter().filter(|e| matches(e, query)).collect();
    let matched = filtered.len();

    if query.limit <= 0 {
        return QueryPage {
            entries: Vec::new(),
            total: 0,
            matched,
        };
    }

    let offset = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
    let start = offset.min(matched);
    let end = start.saturating_add(limit).min(matched);

    let page: Vec<IndexEntry> = filtered[start..end].iter().map(|e| (*e).clone()).collect();
    QueryPage {
        total: page.len(),
        entries: page,
        matched,
    }
}

// =============================================================================
// Facets
// =============================================================================

/// Field a distinct-value listing is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    /// `manufacturer.name` of each record
    Manufacturer,
    /// `category`
    Category,
    /// `status`
    Status,
}

impl FacetKind {
    /// All facet kinds
    pub const ALL: [FacetKind; 3] = [FacetKind::Manufacturer, FacetKind::Category, FacetKind::Status];

    /// Entry field holding the facet value
    pub fn field(&self) -> &'static str {
        match self {
            FacetKind::Manufacturer => "manufacturer",
            FacetKind::Category => "category",
            FacetKind::Status => "status",
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for FacetKind {
    type Err = String;

    /// Accepts singular and plural names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manufacturer" | "manufacturers" => Ok(FacetKind::Manufacturer),
            "category" | "categories" => Ok(FacetKind::Category),
            "status" | "statuses" => Ok(FacetKind::Status),
            other => Err(format!(
                "unknown facet '{}', expected manufacturer, category or status",
                other
            )),
        }
    }
}

/// Distinct non-empty values of a facet, sorted ascending
///
/// Manufacturer names are taken from the entry when its projection carries
/// them and resolved through `resolve` otherwise. Sorting is case-sensitive.
pub fn facets<F>(entries: &[IndexEntry], kind: FacetKind, resolve: F) -> Vec<String>
where
    F: Fn(&IndexEntry) -> Option<String>,
{
    let mut values = BTreeSet::new();
    for entry in entries {
        let value = match kind {
            FacetKind::Manufacturer => match entry.text(kind.field()) {
                Some(name) => Some(name.to_string()),
                None => resolve(entry),
            },
            FacetKind::Category | FacetKind::Status => {
                entry.text(kind.field()).map(str::to_string)
            }
        };
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            values.insert(v);
        }
    }
    values.into_iter().collect()
}
