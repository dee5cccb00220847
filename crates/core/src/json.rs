//! JSON types for catalog records
//!
//! This module defines:
//! - Record: Newtype wrapper around the `serde_json::Value` of one medication
//! - JsonPath: Path into a JSON document (e.g., `codes.atc5.code` or `packaging[0]`)
//! - PathSegment: Individual path component (Key or Index)
//! - get_at_path / lookup: null-safe nested extraction
//!
//! Extraction never fails: a missing key, an out-of-range index, or a type
//! mismatch on any intermediate segment yields `None`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

use crate::error::{Error, Result};

// =============================================================================
// Record
// =============================================================================

/// Authoritative JSON document for one medication
///
/// # Examples
///
/// ```
/// use medcat_core::Record;
///
/// let record: Record = r#"{"id": "A1", "codes": {"atc5": {"code": "N02BE01"}}}"#
///     .parse()
///     .unwrap();
/// assert_eq!(record.id(), Some("A1"));
/// assert_eq!(record.lookup_str("codes.atc5.code"), Some("N02BE01"));
/// assert!(record.lookup("codes.atc4.code").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Record(serde_json::Value);

impl Record {
    /// Field holding the catalog identifier
    pub const ID_FIELD: &'static str = "id";

    /// Create from a serde_json::Value
    pub fn from_value(value: serde_json::Value) -> Self {
        Record(value)
    }

    /// Parse a record from raw file bytes
    ///
    /// The document must be a JSON object; anything else is malformed.
    pub fn from_slice(source_ref: &str, bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| Error::malformed(source_ref, e))?;
        if !value.is_object() {
            return Err(Error::malformed(source_ref, "document is not a JSON object"));
        }
        Ok(Record(value))
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }

    /// The record's `id` field, if it is a string
    pub fn id(&self) -> Option<&str> {
        self.0.get(Self::ID_FIELD).and_then(|v| v.as_str())
    }

    /// Null-safe nested lookup by dotted path
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        lookup(&self.0, path)
    }

    /// Null-safe nested lookup returning a string slice
    pub fn lookup_str(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(|v| v.as_str())
    }

    /// Serialize to pretty JSON, keeping non-ASCII characters verbatim
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Record::from_slice("<inline>", s.as_bytes())
    }
}

impl Deref for Record {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<serde_json::Value> for Record {
    fn from(v: serde_json::Value) -> Self {
        Record(v)
    }
}

impl From<Record> for serde_json::Value {
    fn from(r: Record) -> Self {
        r.0
    }
}

// =============================================================================
// JsonPath and PathSegment
// =============================================================================

/// Error type for JSON path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// A segment in a JSON path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A path into a JSON document
///
/// | Syntax | Meaning | Example |
/// |--------|---------|---------|
/// | `key` | Object property | `status` |
/// | `a.b` | Nested property | `manufacturer.name` |
/// | `a[n]` | Property then index | `packaging[0]` |
/// | (empty) | Root | `` |
///
/// # Examples
///
/// ```
/// use medcat_core::json::JsonPath;
///
/// let built = JsonPath::root().key("codes").key("atc5").key("code");
/// let parsed: JsonPath = "codes.atc5.code".parse().unwrap();
/// assert_eq!(built, parsed);
/// assert_eq!(parsed.to_string(), "codes.atc5.code");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        JsonPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        JsonPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Get the number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Convert to a string representation
    pub fn to_path_string(&self) -> String {
        let mut result = String::new();
        for seg in &self.segments {
            match seg {
                PathSegment::Key(k) => {
                    if !result.is_empty() {
                        result.push('.');
                    }
                    result.push_str(k);
                }
                PathSegment::Index(i) => {
                    result.push('[');
                    result.push_str(&i.to_string());
                    result.push(']');
                }
            }
        }
        result
    }
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    /// Parse a dotted catalog path such as `codes.atc5.code` or
    /// `packaging[0].barcode`
    ///
    /// Each dot-separated component is a key optionally followed by array
    /// indices. Positions in errors are byte offsets into `s`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(JsonPath::root());
        }

        let mut segments = Vec::new();
        let mut offset = 0;
        for component in s.split('.') {
            let (key, indices) = component.split_at(component.find('[').unwrap_or(component.len()));
            if key.is_empty() && indices.is_empty() {
                return Err(PathParseError::EmptyKey(offset));
            }
            if let Some((i, c)) = key.char_indices().find(|(_, c)| !is_key_char(*c)) {
                return Err(PathParseError::UnexpectedChar(c, offset + i));
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            parse_indices(indices, offset + key.len(), &mut segments)?;
            offset += component.len() + 1;
        }

        Ok(JsonPath { segments })
    }
}

/// Parse a run of `[n]` suffixes starting at byte `pos`
fn parse_indices(
    mut rest: &str,
    mut pos: usize,
    segments: &mut Vec<PathSegment>,
) -> std::result::Result<(), PathParseError> {
    while let Some(c) = rest.chars().next() {
        if c != '[' {
            return Err(PathParseError::UnexpectedChar(c, pos));
        }
        let body = &rest[1..];
        let close = body
            .find(']')
            .ok_or(PathParseError::UnclosedBracket(pos))?;
        let digits = &body[..close];
        let idx = digits
            .parse::<usize>()
            .map_err(|_| PathParseError::InvalidIndex(pos + 1, digits.to_string()))?;
        segments.push(PathSegment::Index(idx));
        rest = &body[close + 1..];
        pos += close + 2;
    }
    Ok(())
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

// =============================================================================
// Path Traversal
// =============================================================================

/// Get value at path within a JSON document
///
/// Returns `None` if any segment is missing or hits the wrong container type.
/// An explicit JSON `null` at the end of the path is returned as `Some(Null)`.
pub fn get_at_path<'a>(
    value: &'a serde_json::Value,
    path: &JsonPath,
) -> Option<&'a serde_json::Value> {
    let mut current = value;

    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), serde_json::Value::Object(obj)) => obj.get(key)?,
            (PathSegment::Index(idx), serde_json::Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Get value at a dotted path string
///
/// Unparseable paths resolve to `None`, the same as missing ones.
pub fn lookup<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let path: JsonPath = path.parse().ok()?;
    get_at_path(value, &path)
}
