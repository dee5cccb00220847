//! Export Writer: tabular and JSON renderings of entries
//!
//! Column order is deterministic:
//!
//! 1. priority columns, in their fixed order, when present in the data
//! 2. every other column, ascending
//! 3. `filename` last
//!
//! All rows share the same header, the union of keys across rows. Absent
//! values render as empty cells.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use medcat_core::{Error, FieldMap, IndexEntry, PackageEntry, Result, SOURCE_REF_FIELD};
use medcat_storage::write_atomic;

use crate::projection::flatten_value;

/// Columns placed first, in this order, when present
pub const PRIORITY_COLUMNS: [&str; 8] = [
    "id",
    "catalog_id",
    "name",
    "category",
    "atc_code",
    "atc4_code",
    "atc5_code",
    "moh_code",
];

/// Default separator for list values inside one cell
pub const DEFAULT_LIST_DELIMITER: &str = "; ";

/// Anything that can be written as one export row
pub trait ExportRow {
    /// Cells of the row by column name
    fn fields(&self) -> &FieldMap;
}

impl ExportRow for FieldMap {
    fn fields(&self) -> &FieldMap {
        self
    }
}

impl ExportRow for IndexEntry {
    fn fields(&self) -> &FieldMap {
        self.as_map()
    }
}

impl ExportRow for PackageEntry {
    fn fields(&self) -> &FieldMap {
        self.as_map()
    }
}

fn export_error(e: impl ToString) -> Error {
    Error::ExportError(e.to_string())
}

/// Writes rows as CSV or as a JSON array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWriter {
    list_delimiter: String,
}

impl Default for ExportWriter {
    fn default() -> Self {
        ExportWriter {
            list_delimiter: DEFAULT_LIST_DELIMITER.to_string(),
        }
    }
}

impl ExportWriter {
    /// Writer using the default list delimiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different separator for list values
    pub fn with_list_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.list_delimiter = delimiter.into();
        self
    }

    /// Header shared by all rows
    pub fn column_order<R: ExportRow>(rows: &[R]) -> Vec<String> {
        let mut rest: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.fields().keys().map(String::as_str))
            .collect();

        let mut columns: Vec<String> = Vec::with_capacity(rest.len());
        for col in PRIORITY_COLUMNS {
            if rest.remove(col) {
                columns.push(col.to_string());
            }
        }
        let has_source_ref = rest.remove(SOURCE_REF_FIELD);
        columns.extend(rest.into_iter().map(str::to_string));
        if has_source_ref {
            columns.push(SOURCE_REF_FIELD.to_string());
        }
        columns
    }

    /// Write rows as CSV with a header row
    ///
    /// An empty row set writes nothing.
    pub fn write_csv<R: ExportRow, W: Write>(&self, rows: &[R], out: W) -> Result<()> {
        let columns = Self::column_order(rows);
        let mut writer = csv::Writer::from_writer(out);
        if !columns.is_empty() {
            writer.write_record(&columns).map_err(export_error)?;
        }
        for row in rows {
            let row = row.fields();
            let cells = columns.iter().map(|col| {
                row.get(col)
                    .map(|v| flatten_value(v, &self.list_delimiter))
                    .unwrap_or_default()
            });
            writer.write_record(cells).map_err(export_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write rows as a pretty JSON array
    ///
    /// Every object carries every column, in header order; absent values
    /// are `null` and nested values keep their JSON shape.
    pub fn write_json<R: ExportRow, W: Write>(&self, rows: &[R], mut out: W) -> Result<()> {
        let columns = Self::column_order(rows);
        let objects: Vec<Value> = rows
            .iter()
            .map(|row| {
                let row = row.fields();
                let ordered: FieldMap = columns
                    .iter()
                    .map(|col| (col.clone(), row.get(col).cloned().unwrap_or(Value::Null)))
                    .collect();
                Value::Object(ordered)
            })
            .collect();
        serde_json::to_writer_pretty(&mut out, &objects)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    /// Render CSV to a file, replacing it atomically
    pub fn export_csv_file<R: ExportRow>(&self, rows: &[R], path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        self.write_csv(rows, &mut buf)?;
        write_atomic(path, &buf)?;
        info!(target: "medcat::export", path = %path.display(), rows = rows.len(), "CSV export written");
        Ok(())
    }

    /// Render JSON to a file, replacing it atomically
    pub fn export_json_file<R: ExportRow>(&self, rows: &[R], path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        self.write_json(rows, &mut buf)?;
        write_atomic(path, &buf)?;
        info!(target: "medcat::export", path = %path.display(), rows = rows.len(), "JSON export written");
        Ok(())
    }
}
