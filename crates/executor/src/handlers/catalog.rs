//! Read, index and export command handlers.
//!
//! Reads are answered from the loaded index snapshot. `RebuildIndex` builds
//! from the Record Store, persists, and swaps the result in.

use std::fs;
use std::path::Path;

use medcat_engine::{
    CatalogConfig, CatalogIndex, ExportRow, ExportWriter, FacetKind, IndexBuilder, ListQuery,
    ProjectionTable, DEFAULT_SEARCH_FIELD,
};
use tracing::info;

use crate::convert::convert_result;
use crate::types::{ExportFormat, ExportTarget, ServiceInfo};
use crate::{Command, Error, Output, Result};

/// Handle List command.
#[allow(clippy::too_many_arguments)]
pub fn list(
    index: &CatalogIndex,
    config: &CatalogConfig,
    search: Option<String>,
    field: Option<String>,
    status: Option<String>,
    category: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Output> {
    let query = ListQuery {
        search,
        field: field
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_FIELD.to_string()),
        status,
        category,
        limit: limit.unwrap_or(config.default_limit),
        offset: offset.unwrap_or(0),
    };
    let page = index.list(&query);
    Ok(Output::MedicationPage {
        medications: page.entries,
        total: page.total,
        matched: page.matched,
        limit: query.limit,
        offset: query.offset,
    })
}

/// Handle Get command.
pub fn get(index: &CatalogIndex, id: String) -> Result<Output> {
    let record = convert_result(index.get(&id))?;
    Ok(Output::Record(record.into_inner()))
}

/// Handle Facets command.
pub fn facets(index: &CatalogIndex, kind: FacetKind) -> Result<Output> {
    Ok(Output::Values(index.facets(kind)))
}

/// Handle Stats command.
pub fn stats(index: &CatalogIndex) -> Result<Output> {
    Ok(Output::Stats(index.stats()))
}

/// Handle Health command.
pub fn health(index: &CatalogIndex) -> Result<Output> {
    Ok(Output::Health(index.health()))
}

/// Handle Describe command.
pub fn describe() -> Result<Output> {
    Ok(Output::Describe(ServiceInfo {
        name: "OpenMed Catalog".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commands: Command::NAMES.iter().map(|n| n.to_string()).collect(),
    }))
}

/// Handle RebuildIndex command.
pub fn rebuild(
    index: &CatalogIndex,
    builder: &IndexBuilder,
    config: &CatalogConfig,
) -> Result<Output> {
    let index_path = config.index_path();
    let packages_path = config.packages_path();
    let outcome =
        convert_result(builder.build_and_persist(&index_path, Some(packages_path.as_path())))?;
    index.replace(outcome.document);
    Ok(Output::Built(outcome.report))
}

/// Handle ReloadIndex command.
pub fn reload(index: &CatalogIndex) -> Result<Output> {
    convert_result(index.reload())?;
    Ok(Output::Stats(index.stats()))
}

fn write_rows<R: ExportRow>(
    writer: &ExportWriter,
    rows: &[R],
    format: ExportFormat,
    path: &Path,
) -> Result<usize> {
    match format {
        ExportFormat::Csv => convert_result(writer.export_csv_file(rows, path))?,
        ExportFormat::Json => convert_result(writer.export_json_file(rows, path))?,
    }
    Ok(rows.len())
}

/// Whether `dest` is a JSON file the Record Store of `config` would scan
fn lands_in_catalog(config: &CatalogConfig, dest: &Path) -> bool {
    let is_json = dest
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return false;
    }
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), fs::canonicalize(&config.catalog_dir)) {
        (Ok(parent), Ok(catalog_dir)) => parent == catalog_dir,
        _ => false,
    }
}

/// Handle Export command.
///
/// JSON exports may not be written into the catalog directory, where the
/// next build would scan them as records.
pub fn export(
    index: &CatalogIndex,
    builder: &IndexBuilder,
    config: &CatalogConfig,
    target: ExportTarget,
    format: ExportFormat,
    path: String,
) -> Result<Output> {
    let dest = Path::new(&path);
    if lands_in_catalog(config, dest) {
        return Err(Error::InvalidInput {
            reason: format!(
                "export destination {} is inside the catalog directory and would be read as a record",
                path
            ),
        });
    }
    let writer = ExportWriter::new().with_list_delimiter(config.list_delimiter.clone());
    let rows = match target {
        ExportTarget::Index => write_rows(&writer, index.snapshot().entries(), format, dest)?,
        ExportTarget::Catalog => {
            let rows = convert_result(builder.project_all(&ProjectionTable::catalog_export()))?;
            write_rows(&writer, &rows, format, dest)?
        }
        ExportTarget::Packages => {
            let rows = convert_result(builder.build_packages())?;
            write_rows(&writer, &rows, format, dest)?
        }
    };
    info!(
        target: "medcat::executor",
        export_target = ?target,
        %format,
        rows,
        path = %path,
        "Export complete"
    );
    Ok(Output::Exported { path, rows })
}
