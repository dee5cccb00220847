//! Index Builder
//!
//! Scans the Record Store, projects every record through a projection table
//! and assembles a versioned Index Document. A record that fails to read or
//! parse is skipped with a diagnostic; only an unavailable store aborts a
//! build.
//!
//! ## Versioning
//!
//! The new version is derived from the previously persisted document alone:
//! `a.b.c` becomes `a.b.(c+1)`, anything absent or unparseable becomes
//! `1.0.0`.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use medcat_core::{IndexDocument, IndexEntry, IndexVersion, PackageEntry, Record, Result};
use medcat_storage::{write_atomic, RecordStore};

use crate::projection::ProjectionTable;

/// A record left out of a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// File name of the skipped document
    pub source_ref: String,
    /// Why it was skipped
    pub reason: String,
}

/// Diagnostics for one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Record files encountered
    pub scanned: usize,
    /// Entries written to the index
    pub indexed: usize,
    /// Package entries produced (zero without a packaging table)
    pub packages: usize,
    /// Records left out, in scan order
    pub skipped: Vec<SkippedRecord>,
    /// Version stamped on the new document
    pub version: IndexVersion,
    /// Version string of the document being replaced, if any
    pub previous_version: Option<String>,
}

/// Result of a build: the document, its packages and the diagnostics
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Freshly assembled index
    pub document: IndexDocument,
    /// Package entries from the same scan
    pub packages: Vec<PackageEntry>,
    /// Build diagnostics
    pub report: BuildReport,
}

/// Derives Index Documents from a Record Store
#[derive(Clone)]
pub struct IndexBuilder {
    store: Arc<dyn RecordStore>,
    table: ProjectionTable,
    packaging: Option<ProjectionTable>,
}

impl IndexBuilder {
    /// Builder using the current index entry table and no packaging index
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        IndexBuilder {
            store,
            table: ProjectionTable::catalog_entry(),
            packaging: None,
        }
    }

    /// Use a different table for index entries
    pub fn with_table(mut self, table: ProjectionTable) -> Self {
        self.table = table;
        self
    }

    /// Also produce package entries in the same scan
    pub fn with_packaging(mut self, table: ProjectionTable) -> Self {
        self.packaging = Some(table);
        self
    }

    /// The store being indexed
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Table used for index entries
    pub fn table(&self) -> &ProjectionTable {
        &self.table
    }

    /// Build a new document
    ///
    /// `previous` is the version string of the document being replaced.
    /// Nothing is written.
    pub fn build(&self, previous: Option<&str>) -> Result<BuildOutcome> {
        let started = Instant::now();
        let scanned = self.store.scan()?;
        info!(
            target: "medcat::build",
            records = scanned.len(),
            table = self.table.name(),
            "Building catalog index"
        );

        let mut entries = Vec::with_capacity(scanned.len());
        let mut packages = Vec::new();
        let mut skipped = Vec::new();
        let total_scanned = scanned.len();

        for item in scanned {
            let record = match item.record {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        target: "medcat::build",
                        source_ref = %item.source_ref,
                        error = %e,
                        "Skipping unreadable record"
                    );
                    skipped.push(SkippedRecord {
                        source_ref: item.source_ref,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            debug!(target: "medcat::build", source_ref = %item.source_ref, "Projecting record");
            entries.push(IndexEntry::from_map(
                self.table.project(&record, &item.source_ref),
            ));
            if let Some(packaging) = &self.packaging {
                packages.extend(Self::project_packages(packaging, &record, &item.source_ref));
            }
        }

        let (version, reset) = IndexVersion::next_after(previous);
        if let Some(e) = reset {
            warn!(
                target: "medcat::build",
                error = %e,
                "Previous index version unusable, resetting to {}",
                IndexVersion::INITIAL
            );
        }

        let document = IndexDocument::new(version, self.table.version(), entries);
        let report = BuildReport {
            scanned: total_scanned,
            indexed: document.total(),
            packages: packages.len(),
            skipped,
            version,
            previous_version: previous.map(str::to_string),
        };

        info!(
            target: "medcat::build",
            version = %report.version,
            indexed = report.indexed,
            skipped = report.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog index built"
        );

        Ok(BuildOutcome {
            document,
            packages,
            report,
        })
    }

    /// Package entries of every readable record, in scan order
    ///
    /// Uses the configured packaging table, or the default one when none was
    /// set.
    pub fn build_packages(&self) -> Result<Vec<PackageEntry>> {
        let table = self.packaging.clone().unwrap_or_else(ProjectionTable::packaging);
        let mut packages = Vec::new();
        for item in self.store.scan()? {
            match item.record {
                Ok(record) => {
                    packages.extend(Self::project_packages(&table, &record, &item.source_ref))
                }
                Err(e) => warn!(
                    target: "medcat::build",
                    source_ref = %item.source_ref,
                    error = %e,
                    "Skipping unreadable record"
                ),
            }
        }
        Ok(packages)
    }

    /// Project every readable record through an arbitrary table
    ///
    /// Used for tabular exports. Unreadable records are skipped.
    pub fn project_all(&self, table: &ProjectionTable) -> Result<Vec<medcat_core::FieldMap>> {
        let mut rows = Vec::new();
        for item in self.store.scan()? {
            match item.record {
                Ok(record) => rows.extend(table.project_items(&record, &item.source_ref)),
                Err(e) => warn!(
                    target: "medcat::build",
                    source_ref = %item.source_ref,
                    error = %e,
                    "Skipping unreadable record"
                ),
            }
        }
        Ok(rows)
    }

    fn project_packages<'a>(
        table: &'a ProjectionTable,
        record: &'a Record,
        source_ref: &'a str,
    ) -> impl Iterator<Item = PackageEntry> + 'a {
        table
            .project_items(record, source_ref)
            .into_iter()
            .map(PackageEntry::from_map)
    }

    /// Replace the persisted index atomically
    pub fn persist(document: &IndexDocument, path: &Path) -> Result<()> {
        let json = document.to_json_string()?;
        write_atomic(path, json.as_bytes())?;
        info!(
            target: "medcat::build",
            path = %path.display(),
            version = document.version(),
            "Catalog index written"
        );
        Ok(())
    }

    /// Replace the persisted packaging index atomically
    pub fn persist_packages(packages: &[PackageEntry], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(packages)?;
        write_atomic(path, json.as_bytes())?;
        info!(
            target: "medcat::build",
            path = %path.display(),
            packages = packages.len(),
            "Packaging index written"
        );
        Ok(())
    }

    /// Build from the store and replace the index at `index_path`
    ///
    /// The previous version is read from `index_path` itself. Package
    /// entries are written only when both a packaging table and
    /// `packages_path` are given.
    pub fn build_and_persist(
        &self,
        index_path: &Path,
        packages_path: Option<&Path>,
    ) -> Result<BuildOutcome> {
        let previous = read_previous_version(index_path);
        let outcome = self.build(previous.as_deref())?;
        Self::persist(&outcome.document, index_path)?;
        if let (Some(_), Some(path)) = (&self.packaging, packages_path) {
            Self::persist_packages(&outcome.packages, path)?;
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("table", &self.table.name())
            .field("packaging", &self.packaging.as_ref().map(|t| t.name()))
            .finish()
    }
}

/// Version string of the index persisted at `path`
///
/// `None` when there is no file or it cannot be parsed as an Index Document;
/// either way the next build starts over at `1.0.0`.
pub fn read_previous_version(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(target: "medcat::build", path = %path.display(), error = %e, "Cannot read previous index");
            return None;
        }
    };
    match IndexDocument::from_json_slice(&bytes) {
        Ok(doc) => Some(doc.version().to_string()),
        Err(e) => {
            warn!(target: "medcat::build", path = %path.display(), error = %e, "Previous index is corrupt");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcat_core::Error;
    use medcat_storage::{FsRecordStore, MemoryRecordStore};
    use serde_json::json;

    fn store_with(records: &[(&str, &str)]) -> Arc<MemoryRecordStore> {
        let store = MemoryRecordStore::new();
        for (name, body) in records {
            store.insert_raw(*name, body.as_bytes().to_vec());
        }
        Arc::new(store)
    }

    #[test]
    fn test_build_skips_malformed_and_keeps_order() {
        let store = store_with(&[
            ("B.json", r#"{"id": "B", "name": "Beta"}"#),
            ("A.json", r#"{"id": "A", "name": "Alpha"}"#),
            ("C.json", "{ not json"),
        ]);
        let outcome = IndexBuilder::new(store).build(None).unwrap();

        let ids: Vec<_> = outcome.document.entries().iter().map(|e| e.id()).collect();
        assert_eq!(ids, [Some("A"), Some("B")]);
        assert_eq!(outcome.document.total(), 2);
        assert_eq!(outcome.report.scanned, 3);
        assert_eq!(outcome.report.skipped.len(), 1);
        assert_eq!(outcome.report.skipped[0].source_ref, "C.json");
    }

    #[test]
    fn test_build_bumps_previous_patch() {
        let store = store_with(&[]);
        let builder = IndexBuilder::new(store);
        assert_eq!(builder.build(Some("2.3.4")).unwrap().report.version.to_string(), "2.3.5");
        assert_eq!(builder.build(Some("1.0")).unwrap().report.version, IndexVersion::INITIAL);
        assert_eq!(builder.build(None).unwrap().report.version, IndexVersion::INITIAL);
    }

    #[test]
    fn test_build_collects_packages_when_configured() {
        let store = store_with(&[(
            "A.json",
            r#"{"id": "A", "name": "Alpha", "packaging": [{"package_id": "P1"}, {"package_id": "P2"}]}"#,
        )]);
        let builder = IndexBuilder::new(store).with_packaging(ProjectionTable::packaging());
        let outcome = builder.build(None).unwrap();
        assert_eq!(outcome.packages.len(), 2);
        assert_eq!(outcome.report.packages, 2);
        assert_eq!(outcome.packages[1].field("package_id"), Some(&json!("P2")));
        assert_eq!(builder.build_packages().unwrap(), outcome.packages);
    }

    #[test]
    fn test_missing_store_root_fails_before_work() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("catalog");
        std::fs::create_dir(&root).unwrap();
        let store = FsRecordStore::open(&root).unwrap();
        std::fs::remove_dir(&root).unwrap();

        let result = IndexBuilder::new(Arc::new(store)).build(None);
        assert!(matches!(result, Err(Error::PreconditionFailed(_))));
    }

    #[test]
    fn test_build_and_persist_reads_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.json"), r#"{"id": "A"}"#).unwrap();
        let store = FsRecordStore::open(dir.path())
            .unwrap()
            .exclude("catalog_index.json");
        let index_path = dir.path().join("catalog_index.json");
        let builder = IndexBuilder::new(Arc::new(store));

        let first = builder.build_and_persist(&index_path, None).unwrap();
        assert_eq!(first.report.version.to_string(), "1.0.0");
        let second = builder.build_and_persist(&index_path, None).unwrap();
        assert_eq!(second.report.version.to_string(), "1.0.1");
        assert_eq!(second.report.previous_version.as_deref(), Some("1.0.0"));
        assert_eq!(second.document.entries(), first.document.entries());
    }

    #[test]
    fn test_corrupt_previous_index_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog_index.json");
        assert_eq!(read_previous_version(&path), None);
        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(read_previous_version(&path), None);
    }
}
