//! Hot-reloadable catalog index
//!
//! `CatalogIndex` owns the most recently loaded Index Document and answers
//! the read-side requests. Readers take an `Arc` snapshot under a short read
//! lock, so a reload that swaps the document never disturbs a request that
//! is already running: it keeps the snapshot it started with.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use medcat_core::{IndexDocument, IndexEntry, Record, RecordId, Result};
use medcat_storage::RecordStore;

use crate::query::{self, FacetKind, ListQuery, QueryPage};

/// Summary of the loaded index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Declared number of medications
    pub total: usize,
    /// Version string of the loaded document
    pub version: String,
    /// Generation timestamp of the loaded document
    pub generated_at: String,
    /// Projection table version, when recorded
    pub projection_version: Option<u32>,
}

/// Liveness and record counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `healthy` or `unhealthy`
    pub status: String,
    /// Where records are read from
    pub catalog_dir: String,
    /// Record documents in the store
    pub medications_count: usize,
    /// All JSON documents in the store, records or not
    pub total_files: usize,
    /// Why the store is unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Loaded Index Document plus the store it was built from
pub struct CatalogIndex {
    index_path: Option<PathBuf>,
    store: Arc<dyn RecordStore>,
    current: RwLock<Arc<IndexDocument>>,
}

impl CatalogIndex {
    /// Load the index persisted at `index_path`
    ///
    /// A missing file serves an empty index until the first build. A file
    /// that exists but does not parse is an error.
    pub fn load(index_path: impl Into<PathBuf>, store: Arc<dyn RecordStore>) -> Result<Self> {
        let index_path = index_path.into();
        let document = read_document(&index_path)?;
        info!(
            target: "medcat::index",
            path = %index_path.display(),
            total = document.total(),
            version = document.version(),
            "Catalog index loaded"
        );
        Ok(CatalogIndex {
            index_path: Some(index_path),
            store,
            current: RwLock::new(Arc::new(document)),
        })
    }

    /// Load the index persisted at `index_path`, serving an empty one if
    /// the file does not parse
    ///
    /// The file stays where it is, so the next build reads it as an
    /// unusable previous version and starts over at `1.0.0`. `reload` on the
    /// returned index is still strict.
    pub fn load_or_empty(index_path: impl Into<PathBuf>, store: Arc<dyn RecordStore>) -> Self {
        let index_path = index_path.into();
        match Self::load(index_path.clone(), Arc::clone(&store)) {
            Ok(index) => index,
            Err(e) => {
                warn!(
                    target: "medcat::index",
                    path = %index_path.display(),
                    error = %e,
                    "Catalog index unreadable, serving an empty one until rebuilt"
                );
                CatalogIndex {
                    index_path: Some(index_path),
                    store,
                    current: RwLock::new(Arc::new(IndexDocument::empty())),
                }
            }
        }
    }

    /// An empty index with no backing file
    pub fn empty(store: Arc<dyn RecordStore>) -> Self {
        Self::from_document(IndexDocument::empty(), store)
    }

    /// Serve an already assembled document with no backing file
    pub fn from_document(document: IndexDocument, store: Arc<dyn RecordStore>) -> Self {
        CatalogIndex {
            index_path: None,
            store,
            current: RwLock::new(Arc::new(document)),
        }
    }

    /// File the index is loaded from, if any
    pub fn index_path(&self) -> Option<&Path> {
        self.index_path.as_deref()
    }

    /// Backing Record Store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Consistent view of the current document
    pub fn snapshot(&self) -> Arc<IndexDocument> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new document for subsequent readers
    pub fn replace(&self, document: IndexDocument) {
        *self.current.write() = Arc::new(document);
    }

    /// Re-read the persisted index and swap it in
    ///
    /// On error the current document stays in place. An index without a
    /// backing file has nothing to reload and is left unchanged.
    pub fn reload(&self) -> Result<Arc<IndexDocument>> {
        let Some(path) = &self.index_path else {
            return Ok(self.snapshot());
        };
        let document = Arc::new(read_document(path)?);
        *self.current.write() = Arc::clone(&document);
        info!(
            target: "medcat::index",
            total = document.total(),
            version = document.version(),
            "Catalog index reloaded"
        );
        Ok(document)
    }

    /// Search, filter and paginate the current entries
    pub fn list(&self, q: &ListQuery) -> QueryPage {
        let snapshot = self.snapshot();
        query::query(snapshot.entries(), q)
    }

    /// Full record for an identifier, read from the store
    pub fn get(&self, id: &str) -> Result<Record> {
        let id = RecordId::new(id)?;
        self.store.read(&id)
    }

    /// Index entry for an identifier
    pub fn entry(&self, id: &str) -> Option<IndexEntry> {
        self.snapshot().find(id).cloned()
    }

    /// Distinct values of a facet
    ///
    /// Manufacturer names missing from the entries are read from the full
    /// records; records that cannot be read contribute nothing.
    pub fn facets(&self, kind: FacetKind) -> Vec<String> {
        let snapshot = self.snapshot();
        query::facets(snapshot.entries(), kind, |entry| {
            self.resolve_manufacturer(entry)
        })
    }

    fn resolve_manufacturer(&self, entry: &IndexEntry) -> Option<String> {
        let id = RecordId::new(entry.id()?).ok()?;
        match self.store.read(&id) {
            Ok(record) => record.lookup_str("manufacturer.name").map(str::to_string),
            Err(e) => {
                debug!(target: "medcat::index", id = %id, error = %e, "Cannot resolve manufacturer");
                None
            }
        }
    }

    /// Totals and version of the current document
    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot();
        IndexStats {
            total: snapshot.total(),
            version: snapshot.version().to_string(),
            generated_at: snapshot.generated_at().to_string(),
            projection_version: snapshot.projection_version(),
        }
    }

    /// Record and file counts of the backing store
    pub fn health(&self) -> HealthReport {
        let counts = self
            .store
            .list_identifiers()
            .and_then(|ids| Ok((ids.len(), self.store.count_files()?)));
        match counts {
            Ok((medications_count, total_files)) => HealthReport {
                status: "healthy".to_string(),
                catalog_dir: self.store.location(),
                medications_count,
                total_files,
                error: None,
            },
            Err(e) => HealthReport {
                status: "unhealthy".to_string(),
                catalog_dir: self.store.location(),
                medications_count: 0,
                total_files: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

impl std::fmt::Debug for CatalogIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogIndex")
            .field("index_path", &self.index_path)
            .field("store", &self.store.location())
            .field("total", &self.snapshot().total())
            .finish()
    }
}

fn read_document(path: &Path) -> Result<IndexDocument> {
    match fs::read(path) {
        Ok(bytes) => IndexDocument::from_json_slice(&bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(
                target: "medcat::index",
                path = %path.display(),
                "No catalog index yet, serving an empty one"
            );
            Ok(IndexDocument::empty())
        }
        Err(e) => Err(e.into()),
    }
}
