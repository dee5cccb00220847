//! The Executor - single entry point to the catalog.
//!
//! The Executor routes commands to handlers and converts results to outputs.
//! It owns the loaded index; the records themselves live in the Record Store.

use std::sync::Arc;

use medcat_engine::{CatalogConfig, CatalogIndex, IndexBuilder, ProjectionTable};
use medcat_storage::RecordStore;
use tracing::debug;

use crate::convert::convert_result;
use crate::handlers::{catalog, mirror};
use crate::{Command, Output, Result};

/// The command executor - single entry point to the catalog.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads. Reads run
/// against an index snapshot, so a concurrent `RebuildIndex` or
/// `ReloadIndex` never shows a reader a half-replaced index.
///
/// # Example
///
/// ```ignore
/// use medcat_executor::{CatalogConfig, Command, Executor};
///
/// let executor = Executor::open(CatalogConfig::for_dir("catalog"))?;
///
/// // Single command execution
/// let result = executor.execute(Command::Get { id: "MOH_1".into() })?;
///
/// // Batch execution
/// let results = executor.execute_many(vec![Command::Stats, Command::Health]);
/// ```
pub struct Executor {
    config: CatalogConfig,
    index: Arc<CatalogIndex>,
    builder: IndexBuilder,
}

impl Executor {
    /// Open the catalog described by `config`.
    ///
    /// Fails with `PreconditionFailed` if the catalog directory is missing.
    /// A missing index file is not an error; the index is empty until the
    /// first rebuild.
    pub fn open(config: CatalogConfig) -> Result<Self> {
        let store: Arc<dyn RecordStore> = Arc::new(convert_result(config.open_store())?);
        Self::with_store(config, store)
    }

    /// Serve the index file named by `config` over any Record Store.
    ///
    /// An index file that does not parse is served as empty so that
    /// `RebuildIndex` can replace it; `ReloadIndex` still rejects it.
    pub fn with_store(config: CatalogConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let index = CatalogIndex::load_or_empty(config.index_path(), Arc::clone(&store));
        let builder = IndexBuilder::new(store).with_packaging(ProjectionTable::packaging());
        Ok(Self {
            config,
            index: Arc::new(index),
            builder,
        })
    }

    /// Execute a single command.
    ///
    /// Returns the command result or an error.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "medcat::executor", command = cmd.name(), "Executing command");
        let store: &dyn RecordStore = &**self.index.store();
        match cmd {
            // Read commands
            Command::List {
                search,
                field,
                status,
                category,
                limit,
                offset,
            } => catalog::list(
                &self.index,
                &self.config,
                search,
                field,
                status,
                category,
                limit,
                offset,
            ),
            Command::Get { id } => catalog::get(&self.index, id),
            Command::Facets { kind } => catalog::facets(&self.index, kind),
            Command::Stats => catalog::stats(&self.index),

            // Service commands
            Command::Health => catalog::health(&self.index),
            Command::Describe => catalog::describe(),

            // Write commands
            Command::Upsert { id, record } => mirror::upsert(store, id, record),
            Command::Remove { id } => mirror::remove(store, id),
            Command::ApplyChange { event } => mirror::apply_change(store, event),
            Command::ApplyBatch { events } => mirror::apply_batch(store, events),

            // Index commands
            Command::RebuildIndex => catalog::rebuild(&self.index, &self.builder, &self.config),
            Command::ReloadIndex => catalog::reload(&self.index),
            Command::Export {
                target,
                format,
                path,
            } => catalog::export(
                &self.index,
                &self.builder,
                &self.config,
                target,
                format,
                path,
            ),
        }
    }

    /// Execute multiple commands sequentially.
    ///
    /// Returns all results in the same order as the input commands.
    /// Execution continues even if some commands fail.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// The loaded index.
    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// Configuration the executor was opened with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish()
    }
}
