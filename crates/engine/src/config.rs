//! Catalog configuration via `catalog.toml`
//!
//! Every field has a default, so a missing or empty file yields a working
//! configuration rooted at `./catalog`. Command-line flags override values
//! read from the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use medcat_core::{Error, Result};
use medcat_storage::FsRecordStore;

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "catalog.toml";

/// Catalog configuration loaded from `catalog.toml`
///
/// # Example
///
/// ```toml
/// catalog_dir = "catalog"
/// index_file = "catalog_index.json"
/// record_prefix = "MOH_"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding one `<id>.json` file per record
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    /// Index Document file name, inside `catalog_dir`
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Packaging index file name, inside `catalog_dir`
    #[serde(default = "default_packages_file")]
    pub packages_file: String,
    /// Only files whose stem starts with this prefix are records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_prefix: Option<String>,
    /// Separator used when flattening lists into a single cell
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: String,
    /// Page size used when a list request gives none
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("catalog")
}

fn default_index_file() -> String {
    "catalog_index.json".to_string()
}

fn default_packages_file() -> String {
    "packages_index.json".to_string()
}

fn default_list_delimiter() -> String {
    "; ".to_string()
}

fn default_limit() -> i64 {
    100
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            index_file: default_index_file(),
            packages_file: default_packages_file(),
            record_prefix: None,
            list_delimiter: default_list_delimiter(),
            default_limit: default_limit(),
        }
    }
}

impl CatalogConfig {
    /// Config rooted at a specific catalog directory
    pub fn for_dir(catalog_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
            ..Self::default()
        }
    }

    /// Full path of the Index Document
    pub fn index_path(&self) -> PathBuf {
        self.catalog_dir.join(&self.index_file)
    }

    /// Full path of the packaging index
    pub fn packages_path(&self) -> PathBuf {
        self.catalog_dir.join(&self.packages_file)
    }

    /// Open the Record Store described by this config
    ///
    /// Generated files are excluded from record listings. Fails with
    /// `PreconditionFailed` when the catalog directory is missing.
    pub fn open_store(&self) -> Result<FsRecordStore> {
        let mut store = FsRecordStore::open(&self.catalog_dir)?
            .exclude(self.index_file.clone())
            .exclude(self.packages_file.clone());
        if let Some(prefix) = &self.record_prefix {
            store = store.with_record_prefix(prefix.clone());
        }
        Ok(store)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Medication catalog configuration
#
# Directory holding one <id>.json document per medication
catalog_dir = "catalog"

# Generated files, written inside catalog_dir and never treated as records
index_file = "catalog_index.json"
packages_file = "packages_index.json"

# Only files whose name starts with this prefix are records (default: all)
# record_prefix = "MOH_"

# Separator for list values in CSV exports
list_delimiter = "; "

# Page size when a list request does not give one
default_limit = 100
"#
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Read config if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
