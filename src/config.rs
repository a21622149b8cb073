//! Configuration for tablekv
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TableError};

/// Process-wide suffix counter so generated table paths never collide
static NEXT_TABLE_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// Main configuration for persisting tables
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory that persisted tables are written to
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {name}-{unique}.sst
    ///     └── ...
    pub data_dir: PathBuf,

    /// Extension of table files (without the dot)
    pub file_extension: String,

    /// fsync table files after writing them
    pub sync_on_persist: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tablekv_data"),
            file_extension: "sst".to_string(),
            sync_on_persist: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the config can produce usable table paths
    pub fn validate(&self) -> Result<()> {
        if self.file_extension.is_empty() {
            return Err(TableError::Config("file extension must not be empty".to_string()));
        }
        if self.file_extension.contains(|c: char| matches!(c, '/' | '\\' | '.')) {
            return Err(TableError::Config(format!(
                "file extension {:?} must be a bare extension",
                self.file_extension
            )));
        }
        Ok(())
    }

    /// Default naming function: `{data_dir}/{name}-{unique}.{ext}`
    ///
    /// `unique` is the wall-clock time in nanoseconds joined with a
    /// process-wide counter, so repeated calls for one name differ.
    pub fn table_path(&self, name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let seq = NEXT_TABLE_SUFFIX.fetch_add(1, Ordering::Relaxed);
        self.data_dir
            .join(format!("{}-{:x}{:04x}.{}", name, nanos, seq, self.file_extension))
    }

    /// Whether `path` looks like a table file produced with this config
    pub fn is_table_file(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .map(|ext| ext == self.file_extension.as_str())
                .unwrap_or(false)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the table file extension
    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    /// Enable or disable fsync after persisting a table
    pub fn sync_on_persist(mut self, sync: bool) -> Self {
        self.config.sync_on_persist = sync;
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
