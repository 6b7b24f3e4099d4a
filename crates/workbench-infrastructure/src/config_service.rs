//! Configuration service implementation.
//!
//! Loads [`WorkbenchConfig`] from `config.toml` (by default
//! `~/.config/workbench/config.toml`) and caches it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use workbench_core::config::WorkbenchConfig;
use workbench_core::error::{Result, WorkbenchError};

use crate::paths::WorkbenchPaths;
use crate::storage::write_atomic;

/// Configuration service that loads and caches the workbench configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<WorkbenchConfig>>>,
}

impl ConfigService {
    /// Creates a service for the default config location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(WorkbenchPaths::config_file()?))
    }

    /// Creates a service reading from `path`.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing or empty file yields the defaults; a file that does not
    /// parse is an error.
    pub fn get_config(&self) -> Result<WorkbenchConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| WorkbenchError::internal(format!("config lock poisoned: {}", e)))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| WorkbenchError::internal(format!("config lock poisoned: {}", e)))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Writes the default configuration if no file exists yet.
    ///
    /// Returns `true` when a file was written.
    pub async fn ensure_default(&self) -> Result<bool> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        let contents = toml::to_string_pretty(&WorkbenchConfig::default())?;
        write_atomic(&self.path, contents.as_bytes()).await?;
        tracing::info!("[Config] Wrote default configuration to {:?}", self.path);
        Ok(true)
    }

    fn load(path: &Path) -> Result<WorkbenchConfig> {
        if !path.exists() {
            tracing::debug!("[Config] {:?} not found, using defaults", path);
            return Ok(WorkbenchConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(WorkbenchConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            WorkbenchError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
