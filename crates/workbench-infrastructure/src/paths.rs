//! Unified path management for workbench files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/workbench/         # Config directory
//! └── config.toml              # Interpreter and session configuration
//!
//! ~/.local/share/workbench/    # Data directory
//! └── shared/                  # Files published through "share"
//! ```

use std::path::PathBuf;

use workbench_core::error::{Result, WorkbenchError};

const APP_DIR: &str = "workbench";

pub struct WorkbenchPaths;

impl WorkbenchPaths {
    /// Returns the workbench configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WorkbenchError::config("Cannot find config directory"))
    }

    /// Returns the workbench data directory.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WorkbenchError::config("Cannot find data directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory for shared files.
    pub fn share_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("shared"))
    }
}
