use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use workbench_application::FileSessionController;
use workbench_core::config::WorkbenchConfig;
use workbench_core::file::InitialFile;
use workbench_execution::interpreter_table;
use workbench_infrastructure::{ConfigService, LocalDialogTransport, WorkbenchPaths};

/// A failure the error dialog already showed; the process exits non-zero
/// without printing it again.
#[derive(Debug)]
pub struct AlreadyReported;

impl fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for AlreadyReported {}

/// Loaded configuration plus the collaborators every command shares.
pub struct Workbench {
    pub config: WorkbenchConfig,
    pub transport: Arc<LocalDialogTransport>,
}

impl Workbench {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let service = config_service(config_path)?;
        let config = service.get_config()?;
        tracing::debug!("[CLI] Using configuration from {:?}", service.path());

        let save_dir = match &config.session.save_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir().context("Failed to get current directory")?,
        };
        let share_dir = match &config.session.share_dir {
            Some(dir) => dir.clone(),
            None => WorkbenchPaths::share_dir()?,
        };

        let transport = LocalDialogTransport::new(save_dir, share_dir).with_error_callback(
            Arc::new(|title, message| {
                eprintln!("{} {}", format!("{}:", title).red().bold(), message);
            }),
        );

        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    /// Opens `file` in a fresh controller.
    pub fn open(&self, file: &Path) -> Result<FileSessionController> {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let initial = InitialFile {
            name: file_name(file)?,
            content,
            location: Some(file.to_path_buf()),
        };
        Ok(FileSessionController::new(
            initial,
            interpreter_table(&self.config),
            self.transport.clone(),
        )
        .with_prefer_file_runs(self.config.session.prefer_file_runs))
    }
}

pub fn config_service(config_path: Option<PathBuf>) -> Result<ConfigService> {
    Ok(match config_path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    })
}

pub fn file_name(file: &Path) -> Result<String> {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", file.display()))
}
