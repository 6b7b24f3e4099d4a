//! Local filesystem implementation of the dialog/transport collaborator.
//!
//! Used when the workbench runs without a graphical shell: "save as" writes
//! into a configured directory, "share" publishes a copy under a short link
//! in the share directory, and error dialogs are logged and handed to an
//! optional callback.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;
use workbench_core::dialog::{DialogRequest, DialogResponse, DialogTransport};
use workbench_core::error::{Result, WorkbenchError};

use crate::storage::write_atomic;

/// Callback type for error dialogs: `(title, message)`.
pub type ErrorDialogCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Length of generated share links.
const SHORT_LINK_LEN: usize = 8;

pub struct LocalDialogTransport {
    save_dir: PathBuf,
    share_dir: PathBuf,
    on_error: Option<ErrorDialogCallback>,
    /// Every error dialog shown so far, oldest first.
    errors: Mutex<Vec<(String, String)>>,
}

impl LocalDialogTransport {
    pub fn new(save_dir: PathBuf, share_dir: PathBuf) -> Self {
        Self {
            save_dir,
            share_dir,
            on_error: None,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Sets a callback invoked for every error dialog.
    pub fn with_error_callback(mut self, callback: ErrorDialogCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Error dialogs shown so far as `(title, message)` pairs.
    pub fn shown_errors(&self) -> Vec<(String, String)> {
        self.errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    async fn save_file(&self, contents: &str, location: &Path) -> Result<DialogResponse> {
        write_atomic(location, contents.as_bytes()).await?;
        tracing::debug!("[Dialog] Saved {:?}", location);
        Ok(DialogResponse::ok().with_location(location))
    }

    async fn save_as(&self, contents: &str, hint: &str) -> Result<DialogResponse> {
        let name = file_name_from_hint(hint)?;
        let location = self.save_dir.join(&name);
        write_atomic(&location, contents.as_bytes()).await?;
        tracing::info!("[Dialog] Saved as {:?}", location);
        Ok(DialogResponse::ok().with_name(name).with_location(location))
    }

    async fn share(&self, contents: &str, name: &str) -> Result<DialogResponse> {
        let name = file_name_from_hint(name)?;
        let link: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(SHORT_LINK_LEN)
            .collect();
        let location = self.share_dir.join(&link).join(&name);
        write_atomic(&location, contents.as_bytes()).await?;
        tracing::info!("[Dialog] Shared {} as {}", name, link);
        Ok(DialogResponse::ok()
            .with_name(name)
            .with_location(location)
            .with_link(link))
    }

    fn show_error(&self, title: &str, message: &str) {
        tracing::error!("[Dialog] {}: {}", title, message);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push((title.to_string(), message.to_string()));
        }
        if let Some(callback) = &self.on_error {
            callback(title, message);
        }
    }
}

#[async_trait]
impl DialogTransport for LocalDialogTransport {
    async fn request(&self, request: DialogRequest) -> Result<DialogResponse> {
        match &request {
            DialogRequest::SaveFile { contents, location } => self.save_file(contents, location).await,
            DialogRequest::ShowSaveDialog { contents, hint } => self.save_as(contents, hint).await,
            DialogRequest::ShowShareDialog { contents, name } => self.share(contents, name).await,
            DialogRequest::ShowErrorDialog { title, message } => {
                self.show_error(title, message);
                Ok(DialogResponse::ok())
            }
        }
    }
}

/// Reduces a suggested name to a bare file name.
fn file_name_from_hint(hint: &str) -> Result<String> {
    Path::new(hint.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| WorkbenchError::transport(format!("invalid file name: {:?}", hint)))
}
