//! Requests to the dialog/transport collaborator.
//!
//! Save, save-as and share are request/response round trips; error dialogs
//! are fire-and-forget from the controller's point of view.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// A request understood by the dialog/transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogRequest {
    /// Write `contents` to an already known location.
    SaveFile { contents: String, location: PathBuf },
    /// Ask where to save `contents`, suggesting `hint` as the name.
    ShowSaveDialog { contents: String, hint: String },
    /// Publish `contents` under `name` and report where it went.
    ShowShareDialog { contents: String, name: String },
    /// Show an error to the user.
    ShowErrorDialog { title: String, message: String },
}

impl DialogRequest {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShowErrorDialog {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SaveFile { .. } => "SAVE_FILE",
            Self::ShowSaveDialog { .. } => "SHOW_SAVE_DIALOG",
            Self::ShowShareDialog { .. } => "SHOW_SHARE_DIALOG",
            Self::ShowErrorDialog { .. } => "SHOW_ERROR_DIALOG",
        }
    }
}

/// Response to a non-error request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    /// Shareable link, set by share requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DialogResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// The dialog/transport collaborator, injected into each controller.
#[async_trait]
pub trait DialogTransport: Send + Sync {
    /// Performs one round trip.
    ///
    /// `Err` means the round trip itself broke; `Ok` with `success == false`
    /// means the user or the transport declined.
    async fn request(&self, request: DialogRequest) -> Result<DialogResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request = DialogRequest::SaveFile {
            contents: "x = 1".to_string(),
            location: PathBuf::from("/tmp/a.py"),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"type": "SAVE_FILE", "contents": "x = 1", "location": "/tmp/a.py"})
        );

        let parsed: DialogRequest = serde_json::from_value(json!({
            "type": "SHOW_ERROR_DIALOG",
            "title": "Unable to debug",
            "message": "boom",
        }))
        .unwrap();
        assert_eq!(parsed, DialogRequest::error("Unable to debug", "boom"));
        assert_eq!(parsed.kind(), "SHOW_ERROR_DIALOG");
    }

    #[test]
    fn test_response_defaults_to_failure() {
        let response: DialogResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(response, DialogResponse::failed());
    }
}
