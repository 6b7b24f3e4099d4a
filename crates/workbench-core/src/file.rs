//! Per-file editor state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file as handed to the workbench when it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialFile {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub location: Option<PathBuf>,
}

impl InitialFile {
    /// An unsaved scratch file.
    pub fn scratch(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            location: None,
        }
    }
}

/// Name, texts and location of an open file.
///
/// `saved_text` is `None` until the file has been saved (or was opened from
/// a location), which always counts as unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    pub name: String,
    pub editor_text: String,
    pub saved_text: Option<String>,
    pub location: Option<PathBuf>,
}

impl FileState {
    pub fn new(initial: InitialFile) -> Self {
        let saved_text = initial.location.as_ref().map(|_| initial.content.clone());
        Self {
            name: initial.name,
            editor_text: initial.content,
            saved_text,
            location: initial.location,
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saved_text.as_deref() != Some(self.editor_text.as_str())
    }

    /// Title shown for the editor panel, starred when unsaved.
    pub fn title(&self) -> String {
        if self.has_unsaved_changes() {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Records a successful save of `text`, optionally renaming/relocating.
    pub fn mark_saved(&mut self, text: String, name: Option<String>, location: Option<PathBuf>) {
        self.saved_text = Some(text);
        if let Some(name) = name {
            self.name = name;
        }
        if location.is_some() {
            self.location = location;
        }
    }
}
