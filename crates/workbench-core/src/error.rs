//! Error types for the workbench.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire workbench.
///
/// Failures coming back from external collaborators (interpreters, dialogs,
/// transports) are mapped onto one of these variants so that the controller
/// can decide whether to surface them to the user or drop them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkbenchError {
    /// The interpreter process could not be started.
    #[error("Failed to launch interpreter: {0}")]
    Launch(String),

    /// Debug-trace generation or formatting failed.
    #[error("{0}")]
    Generation(String),

    /// A save/share round trip did not succeed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A structured protocol payload could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The requested capability is not available for a language.
    #[error("{capability} is not supported for {language}")]
    Unsupported {
        capability: String,
        language: String,
    },

    /// IO error (file system operations, pipes)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkbenchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Launch error
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch(message.into())
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a MalformedPayload error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Creates an Unsupported error
    pub fn unsupported(capability: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
            language: language.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a launch failure
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::Launch(_))
    }

    /// Check if this is a generation failure
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a malformed payload
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }

    /// Message suitable for an error dialog body.
    ///
    /// Generation failures carry the collaborator's message verbatim; every
    /// other variant uses its display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WorkbenchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WorkbenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WorkbenchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WorkbenchError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, WorkbenchError>`.
pub type Result<T> = std::result::Result<T, WorkbenchError>;
