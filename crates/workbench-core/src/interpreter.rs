//! Interpreter service interface.
//!
//! Interpreters are external collaborators. The workbench only consumes the
//! four capabilities every language offers, grouped per language in a
//! closed [`InterpreterTable`].

use crate::Language;
use crate::error::Result;
use crate::session::{OutputSink, SessionHandle};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Capabilities of one language's interpreter.
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    /// Starts an interactive run of the file at `location`.
    ///
    /// Output and the final halt notification are pushed into `sink`, and
    /// the returned handle carries `sink.session()` as its id. A launch
    /// failure returns an error and leaves nothing running.
    fn run_file(&self, location: &Path, sink: OutputSink) -> Result<SessionHandle>;

    /// Starts an interactive run of in-memory source text.
    fn run_code(&self, source: &str, sink: OutputSink) -> Result<SessionHandle>;

    /// Generates a debug trace for exactly `source`.
    ///
    /// A failure carries a human-readable message in
    /// [`crate::WorkbenchError::Generation`].
    async fn generate_debug_trace(&self, source: &str) -> Result<Value>;

    /// Formats `source`, returning the formatted code.
    async fn format(&self, source: &str) -> Result<String>;

    /// Text prepended to replayed executed code before tracing it.
    fn debug_prefix(&self) -> String;
}

/// One backend per language, matched exhaustively.
#[derive(Clone)]
pub struct InterpreterTable {
    python: Arc<dyn LanguageBackend>,
    scheme: Arc<dyn LanguageBackend>,
    sql: Arc<dyn LanguageBackend>,
}

impl InterpreterTable {
    pub fn new(
        python: Arc<dyn LanguageBackend>,
        scheme: Arc<dyn LanguageBackend>,
        sql: Arc<dyn LanguageBackend>,
    ) -> Self {
        Self {
            python,
            scheme,
            sql,
        }
    }

    /// A table that routes every language to the same backend.
    pub fn uniform(backend: Arc<dyn LanguageBackend>) -> Self {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn backend(&self, language: Language) -> &Arc<dyn LanguageBackend> {
        match language {
            Language::Python => &self.python,
            Language::Scheme => &self.scheme,
            Language::Sql => &self.sql,
        }
    }
}

impl std::fmt::Debug for InterpreterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterTable").finish_non_exhaustive()
    }
}
