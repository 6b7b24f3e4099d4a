use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use workbench_core::Language;
use workbench_core::config::{InterpreterConfig, WorkbenchConfig};
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::interpreter::{InterpreterTable, LanguageBackend};
use workbench_core::session::{OutputSink, SessionHandle};

use crate::generation::{parse_trace, run_one_shot};
use crate::process::spawn_session;

/// A language backend that drives external commands.
///
/// Interactive runs spawn the configured `run` command on a script file;
/// in-memory source is written to a temporary file with the language's
/// extension first. Debug traces and formatting run their configured
/// commands once with the source on stdin.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    language: Language,
    config: InterpreterConfig,
    generation_timeout: Duration,
}

impl ProcessBackend {
    pub fn new(language: Language, config: InterpreterConfig, generation_timeout: Duration) -> Self {
        Self {
            language,
            config,
            generation_timeout,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

#[async_trait]
impl LanguageBackend for ProcessBackend {
    fn run_file(&self, location: &Path, sink: OutputSink) -> Result<SessionHandle> {
        tracing::debug!("[Interpreter] {} run_file {:?}", self.language, location);
        spawn_session(&self.config.run, location, None, sink)
    }

    fn run_code(&self, source: &str, sink: OutputSink) -> Result<SessionHandle> {
        let mut script = tempfile::Builder::new()
            .prefix("workbench-")
            .suffix(self.language.extension())
            .tempfile()
            .map_err(|e| WorkbenchError::launch(format!("cannot create script file: {}", e)))?;
        script
            .write_all(source.as_bytes())
            .and_then(|_| script.flush())
            .map_err(|e| WorkbenchError::launch(format!("cannot write script file: {}", e)))?;

        let path = script.path().to_path_buf();
        tracing::debug!("[Interpreter] {} run_code via {:?}", self.language, path);
        spawn_session(&self.config.run, &path, Some(script), sink)
    }

    async fn generate_debug_trace(&self, source: &str) -> Result<Value> {
        let spec = self
            .config
            .debug
            .as_ref()
            .ok_or_else(|| WorkbenchError::unsupported("Debugging", self.language.to_string()))?;
        let stdout = run_one_shot(spec, source, self.generation_timeout).await?;
        parse_trace(&stdout)
    }

    async fn format(&self, source: &str) -> Result<String> {
        let spec = self
            .config
            .format
            .as_ref()
            .ok_or_else(|| WorkbenchError::unsupported("Formatting", self.language.to_string()))?;
        run_one_shot(spec, source, self.generation_timeout).await
    }

    fn debug_prefix(&self) -> String {
        self.config.debug_prefix.clone()
    }
}

/// Builds the per-language capability table from configuration.
pub fn interpreter_table(config: &WorkbenchConfig) -> InterpreterTable {
    let timeout = Duration::from_secs(config.session.generation_timeout_secs);
    let backend = |language: Language| -> Arc<dyn LanguageBackend> {
        Arc::new(ProcessBackend::new(
            language,
            config.interpreter(language).clone(),
            timeout,
        ))
    };
    InterpreterTable::new(
        backend(Language::Python),
        backend(Language::Scheme),
        backend(Language::Sql),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_debug_command_is_unsupported() {
        let backend = ProcessBackend::new(
            Language::Sql,
            InterpreterConfig::default_for(Language::Sql),
            Duration::from_secs(1),
        );
        let err = backend.generate_debug_trace("select 1;").await.unwrap_err();
        assert_eq!(err.user_message(), "Debugging is not supported for sql");
    }

    #[test]
    fn test_table_uses_configured_prefix() {
        let mut config = WorkbenchConfig::default();
        config.scheme.debug_prefix = "(define x 1)\n".to_string();
        let table = interpreter_table(&config);

        assert_eq!(table.backend(Language::Scheme).debug_prefix(), "(define x 1)\n");
        assert_eq!(table.backend(Language::Python).debug_prefix(), "");
    }
}
