//! Debug trace coordination.
//!
//! A trace can come from three places, exactly one per request: data the
//! caller already has, the current editor text, or a replay of the code the
//! interpreter reported as executed (prefixed with the language's debug
//! preamble).

use workbench_core::debug::DebugTrace;
use workbench_core::error::Result;
use workbench_core::interpreter::LanguageBackend;

/// Where the trace for one debug request comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceSource {
    /// Supplied by the caller; no generation happens.
    Precomputed(DebugTrace),
    /// Generate for exactly this editor text.
    Editor(String),
    /// Generate for the preamble followed by the executed fragments.
    ExecutedCode { prefix: String, fragments: Vec<String> },
}

impl TraceSource {
    /// Picks the source for a debug request.
    ///
    /// Precomputed data wins; otherwise non-empty editor text; otherwise the
    /// executed-code log. `prefix` is only consulted in the last case.
    pub fn select(
        precomputed: Option<DebugTrace>,
        editor_text: &str,
        executed_code: &[String],
        prefix: impl FnOnce() -> String,
    ) -> Self {
        match precomputed {
            Some(trace) => Self::Precomputed(trace),
            None if !editor_text.is_empty() => Self::Editor(editor_text.to_string()),
            None => Self::ExecutedCode {
                prefix: prefix(),
                fragments: executed_code.to_vec(),
            },
        }
    }

    /// The text a trace must be generated for, if generation is needed.
    pub fn generation_text(&self) -> Option<String> {
        match self {
            Self::Precomputed(_) => None,
            Self::Editor(text) => Some(text.clone()),
            Self::ExecutedCode { prefix, fragments } => Some(replay_text(prefix, fragments)),
        }
    }
}

/// Preamble followed by the fragments joined with newlines.
pub fn replay_text(prefix: &str, fragments: &[String]) -> String {
    format!("{}{}", prefix, fragments.join("\n"))
}

/// Resolves trace sources against a language backend.
pub struct DebugTraceCoordinator;

impl DebugTraceCoordinator {
    /// Produces the trace for `source`, paired with the text it describes.
    ///
    /// Failures come back as [`workbench_core::WorkbenchError::Generation`]
    /// (or `Unsupported`) and leave nothing changed.
    pub async fn resolve(backend: &dyn LanguageBackend, source: TraceSource) -> Result<DebugTrace> {
        let code = match source {
            TraceSource::Precomputed(trace) => return Ok(trace),
            other => other.generation_text().unwrap_or_default(),
        };
        tracing::debug!("[Debug] Generating trace for {} bytes of source", code.len());
        let data = backend.generate_debug_trace(&code).await?;
        Ok(DebugTrace::new(code, data))
    }
}
