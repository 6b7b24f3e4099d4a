//! Debug traces and their pairing with editor text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Step-by-step execution data paired with the exact source it came from.
///
/// The trace data itself is opaque to the workbench; it is produced by a
/// language's debug-trace generator and rendered by the debugger panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugTrace {
    /// The exact text the trace was generated from.
    pub code: String,
    pub data: Value,
}

impl DebugTrace {
    pub fn new(code: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            data,
        }
    }

    /// Whether the trace may be shown over `editor_text`.
    ///
    /// Plain string equality: a trace becomes eligible again as soon as the
    /// editor returns to the text it was generated from.
    pub fn matches(&self, editor_text: &str) -> bool {
        self.code == editor_text
    }
}

/// Debug-related state held per file.
#[derive(Debug, Clone, Default)]
pub struct DebugState {
    /// Data for the debugger panel (latest successful generation).
    debugger_data: Option<Value>,
    /// Trace for the editor overlay, paired with its source text.
    editor_trace: Option<DebugTrace>,
    /// Cached eligibility of `editor_trace`, recomputed on every editor change.
    editor_in_debug_mode: bool,
}

impl DebugState {
    /// Stores a freshly generated trace for both the debugger and the editor.
    pub fn store(&mut self, trace: DebugTrace, editor_text: &str) {
        self.debugger_data = Some(trace.data.clone());
        self.editor_trace = Some(trace);
        self.refresh(editor_text);
    }

    /// Replaces only the editor overlay trace (debugger panel feedback).
    pub fn set_editor_trace(&mut self, trace: DebugTrace, editor_text: &str) {
        self.editor_trace = Some(trace);
        self.refresh(editor_text);
    }

    /// Recomputes overlay eligibility against the current editor text.
    pub fn refresh(&mut self, editor_text: &str) {
        self.editor_in_debug_mode = self
            .editor_trace
            .as_ref()
            .is_some_and(|trace| trace.matches(editor_text));
    }

    pub fn debugger_data(&self) -> Option<&Value> {
        self.debugger_data.as_ref()
    }

    /// The overlay trace, if it is still eligible for display.
    pub fn editor_trace(&self) -> Option<&DebugTrace> {
        if self.editor_in_debug_mode {
            self.editor_trace.as_ref()
        } else {
            None
        }
    }

    pub fn editor_in_debug_mode(&self) -> bool {
        self.editor_in_debug_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eligibility_follows_text_equality() {
        let mut state = DebugState::default();
        state.store(DebugTrace::new("a", json!({"steps": 1})), "a");
        assert!(state.editor_trace().is_some());

        state.refresh("b");
        assert!(state.editor_trace().is_none());
        // The debugger panel keeps its data regardless of the editor.
        assert_eq!(state.debugger_data(), Some(&json!({"steps": 1})));

        state.refresh("a");
        assert_eq!(state.editor_trace().map(|t| t.code.as_str()), Some("a"));
    }

    #[test]
    fn test_trace_for_other_text_is_not_eligible() {
        let mut state = DebugState::default();
        state.store(DebugTrace::new("# pre\nx=1", json!([])), "");
        assert!(!state.editor_in_debug_mode());
        assert!(state.debugger_data().is_some());
    }
}
