//! Line-prefix protocol spoken over the interpreter's combined output stream.
//!
//! Interpreters tag special lines with a literal marker followed directly by
//! the payload. [`demultiplex`] turns one chunk of raw output into the typed
//! events the controller applies to its state. It holds no state and does no
//! I/O; the only outside fact it needs is whether the editor is empty.
//!
//! | marker     | event(s)                                                   |
//! |------------|------------------------------------------------------------|
//! | `DEBUG: `  | [`ProtocolEvent::RegenerateDebugTrace`]                    |
//! | `EDITOR: ` | [`ProtocolEvent::RevealEditor`], plus [`ProtocolEvent::PopulateEditor`] when the editor is empty |
//! | `EXEC: `   | [`ProtocolEvent::AppendExecuted`] with the rest of the line |
//! | `TURTLE: ` | [`ProtocolEvent::AppendGraphics`] with the decoded command  |
//! | (none)     | [`ProtocolEvent::Output`]                                  |

use crate::graphics::GraphicsCommand;
use crate::output::{OutputEntry, OutputKind};

pub const DEBUG_MARKER: &str = "DEBUG: ";
pub const EDITOR_MARKER: &str = "EDITOR: ";
pub const EXEC_MARKER: &str = "EXEC: ";
pub const TURTLE_MARKER: &str = "TURTLE: ";

/// Offset at which a `TURTLE: ` payload is sliced.
///
/// Interpreters in the field are decoded at the `DEBUG: ` length, one byte
/// short of the `TURTLE: ` marker. The extra byte is the marker's trailing
/// space, which the JSON decoder skips, so payloads framed either way decode
/// identically. Kept at this offset to match existing framing.
pub const TURTLE_PAYLOAD_OFFSET: usize = DEBUG_MARKER.len();

/// A typed event produced from one chunk of interpreter output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// Regenerate the debug trace from the executed-code log.
    RegenerateDebugTrace,
    /// Ask for the editor panel to become visible.
    RevealEditor,
    /// Fill the (empty) editor with the executed-code log joined by newlines.
    PopulateEditor,
    /// Append a fragment to the executed-code log.
    AppendExecuted(String),
    /// Append a command to the graphics log.
    AppendGraphics(GraphicsCommand),
    /// Plain output for the history.
    Output(OutputEntry),
}

/// Classifies one chunk of interpreter output.
///
/// Markers are literal prefixes checked in priority order and the first
/// match wins. A `TURTLE: ` line whose payload does not decode produces no
/// event at all.
pub fn demultiplex(text: &str, is_err: bool, editor_is_empty: bool) -> Vec<ProtocolEvent> {
    if text.starts_with(DEBUG_MARKER) {
        vec![ProtocolEvent::RegenerateDebugTrace]
    } else if text.starts_with(EDITOR_MARKER) {
        if editor_is_empty {
            vec![ProtocolEvent::RevealEditor, ProtocolEvent::PopulateEditor]
        } else {
            vec![ProtocolEvent::RevealEditor]
        }
    } else if let Some(code) = text.strip_prefix(EXEC_MARKER) {
        vec![ProtocolEvent::AppendExecuted(code.to_string())]
    } else if text.starts_with(TURTLE_MARKER) {
        match GraphicsCommand::decode(&text[TURTLE_PAYLOAD_OFFSET..]) {
            Ok(command) => vec![ProtocolEvent::AppendGraphics(command)],
            Err(e) => {
                tracing::warn!("[Protocol] Dropping graphics line: {}", e);
                Vec::new()
            }
        }
    } else {
        vec![ProtocolEvent::Output(OutputEntry {
            text: text.to_string(),
            kind: OutputKind::from_stream(is_err),
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exec_marker_appends_remainder() {
        let events = demultiplex("EXEC: x = 1", false, false);
        assert_eq!(events, vec![ProtocolEvent::AppendExecuted("x = 1".to_string())]);
    }

    #[test]
    fn test_plain_line_is_output() {
        assert_eq!(
            demultiplex("hello world", false, false),
            vec![ProtocolEvent::Output(OutputEntry::stdout("hello world"))]
        );
        assert_eq!(
            demultiplex("Traceback", true, false),
            vec![ProtocolEvent::Output(OutputEntry::stderr("Traceback"))]
        );
    }

    #[test]
    fn test_debug_marker_ignores_remainder() {
        assert_eq!(
            demultiplex("DEBUG: whatever follows", true, true),
            vec![ProtocolEvent::RegenerateDebugTrace]
        );
    }

    #[test]
    fn test_editor_marker_populates_only_when_empty() {
        assert_eq!(
            demultiplex("EDITOR: ", false, true),
            vec![ProtocolEvent::RevealEditor, ProtocolEvent::PopulateEditor]
        );
        assert_eq!(
            demultiplex("EDITOR: ", false, false),
            vec![ProtocolEvent::RevealEditor]
        );
    }

    #[test]
    fn test_turtle_payload_decoded() {
        let events = demultiplex(r#"TURTLE: ["forward", 50]"#, false, false);
        assert_eq!(
            events,
            vec![ProtocolEvent::AppendGraphics(GraphicsCommand::new(
                "forward",
                vec![json!(50)]
            ))]
        );
    }

    #[test]
    fn test_turtle_payload_offset_includes_marker_space() {
        let line = r#"TURTLE: ["clear"]"#;
        assert_eq!(&line[TURTLE_PAYLOAD_OFFSET..], r#" ["clear"]"#);
    }

    #[test]
    fn test_malformed_turtle_payload_is_dropped() {
        assert!(demultiplex("TURTLE: {not json", false, false).is_empty());
        assert!(demultiplex("TURTLE: ", false, false).is_empty());
    }

    #[test]
    fn test_marker_must_be_a_prefix() {
        assert_eq!(
            demultiplex("print('EXEC: x')", false, false),
            vec![ProtocolEvent::Output(OutputEntry::stdout("print('EXEC: x')"))]
        );
        // Marker without its trailing space is plain output.
        assert_eq!(
            demultiplex("EXEC:x", false, false),
            vec![ProtocolEvent::Output(OutputEntry::stdout("EXEC:x"))]
        );
    }
}
