use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifies one interpreter attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an interpreter reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessageKind {
    /// One chunk of output from stdout or stderr.
    Output { text: String, is_err: bool },
    /// The process terminated; `text` describes how.
    Halt { text: String },
}

/// A message pushed by a running session, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub session: SessionId,
    pub kind: SessionMessageKind,
}

/// Push side of the session message queue handed to an interpreter.
///
/// Every message is stamped with the session it belongs to, so the consumer
/// can discard anything from a session that is no longer attached.
#[derive(Debug, Clone)]
pub struct OutputSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl OutputSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Delivers an output chunk. Returns `false` once the consumer is gone.
    pub fn output(&self, text: impl Into<String>, is_err: bool) -> bool {
        self.send(SessionMessageKind::Output {
            text: text.into(),
            is_err,
        })
    }

    /// Delivers the halt notification. Returns `false` once the consumer is gone.
    pub fn halt(&self, text: impl Into<String>) -> bool {
        self.send(SessionMessageKind::Halt { text: text.into() })
    }

    fn send(&self, kind: SessionMessageKind) -> bool {
        self.tx
            .send(SessionMessage {
                session: self.session,
                kind,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_stamps_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = SessionId::new();
        let sink = OutputSink::new(id, tx);

        assert!(sink.output("hi", false));
        assert!(sink.halt("done"));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.session, id);
        assert_eq!(
            first.kind,
            SessionMessageKind::Output {
                text: "hi".to_string(),
                is_err: false
            }
        );
        assert_eq!(
            rx.try_recv().unwrap().kind,
            SessionMessageKind::Halt {
                text: "done".to_string()
            }
        );
    }

    #[test]
    fn test_sink_reports_closed_consumer() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = OutputSink::new(SessionId::new(), tx);
        drop(rx);
        assert!(!sink.output("lost", true));
    }
}
