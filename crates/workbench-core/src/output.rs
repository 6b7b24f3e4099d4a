//! Output history shown in the output panel.

use serde::{Deserialize, Serialize};

/// Which stream an output entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Stdout,
    Stderr,
    /// A line the user typed, echoed back into the history.
    InputEcho,
}

impl OutputKind {
    /// Kind for an interpreter stream given its error flag.
    pub fn from_stream(is_err: bool) -> Self {
        if is_err {
            OutputKind::Stderr
        } else {
            OutputKind::Stdout
        }
    }
}

/// A single entry in the output history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub text: String,
    pub kind: OutputKind,
}

impl OutputEntry {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: OutputKind::Stdout,
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: OutputKind::Stderr,
        }
    }

    pub fn input_echo(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: OutputKind::InputEcho,
        }
    }
}

/// Append-only output history with a truncation point.
///
/// `truncate` drops every entry recorded so far; it is called once per run
/// start so that the visible history only ever covers the current run.
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    entries: Vec<OutputEntry>,
    /// Total number of entries dropped by truncation over the log's lifetime.
    dropped: usize,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: OutputEntry) {
        self.entries.push(entry);
    }

    /// Drops all current entries and records how many were dropped.
    pub fn truncate(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.dropped += count;
        count
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_drops_everything_before() {
        let mut log = OutputLog::new();
        log.push(OutputEntry::stdout("a"));
        log.push(OutputEntry::stderr("b"));

        assert_eq!(log.truncate(), 2);
        assert!(log.is_empty());

        log.push(OutputEntry::input_echo("c"));
        assert_eq!(log.entries(), &[OutputEntry::input_echo("c")]);
        assert_eq!(log.dropped(), 2);
    }

    #[test]
    fn test_kind_from_stream() {
        assert_eq!(OutputKind::from_stream(false), OutputKind::Stdout);
        assert_eq!(OutputKind::from_stream(true), OutputKind::Stderr);
    }
}
