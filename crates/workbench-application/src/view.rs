//! Notifications for display collaborators.
//!
//! Panels never touch controller state or session handles; they receive
//! these events and read derived state through the controller's accessors.

use serde::Serialize;
use tokio::sync::mpsc;
use workbench_core::graphics::GraphicsCommand;
use workbench_core::output::OutputEntry;

/// A display panel belonging to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Editor,
    Output,
    Debugger,
    Graphics,
}

/// Something the display side should react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ViewEvent {
    /// The panel should become visible.
    Reveal(Panel),
    OutputAppended(OutputEntry),
    GraphicsAppended(GraphicsCommand),
    /// Editor text was replaced by the controller (format, populate).
    EditorTextChanged,
    /// A new debug trace is available.
    DebugTraceReady,
    /// The interpreter process has terminated.
    Halted,
}

/// Sending side of the view event channel. A notifier without a channel
/// discards everything.
#[derive(Debug, Clone, Default)]
pub struct ViewNotifier {
    tx: Option<mpsc::UnboundedSender<ViewEvent>>,
}

impl ViewNotifier {
    pub fn new(tx: mpsc::UnboundedSender<ViewEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Creates a notifier together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn notify(&self, event: ViewEvent) {
        if let Some(tx) = &self.tx {
            // A closed view is not an error for the controller.
            let _ = tx.send(event);
        }
    }

    pub fn reveal(&self, panel: Panel) {
        self.notify(ViewEvent::Reveal(panel));
    }
}
