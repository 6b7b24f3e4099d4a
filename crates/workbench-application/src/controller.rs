//! Per-file session controller.
//!
//! `FileSessionController` owns everything the workbench knows about one
//! open file: editor and saved text, the output history, the executed-code
//! log, the graphics log, debug state and at most one attached interpreter
//! session. All mutation happens on the task that owns the controller.
//! Interpreter output arrives as [`SessionMessage`]s on an internal queue,
//! is demultiplexed into [`ProtocolEvent`]s, and those events are applied
//! one by one in arrival order.
//!
//! Messages are stamped with the session that produced them; anything from a
//! session other than the attached one is dropped, so a replaced session can
//! never write into the state of its successor.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use workbench_core::debug::{DebugState, DebugTrace};
use workbench_core::dialog::{DialogRequest, DialogResponse, DialogTransport};
use workbench_core::error::Result;
use workbench_core::file::{FileState, InitialFile};
use workbench_core::graphics::GraphicsCommand;
use workbench_core::interpreter::{InterpreterTable, LanguageBackend};
use workbench_core::language::Language;
use workbench_core::output::{OutputEntry, OutputLog};
use workbench_core::protocol::{ProtocolEvent, demultiplex};
use workbench_core::session::{
    OutputSink, SessionHandle, SessionId, SessionMessage, SessionMessageKind,
};

use crate::debug_coordinator::{DebugTraceCoordinator, TraceSource};
use crate::view::{Panel, ViewEvent, ViewNotifier};

/// Coordinates one file's editor, interpreter session and panels.
pub struct FileSessionController {
    file: FileState,
    output: OutputLog,
    /// Whether the output panel accepts input (true between run and halt).
    output_active: bool,
    executed_code: Vec<String>,
    graphics: Vec<GraphicsCommand>,
    debug: DebugState,
    /// The attached session, if any. Kept after halt so `stop` stays valid.
    session: Option<SessionHandle>,
    interpreters: InterpreterTable,
    transport: Arc<dyn DialogTransport>,
    view: ViewNotifier,
    /// Run saved files from their location instead of from editor text.
    prefer_file_runs: bool,
    messages_tx: mpsc::UnboundedSender<SessionMessage>,
    messages_rx: mpsc::UnboundedReceiver<SessionMessage>,
    /// Protocol events waiting to be applied.
    pending: VecDeque<ProtocolEvent>,
}

impl FileSessionController {
    /// Creates a controller for `initial`. No interpreter is started; see
    /// [`FileSessionController::open`].
    pub fn new(
        initial: InitialFile,
        interpreters: InterpreterTable,
        transport: Arc<dyn DialogTransport>,
    ) -> Self {
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        Self {
            file: FileState::new(initial),
            output: OutputLog::new(),
            output_active: false,
            executed_code: Vec::new(),
            graphics: Vec::new(),
            debug: DebugState::default(),
            session: None,
            interpreters,
            transport,
            view: ViewNotifier::default(),
            prefer_file_runs: true,
            messages_tx,
            messages_rx,
            pending: VecDeque::new(),
        }
    }

    /// Routes view notifications to `view`.
    pub fn with_view(mut self, view: ViewNotifier) -> Self {
        self.view = view;
        self
    }

    pub fn with_prefer_file_runs(mut self, prefer: bool) -> Self {
        self.prefer_file_runs = prefer;
        self
    }

    /// Opens the file: either starts an interpreter right away or just
    /// reveals the editor.
    pub async fn open(&mut self, start_interpreter: bool) -> Result<()> {
        if start_interpreter {
            self.run().await.map(|_| ())
        } else {
            self.view.reveal(Panel::Editor);
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    /// Language of the file, recomputed from the current name and text.
    pub fn language(&self) -> Language {
        Language::detect(&self.file.name, &self.file.editor_text)
    }

    pub fn title(&self) -> String {
        self.file.title()
    }

    pub fn file(&self) -> &FileState {
        &self.file
    }

    pub fn editor_text(&self) -> &str {
        &self.file.editor_text
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.file.has_unsaved_changes()
    }

    pub fn output(&self) -> &[OutputEntry] {
        self.output.entries()
    }

    /// Entries discarded by earlier runs.
    pub fn dropped_output(&self) -> usize {
        self.output.dropped()
    }

    pub fn output_active(&self) -> bool {
        self.output_active
    }

    pub fn executed_code(&self) -> &[String] {
        &self.executed_code
    }

    pub fn graphics(&self) -> &[GraphicsCommand] {
        &self.graphics
    }

    /// Most recent trace data shown by the debugger panel.
    pub fn debugger_data(&self) -> Option<&Value> {
        self.debug.debugger_data()
    }

    /// The trace the editor highlights, present only while the editor text
    /// still matches the text the trace was generated for.
    pub fn editor_debug_trace(&self) -> Option<&DebugTrace> {
        self.debug.editor_trace()
    }

    pub fn editor_in_debug_mode(&self) -> bool {
        self.debug.editor_in_debug_mode()
    }

    /// Id of the attached session, if one is attached.
    pub fn active_session(&self) -> Option<SessionId> {
        self.session
            .as_ref()
            .filter(|handle| handle.is_attached())
            .map(SessionHandle::id)
    }

    pub fn is_attached(&self) -> bool {
        self.active_session().is_some()
    }

    fn backend(&self) -> Arc<dyn LanguageBackend> {
        self.interpreters.backend(self.language()).clone()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Starts a fresh interpreter for the current text.
    ///
    /// A file with a location is saved first. Any previous session is
    /// detached and killed before the new one starts, so at most one
    /// session is attached at any moment. When the interpreter cannot be
    /// launched an error dialog is shown and the output, executed-code and
    /// graphics logs are left as they were.
    pub async fn run(&mut self) -> Result<SessionId> {
        let language = self.language();
        if self.file.location.is_some() {
            self.save().await;
        }

        self.teardown_session();

        let session = SessionId::new();
        let sink = OutputSink::new(session, self.messages_tx.clone());
        let backend = self.interpreters.backend(language).clone();
        let started = match (&self.file.location, self.prefer_file_runs) {
            (Some(location), true) => backend.run_file(location, sink),
            _ => backend.run_code(&self.file.editor_text, sink),
        };

        let handle = match started {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("[Controller] Failed to start {} interpreter: {}", language, e);
                self.show_error("Unable to run", &e.user_message()).await;
                return Err(e);
            }
        };

        let dropped = self.output.truncate();
        self.executed_code.clear();
        self.append_graphics(GraphicsCommand::clear());
        self.session = Some(handle);
        self.output_active = true;
        self.view.reveal(Panel::Output);

        tracing::info!(
            "[Controller] Started {} session {} for {} (cleared {} output entries)",
            language,
            session,
            self.file.name,
            dropped
        );
        Ok(session)
    }

    /// Kills the attached interpreter. Its halt message still arrives.
    pub fn stop(&mut self) {
        match &self.session {
            Some(handle) => handle.kill(),
            None => tracing::debug!("[Controller] stop with no session"),
        }
    }

    /// Closes the attached interpreter's input. The process keeps running
    /// and typically exits on its own once it reads end of file.
    pub fn end_input(&mut self) {
        match &self.session {
            Some(handle) => {
                tracing::debug!("[Controller] Closing input of session {}", handle.id());
                handle.close_input();
            }
            None => tracing::debug!("[Controller] end_input with no session"),
        }
    }

    /// Sends one line of input and echoes it into the output history.
    /// Does nothing when no session exists.
    pub fn interact(&mut self, line: &str) {
        let Some(handle) = &self.session else {
            tracing::debug!("[Controller] Ignoring input, no session");
            return;
        };
        if let Err(e) = handle.interact(line) {
            tracing::warn!("[Controller] Input not delivered: {}", e);
        }
        self.append_output(OutputEntry::input_echo(line));
    }

    /// Detaches and kills the current session.
    pub fn close(&mut self) {
        self.teardown_session();
    }

    fn teardown_session(&mut self) {
        if let Some(mut handle) = self.session.take() {
            tracing::debug!("[Controller] Tearing down session {}", handle.id());
            handle.teardown();
        }
    }

    // ------------------------------------------------------------------
    // Message pump
    // ------------------------------------------------------------------

    /// Waits for the next session message.
    ///
    /// Never returns `None` while the controller is alive, since it holds a
    /// sender of its own queue.
    pub async fn next_message(&mut self) -> Option<SessionMessage> {
        self.messages_rx.recv().await
    }

    /// Applies every message already queued. Returns how many were taken.
    pub async fn drain_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(message) = self.messages_rx.try_recv() {
            self.handle_message(message).await;
            count += 1;
        }
        count
    }

    /// Applies one session message.
    pub async fn handle_message(&mut self, message: SessionMessage) {
        if self.active_session() != Some(message.session) {
            tracing::trace!("[Controller] Dropping message from stale session {}", message.session);
            return;
        }

        match message.kind {
            SessionMessageKind::Output { text, is_err } => {
                self.handle_output(&text, is_err).await;
            }
            SessionMessageKind::Halt { text } => {
                if !text.is_empty() {
                    self.handle_output(&text, true).await;
                }
                self.output_active = false;
                self.view.notify(ViewEvent::Halted);
                tracing::info!("[Controller] Session {} halted: {}", message.session, text);
            }
        }
    }

    async fn handle_output(&mut self, text: &str, is_err: bool) {
        let events = demultiplex(text, is_err, self.file.editor_text.is_empty());
        self.pending.extend(events);
        while let Some(event) = self.pending.pop_front() {
            self.apply(event).await;
        }
    }

    async fn apply(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::RegenerateDebugTrace => self.debug_executed_code().await,
            ProtocolEvent::RevealEditor => self.view.reveal(Panel::Editor),
            ProtocolEvent::PopulateEditor => {
                // Re-checked here: earlier events may have filled the editor.
                if self.file.editor_text.is_empty() {
                    let text = self.executed_code.join("\n");
                    self.replace_editor_text(text);
                }
            }
            ProtocolEvent::AppendExecuted(code) => self.executed_code.push(code),
            ProtocolEvent::AppendGraphics(command) => {
                self.append_graphics(command);
                self.view.reveal(Panel::Graphics);
            }
            ProtocolEvent::Output(entry) => self.append_output(entry),
        }
    }

    fn append_output(&mut self, entry: OutputEntry) {
        self.output.push(entry.clone());
        self.view.notify(ViewEvent::OutputAppended(entry));
    }

    fn append_graphics(&mut self, command: GraphicsCommand) {
        self.graphics.push(command.clone());
        self.view.notify(ViewEvent::GraphicsAppended(command));
    }

    // ------------------------------------------------------------------
    // Editor
    // ------------------------------------------------------------------

    /// Records an edit made in the editor panel.
    pub fn on_editor_change(&mut self, text: impl Into<String>) {
        self.file.editor_text = text.into();
        self.debug.refresh(&self.file.editor_text);
    }

    /// Records a trace pushed by the debugger panel (stepping, scrubbing).
    pub fn on_debugger_update(&mut self, trace: DebugTrace) {
        self.debug.set_editor_trace(trace, &self.file.editor_text);
    }

    fn replace_editor_text(&mut self, text: String) {
        self.file.editor_text = text;
        self.debug.refresh(&self.file.editor_text);
        self.view.notify(ViewEvent::EditorTextChanged);
    }

    /// Replaces the editor text with its formatted form.
    pub async fn format(&mut self) -> Result<()> {
        let backend = self.backend();
        match backend.format(&self.file.editor_text).await {
            Ok(formatted) => {
                if formatted != self.file.editor_text {
                    self.replace_editor_text(formatted);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Controller] Format failed: {}", e);
                self.show_error("Unable to format", &e.user_message()).await;
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Debugging
    // ------------------------------------------------------------------

    /// Produces a debug trace and shows it.
    ///
    /// With `precomputed` data nothing is generated. Otherwise the editor
    /// text is traced, or, when the editor is empty, the language preamble
    /// followed by the executed-code log.
    pub async fn debug(&mut self, precomputed: Option<DebugTrace>) -> Result<()> {
        let backend = self.backend();
        let source = TraceSource::select(
            precomputed,
            &self.file.editor_text,
            &self.executed_code,
            || backend.debug_prefix(),
        );
        self.resolve_trace(backend.as_ref(), source).await
    }

    /// Regenerates the trace from the executed-code log, whatever the
    /// editor holds. Triggered by the interpreter's debug marker.
    pub async fn debug_executed_code(&mut self) {
        let backend = self.backend();
        let source = TraceSource::ExecutedCode {
            prefix: backend.debug_prefix(),
            fragments: self.executed_code.clone(),
        };
        // Failures are reported through the error dialog already.
        let _ = self.resolve_trace(backend.as_ref(), source).await;
    }

    async fn resolve_trace(&mut self, backend: &dyn LanguageBackend, source: TraceSource) -> Result<()> {
        match DebugTraceCoordinator::resolve(backend, source).await {
            Ok(trace) => {
                self.debug.store(trace, &self.file.editor_text);
                self.view.reveal(Panel::Editor);
                self.view.reveal(Panel::Debugger);
                self.view.notify(ViewEvent::DebugTraceReady);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Controller] Debug trace failed: {}", e);
                self.show_error("Unable to debug", &e.user_message()).await;
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Saves to the current location, or asks for one when there is none.
    /// Returns whether the text was saved.
    pub async fn save(&mut self) -> bool {
        let Some(location) = self.file.location.clone() else {
            return self.save_as().await;
        };
        let contents = self.file.editor_text.clone();
        let request = DialogRequest::SaveFile {
            contents: contents.clone(),
            location,
        };
        match self.request(request).await {
            Some(_) => {
                self.file.mark_saved(contents, None, None);
                true
            }
            None => false,
        }
    }

    /// Asks for a new name and location, then saves there.
    pub async fn save_as(&mut self) -> bool {
        let contents = self.file.editor_text.clone();
        let request = DialogRequest::ShowSaveDialog {
            contents: contents.clone(),
            hint: self.file.name.clone(),
        };
        match self.request(request).await {
            Some(response) => {
                self.file.mark_saved(contents, response.name, response.location);
                true
            }
            None => false,
        }
    }

    /// Publishes the current text. Returns the transport's response so the
    /// caller can present the link.
    pub async fn share(&mut self) -> Option<DialogResponse> {
        let contents = self.file.editor_text.clone();
        let request = DialogRequest::ShowShareDialog {
            contents: contents.clone(),
            name: self.file.name.clone(),
        };
        let response = self.request(request).await?;
        self.file
            .mark_saved(contents, response.name.clone(), response.location.clone());
        Some(response)
    }

    /// Sends `request`, returning the response only when it succeeded.
    async fn request(&self, request: DialogRequest) -> Option<DialogResponse> {
        let kind = request.kind();
        match self.transport.request(request).await {
            Ok(response) if response.success => Some(response),
            Ok(_) => {
                tracing::debug!("[Controller] {} declined", kind);
                None
            }
            Err(e) => {
                tracing::warn!("[Controller] {} failed: {}", kind, e);
                None
            }
        }
    }

    async fn show_error(&self, title: &str, message: &str) {
        if let Err(e) = self.transport.request(DialogRequest::error(title, message)).await {
            tracing::warn!("[Controller] Could not show error dialog '{}': {}", title, e);
        }
    }
}

impl Drop for FileSessionController {
    fn drop(&mut self) {
        self.teardown_session();
    }
}

impl std::fmt::Debug for FileSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionController")
            .field("file", &self.file.name)
            .field("session", &self.session)
            .field("output_active", &self.output_active)
            .field("executed_code", &self.executed_code.len())
            .field("graphics", &self.graphics.len())
            .finish_non_exhaustive()
    }
}
