use super::message::SessionId;
use crate::error::{Result, WorkbenchError};

/// The three capabilities a running interpreter exposes.
///
/// Implemented by interpreter backends. `kill` and `detach` must be safe to
/// call any number of times, including after the process has exited.
pub trait SessionControl: Send + Sync {
    /// Writes one line to the process's input.
    fn interact(&self, line: &str) -> Result<()>;
    /// Closes the process's input so it reads end of file. Lines already
    /// queued are still delivered.
    fn close_input(&self);
    /// Terminates the process. Best effort; exit is confirmed by the halt message.
    fn kill(&self);
    /// Stops routing the process's output without terminating it.
    fn detach(&self);
}

/// A live attachment to one interpreter process.
///
/// Handles are created attached. Superseding a session is always
/// `detach` followed by `kill`, see [`SessionHandle::teardown`].
pub struct SessionHandle {
    id: SessionId,
    control: Box<dyn SessionControl>,
    attached: bool,
}

impl SessionHandle {
    pub fn new(id: SessionId, control: Box<dyn SessionControl>) -> Self {
        Self {
            id,
            control,
            attached: true,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn interact(&self, line: &str) -> Result<()> {
        if !self.attached {
            return Err(WorkbenchError::internal(format!(
                "session {} is detached",
                self.id
            )));
        }
        self.control.interact(line)
    }

    /// Signals end of input without terminating the process.
    pub fn close_input(&self) {
        self.control.close_input();
    }

    pub fn kill(&self) {
        self.control.kill();
    }

    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.control.detach();
        }
    }

    /// Detaches, then kills.
    ///
    /// Output routing is cut before the process is asked to die so that its
    /// tail output can never reach whoever attaches next.
    pub fn teardown(&mut self) {
        self.detach();
        self.kill();
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("attached", &self.attached)
            .finish()
    }
}
