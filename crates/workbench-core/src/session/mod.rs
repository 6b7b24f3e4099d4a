//! Interpreter session domain module.
//!
//! # Module Structure
//!
//! - `handle`: the interact/kill/detach capability set of one attachment (`SessionHandle`)
//! - `message`: messages pushed by running sessions (`SessionMessage`, `OutputSink`)

mod handle;
mod message;

pub use handle::{SessionControl, SessionHandle};
pub use message::{OutputSink, SessionId, SessionMessage, SessionMessageKind};
