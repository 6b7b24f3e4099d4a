//! Domain layer of the code workbench.
//!
//! Holds the types shared by every other crate: languages and their
//! detection, the interpreter output protocol, session handles, debug
//! traces, graphics commands, file state, dialog requests, configuration and
//! the collaborator traits the application layer is written against.

pub mod config;
pub mod debug;
pub mod dialog;
pub mod error;
pub mod file;
pub mod graphics;
pub mod interpreter;
pub mod language;
pub mod output;
pub mod protocol;
pub mod session;

pub use error::WorkbenchError;
pub use language::Language;
