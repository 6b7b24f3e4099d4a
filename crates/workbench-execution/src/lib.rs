//! Interpreter service for the workbench.
//!
//! Provides [`ProcessBackend`], a [`workbench_core::interpreter::LanguageBackend`]
//! that runs interpreters as child processes, and [`interpreter_table`] to
//! build the per-language capability table from configuration.

mod backend;
mod generation;
mod process;

pub use backend::{ProcessBackend, interpreter_table};
