//! Infrastructure for the workbench: configuration loading, file storage and
//! the local dialog/transport implementation.

pub mod config_service;
pub mod dialog_transport;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::dialog_transport::{ErrorDialogCallback, LocalDialogTransport};
pub use crate::paths::WorkbenchPaths;
