pub mod config;
pub mod context;
pub mod debug;
pub mod detect;
pub mod format;
pub mod run;
pub mod share;
