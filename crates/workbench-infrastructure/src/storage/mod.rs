//! Low-level storage helpers.

pub mod atomic_file;

pub use atomic_file::write_atomic;
