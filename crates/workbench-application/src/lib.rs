//! Application layer: the per-file session controller and the pieces it
//! coordinates (debug trace resolution, view notifications).

pub mod controller;
pub mod debug_coordinator;
pub mod view;

pub use controller::FileSessionController;
pub use debug_coordinator::{DebugTraceCoordinator, TraceSource};
pub use view::{Panel, ViewEvent, ViewNotifier};
