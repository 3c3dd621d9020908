//! Application layer managing wizard state and workflows.
//!
//! This module coordinates between the domain layer and the collaborators
//! (persistence, submission, notifications, telemetry), and holds the
//! terminal session state used by the presentation layer.

pub mod app;
pub mod ports;
pub mod state;

pub use app::*;
pub use ports::*;
pub use state::*;
