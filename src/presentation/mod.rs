//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the current wizard step with ratatui and maps
//! keyboard input onto the application session.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
