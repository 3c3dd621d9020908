//! Infrastructure layer providing external service integrations.
//!
//! This module contains the persistence store for in-progress applications,
//! the submission sinks that record completed ones, and configuration.

pub mod config;
pub mod persistence;
pub mod sink;

pub use config::*;
pub use persistence::*;
pub use sink::*;
