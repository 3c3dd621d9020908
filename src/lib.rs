//! Dealer Wizard - multi-step application wizards for a car dealership
//!
//! Data-driven step definitions, pure per-step validation, derived fields,
//! resumable progress and submission of a completed application as a lead.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
