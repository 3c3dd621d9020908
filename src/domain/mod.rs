//! Domain layer: field model, wizard definitions, validation, derived fields
//! and submission assembly. Everything here is pure.

pub mod definition;
pub mod derive;
pub mod errors;
pub mod fields;
pub mod forms;
pub mod submission;
pub mod validation;

pub use definition::*;
pub use derive::*;
pub use errors::*;
pub use fields::*;
pub use forms::*;
pub use submission::*;
pub use validation::*;
