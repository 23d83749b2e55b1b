//! Domain models for the patient registry.

mod patch;
mod patient;

pub use patch::*;
pub use patient::*;
