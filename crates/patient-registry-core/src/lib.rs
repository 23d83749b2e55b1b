//! Patient Registry Core Library
//!
//! Record management over a single flat JSON document keyed by patient id.
//! Records are validated at write time and carry two derived health metrics
//! (body-mass index and a categorical verdict) that are never persisted and
//! always recomputed from the stored measurements.
//!
//! # Modules
//!
//! - [`models`]: domain types (record, update patch, read view, metrics)
//! - [`store`]: flat-file JSON store and the record operations over it

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::{
    compute_bmi, FieldViolation, Gender, Patient, PatientPatch, PatientView, ValidationError,
    Verdict,
};
pub use store::{FileStore, SortField, SortOrder, StoreError, StoreResult};
