//! Partial-update patch for patient records.

use serde::Deserialize;

use super::patient::{Gender, Patient, ValidationError};

/// A sparse update: each present field overwrites the stored value, absent
/// fields keep their prior value. The record id is not patchable.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl PatientPatch {
    /// Merge this patch into a copy of `existing`.
    ///
    /// The merged record is re-validated as a whole, so a patch that drives
    /// any field out of its constraint range is rejected. Derived metrics are
    /// recomputed from the merged values by whoever reads the result.
    pub fn apply(&self, existing: &Patient) -> Result<Patient, ValidationError> {
        let mut merged = existing.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(city) = &self.city {
            merged.city = city.clone();
        }
        if let Some(age) = self.age {
            merged.age = age;
        }
        if let Some(gender) = self.gender {
            merged.gender = gender;
        }
        if let Some(height) = self.height {
            merged.height = height;
        }
        if let Some(weight) = self.weight {
            merged.weight = weight;
        }
        merged.validate()?;
        Ok(merged)
    }
}
