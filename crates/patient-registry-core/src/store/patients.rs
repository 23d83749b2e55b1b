//! Patient record operations over the file store.
//!
//! Every write is a full read-everything, mutate-one-entry, write-everything
//! cycle against the persisted document.

use super::{FileStore, SortField, SortOrder, StoreError, StoreResult};
use crate::models::{FieldViolation, Patient, PatientPatch, PatientView, ValidationError};

impl FileStore {
    /// List all records with metrics computed per record, in id order.
    pub fn list_patients(&self) -> StoreResult<Vec<PatientView>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(id, patient)| PatientView::new(id, patient))
            .collect())
    }

    /// Get a single record by id.
    pub fn get_patient(&self, id: &str) -> StoreResult<PatientView> {
        match self.load()?.remove(id) {
            Some(patient) => Ok(PatientView::new(id, patient)),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Insert a new record.
    ///
    /// A taken id is a conflict regardless of the field values; only then is
    /// the record itself validated.
    pub fn add_patient(&self, id: &str, patient: Patient) -> StoreResult<PatientView> {
        let mut records = self.load()?;
        if records.contains_key(id) {
            return Err(StoreError::Conflict(id.to_string()));
        }
        if id.trim().is_empty() {
            return Err(ValidationError {
                violations: vec![FieldViolation::new("id", "must not be empty")],
            }
            .into());
        }
        patient.validate()?;
        records.insert(id.to_string(), patient.clone());
        self.save(&records)?;
        Ok(PatientView::new(id, patient))
    }

    /// Merge a partial update into an existing record and persist it.
    ///
    /// The merged record is re-validated as a whole before the write, so a
    /// rejected patch leaves the document untouched.
    pub fn update_patient(&self, id: &str, patch: &PatientPatch) -> StoreResult<PatientView> {
        let mut records = self.load()?;
        let existing = records
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let merged = patch.apply(existing)?;
        records.insert(id.to_string(), merged.clone());
        self.save(&records)?;
        Ok(PatientView::new(id, merged))
    }

    /// Remove a record by id.
    pub fn delete_patient(&self, id: &str) -> StoreResult<()> {
        let mut records = self.load()?;
        if records.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.save(&records)
    }

    /// All records ordered by `field` in the given direction.
    ///
    /// The sort is stable and the store iterates in id order, so equal keys
    /// always tie-break by id.
    pub fn sort_patients(
        &self,
        field: SortField,
        order: SortOrder,
    ) -> StoreResult<Vec<PatientView>> {
        let mut views = self.list_patients()?;
        match order {
            SortOrder::Ascending => views.sort_by(|a, b| field.compare(a, b)),
            SortOrder::Descending => views.sort_by(|a, b| field.compare(b, a)),
        }
        Ok(views)
    }
}
