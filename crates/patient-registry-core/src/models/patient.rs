//! Patient record model and derived health metrics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gender markers accepted by the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    M,
    F,
    Others,
}

/// Weight category derived from a record's BMI.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Verdict {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obesity,
}

impl Verdict {
    /// Categorize a BMI value.
    ///
    /// Values in `24.9..25.0` fall through the ascending checks and land on
    /// `Obesity`; the band is kept as-is rather than renormalized.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 24.9 {
            Self::NormalWeight
        } else if (25.0..29.9).contains(&bmi) {
            Self::Overweight
        } else {
            Self::Obesity
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obesity => "Obesity",
        };
        f.write_str(label)
    }
}

/// Body-mass index from weight (kg) and height (m), rounded to 2 decimals.
pub fn compute_bmi(weight: f64, height: f64) -> f64 {
    (weight / (height * height) * 100.0).round() / 100.0
}

/// A single violated field constraint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field the constraint applies to.
    pub field: &'static str,
    /// Description of the violation.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validation failure listing every violated constraint, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    /// All violated constraints.
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Stored fields of a patient record.
///
/// The record id is the store key and is never persisted inside the value;
/// `bmi` and `verdict` are derived and never stored at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Patient name
    pub name: String,
    /// City of residence
    pub city: String,
    /// Age in years
    pub age: u32,
    /// Gender marker
    pub gender: Gender,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
}

impl Patient {
    /// Check every field constraint, collecting all violations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "must not be empty"));
        }
        if self.city.trim().is_empty() {
            violations.push(FieldViolation::new("city", "must not be empty"));
        }
        if self.age == 0 {
            violations.push(FieldViolation::new("age", "must be greater than 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            violations.push(FieldViolation::new(
                "height",
                "must be a positive, finite number",
            ));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            violations.push(FieldViolation::new(
                "weight",
                "must be a positive, finite number",
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Body-mass index for this record.
    pub fn bmi(&self) -> f64 {
        compute_bmi(self.weight, self.height)
    }

    /// Weight category for this record.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_bmi(self.bmi())
    }
}

/// Read model: a record together with its id and freshly computed metrics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientView {
    /// Record id (the store key)
    pub id: String,
    /// Stored fields
    #[serde(flatten)]
    pub record: Patient,
    /// Derived body-mass index
    pub bmi: f64,
    /// Derived weight category
    pub verdict: Verdict,
}

impl PatientView {
    /// Build a view, computing the metrics from the stored fields.
    pub fn new(id: impl Into<String>, record: Patient) -> Self {
        let bmi = record.bmi();
        let verdict = record.verdict();
        Self {
            id: id.into(),
            record,
            bmi,
            verdict,
        }
    }
}
