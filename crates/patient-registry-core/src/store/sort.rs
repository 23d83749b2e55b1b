//! Sort field and direction tokens for listing operations.

use std::cmp::Ordering;
use std::str::FromStr;

use super::StoreError;
use crate::models::{Gender, PatientView};

/// Fields a listing may be ordered by.
///
/// Tokens are enumerated exactly; anything else is rejected rather than
/// inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    City,
    Age,
    Gender,
    Height,
    Weight,
    Bmi,
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "city" => Ok(Self::City),
            "age" => Ok(Self::Age),
            "gender" => Ok(Self::Gender),
            "height" => Ok(Self::Height),
            "weight" => Ok(Self::Weight),
            "bmi" => Ok(Self::Bmi),
            other => Err(StoreError::InvalidSortField(other.to_string())),
        }
    }
}

impl SortField {
    /// Ascending comparison of two views on this field.
    pub fn compare(&self, a: &PatientView, b: &PatientView) -> Ordering {
        match self {
            Self::Name => a.record.name.cmp(&b.record.name),
            Self::City => a.record.city.cmp(&b.record.city),
            Self::Age => a.record.age.cmp(&b.record.age),
            Self::Gender => gender_rank(a.record.gender).cmp(&gender_rank(b.record.gender)),
            Self::Height => a.record.height.total_cmp(&b.record.height),
            Self::Weight => a.record.weight.total_cmp(&b.record.weight),
            Self::Bmi => a.bmi.total_cmp(&b.bmi),
        }
    }
}

fn gender_rank(gender: Gender) -> u8 {
    match gender {
        Gender::M => 0,
        Gender::F => 1,
        Gender::Others => 2,
    }
}

/// Sort direction. Only the `asc` and `desc` tokens are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(StoreError::InvalidSortOrder(other.to_string())),
        }
    }
}
