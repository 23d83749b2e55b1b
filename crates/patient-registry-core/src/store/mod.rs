//! Flat-file store for patient records.

mod patients;
mod sort;

pub use sort::*;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Patient, ValidationError};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the persisted patient document.
///
/// The document is one JSON object mapping id to stored fields. Every
/// operation re-reads the whole document and writes it back in full; nothing
/// is cached between operations.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store handle for the document at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the persisted document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the entire document.
    pub fn load(&self) -> StoreResult<BTreeMap<String, Patient>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Serialize and overwrite the entire document. Not atomic: a failure
    /// mid-write can leave the document corrupted.
    pub fn save(&self, records: &BTreeMap<String, Patient>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Membership check against the persisted document.
    pub fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.load()?.contains_key(id))
    }
}
