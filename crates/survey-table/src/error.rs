//! Edit and save error types.

use std::collections::BTreeMap;
use std::fmt;

use survey_model::{ModelError, RowId};
use survey_validate::{TransportError, ValidationError};
use thiserror::Error;

/// A table mutation was refused. The table is unchanged.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("row {0} does not exist")]
    UnknownRow(RowId),

    #[error("row {0} is not being edited")]
    NotEditing(RowId),

    #[error("row {0} is part of the save in progress")]
    RowLocked(RowId),

    #[error("row {0} is marked for deletion")]
    PendingDelete(RowId),

    #[error("column '{0}' is not an active column")]
    UnknownColumn(String),

    #[error("cannot {0} while a save is in progress")]
    SaveInProgress(&'static str),

    #[error(transparent)]
    InvalidValue(#[from] ModelError),
}

/// Validation errors of a rejected batch, keyed by row. Only rows with at
/// least one error are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchErrors {
    rows: BTreeMap<RowId, Vec<ValidationError>>,
}

impl BatchErrors {
    pub fn from_rows(rows: BTreeMap<RowId, Vec<ValidationError>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .filter(|(_, errors)| !errors.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of failing rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Total number of errors across all rows.
    pub fn error_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn get(&self, row_id: RowId) -> Option<&[ValidationError]> {
        self.rows.get(&row_id).map(Vec::as_slice)
    }

    /// Errors for one cell.
    pub fn field(&self, row_id: RowId, field_id: &str) -> Vec<&ValidationError> {
        self.get(row_id)
            .unwrap_or_default()
            .iter()
            .filter(|error| error.field_id == field_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &[ValidationError])> {
        self.rows
            .iter()
            .map(|(row_id, errors)| (*row_id, errors.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<RowId, Vec<ValidationError>> {
        self.rows
    }
}

impl fmt::Display for BatchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s) in {} row(s)",
            self.error_count(),
            self.len()
        )
    }
}

/// A save attempt did not commit. Staged and edited rows are kept.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("validation failed: {0}")]
    Invalid(BatchErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("a save is already in progress")]
    InProgress,

    #[error("no matching save is in progress")]
    NotInProgress,
}
