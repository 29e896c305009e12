//! Read-only views handed to the surrounding application.

use std::collections::BTreeSet;

use serde::Serialize;
use survey_model::{ColumnDefinition, ObservationRow, RowId};
use survey_validate::ValidationError;

use crate::store::RowOrigin;

/// Lifecycle state of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Clean,
    Dirty,
    /// Captured by the save in progress.
    Validating,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub row: ObservationRow,
    pub origin: RowOrigin,
    pub status: RowStatus,
    pub pending_delete: bool,
    pub editing: bool,
    pub errors: Vec<ValidationError>,
}

impl RowView {
    pub fn row_id(&self) -> RowId {
        self.row.row_id
    }
}

/// The table at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnDefinition>,
    pub hidden_columns: BTreeSet<String>,
    pub rows: Vec<RowView>,
    pub saving: bool,
    pub has_unsaved_changes: bool,
}

impl TableSnapshot {
    pub fn row(&self, row_id: RowId) -> Option<&RowView> {
        self.rows.iter().find(|view| view.row_id() == row_id)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|column| !self.hidden_columns.contains(&column.field_id))
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().map(|view| view.errors.len()).sum()
    }
}
