//! Save batches.
//!
//! A save runs in three phases so the table stays usable while the
//! measurement lookups are pending:
//!
//! 1. [`EditController::begin_save`] captures the dirty rows and pending
//!    deletions and locks them.
//! 2. [`SaveBatch::run`] validates every captured row concurrently and, only
//!    if all of them pass, hands the batch to the [`ObservationSink`].
//! 3. [`EditController::finish_save`] applies the [`SaveOutcome`]: commit,
//!    or attach errors and leave every row as it was.
//!
//! [`EditController::begin_save`]: crate::EditController::begin_save
//! [`EditController::finish_save`]: crate::EditController::finish_save

use std::collections::BTreeMap;
use std::sync::Arc;

use survey_model::{ColumnDefinition, ObservationRow, RowId, SurveyId};
use survey_validate::{RowValidator, TransportError, ValidationError};

use crate::sink::ObservationSink;
use crate::tracker::BatchId;

/// Rows committed by a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: Vec<RowId>,
    pub deleted: Vec<RowId>,
}

impl SaveReport {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.deleted.is_empty()
    }
}

#[derive(Debug)]
pub(crate) enum BatchResult {
    Committed(SaveReport),
    /// Errors for every validated row, empty lists included.
    Invalid(BTreeMap<RowId, Vec<ValidationError>>),
    Transport(TransportError),
}

/// Result of [`SaveBatch::run`], to be applied with `finish_save`.
#[derive(Debug)]
pub struct SaveOutcome {
    pub(crate) batch: BatchId,
    pub(crate) result: BatchResult,
}

impl SaveOutcome {
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.result, BatchResult::Committed(_))
    }
}

/// Rows captured by `begin_save`, detached from the table.
pub struct SaveBatch {
    pub(crate) id: BatchId,
    pub(crate) survey: SurveyId,
    pub(crate) rows: Vec<ObservationRow>,
    pub(crate) deletions: Vec<RowId>,
    pub(crate) columns: Vec<ColumnDefinition>,
    pub(crate) validator: Arc<RowValidator>,
    pub(crate) sink: Arc<dyn ObservationSink>,
    pub(crate) concurrency: usize,
}

impl SaveBatch {
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// Rows to validate and save.
    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn deletions(&self) -> &[RowId] {
        &self.deletions
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.deletions.is_empty()
    }

    pub async fn run(self) -> SaveOutcome {
        let result = self.execute().await;
        SaveOutcome {
            batch: self.id,
            result,
        }
    }

    async fn execute(&self) -> BatchResult {
        let errors = match self
            .validator
            .validate_rows(&self.rows, &self.columns, self.concurrency)
            .await
        {
            Ok(errors) => errors,
            Err(error) => return BatchResult::Transport(error),
        };
        if errors.values().any(|row_errors| !row_errors.is_empty()) {
            return BatchResult::Invalid(errors);
        }

        if !self.rows.is_empty()
            && let Err(error) = self.sink.save_observations(self.survey, &self.rows).await
        {
            return BatchResult::Transport(error);
        }
        if !self.deletions.is_empty()
            && let Err(error) = self
                .sink
                .delete_observations(self.survey, &self.deletions)
                .await
        {
            return BatchResult::Transport(error);
        }

        BatchResult::Committed(SaveReport {
            saved: self.rows.iter().map(|row| row.row_id).collect(),
            deleted: self.deletions.clone(),
        })
    }
}

impl std::fmt::Debug for SaveBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveBatch")
            .field("id", &self.id)
            .field("survey", &self.survey)
            .field("rows", &self.rows.len())
            .field("deletions", &self.deletions.len())
            .finish_non_exhaustive()
    }
}
