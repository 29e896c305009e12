//! Edit-state controller: the single mutation entry point of the table.

use std::collections::BTreeSet;
use std::sync::Arc;

use survey_model::{CellValue, ColumnDefinition, ObservationRow, RowId, SurveyId};
use survey_persistence::SurveyStore;
use survey_validate::{MeasurementLookup, RowValidator};

use crate::config::TableConfig;
use crate::error::{BatchErrors, EditError, SaveError};
use crate::registry::ColumnRegistry;
use crate::save::{BatchResult, SaveBatch, SaveOutcome, SaveReport};
use crate::sink::ObservationSink;
use crate::snapshot::{RowStatus, RowView, TableSnapshot};
use crate::store::{DeleteOutcome, RevertSummary, RowStore};
use crate::tracker::SaveTracker;

/// Owns the column registry and row store of one survey's observation
/// table and sequences edits against saves.
///
/// Rows captured by a save are locked until the save is finished; other
/// rows stay editable. Column removal and revert are refused while a save
/// is in flight.
pub struct EditController {
    survey: SurveyId,
    config: TableConfig,
    registry: ColumnRegistry,
    rows: RowStore,
    editing: BTreeSet<RowId>,
    tracker: SaveTracker,
    validator: Arc<RowValidator>,
    sink: Arc<dyn ObservationSink>,
}

impl EditController {
    /// Create the controller and restore the survey's persisted columns.
    pub fn new(
        survey: SurveyId,
        config: TableConfig,
        lookup: Arc<dyn MeasurementLookup>,
        sink: Arc<dyn ObservationSink>,
        store: Arc<dyn SurveyStore>,
    ) -> Self {
        let mut registry = if config.persist_columns {
            ColumnRegistry::with_store(survey, store)
        } else {
            ColumnRegistry::new(survey)
        };
        registry.restore();
        let validator = RowValidator::new(lookup)
            .with_required_columns(config.required_columns.iter().cloned());
        Self {
            survey,
            config,
            registry,
            rows: RowStore::new(),
            editing: BTreeSet::new(),
            tracker: SaveTracker::new(),
            validator: Arc::new(validator),
            sink,
        }
    }

    pub fn survey(&self) -> SurveyId {
        self.survey
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn validator(&self) -> &RowValidator {
        &self.validator
    }

    pub fn is_saving(&self) -> bool {
        self.tracker.is_saving()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.rows.has_unsaved_changes()
    }

    pub fn is_editing(&self, row_id: RowId) -> bool {
        self.editing.contains(&row_id)
    }

    // ---------------------------------------------------------------------
    // Rows
    // ---------------------------------------------------------------------

    /// Replace the saved rows with persisted data. Refused while a save is
    /// in flight, since the batch commits by row id.
    pub fn set_initial_rows(&mut self, rows: Vec<ObservationRow>) -> Result<(), EditError> {
        if self.tracker.is_saving() {
            return Err(EditError::SaveInProgress("load rows"));
        }
        for (old, new) in self.rows.set_initial_rows(rows) {
            if self.editing.remove(&old) {
                self.editing.insert(new);
            }
        }
        Ok(())
    }

    /// Add an empty staged row and open it for editing.
    pub fn create_new_record(&mut self) -> RowId {
        let row_id = self.rows.create_new_record();
        self.editing.insert(row_id);
        tracing::debug!(%row_id, "created observation row");
        row_id
    }

    /// Stage imported rows. They are dirty but not opened for editing.
    pub fn stage_rows(&mut self, rows: Vec<ObservationRow>) -> Vec<RowId> {
        let ids = self.rows.stage_rows(rows);
        tracing::debug!(rows = ids.len(), "staged imported rows");
        ids
    }

    pub fn begin_row_edit(&mut self, row_id: RowId) -> Result<(), EditError> {
        self.ensure_unlocked(row_id)?;
        if self.rows.get(row_id).is_some_and(|entry| entry.is_pending_delete()) {
            return Err(EditError::PendingDelete(row_id));
        }
        self.editing.insert(row_id);
        Ok(())
    }

    /// Returns whether the row was being edited.
    pub fn stop_row_edit(&mut self, row_id: RowId) -> bool {
        self.editing.remove(&row_id)
    }

    /// Write one cell of a row that is being edited.
    ///
    /// Core fields are type-checked; dynamic fields must be active columns.
    /// Rows marked for deletion are read-only.
    pub fn set_cell(
        &mut self,
        row_id: RowId,
        field_id: &str,
        value: CellValue,
    ) -> Result<(), EditError> {
        self.ensure_unlocked(row_id)?;
        if !self.editing.contains(&row_id) {
            return Err(EditError::NotEditing(row_id));
        }
        if !self.registry.contains(field_id) {
            return Err(EditError::UnknownColumn(field_id.to_string()));
        }
        self.rows.set_cell(row_id, field_id, value)
    }

    pub fn mark_record_dirty(&mut self, row_id: RowId) -> Result<(), EditError> {
        self.ensure_unlocked(row_id)?;
        self.rows.mark_record_dirty(row_id)
    }

    pub fn delete_row(&mut self, row_id: RowId) -> Result<DeleteOutcome, EditError> {
        self.ensure_unlocked(row_id)?;
        let outcome = self.rows.delete_row(row_id)?;
        self.editing.remove(&row_id);
        tracing::debug!(%row_id, ?outcome, "deleted observation row");
        Ok(outcome)
    }

    /// Discard staged rows and every uncommitted edit.
    pub fn revert_records(&mut self) -> Result<RevertSummary, EditError> {
        if self.tracker.is_saving() {
            return Err(EditError::SaveInProgress("revert"));
        }
        let summary = self.rows.revert_records();
        self.editing.clear();
        tracing::debug!(
            discarded = summary.discarded,
            restored = summary.restored,
            "reverted observation rows"
        );
        Ok(summary)
    }

    // ---------------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------------

    pub fn add_columns(&mut self, columns: Vec<ColumnDefinition>) -> Vec<String> {
        self.registry.add_columns(columns)
    }

    /// Remove dynamic columns and drop their cells from every row.
    pub fn remove_columns(&mut self, field_ids: &[String]) -> Result<Vec<String>, EditError> {
        if self.tracker.is_saving() {
            return Err(EditError::SaveInProgress("remove columns"));
        }
        let removed = self.registry.remove_columns(field_ids);
        if !removed.is_empty() {
            self.rows.strip_fields(&removed);
        }
        Ok(removed)
    }

    pub fn hide_columns(&mut self, field_ids: &[String]) {
        self.registry.hide_columns(field_ids);
    }

    pub fn show_columns(&mut self, field_ids: &[String]) {
        self.registry.show_columns(field_ids);
    }

    // ---------------------------------------------------------------------
    // Saving
    // ---------------------------------------------------------------------

    /// Capture every dirty row and pending deletion, lock them and stop
    /// editing them.
    pub fn begin_save(&mut self) -> Result<SaveBatch, SaveError> {
        if self.tracker.is_saving() {
            return Err(SaveError::InProgress);
        }
        let rows = self.rows.dirty_rows();
        let deletions = self.rows.pending_deletions();
        let captured: Vec<RowId> = rows
            .iter()
            .map(|row| row.row_id)
            .chain(deletions.iter().copied())
            .collect();
        let id = self
            .tracker
            .start_save(captured.iter().copied())
            .ok_or(SaveError::InProgress)?;
        for row_id in &captured {
            self.editing.remove(row_id);
        }

        tracing::debug!(
            batch = %id,
            rows = rows.len(),
            deletions = deletions.len(),
            "started observation save"
        );
        Ok(SaveBatch {
            id,
            survey: self.survey,
            rows,
            deletions,
            columns: self.registry.columns(),
            validator: Arc::clone(&self.validator),
            sink: Arc::clone(&self.sink),
            concurrency: self.config.validation_concurrency,
        })
    }

    /// Apply the outcome of a batch started by [`Self::begin_save`].
    ///
    /// On failure the rows keep their values and dirty flags; rows that
    /// failed validation carry their errors and are reopened for editing.
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> Result<SaveReport, SaveError> {
        let Some(elapsed_ms) = self.tracker.finish(outcome.batch) else {
            tracing::warn!(batch = %outcome.batch, "ignoring outcome of an abandoned save");
            return Err(SaveError::NotInProgress);
        };

        match outcome.result {
            BatchResult::Committed(report) => {
                self.rows.commit(&report.saved, &report.deleted);
                tracing::info!(
                    batch = %outcome.batch,
                    saved = report.saved.len(),
                    deleted = report.deleted.len(),
                    elapsed_ms,
                    "committed observation rows"
                );
                Ok(report)
            }
            BatchResult::Invalid(errors) => {
                self.rows.attach_errors(&errors);
                let errors = BatchErrors::from_rows(errors);
                self.editing.extend(errors.iter().map(|(row_id, _)| row_id));
                tracing::warn!(
                    batch = %outcome.batch,
                    rows = errors.len(),
                    errors = errors.error_count(),
                    "observation save rejected"
                );
                Err(SaveError::Invalid(errors))
            }
            BatchResult::Transport(error) => {
                tracing::warn!(batch = %outcome.batch, %error, "observation save failed");
                Err(SaveError::Transport(error))
            }
        }
    }

    /// Stop editing, validate every dirty row and commit them as one batch.
    pub async fn stop_edit_and_save_rows(&mut self) -> Result<SaveReport, SaveError> {
        let batch = self.begin_save()?;
        let outcome = batch.run().await;
        self.finish_save(outcome)
    }

    /// Release a save whose batch was dropped before finishing. Returns
    /// whether one was active; rows keep their unsaved state.
    pub fn teardown(&mut self) -> bool {
        match self.tracker.abandon() {
            Some(batch) => {
                tracing::debug!(%batch, "abandoned observation save");
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> TableSnapshot {
        let rows = self
            .rows
            .iter()
            .map(|entry| {
                let row_id = entry.row().row_id;
                let status = if self.tracker.is_locked(row_id) {
                    RowStatus::Validating
                } else if entry.is_dirty() {
                    RowStatus::Dirty
                } else {
                    RowStatus::Clean
                };
                RowView {
                    row: entry.row().clone(),
                    origin: entry.origin(),
                    status,
                    pending_delete: entry.is_pending_delete(),
                    editing: self.editing.contains(&row_id),
                    errors: entry.errors().to_vec(),
                }
            })
            .collect();

        TableSnapshot {
            columns: self.registry.columns(),
            hidden_columns: self.registry.hidden_columns().clone(),
            rows,
            saving: self.tracker.is_saving(),
            has_unsaved_changes: self.rows.has_unsaved_changes(),
        }
    }

    fn ensure_unlocked(&self, row_id: RowId) -> Result<(), EditError> {
        if !self.rows.contains(row_id) {
            return Err(EditError::UnknownRow(row_id));
        }
        if self.tracker.is_locked(row_id) {
            return Err(EditError::RowLocked(row_id));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EditController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditController")
            .field("survey", &self.survey)
            .field("registry", &self.registry)
            .field("rows", &self.rows.len())
            .field("editing", &self.editing)
            .field("saving", &self.tracker.is_saving())
            .finish_non_exhaustive()
    }
}
