//! Row store: saved and staged observation rows with their edit state.
//!
//! Rows live in an arena keyed by [`RowId`] plus a display order. Saved rows
//! keep a snapshot of their last committed values from the first mutation
//! until the next commit or revert, which is what `revert_records` restores.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use survey_model::{CellValue, ObservationRow, RowId};
use survey_validate::ValidationError;

use crate::error::EditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    /// Loaded from persisted data or committed in this session.
    Saved,
    /// Created in this session and never committed.
    Staged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Staged row dropped immediately.
    Removed,
    /// Saved row flagged; deleted on the next commit.
    Flagged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevertSummary {
    pub discarded: usize,
    pub restored: usize,
}

#[derive(Debug, Clone)]
pub struct RowEntry {
    row: ObservationRow,
    origin: RowOrigin,
    dirty: bool,
    pending_delete: bool,
    committed: Option<ObservationRow>,
    errors: Vec<ValidationError>,
}

impl RowEntry {
    fn new(row: ObservationRow, origin: RowOrigin) -> Self {
        Self {
            dirty: origin == RowOrigin::Staged,
            row,
            origin,
            pending_delete: false,
            committed: None,
            errors: Vec::new(),
        }
    }

    pub fn row(&self) -> &ObservationRow {
        &self.row
    }

    pub fn origin(&self) -> RowOrigin {
        self.origin
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }

    /// Errors from the last failed save of this row.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Last committed values of a modified saved row.
    pub fn committed(&self) -> Option<&ObservationRow> {
        self.committed.as_ref()
    }

    fn touch(&mut self) {
        if self.origin == RowOrigin::Saved && self.committed.is_none() {
            self.committed = Some(self.row.clone());
        }
        self.dirty = true;
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    entries: HashMap<RowId, RowEntry>,
    order: Vec<RowId>,
    next_id: u64,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the saved rows. Staged rows are kept after them; a staged row
    /// whose id collides with a loaded row is given a fresh id. Returns
    /// those renumberings as `(old, new)`.
    pub fn set_initial_rows(&mut self, rows: Vec<ObservationRow>) -> Vec<(RowId, RowId)> {
        let staged: Vec<RowEntry> = self
            .order
            .iter()
            .filter_map(|row_id| self.entries.remove(row_id))
            .filter(|entry| entry.origin == RowOrigin::Staged)
            .collect();
        self.entries.clear();
        self.order.clear();

        for row in rows {
            let row_id = row.row_id;
            if self.entries.contains_key(&row_id) {
                tracing::warn!(%row_id, "duplicate row id in loaded rows; keeping the first");
                continue;
            }
            self.bump_next_id(row_id);
            self.entries.insert(row_id, RowEntry::new(row, RowOrigin::Saved));
            self.order.push(row_id);
        }

        let mut renumbered = Vec::new();
        for mut entry in staged {
            let old = entry.row.row_id;
            if self.entries.contains_key(&old) {
                let new = self.allocate_id();
                entry.row.row_id = new;
                renumbered.push((old, new));
            }
            self.bump_next_id(entry.row.row_id);
            self.order.push(entry.row.row_id);
            self.entries.insert(entry.row.row_id, entry);
        }

        tracing::debug!(
            saved = self.entries.len() - self.staged_count(),
            staged = self.staged_count(),
            "loaded initial rows"
        );
        renumbered
    }

    /// Append an empty staged row.
    pub fn create_new_record(&mut self) -> RowId {
        let row_id = self.allocate_id();
        self.insert_staged(ObservationRow::empty(row_id));
        row_id
    }

    /// Append externally parsed rows as staged rows with fresh ids.
    pub fn stage_rows(&mut self, rows: Vec<ObservationRow>) -> Vec<RowId> {
        rows.into_iter()
            .map(|mut row| {
                row.row_id = self.allocate_id();
                let row_id = row.row_id;
                self.insert_staged(row);
                row_id
            })
            .collect()
    }

    pub fn mark_record_dirty(&mut self, row_id: RowId) -> Result<(), EditError> {
        self.entry_mut(row_id)?.touch();
        Ok(())
    }

    pub fn set_cell(
        &mut self,
        row_id: RowId,
        field_id: &str,
        value: CellValue,
    ) -> Result<(), EditError> {
        let entry = self.entry_mut(row_id)?;
        if entry.pending_delete {
            return Err(EditError::PendingDelete(row_id));
        }
        let mut row = entry.row.clone();
        row.set_value(field_id, value)?;
        entry.touch();
        entry.row = row;
        Ok(())
    }

    pub fn delete_row(&mut self, row_id: RowId) -> Result<DeleteOutcome, EditError> {
        let entry = self.entry_mut(row_id)?;
        if entry.origin == RowOrigin::Saved {
            entry.touch();
            entry.pending_delete = true;
            return Ok(DeleteOutcome::Flagged);
        }
        self.entries.remove(&row_id);
        self.order.retain(|id| *id != row_id);
        Ok(DeleteOutcome::Removed)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.dirty || entry.pending_delete)
    }

    /// Drop staged rows and restore modified saved rows to their committed
    /// values.
    pub fn revert_records(&mut self) -> RevertSummary {
        let mut summary = RevertSummary::default();
        self.entries.retain(|_, entry| {
            if entry.origin == RowOrigin::Staged {
                summary.discarded += 1;
                return false;
            }
            if let Some(committed) = entry.committed.take() {
                entry.row = committed;
                summary.restored += 1;
            }
            entry.dirty = false;
            entry.pending_delete = false;
            entry.errors.clear();
            true
        });
        let entries = &self.entries;
        self.order.retain(|row_id| entries.contains_key(row_id));
        summary
    }

    /// Remove dynamic fields from every row and committed snapshot. Does not
    /// mark rows dirty.
    pub fn strip_fields(&mut self, field_ids: &[String]) {
        let ids = || field_ids.iter().map(String::as_str);
        for entry in self.entries.values_mut() {
            entry.row.strip_fields(ids());
            if let Some(committed) = entry.committed.as_mut() {
                committed.strip_fields(ids());
            }
            entry
                .errors
                .retain(|error| !field_ids.contains(&error.field_id));
        }
    }

    /// Dirty rows to validate and save, in display order.
    pub fn dirty_rows(&self) -> Vec<ObservationRow> {
        self.iter()
            .filter(|entry| entry.dirty && !entry.pending_delete)
            .map(|entry| entry.row.clone())
            .collect()
    }

    /// Saved rows flagged for deletion, in display order.
    pub fn pending_deletions(&self) -> Vec<RowId> {
        self.iter()
            .filter(|entry| entry.pending_delete)
            .map(|entry| entry.row.row_id)
            .collect()
    }

    /// Replace the errors of the given rows.
    pub fn attach_errors(&mut self, errors: &BTreeMap<RowId, Vec<ValidationError>>) {
        for (row_id, row_errors) in errors {
            if let Some(entry) = self.entries.get_mut(row_id) {
                entry.errors.clone_from(row_errors);
            }
        }
    }

    /// Mark rows as committed and drop committed deletions.
    pub fn commit(&mut self, saved: &[RowId], deleted: &[RowId]) {
        for row_id in saved {
            if let Some(entry) = self.entries.get_mut(row_id) {
                entry.origin = RowOrigin::Saved;
                entry.dirty = false;
                entry.committed = None;
                entry.errors.clear();
            }
        }
        for row_id in deleted {
            self.entries.remove(row_id);
        }
        let entries = &self.entries;
        self.order.retain(|row_id| entries.contains_key(row_id));
    }

    pub fn get(&self, row_id: RowId) -> Option<&RowEntry> {
        self.entries.get(&row_id)
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.entries.contains_key(&row_id)
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &RowEntry> {
        self.order.iter().filter_map(|row_id| self.entries.get(row_id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn staged_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.origin == RowOrigin::Staged)
            .count()
    }

    fn entry_mut(&mut self, row_id: RowId) -> Result<&mut RowEntry, EditError> {
        self.entries
            .get_mut(&row_id)
            .ok_or(EditError::UnknownRow(row_id))
    }

    fn insert_staged(&mut self, row: ObservationRow) {
        let row_id = row.row_id;
        self.order.push(row_id);
        self.entries.insert(row_id, RowEntry::new(row, RowOrigin::Staged));
    }

    fn allocate_id(&mut self) -> RowId {
        self.next_id += 1;
        RowId::new(self.next_id)
    }

    fn bump_next_id(&mut self, row_id: RowId) {
        self.next_id = self.next_id.max(row_id.get());
    }
}
