//! Save-in-progress tracking.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use survey_model::RowId;

/// Identifies one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ActiveBatch {
    id: BatchId,
    locked: BTreeSet<RowId>,
    started: Instant,
}

/// Tracks the save batch in flight and the rows it locks.
///
/// At most one batch is active. Rows captured by the batch stay locked
/// until it completes, fails, or is abandoned.
#[derive(Debug, Clone, Default)]
pub struct SaveTracker {
    active: Option<ActiveBatch>,
    issued: u64,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a save is in progress.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.active.is_some()
    }

    #[inline]
    pub fn is_locked(&self, row_id: RowId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|batch| batch.locked.contains(&row_id))
    }

    /// Mark that a save has started. Returns `None` if one is already active.
    pub fn start_save(&mut self, rows: impl IntoIterator<Item = RowId>) -> Option<BatchId> {
        if self.active.is_some() {
            return None;
        }
        self.issued += 1;
        let id = BatchId(self.issued);
        self.active = Some(ActiveBatch {
            id,
            locked: rows.into_iter().collect(),
            started: Instant::now(),
        });
        Some(id)
    }

    /// Finish the active batch if it is `id`. Returns the elapsed time in
    /// milliseconds, `None` for a stale id.
    pub fn finish(&mut self, id: BatchId) -> Option<u64> {
        if self.active.as_ref().is_none_or(|batch| batch.id != id) {
            return None;
        }
        self.active
            .take()
            .map(|batch| batch.started.elapsed().as_millis() as u64)
    }

    /// Drop the active batch without completing it.
    pub fn abandon(&mut self) -> Option<BatchId> {
        self.active.take().map(|batch| batch.id)
    }
}
