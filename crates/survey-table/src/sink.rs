//! Port to the service that stores committed observations.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use survey_model::{ObservationRow, RowId, SurveyId};
use survey_validate::TransportError;

/// Receives a batch once every row in it has validated.
///
/// `save_observations` must behave as an upsert: a batch whose delete call
/// fails is retried as a whole on the next save.
#[async_trait]
pub trait ObservationSink: Send + Sync {
    async fn save_observations(
        &self,
        survey: SurveyId,
        rows: &[ObservationRow],
    ) -> Result<(), TransportError>;

    async fn delete_observations(
        &self,
        survey: SurveyId,
        row_ids: &[RowId],
    ) -> Result<(), TransportError>;
}

/// Keeps committed observations in memory, keyed by survey and row.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<BTreeMap<(SurveyId, RowId), ObservationRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows of one survey, ordered by row id.
    pub fn rows(&self, survey: SurveyId) -> Vec<ObservationRow> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|((row_survey, _), _)| *row_survey == survey)
            .map(|(_, row)| row.clone())
            .collect()
    }
}

#[async_trait]
impl ObservationSink for MemorySink {
    async fn save_observations(
        &self,
        survey: SurveyId,
        rows: &[ObservationRow],
    ) -> Result<(), TransportError> {
        let mut stored = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        for row in rows {
            stored.insert((survey, row.row_id), row.clone());
        }
        Ok(())
    }

    async fn delete_observations(
        &self,
        survey: SurveyId,
        row_ids: &[RowId],
    ) -> Result<(), TransportError> {
        let mut stored = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        for row_id in row_ids {
            stored.remove(&(survey, *row_id));
        }
        Ok(())
    }
}
