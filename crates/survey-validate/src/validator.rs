//! Row validator: structural rules plus the async per-taxon measurement rule.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use survey_model::{ColumnDefinition, ObservationRow, RowId};

use crate::checks::required::RequiredColumn;
use crate::checks::{environment, measurement, run_structural};
use crate::issue::{Issue, ValidationError};
use crate::lookup::{MeasurementCache, MeasurementLookup, TransportError};

/// Default number of rows validated concurrently.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Validates observation rows against the active columns.
///
/// Issues are reported in a fixed order: required columns, sampling
/// hierarchy, date/time and coordinates, measurements (column order), then
/// environment columns. The validator owns the session's measurement cache.
#[derive(Debug)]
pub struct RowValidator {
    required_columns: Vec<String>,
    cache: Arc<MeasurementCache>,
}

impl RowValidator {
    pub fn new(lookup: Arc<dyn MeasurementLookup>) -> Self {
        Self::with_cache(Arc::new(MeasurementCache::new(lookup)))
    }

    pub fn with_cache(cache: Arc<MeasurementCache>) -> Self {
        Self {
            required_columns: Vec::new(),
            cache,
        }
    }

    /// Core columns that must be populated.
    pub fn with_required_columns<I, S>(mut self, field_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = field_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    pub fn cache(&self) -> &MeasurementCache {
        &self.cache
    }

    /// Synchronous rules only: required, sampling, date/time, coordinates.
    pub fn validate_structure(
        &self,
        row: &ObservationRow,
        columns: &[ColumnDefinition],
    ) -> Vec<Issue> {
        let required =
            RequiredColumn::resolve(self.required_columns.iter().map(String::as_str), columns);
        run_structural(row, &required)
    }

    /// Every rule for one row.
    ///
    /// A failed lookup is returned as `Err` and never reported as an issue;
    /// a taxon without definitions is reported as a single lookup issue.
    pub async fn validate_issues(
        &self,
        row: &ObservationRow,
        columns: &[ColumnDefinition],
    ) -> Result<Vec<Issue>, TransportError> {
        let mut issues = self.validate_structure(row, columns);

        let measurement_columns: Vec<&ColumnDefinition> =
            columns.iter().filter(|c| c.kind.is_measurement()).collect();
        if let Some(taxon) = row.itis_tsn
            && !measurement_columns.is_empty()
        {
            let definitions = self.cache.definitions(taxon).await?;
            issues.extend(measurement::check(
                row,
                taxon,
                &measurement_columns,
                definitions.as_deref(),
            ));
        }

        let environment_columns: Vec<&ColumnDefinition> =
            columns.iter().filter(|c| c.kind.is_environment()).collect();
        issues.extend(environment::check(row, &environment_columns));

        Ok(issues)
    }

    pub async fn validate(
        &self,
        row: &ObservationRow,
        columns: &[ColumnDefinition],
    ) -> Result<Vec<ValidationError>, TransportError> {
        let issues = self.validate_issues(row, columns).await?;
        Ok(issues.iter().map(ValidationError::from).collect())
    }

    /// Validate many rows with at most `concurrency` in flight. Rows without
    /// errors are included with an empty list. The first transport failure
    /// aborts the whole pass.
    pub async fn validate_rows(
        &self,
        rows: &[ObservationRow],
        columns: &[ColumnDefinition],
        concurrency: usize,
    ) -> Result<BTreeMap<RowId, Vec<ValidationError>>, TransportError> {
        stream::iter(rows)
            .map(|row| async move {
                let errors = self.validate(row, columns).await?;
                Ok::<_, TransportError>((row.row_id, errors))
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await
    }
}
