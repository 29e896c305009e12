//! Table configuration.

use serde::{Deserialize, Serialize};
use survey_model::CoreField;
use survey_validate::DEFAULT_CONCURRENCY;

/// Per-table settings, usually loaded from the `[table]` section of a TOML
/// file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Core columns that must be populated before a row can be saved.
    pub required_columns: Vec<String>,

    /// Write the dynamic column set and hidden columns to the survey store.
    pub persist_columns: bool,

    /// Maximum number of rows validated at once during a save.
    pub validation_concurrency: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            required_columns: [
                CoreField::ItisTsn,
                CoreField::Count,
                CoreField::Latitude,
                CoreField::Longitude,
                CoreField::ObservationDate,
            ]
            .into_iter()
            .map(|field| field.field_id().to_string())
            .collect(),
            persist_columns: true,
            validation_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}
