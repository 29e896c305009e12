//! Required core column checks.

use survey_model::{ColumnDefinition, CoreField, ObservationRow};

use crate::issue::Issue;

/// A core column the caller designated as required, with the header used
/// in its error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredColumn {
    pub field: CoreField,
    pub header: String,
}

impl RequiredColumn {
    /// Resolve required field ids against the active columns. Unknown or
    /// non-core ids are ignored.
    pub fn resolve<'a>(
        field_ids: impl IntoIterator<Item = &'a str>,
        columns: &[ColumnDefinition],
    ) -> Vec<Self> {
        field_ids
            .into_iter()
            .filter_map(|field_id| {
                let Some(field) = CoreField::parse(field_id) else {
                    tracing::debug!(field_id, "ignoring non-core required column");
                    return None;
                };
                let header = columns
                    .iter()
                    .find(|column| column.field_id == field.field_id())
                    .map_or_else(|| field.header().to_string(), |c| c.header_label.clone());
                Some(Self { field, header })
            })
            .collect()
    }
}

/// One `MissingColumn` issue per empty required column.
pub fn check(row: &ObservationRow, required: &[RequiredColumn]) -> Vec<Issue> {
    required
        .iter()
        .filter(|column| row.core_value(column.field).is_missing())
        .map(|column| Issue::MissingColumn {
            field: column.field,
            header: column.header.clone(),
        })
        .collect()
}
