//! Environment column checks.
//!
//! Environment definitions are survey-wide and travel with the column, so
//! no lookup is needed. Columns without a constraint accept any value.

use survey_model::{ColumnDefinition, ObservationRow, ValueConstraint};

use super::measurement::{check_quantitative, is_listed_option};
use crate::issue::Issue;

pub fn check(row: &ObservationRow, columns: &[&ColumnDefinition]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for column in columns {
        let Some(constraint) = &column.constraint else {
            continue;
        };
        let value = row.value(&column.field_id);
        if value.is_missing() {
            continue;
        }
        let issue = match constraint {
            ValueConstraint::Options { options } => (!is_listed_option(&value, options))
                .then(|| Issue::InvalidEnvironmentOption {
                    field_id: column.field_id.clone(),
                }),
            ValueConstraint::Range(bounds) => check_quantitative(&column.field_id, &value, *bounds),
        };
        issues.extend(issue);
    }
    issues
}
