//! Per-taxon measurement checks.
//!
//! Runs once the taxon's definitions have been resolved:
//!
//! - no definitions at all: a single lookup issue on the taxon field, and
//!   no per-column checks for the row
//! - qualitative columns: the cell must equal one of the option ids
//! - quantitative columns: the cell must be a number inside the bounds
//! - a column with no definition for this taxon is flagged as such
//!
//! Columns are visited in registry order; empty cells are skipped.

use survey_model::{
    Bounds, CellValue, ColumnDefinition, ColumnKind, MeasurementOption, ObservationRow, TaxonId,
    TaxonMeasurements,
};

use crate::issue::Issue;

/// Check every active measurement column of `row` against the resolved
/// definitions. `definitions` is `None` when the taxon has none.
pub fn check(
    row: &ObservationRow,
    taxon: TaxonId,
    columns: &[&ColumnDefinition],
    definitions: Option<&TaxonMeasurements>,
) -> Vec<Issue> {
    let Some(definitions) = definitions else {
        return vec![Issue::NoTaxonMeasurements { taxon }];
    };

    let mut issues = Vec::new();
    for column in columns {
        let value = row.value(&column.field_id);
        if value.is_missing() {
            continue;
        }
        if let Some(issue) = check_cell(column, &value, definitions) {
            issues.push(issue);
        }
    }
    issues
}

fn check_cell(
    column: &ColumnDefinition,
    value: &CellValue,
    definitions: &TaxonMeasurements,
) -> Option<Issue> {
    let field_id = column.field_id.as_str();
    let qualitative = definitions.qualitative(field_id);
    let quantitative = definitions.quantitative(field_id);

    // The column kind picks which definition list is consulted first.
    let prefer_quantitative = column.kind == ColumnKind::QuantitativeMeasurement;
    match (prefer_quantitative, qualitative, quantitative) {
        (true, _, Some(definition)) | (false, None, Some(definition)) => {
            check_quantitative(field_id, value, definition.bounds())
        }
        (false, Some(definition), _) | (true, Some(definition), None) => {
            check_qualitative(field_id, value, &definition.options)
        }
        (_, None, None) => Some(Issue::UnknownMeasurement {
            field_id: field_id.to_string(),
        }),
    }
}

fn check_qualitative(
    field_id: &str,
    value: &CellValue,
    options: &[MeasurementOption],
) -> Option<Issue> {
    if is_listed_option(value, options) {
        None
    } else {
        Some(Issue::InvalidOption {
            field_id: field_id.to_string(),
        })
    }
}

/// True when the cell equals one of the option ids.
pub(crate) fn is_listed_option(value: &CellValue, options: &[MeasurementOption]) -> bool {
    value
        .as_text()
        .is_some_and(|selected| options.iter().any(|option| option.option_id == selected))
}

/// Numeric range rule shared with environment columns.
pub(crate) fn check_quantitative(field_id: &str, value: &CellValue, bounds: Bounds) -> Option<Issue> {
    let Some(number) = value.as_f64() else {
        return Some(Issue::NotNumeric {
            field_id: field_id.to_string(),
        });
    };
    if bounds.contains(number) {
        None
    } else {
        Some(Issue::OutOfRange {
            field_id: field_id.to_string(),
            bounds,
        })
    }
}
