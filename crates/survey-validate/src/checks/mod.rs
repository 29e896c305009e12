//! Validation check modules.
//!
//! Each module implements one rule family. The synchronous families run in
//! a fixed order (required, sampling, dates, coordinates); measurement and
//! environment checks need resolved definitions and run after them.

pub mod coordinates;
pub mod dates;
pub mod environment;
pub mod measurement;
pub mod required;
pub mod sampling;

use survey_model::ObservationRow;

use crate::issue::Issue;

/// Run every synchronous rule, in reporting order.
pub fn run_structural(row: &ObservationRow, required_columns: &[required::RequiredColumn]) -> Vec<Issue> {
    let mut issues = Vec::new();

    // 1. Required core columns
    issues.extend(required::check(row, required_columns));

    // 2. Sampling hierarchy (site -> method, period)
    issues.extend(sampling::check(row));

    // 3. Date and time format
    issues.extend(dates::check(row));

    // 4. Coordinate and count ranges
    issues.extend(coordinates::check(row));

    issues
}
