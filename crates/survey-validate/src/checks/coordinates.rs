//! Coordinate and count range checks.

use survey_model::{CoreField, ObservationRow};

use crate::issue::Issue;

pub fn check(row: &ObservationRow) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let Some(latitude) = row.latitude
        && !(-90.0..=90.0).contains(&latitude)
    {
        issues.push(Issue::CoordinateOutOfRange {
            field: CoreField::Latitude,
            value: latitude,
        });
    }

    if let Some(longitude) = row.longitude
        && !(-180.0..=180.0).contains(&longitude)
    {
        issues.push(Issue::CoordinateOutOfRange {
            field: CoreField::Longitude,
            value: longitude,
        });
    }

    if let Some(count) = row.count
        && count < 0
    {
        issues.push(Issue::NegativeCount { value: count });
    }

    issues
}
