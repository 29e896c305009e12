//! Validation issue types.
//!
//! The `Issue` enum is the typed result of a rule; each variant carries only
//! the data its message needs. Rows keep the flattened [`ValidationError`]
//! form, which is what the grid displays next to a cell.

use serde::{Deserialize, Serialize};
use survey_model::{Bounds, CoreField, TaxonId};

/// Error taxonomy for row-level problems.
///
/// All categories are recoverable: they block the save batch they were
/// found in and nothing else. Collaborator failures are not an issue
/// category; see [`crate::TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A required core column is empty.
    Structural,
    /// Sampling site/method/period hierarchy is incomplete.
    Consistency,
    /// Date, time or coordinate value is malformed.
    Format,
    /// Measurement or environment value does not fit its definition.
    Semantic,
    /// The taxon has no measurement definitions at all.
    Lookup,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structural => "Structural",
            Self::Consistency => "Consistency",
            Self::Format => "Format",
            Self::Semantic => "Semantic",
            Self::Lookup => "Lookup",
        }
    }
}

/// Marker written by the time editor when the entered time cannot be parsed.
pub const INVALID_TIME_MARKER: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Issue {
    // Structural
    MissingColumn { field: CoreField, header: String },

    // Consistency
    MissingSamplingMethod,
    MissingSamplingPeriod,

    // Format
    InvalidDate { value: String },
    InvalidTime,
    CoordinateOutOfRange { field: CoreField, value: f64 },
    NegativeCount { value: i64 },

    // Lookup
    NoTaxonMeasurements { taxon: TaxonId },

    // Semantic
    InvalidOption { field_id: String },
    InvalidEnvironmentOption { field_id: String },
    OutOfRange { field_id: String, bounds: Bounds },
    NotNumeric { field_id: String },
    UnknownMeasurement { field_id: String },
}

impl Issue {
    /// Column the issue is attached to.
    pub fn field_id(&self) -> &str {
        match self {
            Issue::MissingColumn { field, .. } => field.field_id(),
            Issue::MissingSamplingMethod => CoreField::SurveySampleMethodId.field_id(),
            Issue::MissingSamplingPeriod => CoreField::SurveySamplePeriodId.field_id(),
            Issue::InvalidDate { .. } => CoreField::ObservationDate.field_id(),
            Issue::InvalidTime => CoreField::ObservationTime.field_id(),
            Issue::CoordinateOutOfRange { field, .. } => field.field_id(),
            Issue::NegativeCount { .. } => CoreField::Count.field_id(),
            Issue::NoTaxonMeasurements { .. } => CoreField::ItisTsn.field_id(),
            Issue::InvalidOption { field_id }
            | Issue::InvalidEnvironmentOption { field_id }
            | Issue::OutOfRange { field_id, .. }
            | Issue::NotNumeric { field_id }
            | Issue::UnknownMeasurement { field_id } => field_id,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Issue::MissingColumn { .. } => Category::Structural,
            Issue::MissingSamplingMethod | Issue::MissingSamplingPeriod => Category::Consistency,
            Issue::InvalidDate { .. }
            | Issue::InvalidTime
            | Issue::CoordinateOutOfRange { .. }
            | Issue::NegativeCount { .. } => Category::Format,
            Issue::NoTaxonMeasurements { .. } => Category::Lookup,
            Issue::InvalidOption { .. }
            | Issue::InvalidEnvironmentOption { .. }
            | Issue::OutOfRange { .. }
            | Issue::NotNumeric { .. }
            | Issue::UnknownMeasurement { .. } => Category::Semantic,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::MissingColumn { header, .. } => format!("Missing column: {header}"),
            Issue::MissingSamplingMethod => "Missing sampling method".to_string(),
            Issue::MissingSamplingPeriod => "Missing sampling period".to_string(),
            Issue::InvalidDate { value } => format!("Invalid date: {value}"),
            Issue::InvalidTime => "Invalid time".to_string(),
            Issue::CoordinateOutOfRange { field, value } => {
                let limit = match field {
                    CoreField::Latitude => 90,
                    _ => 180,
                };
                format!(
                    "{} {value} is outside the range -{limit} to {limit}.",
                    field.header()
                )
            }
            Issue::NegativeCount { value } => {
                format!("Count must not be negative (found {value}).")
            }
            Issue::NoTaxonMeasurements { .. } => {
                "No valid measurements found for this taxon; contact an administrator.".to_string()
            }
            Issue::InvalidOption { .. } => "Invalid option selected for taxon.".to_string(),
            Issue::InvalidEnvironmentOption { .. } => "Invalid option selected.".to_string(),
            Issue::OutOfRange { bounds, .. } => bounds.describe(),
            Issue::NotNumeric { .. } => "Value must be a number.".to_string(),
            Issue::UnknownMeasurement { .. } => "Invalid measurement set for taxon.".to_string(),
        }
    }
}

/// Error attached to a row and cell. Recomputed on every validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field_id: String,
    pub message: String,
    pub category: Category,
}

impl From<&Issue> for ValidationError {
    fn from(issue: &Issue) -> Self {
        Self {
            field_id: issue.field_id().to_string(),
            message: issue.message(),
            category: issue.category(),
        }
    }
}

impl From<Issue> for ValidationError {
    fn from(issue: Issue) -> Self {
        Self::from(&issue)
    }
}
