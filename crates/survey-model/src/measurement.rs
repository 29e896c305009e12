//! Taxon-specific measurement definitions.
//!
//! Definitions come from the external taxonomy service and are read-only
//! inside the engine:
//!
//! - **Qualitative** definitions carry an ordered option list. A cell is
//!   valid iff it equals one of the option identifiers.
//! - **Quantitative** definitions carry optional `[min, max]` bounds. Each
//!   bound that is present must hold; no bounds means any number is valid.
//!
//! Column `field_id`s for measurement columns are the definition
//! identifiers, so a cell is matched to its definition by that id.

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDefinition, ColumnKind, ValueConstraint, ValueType};
use crate::value::format_numeric;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementOption {
    pub option_id: String,
    pub label: String,
}

impl MeasurementOption {
    pub fn new(option_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            option_id: option_id.into(),
            label: label.into(),
        }
    }
}

/// Optional inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl Bounds {
    pub fn new(min_value: Option<f64>, max_value: Option<f64>) -> Self {
        Self {
            min_value,
            max_value,
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Inclusive on both ends; a missing bound is not checked.
    pub fn contains(&self, value: f64) -> bool {
        let above_min = self.min_value.is_none_or(|min| value >= min);
        let below_max = self.max_value.is_none_or(|max| value <= max);
        above_min && below_max
    }

    /// Human-readable description of the accepted range.
    pub fn describe(&self) -> String {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => format!(
                "Value must be between {} and {}.",
                format_numeric(min),
                format_numeric(max)
            ),
            (Some(min), None) => format!(
                "Value must be greater than or equal to {}.",
                format_numeric(min)
            ),
            (None, Some(max)) => format!(
                "Value must be less than or equal to {}.",
                format_numeric(max)
            ),
            (None, None) => "Any numeric value is accepted.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeDefinition {
    pub identifier: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub options: Vec<MeasurementOption>,
}

impl QualitativeDefinition {
    pub fn accepts(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.option_id == value)
    }

    pub fn to_column(&self) -> ColumnDefinition {
        ColumnDefinition::new(
            self.identifier.clone(),
            ColumnKind::QualitativeMeasurement,
            self.label.clone(),
            ValueType::Option,
        )
        .with_constraint(ValueConstraint::Options {
            options: self.options.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeDefinition {
    pub identifier: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl QuantitativeDefinition {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_value, self.max_value)
    }

    pub fn to_column(&self) -> ColumnDefinition {
        ColumnDefinition::new(
            self.identifier.clone(),
            ColumnKind::QuantitativeMeasurement,
            self.label.clone(),
            ValueType::Number,
        )
        .with_constraint(ValueConstraint::Range(self.bounds()))
    }
}

/// Measurement definitions available for one taxon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxonMeasurements {
    #[serde(default)]
    pub qualitative: Vec<QualitativeDefinition>,
    #[serde(default)]
    pub quantitative: Vec<QuantitativeDefinition>,
}

impl TaxonMeasurements {
    pub fn is_empty(&self) -> bool {
        self.qualitative.is_empty() && self.quantitative.is_empty()
    }

    pub fn qualitative(&self, identifier: &str) -> Option<&QualitativeDefinition> {
        self.qualitative
            .iter()
            .find(|definition| definition.identifier == identifier)
    }

    pub fn quantitative(&self, identifier: &str) -> Option<&QuantitativeDefinition> {
        self.quantitative
            .iter()
            .find(|definition| definition.identifier == identifier)
    }

    /// Measurement columns for every definition, qualitative first.
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        self.qualitative
            .iter()
            .map(QualitativeDefinition::to_column)
            .chain(
                self.quantitative
                    .iter()
                    .map(QuantitativeDefinition::to_column),
            )
            .collect()
    }
}
