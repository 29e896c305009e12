//! Observation table column definitions.
//!
//! The table schema is the fixed list of [`CoreField`]s followed by a
//! runtime-variable set of measurement and environment columns. Every column
//! is described by a [`ColumnDefinition`] tagged with its [`ColumnKind`];
//! which validation rule applies to a cell is decided from that kind when a
//! row is validated, never when the value is stored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::measurement::{Bounds, MeasurementOption};

/// The fixed observation fields every row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreField {
    ItisTsn,
    SurveySampleSiteId,
    SurveySampleMethodId,
    SurveySamplePeriodId,
    ObservationDate,
    ObservationTime,
    Latitude,
    Longitude,
    Count,
}

impl CoreField {
    /// All core fields in display order.
    pub const ALL: [CoreField; 9] = [
        CoreField::ItisTsn,
        CoreField::SurveySampleSiteId,
        CoreField::SurveySampleMethodId,
        CoreField::SurveySamplePeriodId,
        CoreField::ObservationDate,
        CoreField::ObservationTime,
        CoreField::Latitude,
        CoreField::Longitude,
        CoreField::Count,
    ];

    pub fn field_id(self) -> &'static str {
        match self {
            Self::ItisTsn => "itis_tsn",
            Self::SurveySampleSiteId => "survey_sample_site_id",
            Self::SurveySampleMethodId => "survey_sample_method_id",
            Self::SurveySamplePeriodId => "survey_sample_period_id",
            Self::ObservationDate => "observation_date",
            Self::ObservationTime => "observation_time",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Count => "count",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::ItisTsn => "Species",
            Self::SurveySampleSiteId => "Sampling Site",
            Self::SurveySampleMethodId => "Sampling Method",
            Self::SurveySamplePeriodId => "Sampling Period",
            Self::ObservationDate => "Date",
            Self::ObservationTime => "Time",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Count => "Count",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Self::ItisTsn
            | Self::SurveySampleSiteId
            | Self::SurveySampleMethodId
            | Self::SurveySamplePeriodId => ValueType::Reference,
            Self::ObservationDate => ValueType::Date,
            Self::ObservationTime => ValueType::Time,
            Self::Latitude | Self::Longitude => ValueType::Number,
            Self::Count => ValueType::Integer,
        }
    }

    /// Resolve a core field from its `field_id` (case-insensitive).
    pub fn parse(field_id: &str) -> Option<Self> {
        let key = field_id.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.field_id().eq_ignore_ascii_case(key))
    }

    pub fn is_core(field_id: &str) -> bool {
        Self::parse(field_id).is_some()
    }
}

impl fmt::Display for CoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_id())
    }
}

/// Column kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Core,
    QualitativeMeasurement,
    QuantitativeMeasurement,
    QualitativeEnvironment,
    QuantitativeEnvironment,
}

impl ColumnKind {
    pub fn is_core(self) -> bool {
        matches!(self, Self::Core)
    }

    pub fn is_measurement(self) -> bool {
        matches!(
            self,
            Self::QualitativeMeasurement | Self::QuantitativeMeasurement
        )
    }

    pub fn is_environment(self) -> bool {
        matches!(
            self,
            Self::QualitativeEnvironment | Self::QuantitativeEnvironment
        )
    }

    pub fn is_quantitative(self) -> bool {
        matches!(
            self,
            Self::QuantitativeMeasurement | Self::QuantitativeEnvironment
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::QualitativeMeasurement => "Qualitative measurement",
            Self::QuantitativeMeasurement => "Quantitative measurement",
            Self::QualitativeEnvironment => "Qualitative environment",
            Self::QuantitativeEnvironment => "Quantitative environment",
        }
    }
}

/// Editor/value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    Text,
    Number,
    Integer,
    Date,
    Time,
    /// Identifier of another record (taxon, site, method, period).
    Reference,
    /// One of a fixed option list.
    Option,
}

/// Survey-wide constraint carried by an environment column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueConstraint {
    Options { options: Vec<MeasurementOption> },
    Range(Bounds),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Unique across all active columns.
    pub field_id: String,
    pub kind: ColumnKind,
    pub header_label: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<ValueConstraint>,
}

impl ColumnDefinition {
    pub fn new(
        field_id: impl Into<String>,
        kind: ColumnKind,
        header_label: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            kind,
            header_label: header_label.into(),
            value_type,
            constraint: None,
        }
    }

    pub fn core(field: CoreField) -> Self {
        Self::new(
            field.field_id(),
            ColumnKind::Core,
            field.header(),
            field.value_type(),
        )
    }

    pub fn with_constraint(mut self, constraint: ValueConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn core_field(&self) -> Option<CoreField> {
        if self.kind.is_core() {
            CoreField::parse(&self.field_id)
        } else {
            None
        }
    }
}

/// Definitions for every core column, in display order.
pub fn core_columns() -> Vec<ColumnDefinition> {
    CoreField::ALL
        .into_iter()
        .map(ColumnDefinition::core)
        .collect()
}
