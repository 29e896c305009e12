#![allow(dead_code)]

use survey_model::{
    ColumnDefinition, ColumnKind, MeasurementOption, ObservationRow, QualitativeDefinition,
    QuantitativeDefinition, RowId, TaxonId, TaxonMeasurements, ValueType, core_columns,
};
use survey_validate::StaticTaxonomy;

pub const MOOSE: TaxonId = TaxonId::new(180703);
pub const AGENT_TAXON: TaxonId = TaxonId::new(2065);
pub const UNKNOWN_TAXON: TaxonId = TaxonId::new(999);

pub fn agent_count_column() -> ColumnDefinition {
    ColumnDefinition::new(
        "agent_count",
        ColumnKind::QuantitativeMeasurement,
        "Agent Count",
        ValueType::Number,
    )
}

pub fn life_stage_column() -> ColumnDefinition {
    ColumnDefinition::new(
        "life_stage",
        ColumnKind::QualitativeMeasurement,
        "Life Stage",
        ValueType::Option,
    )
}

pub fn antler_column() -> ColumnDefinition {
    ColumnDefinition::new(
        "antler_points",
        ColumnKind::QuantitativeMeasurement,
        "Antler Points",
        ValueType::Number,
    )
}

pub fn columns_with(dynamic: Vec<ColumnDefinition>) -> Vec<ColumnDefinition> {
    let mut columns = core_columns();
    columns.extend(dynamic);
    columns
}

pub fn taxonomy() -> StaticTaxonomy {
    StaticTaxonomy::new()
        .with_taxon(
            AGENT_TAXON,
            TaxonMeasurements {
                qualitative: vec![],
                quantitative: vec![QuantitativeDefinition {
                    identifier: "agent_count".to_string(),
                    label: "Agent Count".to_string(),
                    description: None,
                    min_value: Some(0.0),
                    max_value: Some(50.0),
                    unit: None,
                }],
            },
        )
        .with_taxon(
            MOOSE,
            TaxonMeasurements {
                qualitative: vec![QualitativeDefinition {
                    identifier: "life_stage".to_string(),
                    label: "Life Stage".to_string(),
                    description: None,
                    options: vec![
                        MeasurementOption::new("adult", "Adult"),
                        MeasurementOption::new("calf", "Calf"),
                    ],
                }],
                quantitative: vec![QuantitativeDefinition {
                    identifier: "antler_points".to_string(),
                    label: "Antler Points".to_string(),
                    description: None,
                    min_value: None,
                    max_value: Some(10.0),
                    unit: None,
                }],
            },
        )
}

/// A row that passes every structural rule.
pub fn valid_row(id: u64) -> ObservationRow {
    let mut row = ObservationRow::empty(RowId::new(id));
    row.itis_tsn = Some(MOOSE);
    row.survey_sample_site_id = Some(1);
    row.survey_sample_method_id = Some(2);
    row.survey_sample_period_id = Some(3);
    row.observation_date = Some("2024-05-01".to_string());
    row.observation_time = Some("08:30:00".to_string());
    row.latitude = Some(49.2);
    row.longitude = Some(-123.1);
    row.count = Some(2);
    row
}

pub const REQUIRED: [&str; 5] = [
    "itis_tsn",
    "count",
    "latitude",
    "longitude",
    "observation_date",
];
