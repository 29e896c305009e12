#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use survey_model::{
    ColumnDefinition, ColumnKind, ObservationRow, QuantitativeDefinition, RowId, SurveyId,
    TaxonId, TaxonMeasurements, ValueType,
};
use survey_persistence::{MemoryStore, SurveyStore};
use survey_table::{EditController, MemorySink, ObservationSink, TableConfig};
use survey_validate::{MeasurementLookup, StaticTaxonomy, TransportError};

pub const SURVEY: SurveyId = SurveyId::new(7);
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

pub fn measurement(field_id: &str) -> ColumnDefinition {
    ColumnDefinition::new(
        field_id,
        ColumnKind::QualitativeMeasurement,
        field_id.to_uppercase(),
        ValueType::Option,
    )
}

pub fn taxonomy() -> StaticTaxonomy {
    StaticTaxonomy::new().with_taxon(
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
}

/// A row that passes every rule under the default configuration.
pub fn valid_row(id: u64) -> ObservationRow {
    let mut row = ObservationRow::empty(RowId::new(id));
    row.itis_tsn = Some(AGENT_TAXON);
    row.observation_date = Some("2024-05-01".to_string());
    row.latitude = Some(49.2);
    row.longitude = Some(-123.1);
    row.count = Some(2);
    row
}

pub struct Harness {
    pub table: EditController,
    pub sink: Arc<MemorySink>,
    pub store: Arc<MemoryStore>,
}

pub fn harness() -> Harness {
    harness_with(Arc::new(taxonomy()), None)
}

pub fn harness_with(
    lookup: Arc<dyn MeasurementLookup>,
    sink: Option<Arc<dyn ObservationSink>>,
) -> Harness {
    let memory_sink = Arc::new(MemorySink::new());
    let store = Arc::new(MemoryStore::new());
    let sink = sink.unwrap_or_else(|| memory_sink.clone() as Arc<dyn ObservationSink>);
    let table = EditController::new(
        SURVEY,
        TableConfig::default(),
        lookup,
        sink,
        store.clone() as Arc<dyn SurveyStore>,
    );
    Harness {
        table,
        sink: memory_sink,
        store,
    }
}

pub struct FailingSink;

#[async_trait]
impl ObservationSink for FailingSink {
    async fn save_observations(
        &self,
        _survey: SurveyId,
        _rows: &[ObservationRow],
    ) -> Result<(), TransportError> {
        Err(TransportError::new("save observations", "503 Service Unavailable"))
    }

    async fn delete_observations(
        &self,
        _survey: SurveyId,
        _row_ids: &[RowId],
    ) -> Result<(), TransportError> {
        Err(TransportError::new("delete observations", "503 Service Unavailable"))
    }
}

pub struct FailingLookup;

#[async_trait]
impl MeasurementLookup for FailingLookup {
    async fn measurement_definitions(
        &self,
        _taxon: TaxonId,
    ) -> Result<Option<TaxonMeasurements>, TransportError> {
        Err(TransportError::new("measurement lookup", "connection reset"))
    }
}
