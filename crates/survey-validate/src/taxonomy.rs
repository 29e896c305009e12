//! In-memory taxonomy service.
//!
//! Backs both collaborator ports from a fixed catalogue. Used by the CLI
//! (loaded from JSON) and as a stand-in where no taxonomy service exists.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use survey_model::{ColumnDefinition, TaxonId, TaxonMeasurements};

use crate::lookup::{ColumnSearch, MeasurementLookup, TransportError};

/// Minimum Jaro-Winkler similarity for a fuzzy search hit.
const MIN_SIMILARITY: f64 = 0.8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTaxonomy {
    /// Definitions per ITIS TSN.
    #[serde(default)]
    pub measurements: BTreeMap<TaxonId, TaxonMeasurements>,
    /// Survey-wide environment columns.
    #[serde(default)]
    pub environments: Vec<ColumnDefinition>,
}

impl StaticTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxon(mut self, taxon: TaxonId, measurements: TaxonMeasurements) -> Self {
        self.measurements.insert(taxon, measurements);
        self
    }

    pub fn with_environment(mut self, column: ColumnDefinition) -> Self {
        self.environments.push(column);
        self
    }

    /// Load a catalogue from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, TransportError> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            TransportError::new(format!("read taxonomy {}", path.display()), error.to_string())
        })?;
        serde_json::from_str(&text).map_err(|error| {
            TransportError::new(format!("parse taxonomy {}", path.display()), error.to_string())
        })
    }

    /// Every measurement column known for any taxon, first definition wins.
    pub fn measurement_columns(&self) -> Vec<ColumnDefinition> {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::new();
        for measurements in self.measurements.values() {
            for column in measurements.columns() {
                if seen.insert(column.field_id.clone()) {
                    columns.push(column);
                }
            }
        }
        columns
    }
}

#[async_trait]
impl MeasurementLookup for StaticTaxonomy {
    async fn measurement_definitions(
        &self,
        taxon: TaxonId,
    ) -> Result<Option<TaxonMeasurements>, TransportError> {
        Ok(self.measurements.get(&taxon).cloned())
    }
}

#[async_trait]
impl ColumnSearch for StaticTaxonomy {
    async fn search_measurement_columns(
        &self,
        term: &str,
    ) -> Result<Vec<ColumnDefinition>, TransportError> {
        Ok(rank_columns(self.measurement_columns(), term))
    }

    async fn search_environment_columns(
        &self,
        term: &str,
    ) -> Result<Vec<ColumnDefinition>, TransportError> {
        Ok(rank_columns(self.environments.clone(), term))
    }
}

/// Rank columns by how well their label matches `term`.
///
/// Substring hits come first (shorter labels before longer ones), then
/// fuzzy hits by descending similarity. Non-matching columns are dropped.
pub fn rank_columns(columns: Vec<ColumnDefinition>, term: &str) -> Vec<ColumnDefinition> {
    let needle = normalize(term);
    if needle.is_empty() {
        return columns;
    }

    let mut scored: Vec<(bool, f64, ColumnDefinition)> = columns
        .into_iter()
        .filter_map(|column| {
            let label = normalize(&column.header_label);
            let contains = label.contains(&needle) || normalize(&column.field_id).contains(&needle);
            let similarity = jaro_winkler::similarity(label.chars(), needle.chars());
            (contains || similarity >= MIN_SIMILARITY).then_some((contains, similarity, column))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| {
                if a.0 {
                    a.2.header_label.len().cmp(&b.2.header_label.len())
                } else {
                    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)
                }
            })
            .then_with(|| a.2.header_label.cmp(&b.2.header_label))
    });

    scored.into_iter().map(|(_, _, column)| column).collect()
}

/// Lowercase and collapse separators to single spaces.
fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['_', '-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
