//! Ports to the external taxonomy service and the per-taxon definition cache.
//!
//! The measurement lookup is the only suspension point of the engine. The
//! [`MeasurementCache`] keeps one shared in-flight future per taxon, so any
//! number of rows naming the same taxon trigger a single service call, and
//! the resolved definitions are reused for the rest of the table session.
//! Failed calls are evicted so the next save attempt retries them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use survey_model::{ColumnDefinition, TaxonId, TaxonMeasurements};
use thiserror::Error;

/// A collaborator call failed. Opaque to the engine and never turned into
/// a row issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    pub operation: String,
    pub message: String,
}

impl TransportError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait MeasurementLookup: Send + Sync {
    /// Measurement definitions for a taxon. `Ok(None)` and an empty
    /// definition set both mean the taxon has no measurements.
    async fn measurement_definitions(
        &self,
        taxon: TaxonId,
    ) -> Result<Option<TaxonMeasurements>, TransportError>;
}

/// Search feeding the column registry. Not used during validation.
#[async_trait]
pub trait ColumnSearch: Send + Sync {
    async fn search_measurement_columns(
        &self,
        term: &str,
    ) -> Result<Vec<ColumnDefinition>, TransportError>;

    async fn search_environment_columns(
        &self,
        term: &str,
    ) -> Result<Vec<ColumnDefinition>, TransportError>;
}

type LookupResult = Result<Option<Arc<TaxonMeasurements>>, TransportError>;
type SharedLookup = Shared<BoxFuture<'static, LookupResult>>;

/// Session-scoped, coalescing cache of taxon measurement definitions.
pub struct MeasurementCache {
    lookup: Arc<dyn MeasurementLookup>,
    entries: Mutex<HashMap<TaxonId, SharedLookup>>,
}

impl MeasurementCache {
    pub fn new(lookup: Arc<dyn MeasurementLookup>) -> Self {
        Self {
            lookup,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Definitions for `taxon`, issuing at most one concurrent service call
    /// per taxon. `Ok(None)` means the taxon has no definitions.
    pub async fn definitions(&self, taxon: TaxonId) -> LookupResult {
        let pending = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(taxon)
                .or_insert_with(|| {
                    tracing::debug!(%taxon, "fetching measurement definitions");
                    let lookup = Arc::clone(&self.lookup);
                    async move {
                        lookup.measurement_definitions(taxon).await.map(|definitions| {
                            definitions
                                .filter(|definitions| !definitions.is_empty())
                                .map(Arc::new)
                        })
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };

        let result = pending.clone().await;
        if let Err(error) = &result {
            tracing::warn!(%taxon, %error, "measurement lookup failed");
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if entries
                .get(&taxon)
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                entries.remove(&taxon);
            }
        }
        result
    }

    /// Number of taxa with a cached or in-flight lookup.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached taxon.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for MeasurementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementCache")
            .field("taxa", &self.len())
            .finish_non_exhaustive()
    }
}
