//! The durable store port.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use survey_model::SurveyId;

use crate::error::{PersistenceError, Result};

/// Durable per-survey key/value storage.
///
/// Values are JSON documents. Implementations must be safe to share between
/// the table components of one session.
pub trait SurveyStore: Send + Sync {
    /// Stored value, `None` if the key was never set.
    fn get(&self, survey: SurveyId, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    fn set(&self, survey: SurveyId, key: &str, value: Value) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&self, survey: SurveyId, key: &str) -> Result<()>;
}

/// Read and decode a typed value.
pub fn load<T: DeserializeOwned>(
    store: &dyn SurveyStore,
    survey: SurveyId,
    key: &str,
) -> Result<Option<T>> {
    let Some(value) = store.get(survey, key)? else {
        return Ok(None);
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| PersistenceError::Deserialization {
            key: key.to_string(),
            source,
        })
}

/// Encode and write a typed value.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn SurveyStore,
    survey: SurveyId,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value).map_err(|source| PersistenceError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(survey, key, value)
}
