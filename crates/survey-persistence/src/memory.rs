//! In-process store, for tests and sessions that need no durability.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use survey_model::SurveyId;

use crate::error::{PersistenceError, Result};
use crate::store::SurveyStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(SurveyId, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across all surveys.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> PersistenceError {
    PersistenceError::Unavailable("memory store lock poisoned".to_string())
}

impl SurveyStore for MemoryStore {
    fn get(&self, survey: SurveyId, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(&(survey, key.to_string())).cloned())
    }

    fn set(&self, survey: SurveyId, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert((survey, key.to_string()), value);
        Ok(())
    }

    fn remove(&self, survey: SurveyId, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(&(survey, key.to_string()));
        Ok(())
    }
}
