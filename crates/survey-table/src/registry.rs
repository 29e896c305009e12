//! Column registry: the fixed core columns plus the dynamic measurement and
//! environment columns added during a session.
//!
//! The dynamic set and the hidden column ids are persisted per survey under
//! [`DYNAMIC_COLUMNS_KEY`] and [`HIDDEN_COLUMNS_KEY`]. Writes are
//! fire-and-forget: a failed write is logged and the in-memory registry
//! stays authoritative for the session.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use survey_model::{ColumnDefinition, CoreField, SurveyId, core_columns};
use survey_persistence::{SurveyStore, load, save};

pub const DYNAMIC_COLUMNS_KEY: &str = "observations.dynamic_columns";
pub const HIDDEN_COLUMNS_KEY: &str = "observations.hidden_columns";

#[derive(Clone)]
pub struct ColumnRegistry {
    survey: SurveyId,
    store: Option<Arc<dyn SurveyStore>>,
    core: Vec<ColumnDefinition>,
    dynamic: Vec<ColumnDefinition>,
    hidden: BTreeSet<String>,
}

impl ColumnRegistry {
    /// Registry without persistence.
    pub fn new(survey: SurveyId) -> Self {
        Self {
            survey,
            store: None,
            core: core_columns(),
            dynamic: Vec::new(),
            hidden: BTreeSet::new(),
        }
    }

    pub fn with_store(survey: SurveyId, store: Arc<dyn SurveyStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(survey)
        }
    }

    pub fn survey(&self) -> SurveyId {
        self.survey
    }

    /// Reload the persisted dynamic columns and hidden ids, replacing the
    /// in-memory state. Missing or unreadable values leave it empty.
    pub fn restore(&mut self) {
        let columns: Vec<ColumnDefinition> =
            self.load_setting(DYNAMIC_COLUMNS_KEY).unwrap_or_default();
        self.dynamic.clear();
        let accepted = self.append_new(columns);

        let hidden: Vec<String> = self.load_setting(HIDDEN_COLUMNS_KEY).unwrap_or_default();
        self.hidden = hidden
            .into_iter()
            .filter(|field_id| self.contains(field_id))
            .collect();

        tracing::debug!(
            survey = %self.survey,
            columns = accepted.len(),
            hidden = self.hidden.len(),
            "restored observation columns"
        );
    }

    /// Append the columns whose `field_id` is not active yet, keeping their
    /// input order. Returns the ids that were added.
    pub fn add_columns(&mut self, columns: Vec<ColumnDefinition>) -> Vec<String> {
        if columns.is_empty() {
            return Vec::new();
        }
        let added = self.append_new(columns);
        if !added.is_empty() {
            tracing::debug!(survey = %self.survey, added = ?added, "added observation columns");
            self.persist(DYNAMIC_COLUMNS_KEY, &self.dynamic);
        }
        added
    }

    /// Remove dynamic columns. Returns the ids that were actually removed;
    /// the caller strips their cells from the rows.
    pub fn remove_columns(&mut self, field_ids: &[String]) -> Vec<String> {
        if field_ids.is_empty() {
            return Vec::new();
        }
        let targets: HashSet<&str> = field_ids.iter().map(String::as_str).collect();
        let mut removed = Vec::new();
        self.dynamic.retain(|column| {
            if targets.contains(column.field_id.as_str()) {
                removed.push(column.field_id.clone());
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return removed;
        }

        tracing::debug!(survey = %self.survey, removed = ?removed, "removed observation columns");
        self.persist(DYNAMIC_COLUMNS_KEY, &self.dynamic);
        let hidden_before = self.hidden.len();
        self.hidden.retain(|field_id| !removed.contains(field_id));
        if self.hidden.len() != hidden_before {
            self.persist(HIDDEN_COLUMNS_KEY, &self.hidden);
        }
        removed
    }

    /// Hide active columns. Unknown ids are ignored.
    pub fn hide_columns(&mut self, field_ids: &[String]) {
        let mut changed = false;
        for field_id in field_ids {
            if self.contains(field_id) {
                changed |= self.hidden.insert(field_id.clone());
            }
        }
        if changed {
            self.persist(HIDDEN_COLUMNS_KEY, &self.hidden);
        }
    }

    pub fn show_columns(&mut self, field_ids: &[String]) {
        let mut changed = false;
        for field_id in field_ids {
            changed |= self.hidden.remove(field_id);
        }
        if changed {
            self.persist(HIDDEN_COLUMNS_KEY, &self.hidden);
        }
    }

    /// Core columns followed by dynamic columns.
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        self.core.iter().chain(&self.dynamic).cloned().collect()
    }

    /// Columns not hidden, in display order.
    pub fn visible_columns(&self) -> Vec<ColumnDefinition> {
        self.core
            .iter()
            .chain(&self.dynamic)
            .filter(|column| !self.hidden.contains(&column.field_id))
            .cloned()
            .collect()
    }

    pub fn dynamic_columns(&self) -> &[ColumnDefinition] {
        &self.dynamic
    }

    pub fn measurement_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.dynamic.iter().filter(|column| column.kind.is_measurement())
    }

    pub fn environment_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.dynamic.iter().filter(|column| column.kind.is_environment())
    }

    pub fn hidden_columns(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    pub fn is_hidden(&self, field_id: &str) -> bool {
        self.hidden.contains(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        CoreField::is_core(field_id) || self.dynamic_column(field_id).is_some()
    }

    pub fn dynamic_column(&self, field_id: &str) -> Option<&ColumnDefinition> {
        self.dynamic.iter().find(|column| column.field_id == field_id)
    }

    fn append_new(&mut self, columns: Vec<ColumnDefinition>) -> Vec<String> {
        let mut added = Vec::new();
        for column in columns {
            if column.kind.is_core() || CoreField::is_core(&column.field_id) {
                tracing::debug!(field_id = %column.field_id, "ignoring core field as dynamic column");
                continue;
            }
            if self.dynamic_column(&column.field_id).is_some() {
                continue;
            }
            added.push(column.field_id.clone());
            self.dynamic.push(column);
        }
        added
    }

    fn load_setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_deref()?;
        match load(store, self.survey, key) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(survey = %self.survey, key, %error, "ignoring stored column settings");
                None
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        if let Err(error) = save(store, self.survey, key, value) {
            tracing::warn!(survey = %self.survey, key, %error, "failed to persist column settings");
        }
    }
}

impl std::fmt::Debug for ColumnRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnRegistry")
            .field("survey", &self.survey)
            .field("persistent", &self.store.is_some())
            .field("dynamic", &self.dynamic)
            .field("hidden", &self.hidden)
            .finish()
    }
}
