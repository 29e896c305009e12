//! Column registry: add/remove semantics and persistence.

mod common;

use std::sync::Arc;

use common::{SURVEY, agent_count_column, measurement};
use serde_json::json;
use survey_model::{ColumnDefinition, ColumnKind, ValueType};
use survey_persistence::{JsonFileStore, MemoryStore, SurveyStore};
use survey_table::{ColumnRegistry, DYNAMIC_COLUMNS_KEY, HIDDEN_COLUMNS_KEY};

fn dynamic_ids(registry: &ColumnRegistry) -> Vec<&str> {
    registry
        .dynamic_columns()
        .iter()
        .map(|column| column.field_id.as_str())
        .collect()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn persistent_registry() -> (ColumnRegistry, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let registry = ColumnRegistry::with_store(SURVEY, store.clone());
    (registry, store)
}

#[test]
fn adding_known_columns_does_not_duplicate() {
    let (mut registry, _) = persistent_registry();
    registry.add_columns(vec![measurement("m1")]);
    let added = registry.add_columns(vec![measurement("m1"), measurement("m2")]);

    assert_eq!(added, ids(&["m2"]));
    assert_eq!(dynamic_ids(&registry), ["m1", "m2"]);
}

#[test]
fn re_adding_the_full_set_changes_nothing() {
    let (mut registry, _) = persistent_registry();
    registry.add_columns(vec![measurement("m1"), measurement("m2")]);
    let added = registry.add_columns(vec![measurement("m2"), measurement("m1")]);

    assert!(added.is_empty());
    assert_eq!(dynamic_ids(&registry), ["m1", "m2"]);
}

#[test]
fn duplicate_ids_within_one_call_are_added_once() {
    let mut registry = ColumnRegistry::new(SURVEY);
    registry.add_columns(vec![measurement("m1"), measurement("m1")]);
    assert_eq!(dynamic_ids(&registry), ["m1"]);
}

#[test]
fn core_fields_cannot_be_added_as_dynamic_columns() {
    let mut registry = ColumnRegistry::new(SURVEY);
    let shadow = ColumnDefinition::new(
        "count",
        ColumnKind::QuantitativeMeasurement,
        "Count",
        ValueType::Number,
    );
    assert!(registry.add_columns(vec![shadow]).is_empty());
    assert_eq!(registry.columns().len(), 9);
}

#[test]
fn re_added_columns_move_to_the_end() {
    let mut registry = ColumnRegistry::new(SURVEY);
    registry.add_columns(vec![measurement("m1"), measurement("m2"), measurement("m3")]);
    registry.remove_columns(&ids(&["m1"]));
    registry.add_columns(vec![measurement("m1")]);

    assert_eq!(dynamic_ids(&registry), ["m2", "m3", "m1"]);
}

#[test]
fn columns_list_core_before_dynamic() {
    let mut registry = ColumnRegistry::new(SURVEY);
    registry.add_columns(vec![agent_count_column()]);
    let columns = registry.columns();

    assert_eq!(columns.first().unwrap().field_id, "itis_tsn");
    assert_eq!(columns.last().unwrap().field_id, "agent_count");
    assert_eq!(registry.measurement_columns().count(), 1);
    assert_eq!(registry.environment_columns().count(), 0);
}

#[test]
fn removing_nothing_is_a_no_op() {
    let (mut registry, store) = persistent_registry();
    assert!(registry.remove_columns(&[]).is_empty());
    assert!(registry.remove_columns(&ids(&["missing"])).is_empty());
    assert!(store.is_empty());
}

#[test]
fn column_set_survives_a_reload() {
    let (mut registry, store) = persistent_registry();
    registry.add_columns(vec![measurement("m1"), agent_count_column()]);
    registry.remove_columns(&ids(&["m1"]));

    let mut reloaded = ColumnRegistry::with_store(SURVEY, store);
    reloaded.restore();
    assert_eq!(dynamic_ids(&reloaded), ["agent_count"]);
}

#[test]
fn hidden_columns_survive_a_reload() {
    let (mut registry, store) = persistent_registry();
    registry.add_columns(vec![measurement("m1")]);
    registry.hide_columns(&ids(&["m1", "count", "unknown"]));
    assert!(registry.is_hidden("m1"));
    assert!(!registry.is_hidden("unknown"));

    let mut reloaded = ColumnRegistry::with_store(SURVEY, store);
    reloaded.restore();
    assert_eq!(
        reloaded.hidden_columns().iter().collect::<Vec<_>>(),
        ["count", "m1"]
    );
    assert!(
        reloaded
            .visible_columns()
            .iter()
            .all(|column| column.field_id != "m1")
    );
}

#[test]
fn removing_a_hidden_column_forgets_it() {
    let (mut registry, store) = persistent_registry();
    registry.add_columns(vec![measurement("m1")]);
    registry.hide_columns(&ids(&["m1"]));
    registry.remove_columns(&ids(&["m1"]));

    assert!(registry.hidden_columns().is_empty());
    assert_eq!(store.get(SURVEY, HIDDEN_COLUMNS_KEY).unwrap(), Some(json!([])));
}

#[test]
fn corrupt_stored_columns_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(SURVEY, DYNAMIC_COLUMNS_KEY, json!({"not": "a list"}))
        .unwrap();

    let mut registry = ColumnRegistry::with_store(SURVEY, store);
    registry.restore();
    assert!(registry.dynamic_columns().is_empty());
}

#[test]
fn corrupt_settings_file_is_replaced_on_next_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    std::fs::write(store.path_for(SURVEY), b"{ not json").unwrap();

    let mut registry = ColumnRegistry::with_store(SURVEY, store.clone());
    registry.restore();
    assert!(registry.dynamic_columns().is_empty());
    registry.add_columns(vec![measurement("m1")]);

    let mut reloaded = ColumnRegistry::with_store(SURVEY, store);
    reloaded.restore();
    assert_eq!(dynamic_ids(&reloaded), ["m1"]);
}

#[test]
fn stored_columns_are_scoped_to_their_survey() {
    let (mut registry, store) = persistent_registry();
    registry.add_columns(vec![measurement("m1")]);

    let mut other = ColumnRegistry::with_store(survey_model::SurveyId::new(8), store);
    other.restore();
    assert!(other.dynamic_columns().is_empty());
}
