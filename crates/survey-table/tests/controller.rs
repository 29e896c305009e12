//! Edit-state controller: editing, saving and failure handling.

mod common;

use std::sync::Arc;

use common::{
    FailingLookup, FailingSink, SURVEY, UNKNOWN_TAXON, agent_count_column, harness,
    harness_with, taxonomy, valid_row,
};
use survey_model::{CellValue, ObservationRow, RowId};
use survey_table::{
    DeleteOutcome, EditController, EditError, RowOrigin, RowStatus, SaveError, TableConfig,
};
use survey_validate::Category;

fn with_agent_count(mut row: ObservationRow, value: f64) -> ObservationRow {
    row.dynamic_values
        .insert("agent_count".to_string(), CellValue::Number(value));
    row
}

#[tokio::test]
async fn invalid_row_blocks_the_whole_batch() {
    let mut h = harness();
    h.table.add_columns(vec![agent_count_column()]);
    let ids = h.table.stage_rows(vec![
        valid_row(0),
        with_agent_count(valid_row(0), 75.0),
        valid_row(0),
    ]);

    let Err(SaveError::Invalid(errors)) = h.table.stop_edit_and_save_rows().await else {
        panic!("expected the batch to be rejected");
    };
    assert_eq!(errors.len(), 1);
    let cell = errors.field(ids[1], "agent_count");
    assert_eq!(cell.len(), 1);
    assert_eq!(cell[0].message, "Value must be between 0 and 50.");

    let snapshot = h.table.snapshot();
    for id in &ids {
        let view = snapshot.row(*id).unwrap();
        assert_eq!(view.status, RowStatus::Dirty);
        assert_eq!(view.origin, RowOrigin::Staged);
    }
    assert!(snapshot.row(ids[0]).unwrap().errors.is_empty());
    assert!(snapshot.row(ids[2]).unwrap().errors.is_empty());
    assert!(snapshot.row(ids[1]).unwrap().editing);
    assert!(h.table.has_unsaved_changes());
    assert!(!h.table.is_saving());
    assert!(h.sink.rows(SURVEY).is_empty());
}

#[tokio::test]
async fn fixed_batch_commits_every_row() {
    let mut h = harness();
    h.table.add_columns(vec![agent_count_column()]);
    let ids = h.table.stage_rows(vec![
        valid_row(0),
        with_agent_count(valid_row(0), 75.0),
        valid_row(0),
    ]);
    assert!(h.table.stop_edit_and_save_rows().await.is_err());

    h.table
        .set_cell(ids[1], "agent_count", CellValue::Number(20.0))
        .unwrap();
    let report = h.table.stop_edit_and_save_rows().await.unwrap();

    assert_eq!(report.saved, ids);
    assert!(!h.table.has_unsaved_changes());
    let snapshot = h.table.snapshot();
    assert!(snapshot.rows.iter().all(|view| {
        view.status == RowStatus::Clean && view.origin == RowOrigin::Saved && view.errors.is_empty()
    }));
    assert_eq!(h.sink.rows(SURVEY).len(), 3);
}

#[tokio::test]
async fn edited_saved_row_is_committed() {
    let mut h = harness();
    h.table.set_initial_rows(vec![valid_row(1), valid_row(2)]).unwrap();
    let id = RowId::new(1);
    assert!(!h.table.has_unsaved_changes());

    h.table.begin_row_edit(id).unwrap();
    h.table.set_cell(id, "count", CellValue::from_text("5")).unwrap();
    assert!(h.table.has_unsaved_changes());

    let report = h.table.stop_edit_and_save_rows().await.unwrap();
    assert_eq!(report.saved, vec![id]);
    assert!(!h.table.is_editing(id));
    assert_eq!(h.sink.rows(SURVEY)[0].count, Some(5));
    assert_eq!(
        h.table.snapshot().row(id).unwrap().status,
        RowStatus::Clean
    );
}

#[tokio::test]
async fn deletion_flagged_rows_are_removed_on_commit() {
    let mut h = harness();
    // Row 1 would fail validation but is not validated once flagged.
    h.table
        .set_initial_rows(vec![ObservationRow::empty(RowId::new(1)), valid_row(2)])
        .unwrap();

    assert_eq!(
        h.table.delete_row(RowId::new(1)).unwrap(),
        DeleteOutcome::Flagged
    );
    assert!(h.table.has_unsaved_changes());

    let report = h.table.stop_edit_and_save_rows().await.unwrap();
    assert_eq!(report.deleted, vec![RowId::new(1)]);
    assert!(report.saved.is_empty());
    assert_eq!(h.table.rows().len(), 1);
    assert!(!h.table.has_unsaved_changes());
}

#[tokio::test]
async fn staged_row_delete_is_immediate() {
    let mut h = harness();
    let id = h.table.create_new_record();
    assert!(h.table.is_editing(id));

    assert_eq!(h.table.delete_row(id).unwrap(), DeleteOutcome::Removed);
    assert!(!h.table.is_editing(id));
    assert!(!h.table.has_unsaved_changes());
    assert!(h.table.stop_edit_and_save_rows().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_taxon_reports_one_error_on_the_taxon() {
    let mut h = harness();
    h.table.add_columns(vec![agent_count_column()]);
    let mut row = with_agent_count(valid_row(0), 4.0);
    row.itis_tsn = Some(UNKNOWN_TAXON);
    let ids = h.table.stage_rows(vec![row]);

    let Err(SaveError::Invalid(errors)) = h.table.stop_edit_and_save_rows().await else {
        panic!("expected the batch to be rejected");
    };
    let row_errors = errors.get(ids[0]).unwrap();
    assert_eq!(row_errors.len(), 1);
    assert_eq!(row_errors[0].field_id, "itis_tsn");
    assert_eq!(row_errors[0].category, Category::Lookup);
}

#[tokio::test]
async fn sink_failure_keeps_every_edit() {
    let mut h = harness_with(Arc::new(taxonomy()), Some(Arc::new(FailingSink)));
    h.table.set_initial_rows(vec![valid_row(1)]).unwrap();
    h.table.begin_row_edit(RowId::new(1)).unwrap();
    h.table
        .set_cell(RowId::new(1), "count", CellValue::Number(9.0))
        .unwrap();
    let staged = h.table.stage_rows(vec![valid_row(0)]);

    let result = h.table.stop_edit_and_save_rows().await;
    assert!(matches!(result, Err(SaveError::Transport(_))));

    assert!(!h.table.is_saving());
    assert!(h.table.has_unsaved_changes());
    let snapshot = h.table.snapshot();
    assert_eq!(snapshot.row(RowId::new(1)).unwrap().row.count, Some(9));
    assert_eq!(snapshot.row(staged[0]).unwrap().origin, RowOrigin::Staged);
    assert_eq!(snapshot.error_count(), 0);
}

#[tokio::test]
async fn lookup_failure_is_a_transport_error() {
    let mut h = harness_with(Arc::new(FailingLookup), None);
    h.table.add_columns(vec![agent_count_column()]);
    h.table
        .stage_rows(vec![with_agent_count(valid_row(0), 4.0)]);

    let Err(SaveError::Transport(error)) = h.table.stop_edit_and_save_rows().await else {
        panic!("expected a transport failure");
    };
    assert_eq!(error.operation, "measurement lookup");
    assert!(h.table.has_unsaved_changes());
    assert_eq!(h.table.snapshot().error_count(), 0);
}

#[tokio::test]
async fn rows_in_flight_are_locked() {
    let mut h = harness();
    h.table.set_initial_rows(vec![valid_row(1)]).unwrap();
    h.table.begin_row_edit(RowId::new(1)).unwrap();
    h.table
        .set_cell(RowId::new(1), "count", CellValue::Number(3.0))
        .unwrap();

    let batch = h.table.begin_save().unwrap();
    assert!(h.table.is_saving());
    assert_eq!(
        h.table.snapshot().row(RowId::new(1)).unwrap().status,
        RowStatus::Validating
    );
    assert!(matches!(
        h.table.set_cell(RowId::new(1), "count", CellValue::Number(4.0)),
        Err(EditError::RowLocked(_))
    ));
    assert!(matches!(
        h.table.begin_row_edit(RowId::new(1)),
        Err(EditError::RowLocked(_))
    ));
    assert!(matches!(
        h.table.delete_row(RowId::new(1)),
        Err(EditError::RowLocked(_))
    ));
    assert!(matches!(
        h.table.remove_columns(&["agent_count".to_string()]),
        Err(EditError::SaveInProgress(_))
    ));
    assert!(matches!(
        h.table.revert_records(),
        Err(EditError::SaveInProgress(_))
    ));
    assert!(matches!(h.table.begin_save(), Err(SaveError::InProgress)));

    // Rows outside the batch stay editable.
    let fresh = h.table.create_new_record();
    h.table
        .set_cell(fresh, "count", CellValue::Number(1.0))
        .unwrap();

    let outcome = batch.run().await;
    let report = h.table.finish_save(outcome).unwrap();
    assert_eq!(report.saved, vec![RowId::new(1)]);
    assert!(!h.table.is_saving());
    assert!(h.table.has_unsaved_changes());
    assert_eq!(
        h.table.snapshot().row(fresh).unwrap().status,
        RowStatus::Dirty
    );
}

#[tokio::test]
async fn loading_rows_waits_for_the_save_in_flight() {
    let mut h = harness();
    let ids = h.table.stage_rows(vec![valid_row(0)]);
    let staged = ids[0];

    let batch = h.table.begin_save().unwrap();
    let mut reloaded = valid_row(staged.get());
    reloaded.count = Some(42);
    assert!(matches!(
        h.table.set_initial_rows(vec![valid_row(1), reloaded]),
        Err(EditError::SaveInProgress(_))
    ));

    let outcome = batch.run().await;
    let report = h.table.finish_save(outcome).unwrap();
    assert_eq!(report.saved, vec![staged]);
    assert!(!h.table.has_unsaved_changes());

    let snapshot = h.table.snapshot();
    assert_eq!(snapshot.rows.len(), 1);
    let view = snapshot.row(staged).unwrap();
    assert_eq!(view.origin, RowOrigin::Saved);
    assert_eq!(view.status, RowStatus::Clean);
    assert_eq!(view.row.count, Some(2));
    assert_eq!(h.sink.rows(SURVEY)[0].count, Some(2));

    h.table.set_initial_rows(h.sink.rows(SURVEY)).unwrap();
    assert!(!h.table.has_unsaved_changes());
}

#[test]
fn rows_marked_for_deletion_cannot_be_edited() {
    let mut h = harness();
    h.table.set_initial_rows(vec![valid_row(1)]).unwrap();
    let id = RowId::new(1);

    assert_eq!(h.table.delete_row(id).unwrap(), DeleteOutcome::Flagged);
    assert!(matches!(
        h.table.begin_row_edit(id),
        Err(EditError::PendingDelete(_))
    ));
    assert!(h.table.snapshot().row(id).unwrap().pending_delete);
}

#[tokio::test]
async fn teardown_releases_an_abandoned_save() {
    let mut h = harness();
    let ids = h.table.stage_rows(vec![valid_row(0)]);

    let batch = h.table.begin_save().unwrap();
    let outcome = batch.run().await;
    assert!(h.table.teardown());
    assert!(!h.table.teardown());

    assert!(matches!(
        h.table.finish_save(outcome),
        Err(SaveError::NotInProgress)
    ));
    assert_eq!(
        h.table.snapshot().row(ids[0]).unwrap().status,
        RowStatus::Dirty
    );

    let report = h.table.stop_edit_and_save_rows().await.unwrap();
    assert_eq!(report.saved, ids);
}

#[tokio::test]
async fn removing_a_column_strips_its_cells() {
    let mut h = harness();
    h.table.add_columns(vec![agent_count_column()]);
    h.table
        .set_initial_rows(vec![with_agent_count(valid_row(1), 12.0)])
        .unwrap();

    let removed = h.table.remove_columns(&["agent_count".to_string()]).unwrap();
    assert_eq!(removed, vec!["agent_count".to_string()]);
    let snapshot = h.table.snapshot();
    assert!(snapshot.rows[0].row.dynamic_values.is_empty());
    assert_eq!(snapshot.rows[0].status, RowStatus::Clean);
    assert!(snapshot.columns.iter().all(|c| c.field_id != "agent_count"));
}

#[tokio::test]
async fn cells_require_edit_mode_and_an_active_column() {
    let mut h = harness();
    h.table.set_initial_rows(vec![valid_row(1)]).unwrap();
    let id = RowId::new(1);

    assert!(matches!(
        h.table.set_cell(id, "count", CellValue::Number(1.0)),
        Err(EditError::NotEditing(_))
    ));
    h.table.begin_row_edit(id).unwrap();
    assert!(matches!(
        h.table.set_cell(id, "agent_count", CellValue::Number(1.0)),
        Err(EditError::UnknownColumn(_))
    ));
    assert!(matches!(
        h.table.set_cell(id, "latitude", CellValue::from_text("north")),
        Err(EditError::InvalidValue(_))
    ));
    assert!(matches!(
        h.table.begin_row_edit(RowId::new(99)),
        Err(EditError::UnknownRow(_))
    ));
    assert!(!h.table.has_unsaved_changes());
}

#[tokio::test]
async fn revert_discards_staged_rows_and_edits() {
    let mut h = harness();
    h.table.set_initial_rows(vec![valid_row(1)]).unwrap();
    let id = RowId::new(1);
    h.table.begin_row_edit(id).unwrap();
    h.table.set_cell(id, "count", CellValue::Number(40.0)).unwrap();
    h.table.create_new_record();

    let summary = h.table.revert_records().unwrap();
    assert_eq!(summary.discarded, 1);
    assert_eq!(summary.restored, 1);
    assert!(!h.table.has_unsaved_changes());
    assert!(!h.table.is_editing(id));
    assert_eq!(h.table.snapshot().rows[0].row.count, Some(2));
}

#[tokio::test]
async fn columns_are_restored_for_the_next_session() {
    let h = harness();
    let mut first = h.table;
    first.add_columns(vec![agent_count_column()]);
    first.hide_columns(&["observation_time".to_string()]);

    let second = EditController::new(
        SURVEY,
        TableConfig::default(),
        Arc::new(taxonomy()),
        h.sink.clone(),
        h.store.clone(),
    );
    let snapshot = second.snapshot();
    assert_eq!(snapshot.columns.last().unwrap().field_id, "agent_count");
    assert!(snapshot.hidden_columns.contains("observation_time"));
    assert_eq!(snapshot.visible_columns().count(), 9);
}

#[tokio::test]
async fn disabled_persistence_writes_nothing() {
    let h = harness();
    let config = TableConfig {
        persist_columns: false,
        ..TableConfig::default()
    };
    let mut table = EditController::new(
        SURVEY,
        config,
        Arc::new(taxonomy()),
        h.sink.clone(),
        h.store.clone(),
    );
    table.add_columns(vec![agent_count_column()]);
    assert!(h.store.is_empty());
}
