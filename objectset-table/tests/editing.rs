//! Edit-mode protocol: validation-gated commits, save handlers and events.

mod common;

use std::time::Duration;

use async_trait::async_trait;
use objectset_table::prelude::*;

use common::{Person, columns, names, people, person, table};

fn set_pending(api: &TableApi<Person>, row: usize, column: usize, value: &str) {
    api.get_state()
        .form(CellIndex::new(row, column))
        .expect("editable cell has a form")
        .set_value(value);
}

fn table_with_name_save(handler: impl SaveHandler<Person> + 'static) -> ObjectSetTable<Person> {
    let mut cols = columns();
    cols[0] = cols[0].clone().on_save(handler);
    ObjectSetTable::new(cols, people(), TableConfig::new().save_timeout(Duration::from_millis(50)))
        .unwrap()
}

#[tokio::test]
async fn test_commit_valid_value() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    assert!(api.enter_cell_edit_mode(0, 0).await);
    assert!(api.is_cell_editing(0, 0));
    set_pending(api, 0, 0, "Ann");

    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Saved);
    assert!(!api.is_editing());
    assert_eq!(api.edit_phase(), EditPhase::Selected(CellIndex::new(0, 0)));
    assert_eq!(names(api)[0], "Ann");
}

#[tokio::test]
async fn test_invalid_value_keeps_edit_mode() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(1, 0).await;
    set_pending(api, 1, 0, "   ");

    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Rejected);
    let state = api.get_state();
    assert!(state.is_cell_edit_mode);
    assert_eq!(
        state.selected_row_errors,
        Some(vec!["Name is required".to_string()])
    );
    // Input is preserved for the user to fix.
    assert_eq!(state.form(CellIndex::new(1, 0)).unwrap().value(), CellValue::from("   "));
    assert_eq!(names(api)[1], "Bob");
}

#[tokio::test]
async fn test_discard_restores_value() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 1).await;
    set_pending(api, 0, 1, "not an email");

    assert_eq!(api.exit_cell_edit_mode(false).await, EditOutcome::Discarded);
    let state = api.get_state();
    assert!(!state.is_cell_edit_mode);
    assert_eq!(state.selected_cell_index, Some(CellIndex::new(0, 1)));
    assert_eq!(
        state.form(CellIndex::new(0, 1)).unwrap().value(),
        CellValue::from("ada@example.com")
    );
    assert_eq!(api.exit_cell_edit_mode(false).await, EditOutcome::NotEditing);
}

#[tokio::test]
async fn test_resolve_before_move() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "");

    // The invalid value pins the selection to the edited cell.
    assert!(!api.click_cell(1, 0).await);
    let state = api.get_state();
    assert_eq!(state.selected_cell_index, Some(CellIndex::new(0, 0)));
    assert!(state.is_cell_edit_mode);
    assert!(state.selected_row_errors.is_some());

    set_pending(api, 0, 0, "Zed");
    assert!(api.click_cell(1, 0).await);
    let state = api.get_state();
    assert_eq!(state.selected_cell_index, Some(CellIndex::new(1, 0)));
    assert!(!state.is_cell_edit_mode);
    assert_eq!(state.selected_row_errors, None);
    assert_eq!(names(api)[0], "Zed");
}

#[tokio::test]
async fn test_host_selection_cannot_abandon_an_edit() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    let public = table.api();

    public.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "");

    assert!(!public.select_cell(1, 0).await);
    assert!(!public.clear().await);
    api.selection().select_cell(1, 0);
    let state = api.get_state();
    assert_eq!(state.selected_cell_index, Some(CellIndex::new(0, 0)));
    assert!(state.is_cell_edit_mode);
    assert_eq!(state.selected_row_errors, Some(vec!["Name is required".to_string()]));

    assert_eq!(public.exit_cell_edit_mode(false).await, EditOutcome::Discarded);
    assert!(!api.get_state().form(CellIndex::new(0, 0)).unwrap().is_dirty());
    assert!(public.select_cell(1, 0).await);
    assert!(public.clear().await);
    assert!(!public.have_selected_cells());
    assert_eq!(names(api)[0], "Ada");
}

struct SlowRejectingSave;

#[async_trait]
impl SaveHandler<Person> for SlowRejectingSave {
    async fn save(&self, _value: CellValue, _context: CellContext<Person>) -> Result<bool, SaveError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(false)
    }
}

#[tokio::test]
async fn test_navigation_waits_for_commit_in_flight() {
    let mut cols = columns();
    cols[0] = cols[0].clone().on_save(SlowRejectingSave);
    let table = ObjectSetTable::new(cols, people(), TableConfig::new()).unwrap();
    let api = table.api_ref();
    let public = table.api();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ann");

    let (outcome, moved) = tokio::join!(api.exit_cell_edit_mode(true), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        // The save is still running here.
        assert_eq!(api.get_state().pending_cell, Some(CellIndex::new(0, 0)));
        api.selection().select_cell(3, 0);
        public.select_cell(3, 0).await
    });

    assert_eq!(outcome, EditOutcome::Rejected);
    assert!(!moved);
    let state = api.get_state();
    assert_eq!(state.selected_cell_index, Some(CellIndex::new(0, 0)));
    assert!(state.is_cell_edit_mode);
    assert_eq!(state.pending_cell, None);
    assert_eq!(
        state.selected_row_errors,
        Some(vec![SaveError::Rejected.to_string()])
    );
}

#[tokio::test]
async fn test_sort_toggles_queue_behind_commit() {
    let table = table_with_name_save(SlowSave);
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ann");

    let (outcome, first, second) = tokio::join!(
        api.exit_cell_edit_mode(true),
        api.toggle_sort(0),
        api.toggle_sort(0)
    );
    assert_eq!(outcome, EditOutcome::Rejected);
    assert!(first.is_ok() && second.is_ok());
    assert_eq!(
        api.get_state().sort_state,
        Some(SortState {
            column_index: 0,
            direction: SortDirection::Desc,
        })
    );
}

#[tokio::test]
async fn test_entering_another_cell_commits_first() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ada Lovelace");
    assert!(api.enter_cell_edit_mode(2, 1).await);

    assert_eq!(names(api)[0], "Ada Lovelace");
    let editing: Vec<(usize, usize)> = (0..5)
        .flat_map(|r| (0..3).map(move |c| (r, c)))
        .filter(|&(r, c)| api.is_cell_editing(r, c))
        .collect();
    assert_eq!(editing, vec![(2, 1)]);
}

#[tokio::test]
async fn test_failed_commit_blocks_entering_another_cell() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 1).await;
    set_pending(api, 0, 1, "nope");
    assert!(!api.enter_cell_edit_mode(3, 0).await);
    assert!(api.is_cell_editing(0, 1));
}

#[tokio::test]
async fn test_non_editable_cell() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    assert!(!api.can_edit_cell(0, 2));
    assert!(!api.enter_cell_edit_mode(0, 2).await);
    assert!(!api.can_edit_cell(9, 0));

    let locked = table_disabled_cells();
    assert!(!locked.api_ref().can_edit_cell(0, 0));
}

fn table_disabled_cells() -> ObjectSetTable<Person> {
    common::table(TableConfig::new().cell_selection(false))
}

#[tokio::test]
async fn test_save_handler_rejects() {
    let table = table_with_name_save(FnSaveHandler(|_: &CellValue, _: &CellContext<Person>| false));
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ann");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Rejected);

    let state = api.get_state();
    assert!(state.is_cell_edit_mode);
    assert_eq!(
        state.selected_row_errors,
        Some(vec![SaveError::Rejected.to_string()])
    );
    assert_eq!(state.pending_cell, None);
    assert_eq!(names(api)[0], "Ada");
}

struct FailingSave;

#[async_trait]
impl SaveHandler<Person> for FailingSave {
    async fn save(&self, _value: CellValue, _context: CellContext<Person>) -> Result<bool, SaveError> {
        Err(SaveError::failed("database is down"))
    }
}

#[tokio::test]
async fn test_save_handler_error_is_validation_failure() {
    let table = table_with_name_save(FailingSave);
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ann");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Rejected);
    assert_eq!(
        api.get_state().selected_row_errors,
        Some(vec!["Saving failed: database is down".to_string()])
    );
}

struct SlowSave;

#[async_trait]
impl SaveHandler<Person> for SlowSave {
    async fn save(&self, _value: CellValue, _context: CellContext<Person>) -> Result<bool, SaveError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(true)
    }
}

#[tokio::test]
async fn test_save_timeout() {
    let table = table_with_name_save(SlowSave);
    let api = table.api_ref();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "Ann");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Rejected);

    let state = api.get_state();
    assert!(state.is_cell_edit_mode);
    assert_eq!(state.pending_cell, None);
    assert_eq!(
        state.selected_row_errors,
        Some(vec![SaveError::TimedOut(Duration::from_millis(50)).to_string()])
    );
}

struct CheckingSave;

#[async_trait]
impl SaveHandler<Person> for CheckingSave {
    async fn save(&self, value: CellValue, context: CellContext<Person>) -> Result<bool, SaveError> {
        let original = context.row_data.map(|p| p.name).unwrap_or_default();
        Ok(value.to_string() != original.to_uppercase())
    }
}

#[tokio::test]
async fn test_save_handler_sees_context() {
    let table = table_with_name_save(CheckingSave);
    let api = table.api_ref();

    api.enter_cell_edit_mode(2, 0).await;
    set_pending(api, 2, 0, "CY");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Rejected);
    set_pending(api, 2, 0, "Cyd");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Saved);
    assert_eq!(names(api)[2], "Cyd");
}

#[tokio::test]
async fn test_two_phase_commit() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.enter_cell_edit_mode(3, 1).await;
    set_pending(api, 3, 1, "bad");
    assert!(api.validate_cell(3, 1).await.is_err());
    assert!(api.is_editing());

    set_pending(api, 3, 1, "dee@example.org");
    let value = api.validate_cell(3, 1).await.unwrap();
    assert_eq!(value, CellValue::from("dee@example.org"));
    assert!(api.is_editing());

    assert!(api.commit_cell(1, 1, value.clone()).await.is_err());
    assert!(api.is_cell_editing(3, 1));

    api.commit_cell(3, 1, value).await.unwrap();
    assert!(!api.is_editing());
    assert_eq!(api.get_state().row(3).unwrap().email, "dee@example.org");
}

#[tokio::test]
async fn test_insert_row_commit_appends() {
    let table = table(TableConfig::new().addable(|| person("", "", None)));
    let api = table.api_ref();
    assert!(api.can_add());
    assert_eq!(api.get_state().grid_rows(), 6);

    assert!(api.enter_cell_edit_mode(5, 0).await);
    assert!(api.create_cell_context(5, 0).unwrap().is_new_row);
    set_pending(api, 5, 0, "Fay");
    assert_eq!(api.exit_cell_edit_mode(true).await, EditOutcome::Saved);

    assert_eq!(api.get_total_rows_count(), 6);
    assert_eq!(names(api)[5], "Fay");
    // A fresh, empty insert row follows.
    let state = api.get_state();
    assert!(state.is_insert_row(6));
    assert_eq!(state.form(CellIndex::new(6, 0)).unwrap().value(), CellValue::Null);
}

#[tokio::test]
async fn test_insert_row_requires_add() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    assert!(!api.can_add());
    assert!(!api.enter_cell_edit_mode(5, 0).await);
    assert!(!api.add_row(person("Fay", "", None)));
}

#[tokio::test]
async fn test_events() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    let mut events = api.subscribe();

    api.enter_cell_edit_mode(0, 0).await;
    set_pending(api, 0, 0, "");
    api.exit_cell_edit_mode(true).await;
    set_pending(api, 0, 0, "Al");
    api.exit_cell_edit_mode(true).await;

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        assert_eq!(event.cell(), CellIndex::new(0, 0));
        assert_eq!(event.field, "name");
        kinds.push(event.kind);
    }
    assert_eq!(
        kinds,
        vec![
            TableEventKind::EditingStart,
            TableEventKind::ValidationError,
            TableEventKind::ValidationErrorChange,
            TableEventKind::ValidationErrorChange,
            TableEventKind::ValidationSuccess,
            TableEventKind::EditingSave,
            TableEventKind::EditingExit,
        ]
    );
}
