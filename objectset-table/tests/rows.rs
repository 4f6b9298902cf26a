//! Selection, sorting and deletion through the table API.

mod common;

use std::sync::{Arc, Mutex};

use objectset_table::prelude::*;

use common::{Person, columns, names, people, person, table};

fn six_rows() -> ObjectSetTable<Person> {
    let mut rows = people();
    rows.push(person("Fay", "fay@example.com", Some(29)));
    ObjectSetTable::new(columns(), rows, TableConfig::new()).unwrap()
}

#[test]
fn test_toggle_select_all() {
    let table = six_rows();
    let api = table.api();
    assert!(api.get_selected_row_indexes().is_empty());

    api.toggle_select_all();
    assert_eq!(api.get_selected_row_indexes(), vec![0, 1, 2, 3, 4, 5]);
    api.toggle_select_all();
    assert!(api.get_selected_row_indexes().is_empty());
}

#[tokio::test]
async fn test_cell_and_row_selection_coexist() {
    let table = table(TableConfig::new());
    let api = table.api();
    api.select_row(1);
    assert!(api.select_cell(2, 0).await);
    assert_eq!(api.get_selected_row_indexes(), vec![1]);
    assert!(api.have_selected_cells());

    // Cell highlight wins while both are set.
    let element = api.get_table_element().unwrap();
    assert!(!element.row(1).unwrap().selected);
    assert!(element.cell(CellIndex::new(2, 0)).unwrap().selected);

    assert!(api.clear().await);
    assert!(!api.have_selected_cells());
    assert_eq!(api.get_selected_row_indexes(), vec![1]);
    assert!(api.get_table_element().unwrap().row(1).unwrap().selected);
}

#[tokio::test]
async fn test_sort_nulls_last_both_directions() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.sort_rows(2, Some(SortDirection::Asc)).await.unwrap();
    assert_eq!(names(api), vec!["Cy", "Ada", "Dee", "Bob", "Eve"]);

    api.sort_rows(2, Some(SortDirection::Desc)).await.unwrap();
    assert_eq!(names(api), vec!["Dee", "Ada", "Cy", "Bob", "Eve"]);

    api.sort_rows(2, None).await.unwrap();
    assert_eq!(names(api), vec!["Ada", "Bob", "Cy", "Dee", "Eve"]);
    assert_eq!(api.get_state().default_data.len(), 5);
}

#[tokio::test]
async fn test_sort_idempotent() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.sort_rows(0, Some(SortDirection::Desc)).await.unwrap();
    let once = names(api);
    api.sort_rows(0, Some(SortDirection::Desc)).await.unwrap();
    assert_eq!(names(api), once);
    assert_eq!(once, vec!["Eve", "Dee", "Cy", "Bob", "Ada"]);
}

#[tokio::test]
async fn test_sort_guards() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    // Email is not sortable: silently ignored.
    api.sort_rows(1, Some(SortDirection::Desc)).await.unwrap();
    assert_eq!(api.get_state().sort_state, None);

    let err = api.sort_rows(7, Some(SortDirection::Asc)).await.unwrap_err();
    assert!(matches!(err, TableError::ColumnOutOfRange { index: 7, count: 3 }));
}

#[tokio::test]
async fn test_toggle_sort_cycles() {
    let table = table(TableConfig::new());
    let api = table.api_ref();

    api.toggle_sort(0).await.unwrap();
    assert_eq!(
        api.get_state().sort_state.map(|s| s.direction),
        Some(SortDirection::Asc)
    );
    api.toggle_sort(0).await.unwrap();
    assert_eq!(
        api.get_state().sort_state.map(|s| s.direction),
        Some(SortDirection::Desc)
    );
    api.toggle_sort(0).await.unwrap();
    assert_eq!(api.get_state().sort_state, None);
}

#[tokio::test]
async fn test_sorted_range_selection_uses_display_order() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    api.sort_rows(2, Some(SortDirection::Asc)).await.unwrap();

    // Display: Cy(2) Ada(0) Dee(3) Bob(1) Eve(4)
    api.selection().select_row(0);
    api.selection().select_from_last_active_row(1);
    assert_eq!(api.selection().get_selected_row_indexes(), vec![0, 1, 3]);
}

#[tokio::test]
async fn test_delete_rows_reindexes() {
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&deleted);
    let table = table(
        TableConfig::new()
            .deletable()
            .on_delete(move |rows: &[Person]| {
                sink.lock()
                    .unwrap()
                    .extend(rows.iter().map(|p| p.name.clone()));
            }),
    );
    let api = table.api_ref();
    api.selection().select_all_rows();

    assert_eq!(api.delete_rows(vec![2, 4]).await, 2);
    assert_eq!(names(api), vec!["Ada", "Bob", "Dee"]);
    let state = api.get_state();
    let stamps: Vec<usize> = state.data.iter().map(|r| r.index).collect();
    assert_eq!(stamps, vec![0, 1, 2]);
    assert_eq!(api.selection().get_selected_row_indexes(), vec![0, 1, 2]);
    assert_eq!(*deleted.lock().unwrap(), vec!["Cy", "Eve"]);
}

#[tokio::test]
async fn test_delete_clears_removed_cell() {
    let table = table(TableConfig::new().deletable());
    let api = table.api_ref();

    api.enter_cell_edit_mode(4, 0).await;
    api.selection().select_row(4);
    assert_eq!(api.delete_rows(vec![4, 99]).await, 1);

    let state = api.get_state();
    assert_eq!(state.selected_cell_index, None);
    assert!(!state.is_cell_edit_mode);
    assert!(state.selected_row_indexes.is_empty());
    assert_eq!(api.get_total_rows_count(), 4);
}

#[tokio::test]
async fn test_delete_needs_capability() {
    let table = table(TableConfig::new());
    assert!(!table.api().can_delete());
    assert_eq!(table.api().delete_rows(vec![0]).await, 0);

    let table = common::table(
        TableConfig::new()
            .deletable()
            .selection_mode(SelectionMode::None),
    );
    assert!(!table.api().can_delete());
}

#[tokio::test]
async fn test_set_and_reset_data() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    api.selection().select_all_rows();

    api.set_data(vec![person("Zoe", "zoe@example.com", None)]).await;
    assert_eq!(names(api), vec!["Zoe"]);
    assert!(api.selection().get_selected_row_indexes().is_empty());

    api.add_row(person("Yan", "", None));
    assert_eq!(names(api), vec!["Zoe"]);

    api.reset_data().await;
    assert_eq!(names(api), vec!["Zoe"]);
}

#[tokio::test]
async fn test_set_data_ends_edit() {
    let table = table(TableConfig::new());
    let api = table.api_ref();
    let mut events = api.subscribe();

    api.enter_cell_edit_mode(1, 0).await;
    api.get_state()
        .form(CellIndex::new(1, 0))
        .unwrap()
        .set_value("Bobby");
    api.set_data(people()).await;

    let state = api.get_state();
    assert!(!state.is_cell_edit_mode);
    assert_eq!(state.selected_cell_index, None);
    assert!(!state.form(CellIndex::new(1, 0)).unwrap().is_dirty());
    assert_eq!(names(api)[1], "Bob");

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind);
    }
    assert_eq!(kinds, vec![TableEventKind::EditingStart, TableEventKind::EditingExit]);
}

#[tokio::test]
async fn test_add_and_reset() {
    let table = table(TableConfig::new().addable(|| person("", "", None)));
    let api = table.api_ref();
    assert!(api.add_row(person("Fay", "", None)));
    assert_eq!(api.get_total_rows_count(), 6);

    api.reset_data().await;
    assert_eq!(api.get_total_rows_count(), 5);
}
