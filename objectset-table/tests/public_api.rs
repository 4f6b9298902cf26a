//! The host-facing API surface and state invariants across operation mixes.

mod common;

use objectset_table::prelude::*;

use common::{Person, table};

#[test]
fn test_private_accessors_denied() {
    for name in ["_getState", "_getConfig", "_createCellContext", "_get_state", "get_config"] {
        let err = PublicTableApi::<Person>::resolve(name).unwrap_err();
        assert!(matches!(err, TableError::PrivateAccess(_)), "{name}");
        assert!(err.to_string().contains(name));
    }
}

#[test]
fn test_method_names_are_public_only() {
    let names = PublicTableApi::<Person>::method_names();
    for hidden in ["_getState", "_getConfig", "_createCellContext", "get_state", "get_config"] {
        assert!(!names.contains(&hidden), "{hidden} leaked");
    }
    for name in &names {
        assert!(PublicTableApi::<Person>::resolve(name).is_ok(), "{name}");
    }
    assert!(names.contains(&"exit_cell_edit_mode"));
    assert!(names.contains(&"get_table_element"));
}

#[test]
fn test_resolve_camel_case() {
    assert_eq!(
        PublicTableApi::<Person>::resolve("getTotalRowsCount").unwrap(),
        PublicMethod::GetTotalRowsCount
    );
    assert!(matches!(
        PublicTableApi::<Person>::resolve("dispatch"),
        Err(TableError::UnknownMethod(_))
    ));
}

#[tokio::test]
async fn test_public_handle_shares_state() {
    let table = table(TableConfig::new());
    let public = table.api();
    let other = public.clone();

    assert!(public.enter_cell_edit_mode(0, 0).await);
    assert!(other.is_editing());
    assert!(table.api_ref().is_cell_editing(0, 0));
    assert_eq!(other.exit_cell_edit_mode(false).await, EditOutcome::Discarded);
    assert!(!public.is_editing());
    assert_eq!(public.get_total_rows_count(), 5);
}

#[tokio::test]
async fn test_table_element_view() {
    let table = table(TableConfig::new().addable(|| common::person("", "", None)));
    let api = table.api();
    api.sort_rows(0, Some(SortDirection::Asc)).await.unwrap();
    api.enter_cell_edit_mode(1, 1).await;

    let element = api.get_table_element().unwrap();
    assert_eq!(element.id, table.id());
    assert_eq!(element.headers[0].sort, Some(SortDirection::Asc));
    assert_eq!(element.headers[1].sort, None);
    assert_eq!(element.rows.len(), 6);
    assert!(element.rows[5].is_insert_row);

    let cell = element.cell(CellIndex::new(1, 1)).unwrap();
    assert!(cell.editing && cell.selected);
    assert_eq!(cell.text, "bob@example.com");
    assert_eq!(element.cell(CellIndex::new(1, 2)).unwrap().text, "");

    let text = element.to_string();
    assert!(text.contains("Name ▲"));
    assert!(text.contains("[bob@example.com▏]"));
}

/// Small deterministic generator so the operation mix is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[tokio::test]
async fn test_edit_invariants_hold_across_operations() {
    let table = table(
        TableConfig::new()
            .deletable()
            .reorderable()
            .addable(|| common::person("New", "", None)),
    );
    let api = table.api_ref();
    let public = table.api();
    let mut rng = Lcg(7);

    for _ in 0..400 {
        let state = api.get_state();
        let rows = state.grid_rows().max(1);
        let (row, column) = (rng.next(rows + 1), rng.next(4));
        match rng.next(13) {
            0 => {
                api.click_cell(row, column).await;
            }
            1 => {
                api.enter_cell_edit_mode(row, column).await;
            }
            2 => {
                api.exit_cell_edit_mode(rng.next(2) == 0).await;
            }
            3 => {
                if let Some(cell) = state.editing_cell() {
                    let value = ["", "x", "a@b.co", "Zed"][rng.next(4)];
                    if let Some(form) = state.form(cell) {
                        form.set_value(value);
                    }
                }
            }
            4 => api.selection().toggle_row(row),
            5 => api.selection().toggle_select_all(),
            6 => {
                api.delete_rows(vec![row]).await;
            }
            7 => {
                let direction = [None, Some(SortDirection::Asc), Some(SortDirection::Desc)];
                let _ = api.sort_rows(column % 3, direction[rng.next(3)]).await;
            }
            8 => {
                let key = [Key::Up, Key::Down, Key::Left, Key::Right, Key::Tab, Key::Enter, Key::Escape];
                api.handle_key(&KeyCombo::key(key[rng.next(key.len())])).await;
            }
            9 => {
                if let Some(payload) = api.drag_start(row) {
                    api.drop_rows(payload, rng.next(rows)).await;
                }
            }
            10 => {
                if rng.next(2) == 0 {
                    api.selection().select_cell(row, column);
                } else {
                    public.select_cell(row, column).await;
                }
            }
            11 => {
                public.clear().await;
            }
            _ => {
                api.handle_document_key(&KeyCombo::key(Key::Delete)).await;
            }
        }

        let state = api.get_state();
        if state.is_cell_edit_mode {
            assert!(state.selected_cell_index.is_some());
        }
        let editing = (0..state.grid_rows())
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .filter(|&(r, c)| api.is_cell_editing(r, c))
            .count();
        assert!(editing <= 1);
        assert!(state.selected_row_indexes.iter().all(|&i| state.is_data_row(i)));
        assert_eq!(state.data_form_references.len(), state.row_count() + 1);
        if state.is_cell_edit_mode {
            let cell = state.selected_cell_index.unwrap();
            assert!(cell.row < state.grid_rows() && cell.column < 3);
        } else {
            // Leaving edit mode always commits or discards the input.
            let stale = state
                .data_form_references
                .iter()
                .flatten()
                .flatten()
                .any(|form| form.is_dirty());
            assert!(!stale, "dirty form outside edit mode");
        }
    }
}
