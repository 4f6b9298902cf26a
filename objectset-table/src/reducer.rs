//! The table reducer.

use std::collections::{BTreeSet, HashMap};

use crate::TableRow;
use crate::action::TableAction;
use crate::drag::reorder_rows;
use crate::sort::sort_data;
use crate::state::{IndexedRow, TableState, build_form_grid, build_form_row, stamp};

/// Apply one action to a snapshot, producing the next snapshot.
///
/// The input state is never modified. Every action is handled here; adding
/// an action without handling it is a compile error.
pub fn reduce<T: TableRow>(state: &TableState<T>, action: TableAction<T>) -> TableState<T> {
    log::debug!("reduce {action:?}");
    let mut next = state.clone();

    match action {
        TableAction::SetData(rows) => {
            replace_rows(&mut next, rows.clone());
            next.default_data = rows.into();
        }
        TableAction::ResetData => {
            let rows = next.default_data.to_vec();
            replace_rows(&mut next, rows);
        }
        TableAction::SetDispatch(dispatch) => {
            next.dispatch = Some(dispatch);
        }
        TableAction::ToggleSelectedRow {
            index,
            clear_others,
        } => {
            if clear_others {
                next.selected_row_indexes.clear();
                next.selected_row_indexes.insert(index);
            } else if !next.selected_row_indexes.remove(&index) {
                next.selected_row_indexes.insert(index);
            }
            next.last_selected_row_index = Some(index);
        }
        TableAction::SelectRowRange { from, to } => {
            match (next.position_of(from), next.position_of(to)) {
                (Some(a), Some(b)) => {
                    let (start, end) = if a <= b { (a, b) } else { (b, a) };
                    let end = end.min(next.data.len().saturating_sub(1));
                    next.selected_row_indexes = next
                        .data
                        .get(start..=end)
                        .unwrap_or_default()
                        .iter()
                        .map(|r| r.index)
                        .collect();
                }
                _ => {
                    next.selected_row_indexes = BTreeSet::from([to]);
                }
            }
            next.last_selected_row_index = Some(from);
        }
        TableAction::SelectAllRows => {
            next.selected_row_indexes = next.data.iter().map(|r| r.index).collect();
        }
        TableAction::ToggleSelectAllRows => {
            if next.all_rows_selected() {
                next.selected_row_indexes.clear();
            } else {
                next.selected_row_indexes = next.data.iter().map(|r| r.index).collect();
            }
        }
        TableAction::ClearSelectedRows => {
            next.selected_row_indexes.clear();
            next.last_selected_row_index = None;
        }
        TableAction::SelectCell(cell) => {
            if next.selected_cell_index == cell {
                // Reselecting the active cell changes nothing.
            } else if next.is_cell_edit_mode || next.pending_cell.is_some() {
                // Leaving an editing cell goes through commit or discard.
                log::warn!(
                    "Ignoring selection of {cell:?} while {:?} is being edited",
                    next.selected_cell_index
                );
            } else {
                next.selected_cell_index = cell;
                next.selected_row_errors = None;
            }
        }
        TableAction::EnterCellEditMode => {
            if next.selected_cell_index.is_some() {
                next.is_cell_edit_mode = true;
                next.selected_row_errors = None;
            } else {
                log::warn!("Ignoring edit mode entry without a selected cell");
            }
        }
        TableAction::ExitCellEditMode => {
            next.is_cell_edit_mode = false;
            next.selected_row_errors = None;
        }
        TableAction::SetSortState(sort) => {
            next.sort_state = sort.filter(|s| s.column_index < next.columns.len());
            let rows = next.rows_in_index_order();
            next.data = apply_sort(&next, stamp(rows));
        }
        TableAction::InsertRow(row) => {
            let mut rows = next.rows_in_index_order();
            let index = rows.len();
            let forms = build_form_row(&next.columns, Some(&row), next.config.can_add());
            rows.push(row);
            next.data = apply_sort(&next, stamp(rows));
            // The old insert-row slot now belongs to the new row.
            next.data_form_references.truncate(index);
            next.data_form_references.push(forms);
            next.data_form_references.push(build_form_row(
                &next.columns,
                None,
                next.config.can_add(),
            ));
        }
        TableAction::DeleteRows(indexes) => {
            delete_rows(&mut next, &indexes.into_iter().collect());
        }
        TableAction::UpdateRow { index, data } => {
            if index < next.data.len() {
                let forms = build_form_row(&next.columns, Some(&data), next.config.can_add());
                let mut rows = next.rows_in_index_order();
                rows[index] = data;
                next.data = apply_sort(&next, stamp(rows));
                if let Some(slot) = next.data_form_references.get_mut(index) {
                    *slot = forms;
                }
            } else {
                log::warn!("Ignoring update of missing row {index}");
            }
        }
        TableAction::ReorderRows { dragged, target } => {
            let positions: Vec<usize> = dragged
                .iter()
                .filter_map(|&index| next.data.iter().position(|r| r.index == index))
                .collect();
            if let Some(target) = next.data.iter().position(|r| r.index == target) {
                let display: Vec<T> = next.data.iter().map(|r| r.data.clone()).collect();
                let rows = reorder_rows(&display, &positions, target);
                // The dropped order becomes the new data order.
                next.sort_state = None;
                replace_rows(&mut next, rows);
            }
            next.drop_target = None;
        }
        TableAction::SetRowErrors(errors) => {
            next.selected_row_errors = errors;
        }
        TableAction::SetPendingCell(cell) => {
            next.pending_cell = cell;
        }
        TableAction::SetDropTarget(row) => {
            next.drop_target = row.filter(|&r| r < next.data.len());
        }
    }

    debug_assert!(
        !next.is_cell_edit_mode || next.selected_cell_index.is_some(),
        "edit mode without a selected cell"
    );
    next
}

/// Sorted display order for stamped rows under the state's sort.
fn apply_sort<T: TableRow>(state: &TableState<T>, rows: Vec<IndexedRow<T>>) -> Vec<IndexedRow<T>> {
    match state.sort_state {
        Some(sort) => match state.columns.get(sort.column_index) {
            Some(column) => sort_data(&rows, Some(&sort), column, &state.config),
            None => rows,
        },
        None => rows,
    }
}

/// Swap in a new data array, dropping everything tied to old row indexes.
fn replace_rows<T: TableRow>(state: &mut TableState<T>, rows: Vec<T>) {
    state.data_form_references = build_form_grid(&state.columns, &rows, state.config.can_add());
    state.data = apply_sort(state, stamp(rows));
    state.selected_row_indexes.clear();
    state.last_selected_row_index = None;
    state.selected_cell_index = None;
    state.is_cell_edit_mode = false;
    state.selected_row_errors = None;
    state.pending_cell = None;
    state.drop_target = None;
}

fn delete_rows<T: TableRow>(state: &mut TableState<T>, removed: &BTreeSet<usize>) {
    let old_len = state.data.len();
    let rows = state.rows_in_index_order();

    // Old row index -> new row index for every surviving row, plus the
    // insert row which stays last.
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(rows.len());
    let mut forms = Vec::with_capacity(rows.len() + 1);
    let mut old_forms = std::mem::take(&mut state.data_form_references).into_iter();
    for (old_index, row) in rows.into_iter().enumerate() {
        let row_forms = old_forms.next().unwrap_or_default();
        if removed.contains(&old_index) {
            continue;
        }
        remap.insert(old_index, kept.len());
        kept.push(row);
        forms.push(row_forms);
    }
    remap.insert(old_len, kept.len());
    forms.push(
        old_forms
            .next()
            .unwrap_or_else(|| build_form_row(&state.columns, None, state.config.can_add())),
    );

    state.data_form_references = forms;
    state.data = apply_sort(state, stamp(kept));
    state.selected_row_indexes = state
        .selected_row_indexes
        .iter()
        .filter_map(|i| remap.get(i).copied())
        .filter(|&i| i < state.data.len())
        .collect();
    state.last_selected_row_index = state
        .last_selected_row_index
        .and_then(|i| remap.get(&i).copied());
    state.drop_target = None;

    match state.selected_cell_index {
        Some(cell) => match remap.get(&cell.row) {
            Some(&row) => {
                state.selected_cell_index = Some(crate::CellIndex::new(row, cell.column));
                state.pending_cell = state
                    .pending_cell
                    .and_then(|p| remap.get(&p.row).map(|&r| crate::CellIndex::new(r, p.column)));
            }
            None => {
                state.selected_cell_index = None;
                state.is_cell_edit_mode = false;
                state.selected_row_errors = None;
                state.pending_cell = None;
            }
        },
        None => state.pending_cell = None,
    }
}
