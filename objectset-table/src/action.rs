//! Typed reducer actions.

use std::fmt;

use crate::state::{CellIndex, SortState};
use crate::store::Dispatcher;

/// Every state change the table can make.
///
/// Row indexes in payloads are row indexes (the stamp on
/// [`crate::IndexedRow`]), never display positions.
pub enum TableAction<T> {
    /// Replace all rows. Resets selection, edit mode and the default snapshot.
    SetData(Vec<T>),
    /// Restore the rows captured by the last `SetData`.
    ResetData,
    /// Bind the store's dispatcher into the state.
    SetDispatch(Dispatcher<T>),
    /// Toggle a row, or select it exclusively when `clear_others` is set.
    ToggleSelectedRow { index: usize, clear_others: bool },
    /// Select every row displayed between `from` and `to`, inclusive.
    SelectRowRange { from: usize, to: usize },
    SelectAllRows,
    ToggleSelectAllRows,
    ClearSelectedRows,
    /// Select a cell, or clear cell selection with `None`.
    SelectCell(Option<CellIndex>),
    EnterCellEditMode,
    ExitCellEditMode,
    SetSortState(Option<SortState>),
    /// Append a row to the data array.
    InsertRow(T),
    DeleteRows(Vec<usize>),
    UpdateRow { index: usize, data: T },
    /// Move `dragged` rows next to `target`, in display order.
    ReorderRows { dragged: Vec<usize>, target: usize },
    SetRowErrors(Option<Vec<String>>),
    SetPendingCell(Option<CellIndex>),
    SetDropTarget(Option<usize>),
}

impl<T> TableAction<T> {
    /// Action name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TableAction::SetData(_) => "SET_DATA",
            TableAction::ResetData => "RESET_DATA",
            TableAction::SetDispatch(_) => "SET_DISPATCH",
            TableAction::ToggleSelectedRow { .. } => "TOGGLE_SELECTED_ROW",
            TableAction::SelectRowRange { .. } => "SELECT_ROW_RANGE",
            TableAction::SelectAllRows => "SELECT_ALL_ROWS",
            TableAction::ToggleSelectAllRows => "TOGGLE_SELECT_ALL_ROWS",
            TableAction::ClearSelectedRows => "CLEAR_SELECTED_ROWS",
            TableAction::SelectCell(_) => "SELECT_CELL",
            TableAction::EnterCellEditMode => "ENTER_CELL_EDIT_MODE",
            TableAction::ExitCellEditMode => "EXIT_CELL_EDIT_MODE",
            TableAction::SetSortState(_) => "SET_SORT_STATE",
            TableAction::InsertRow(_) => "INSERT_ROW",
            TableAction::DeleteRows(_) => "DELETE_ROWS",
            TableAction::UpdateRow { .. } => "UPDATE_ROW",
            TableAction::ReorderRows { .. } => "REORDER_ROWS",
            TableAction::SetRowErrors(_) => "SET_ROW_ERRORS",
            TableAction::SetPendingCell(_) => "SET_PENDING_CELL",
            TableAction::SetDropTarget(_) => "SET_DROP_TARGET",
        }
    }
}

impl<T> fmt::Debug for TableAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableAction::ToggleSelectedRow {
                index,
                clear_others,
            } => write!(f, "{}({index}, clear_others: {clear_others})", self.name()),
            TableAction::SelectRowRange { from, to } => write!(f, "{}({from}..={to})", self.name()),
            TableAction::SelectCell(cell) => write!(f, "{}({cell:?})", self.name()),
            TableAction::SetSortState(sort) => write!(f, "{}({sort:?})", self.name()),
            TableAction::DeleteRows(indexes) => write!(f, "{}({indexes:?})", self.name()),
            TableAction::UpdateRow { index, .. } => write!(f, "{}({index})", self.name()),
            TableAction::ReorderRows { dragged, target } => {
                write!(f, "{}({dragged:?} -> {target})", self.name())
            }
            TableAction::SetRowErrors(errors) => write!(f, "{}({errors:?})", self.name()),
            TableAction::SetPendingCell(cell) => write!(f, "{}({cell:?})", self.name()),
            TableAction::SetDropTarget(row) => write!(f, "{}({row:?})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}
