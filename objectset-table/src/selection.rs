//! Row and cell selection.
//!
//! Selection is stored in the table state by row index. The manager gates
//! every operation on the table configuration: a disabled capability turns
//! the call into a no-op.

use serde::Deserialize;

use crate::TableRow;
use crate::action::TableAction;
use crate::state::CellIndex;
use crate::store::TableStore;

/// Row selection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No row selection.
    #[default]
    None,
    /// At most one selected row.
    Single,
    /// Any number of rows (toggle, range, select all).
    Multiple,
}

/// Selection operations layered on the store.
pub struct SelectionManager<T> {
    store: TableStore<T>,
}

impl<T: TableRow> SelectionManager<T> {
    pub fn new(store: TableStore<T>) -> Self {
        Self { store }
    }

    fn mode(&self) -> SelectionMode {
        self.store.state().config.selection_mode
    }

    fn is_valid_row(&self, index: usize) -> bool {
        let valid = self.store.state().is_data_row(index);
        if !valid {
            log::warn!("Ignoring selection of missing row {index}");
        }
        valid
    }

    /// Select one row, clearing all others.
    pub fn select_row(&self, index: usize) {
        if self.mode() == SelectionMode::None || !self.is_valid_row(index) {
            return;
        }
        self.store.dispatch(TableAction::ToggleSelectedRow {
            index,
            clear_others: true,
        });
    }

    /// Add or remove one row. In single mode the row replaces the selection.
    pub fn toggle_row(&self, index: usize) {
        if !self.is_valid_row(index) {
            return;
        }
        match self.mode() {
            SelectionMode::None => {}
            SelectionMode::Single => {
                let state = self.store.state();
                if state.selected_row_indexes.contains(&index) {
                    self.store.dispatch(TableAction::ClearSelectedRows);
                } else {
                    self.store.dispatch(TableAction::ToggleSelectedRow {
                        index,
                        clear_others: true,
                    });
                }
            }
            SelectionMode::Multiple => {
                self.store.dispatch(TableAction::ToggleSelectedRow {
                    index,
                    clear_others: false,
                });
            }
        }
    }

    /// Range-select from the last selected row to `index`.
    ///
    /// Falls back to [`select_row`](Self::select_row) without an anchor or
    /// outside multiple mode.
    pub fn select_from_last_active_row(&self, index: usize) {
        let anchor = self.store.state().last_selected_row_index;
        match anchor {
            Some(from) if self.mode() == SelectionMode::Multiple => self.select_range(from, index),
            _ => self.select_row(index),
        }
    }

    /// Select every row displayed between `from` and `to`, inclusive.
    pub fn select_range(&self, from: usize, to: usize) {
        if self.mode() != SelectionMode::Multiple
            || !self.is_valid_row(from)
            || !self.is_valid_row(to)
        {
            return;
        }
        self.store.dispatch(TableAction::SelectRowRange { from, to });
    }

    pub fn select_all_rows(&self) {
        if self.mode() == SelectionMode::Multiple {
            self.store.dispatch(TableAction::SelectAllRows);
        }
    }

    /// Select all rows, or clear them when all are already selected.
    pub fn toggle_select_all(&self) {
        if self.mode() == SelectionMode::Multiple {
            self.store.dispatch(TableAction::ToggleSelectAllRows);
        }
    }

    /// Select one cell. The insert row counts as a row here.
    ///
    /// The selection does not move off a cell that is being edited; use
    /// [`TableApi::click_cell`](crate::TableApi::click_cell) to commit and
    /// move.
    pub fn select_cell(&self, row: usize, column: usize) {
        let state = self.store.state();
        if !state.config.cell_selection {
            return;
        }
        if row >= state.grid_rows() || column >= state.columns.len() {
            log::warn!("Ignoring selection of missing cell ({row}, {column})");
            return;
        }
        self.store
            .dispatch(TableAction::SelectCell(Some(CellIndex::new(row, column))));
    }

    /// Clear the cell selection. Row selection is left alone.
    pub fn clear(&self) {
        if self.store.state().selected_cell_index.is_some() {
            self.store.dispatch(TableAction::SelectCell(None));
        }
    }

    /// Clear the row selection.
    pub fn clear_rows(&self) {
        self.store.dispatch(TableAction::ClearSelectedRows);
    }

    /// Selected row indexes in ascending order.
    pub fn get_selected_row_indexes(&self) -> Vec<usize> {
        self.store
            .state()
            .selected_row_indexes
            .iter()
            .copied()
            .collect()
    }

    pub fn have_selected_cells(&self) -> bool {
        self.store.state().selected_cell_index.is_some()
    }
}

impl<T> Clone for SelectionManager<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T> std::fmt::Debug for SelectionManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("store", &self.store)
            .finish()
    }
}
