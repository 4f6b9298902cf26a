//! The authoritative table snapshot.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::TableRow;
use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::store::Dispatcher;
use crate::validation::CellForm;

/// A row stamped with its position in the underlying data array.
///
/// Sorting reorders the stamped rows but never changes `index`, so the
/// stamp is the row's identity until the data array itself changes
/// (insert, delete, reorder).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRow<T> {
    pub data: T,
    pub index: usize,
}

/// A `(row, column)` cell address. `row` is a row index, not a display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    pub row: usize,
    pub column: usize,
}

impl CellIndex {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Single-column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column_index: usize,
    pub direction: SortDirection,
}

/// Where the edit-mode state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// No cell selected.
    Idle,
    /// A cell is selected but not being edited.
    Selected(CellIndex),
    /// The selected cell is being edited.
    Editing(CellIndex),
}

/// Table snapshot. Produced only by [`crate::reduce`].
pub struct TableState<T> {
    pub columns: Arc<[ColumnDef<T>]>,
    /// Rows in display order.
    pub data: Vec<IndexedRow<T>>,
    /// Rows as they were last handed to the table.
    pub default_data: Arc<[T]>,
    pub selected_row_indexes: BTreeSet<usize>,
    /// Anchor for range selection.
    pub last_selected_row_index: Option<usize>,
    pub selected_cell_index: Option<CellIndex>,
    pub is_cell_edit_mode: bool,
    pub sort_state: Option<SortState>,
    /// Errors for the row holding the selected cell.
    pub selected_row_errors: Option<Vec<String>>,
    /// Cell forms by `[row index][column]`. One extra row for the insert row.
    pub data_form_references: Vec<Vec<Option<CellForm>>>,
    /// Cell whose save handler is still running.
    pub pending_cell: Option<CellIndex>,
    /// Row hovered by an in-progress drag.
    pub drop_target: Option<usize>,
    /// Set once the store exists.
    pub dispatch: Option<Dispatcher<T>>,
    pub config: Arc<TableConfig<T>>,
}

impl<T: TableRow> TableState<T> {
    /// Build the initial snapshot for a table mount.
    pub fn new(columns: Vec<ColumnDef<T>>, rows: Vec<T>, config: Arc<TableConfig<T>>) -> Self {
        let columns: Arc<[ColumnDef<T>]> = columns.into();
        let data_form_references = build_form_grid(&columns, &rows, config.can_add());
        Self {
            columns,
            data: stamp(rows.iter().cloned()),
            default_data: rows.into(),
            selected_row_indexes: BTreeSet::new(),
            last_selected_row_index: None,
            selected_cell_index: None,
            is_cell_edit_mode: false,
            sort_state: None,
            selected_row_errors: None,
            data_form_references,
            pending_cell: None,
            drop_target: None,
            dispatch: None,
            config,
        }
    }

    /// Number of real data rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Rows the grid navigates over, including the insert row when enabled.
    pub fn grid_rows(&self) -> usize {
        self.data.len() + usize::from(self.config.can_add())
    }

    /// Check if a row index refers to real data (not the insert row).
    pub fn is_data_row(&self, index: usize) -> bool {
        index < self.data.len()
    }

    /// Check if a row index is the trailing insert row.
    pub fn is_insert_row(&self, index: usize) -> bool {
        self.config.can_add() && index == self.data.len()
    }

    /// Get row data by row index.
    pub fn row(&self, index: usize) -> Option<&T> {
        self.data.iter().find(|r| r.index == index).map(|r| &r.data)
    }

    /// Display position of a row index. The insert row is always last.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        if self.is_insert_row(index) {
            return Some(self.data.len());
        }
        self.data.iter().position(|r| r.index == index)
    }

    /// Row index at a display position.
    pub fn index_at(&self, position: usize) -> Option<usize> {
        match self.data.get(position) {
            Some(row) => Some(row.index),
            None if self.is_insert_row(position) => Some(position),
            None => None,
        }
    }

    /// Rows in data-array order (ignores sorting).
    pub fn rows_in_index_order(&self) -> Vec<T> {
        let mut rows: Vec<&IndexedRow<T>> = self.data.iter().collect();
        rows.sort_by_key(|r| r.index);
        rows.into_iter().map(|r| r.data.clone()).collect()
    }

    /// Form handle for a cell, if the cell is editable.
    pub fn form(&self, cell: CellIndex) -> Option<&CellForm> {
        self.data_form_references
            .get(cell.row)
            .and_then(|row| row.get(cell.column))
            .and_then(Option::as_ref)
    }

    pub fn edit_phase(&self) -> EditPhase {
        match self.selected_cell_index {
            None => EditPhase::Idle,
            Some(cell) if self.is_cell_edit_mode => EditPhase::Editing(cell),
            Some(cell) => EditPhase::Selected(cell),
        }
    }

    /// The cell currently being edited.
    pub fn editing_cell(&self) -> Option<CellIndex> {
        match self.edit_phase() {
            EditPhase::Editing(cell) => Some(cell),
            _ => None,
        }
    }

    /// Check if all data rows are selected.
    pub fn all_rows_selected(&self) -> bool {
        !self.data.is_empty() && self.data.iter().all(|r| self.selected_row_indexes.contains(&r.index))
    }
}

impl<T> Clone for TableState<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            data: self.data.clone(),
            default_data: Arc::clone(&self.default_data),
            selected_row_indexes: self.selected_row_indexes.clone(),
            last_selected_row_index: self.last_selected_row_index,
            selected_cell_index: self.selected_cell_index,
            is_cell_edit_mode: self.is_cell_edit_mode,
            sort_state: self.sort_state,
            selected_row_errors: self.selected_row_errors.clone(),
            data_form_references: self.data_form_references.clone(),
            pending_cell: self.pending_cell,
            drop_target: self.drop_target,
            dispatch: self.dispatch.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("columns", &self.columns.len())
            .field("data", &self.data)
            .field("selected_row_indexes", &self.selected_row_indexes)
            .field("last_selected_row_index", &self.last_selected_row_index)
            .field("selected_cell_index", &self.selected_cell_index)
            .field("is_cell_edit_mode", &self.is_cell_edit_mode)
            .field("sort_state", &self.sort_state)
            .field("selected_row_errors", &self.selected_row_errors)
            .field("pending_cell", &self.pending_cell)
            .field("drop_target", &self.drop_target)
            .field("bound", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}

/// Stamp rows with their position in the data array.
pub(crate) fn stamp<T>(rows: impl IntoIterator<Item = T>) -> Vec<IndexedRow<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, data)| IndexedRow { data, index })
        .collect()
}

/// Forms for one row. `row` is `None` for the insert row.
pub(crate) fn build_form_row<T: TableRow>(
    columns: &[ColumnDef<T>],
    row: Option<&T>,
    can_add: bool,
) -> Vec<Option<CellForm>> {
    columns
        .iter()
        .map(|column| match row {
            Some(row) if column.editable => {
                Some(CellForm::new(column.field.clone(), column.value(row)))
            }
            None if can_add && column.insertable => {
                Some(CellForm::new(column.field.clone(), Default::default()))
            }
            _ => None,
        })
        .collect()
}

/// Forms for every row plus the insert row.
pub(crate) fn build_form_grid<T: TableRow>(
    columns: &[ColumnDef<T>],
    rows: &[T],
    can_add: bool,
) -> Vec<Vec<Option<CellForm>>> {
    rows.iter()
        .map(|row| build_form_row(columns, Some(row), can_add))
        .chain(std::iter::once(build_form_row(columns, None, can_add)))
        .collect()
}
