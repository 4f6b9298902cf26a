use crate::TableRow;
use crate::state::{CellIndex, TableState};
use crate::validation::CellForm;
use crate::value::CellValue;

/// Everything a cell renderer or save handler needs to know about a cell.
#[derive(Debug, Clone)]
pub struct CellContext<T> {
    pub row: usize,
    pub column: usize,
    pub field: String,
    /// Row data. `None` on the insert row.
    pub row_data: Option<T>,
    /// Current value. On the insert row this is the pending form value.
    pub value: CellValue,
    pub is_new_row: bool,
    pub is_selected: bool,
    pub is_editing: bool,
    /// The cell's form, for editable cells.
    pub form: Option<CellForm>,
}

impl<T: TableRow> CellContext<T> {
    pub(crate) fn build(state: &TableState<T>, cell: CellIndex) -> Option<Self> {
        let column = state.columns.get(cell.column)?;
        let is_new_row = state.is_insert_row(cell.row);
        let row_data = state.row(cell.row).cloned();
        if row_data.is_none() && !is_new_row {
            return None;
        }
        let form = state.form(cell).cloned();
        let value = match (&row_data, &form) {
            (Some(row), _) => column.value(row),
            (None, Some(form)) => form.value(),
            (None, None) => CellValue::Null,
        };
        Some(Self {
            row: cell.row,
            column: cell.column,
            field: column.field.clone(),
            row_data,
            value,
            is_new_row,
            is_selected: state.selected_cell_index == Some(cell),
            is_editing: state.editing_cell() == Some(cell),
            form,
        })
    }

    pub fn cell(&self) -> CellIndex {
        CellIndex::new(self.row, self.column)
    }
}
