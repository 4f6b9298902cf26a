use std::fmt;

use tokio::sync::broadcast;

use super::private::{EditOutcome, TableApi};
use crate::TableRow;
use crate::error::TableError;
use crate::events::TableEvent;
use crate::render::TableElement;
use crate::state::SortDirection;

/// Accessors that hand out internal references and stay on [`TableApi`].
const PRIVATE_METHODS: &[&str] = &["get_state", "get_config", "create_cell_context"];

/// One operation of the public table API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicMethod {
    SelectCell,
    SelectRow,
    ToggleRow,
    SelectFromLastActiveRow,
    SelectAllRows,
    ToggleSelectAll,
    SelectRange,
    Clear,
    ClearRows,
    GetSelectedRowIndexes,
    HaveSelectedCells,
    EnterCellEditMode,
    ExitCellEditMode,
    IsEditing,
    CanEditCell,
    DeleteRows,
    CanDelete,
    CanAdd,
    AddRow,
    SortRows,
    GetTotalRowsCount,
    GetTableElement,
    Subscribe,
}

impl PublicMethod {
    /// Every public operation, in documentation order.
    pub const ALL: &'static [PublicMethod] = &[
        PublicMethod::SelectCell,
        PublicMethod::SelectRow,
        PublicMethod::ToggleRow,
        PublicMethod::SelectFromLastActiveRow,
        PublicMethod::SelectAllRows,
        PublicMethod::ToggleSelectAll,
        PublicMethod::SelectRange,
        PublicMethod::Clear,
        PublicMethod::ClearRows,
        PublicMethod::GetSelectedRowIndexes,
        PublicMethod::HaveSelectedCells,
        PublicMethod::EnterCellEditMode,
        PublicMethod::ExitCellEditMode,
        PublicMethod::IsEditing,
        PublicMethod::CanEditCell,
        PublicMethod::DeleteRows,
        PublicMethod::CanDelete,
        PublicMethod::CanAdd,
        PublicMethod::AddRow,
        PublicMethod::SortRows,
        PublicMethod::GetTotalRowsCount,
        PublicMethod::GetTableElement,
        PublicMethod::Subscribe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PublicMethod::SelectCell => "select_cell",
            PublicMethod::SelectRow => "select_row",
            PublicMethod::ToggleRow => "toggle_row",
            PublicMethod::SelectFromLastActiveRow => "select_from_last_active_row",
            PublicMethod::SelectAllRows => "select_all_rows",
            PublicMethod::ToggleSelectAll => "toggle_select_all",
            PublicMethod::SelectRange => "select_range",
            PublicMethod::Clear => "clear",
            PublicMethod::ClearRows => "clear_rows",
            PublicMethod::GetSelectedRowIndexes => "get_selected_row_indexes",
            PublicMethod::HaveSelectedCells => "have_selected_cells",
            PublicMethod::EnterCellEditMode => "enter_cell_edit_mode",
            PublicMethod::ExitCellEditMode => "exit_cell_edit_mode",
            PublicMethod::IsEditing => "is_editing",
            PublicMethod::CanEditCell => "can_edit_cell",
            PublicMethod::DeleteRows => "delete_rows",
            PublicMethod::CanDelete => "can_delete",
            PublicMethod::CanAdd => "can_add",
            PublicMethod::AddRow => "add_row",
            PublicMethod::SortRows => "sort_rows",
            PublicMethod::GetTotalRowsCount => "get_total_rows_count",
            PublicMethod::GetTableElement => "get_table_element",
            PublicMethod::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for PublicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `selectFromLastActiveRow` -> `select_from_last_active_row`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// The table API as handed to host applications.
///
/// Only the documented operations exist on this type. The raw state,
/// configuration and cell context builders stay on [`TableApi`], so a host
/// can never keep a reference that bypasses the reducer.
pub struct PublicTableApi<T> {
    inner: TableApi<T>,
}

impl<T: TableRow> PublicTableApi<T> {
    pub fn new(inner: TableApi<T>) -> Self {
        Self { inner }
    }

    /// Names of every public operation.
    pub fn method_names() -> Vec<&'static str> {
        PublicMethod::ALL.iter().map(|m| m.name()).collect()
    }

    /// Look up an operation by name, as a scripting bridge would.
    ///
    /// Accepts snake_case and camelCase names. Asking for a private accessor
    /// (any name starting with `_`, or one of the raw state accessors) is an
    /// error, as is any other name off the public surface.
    pub fn resolve(name: &str) -> Result<PublicMethod, TableError> {
        let normalized = snake_case(name);
        let bare = normalized.trim_start_matches('_');
        if name.starts_with('_') || PRIVATE_METHODS.contains(&bare) {
            return Err(TableError::PrivateAccess(name.to_string()));
        }
        PublicMethod::ALL
            .iter()
            .copied()
            .find(|m| m.name() == normalized)
            .ok_or_else(|| TableError::UnknownMethod(name.to_string()))
    }

    /// Select a cell. A cell being edited elsewhere is committed first and
    /// the selection only moves if that succeeds.
    pub async fn select_cell(&self, row: usize, column: usize) -> bool {
        self.inner.click_cell(row, column).await
    }

    pub fn select_row(&self, index: usize) {
        self.inner.selection().select_row(index);
    }

    pub fn toggle_row(&self, index: usize) {
        self.inner.selection().toggle_row(index);
    }

    pub fn select_from_last_active_row(&self, index: usize) {
        self.inner.selection().select_from_last_active_row(index);
    }

    pub fn select_all_rows(&self) {
        self.inner.selection().select_all_rows();
    }

    pub fn toggle_select_all(&self) {
        self.inner.selection().toggle_select_all();
    }

    pub fn select_range(&self, from: usize, to: usize) {
        self.inner.selection().select_range(from, to);
    }

    /// Clear the cell selection, committing a cell being edited first.
    pub async fn clear(&self) -> bool {
        self.inner.clear_cell().await
    }

    pub fn clear_rows(&self) {
        self.inner.selection().clear_rows();
    }

    pub fn get_selected_row_indexes(&self) -> Vec<usize> {
        self.inner.selection().get_selected_row_indexes()
    }

    pub fn have_selected_cells(&self) -> bool {
        self.inner.selection().have_selected_cells()
    }

    pub async fn enter_cell_edit_mode(&self, row: usize, column: usize) -> bool {
        self.inner.enter_cell_edit_mode(row, column).await
    }

    pub async fn exit_cell_edit_mode(&self, should_save: bool) -> EditOutcome {
        self.inner.exit_cell_edit_mode(should_save).await
    }

    pub fn is_editing(&self) -> bool {
        self.inner.is_editing()
    }

    pub fn can_edit_cell(&self, row: usize, column: usize) -> bool {
        self.inner.can_edit_cell(row, column)
    }

    pub async fn delete_rows(&self, indexes: Vec<usize>) -> usize {
        self.inner.delete_rows(indexes).await
    }

    pub fn can_delete(&self) -> bool {
        self.inner.can_delete()
    }

    pub fn can_add(&self) -> bool {
        self.inner.can_add()
    }

    pub fn add_row(&self, row: T) -> bool {
        self.inner.add_row(row)
    }

    pub async fn sort_rows(
        &self,
        column: usize,
        direction: Option<SortDirection>,
    ) -> Result<(), TableError> {
        self.inner.sort_rows(column, direction).await
    }

    pub fn get_total_rows_count(&self) -> usize {
        self.inner.get_total_rows_count()
    }

    pub fn get_table_element(&self) -> Option<TableElement> {
        self.inner.get_table_element()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.inner.subscribe()
    }
}

impl<T> Clone for PublicTableApi<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for PublicTableApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicTableApi")
            .field("methods", &PublicMethod::ALL.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Api = PublicTableApi<u32>;

    #[test]
    fn test_private_names_denied() {
        for name in ["_get_state", "_getState", "_getConfig", "_create_cell_context", "getState"] {
            assert!(
                matches!(Api::resolve(name), Err(TableError::PrivateAccess(_))),
                "{name} should be private"
            );
        }
    }

    #[test]
    fn test_method_names_hide_private() {
        let names = Api::method_names();
        assert!(names.contains(&"toggle_select_all"));
        assert!(names.iter().all(|n| !n.starts_with('_')));
        for private in PRIVATE_METHODS {
            assert!(!names.contains(private));
        }
    }

    #[test]
    fn test_resolve_public() {
        assert_eq!(
            Api::resolve("selectFromLastActiveRow").unwrap(),
            PublicMethod::SelectFromLastActiveRow
        );
        assert_eq!(Api::resolve("sort_rows").unwrap(), PublicMethod::SortRows);
        assert!(matches!(
            Api::resolve("frobnicate"),
            Err(TableError::UnknownMethod(_))
        ));
    }
}
