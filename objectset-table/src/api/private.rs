use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use super::context::CellContext;
use crate::TableRow;
use crate::action::TableAction;
use crate::config::TableConfig;
use crate::error::{SaveError, TableError};
use crate::events::{TableEvent, TableEventKind};
use crate::render::{self, TableElement};
use crate::selection::SelectionManager;
use crate::sort::next_sort;
use crate::state::{CellIndex, EditPhase, SortDirection, SortState, TableState};
use crate::store::TableStore;
use crate::table::TableId;
use crate::value::CellValue;

const EVENT_CAPACITY: usize = 64;

/// How an edit session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// No cell was being edited.
    NotEditing,
    /// Pending input was thrown away.
    Discarded,
    /// The value passed validation and was committed.
    Saved,
    /// Validation or saving failed. The cell is still being edited.
    Rejected,
}

/// The table's full API.
///
/// Every asynchronous transition runs through a FIFO lane, so a navigation
/// issued while a commit is in flight waits for that commit to resolve
/// before it looks at the state. Synchronous queries never wait.
pub struct TableApi<T> {
    id: TableId,
    store: TableStore<T>,
    selection: SelectionManager<T>,
    events: broadcast::Sender<TableEvent>,
    lane: Arc<Mutex<()>>,
}

impl<T: TableRow> TableApi<T> {
    pub fn new(id: TableId, store: TableStore<T>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            id,
            selection: SelectionManager::new(store.clone()),
            store,
            events,
            lane: Arc::new(Mutex::new(())),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn selection(&self) -> &SelectionManager<T> {
        &self.selection
    }

    /// Current raw state snapshot.
    pub fn get_state(&self) -> Arc<TableState<T>> {
        self.store.state()
    }

    /// Raw table configuration.
    pub fn get_config(&self) -> Arc<TableConfig<T>> {
        Arc::clone(&self.store.state().config)
    }

    /// Context for one cell, or `None` if the cell does not exist.
    pub fn create_cell_context(&self, row: usize, column: usize) -> Option<CellContext<T>> {
        CellContext::build(&self.state(), CellIndex::new(row, column))
    }

    pub(crate) fn state(&self) -> Arc<TableState<T>> {
        self.store.state()
    }

    pub(crate) fn store(&self) -> &TableStore<T> {
        &self.store
    }

    pub(crate) fn lane(&self) -> &Mutex<()> {
        &self.lane
    }

    /// Check if the state changed since the last call. Renderers use this to
    /// skip redrawing an unchanged table.
    pub fn take_changed(&self) -> bool {
        self.store.take_dirty()
    }

    /// Receive table events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    fn emit(&self, kind: TableEventKind, cell: CellIndex, errors: Vec<String>) {
        let field = self
            .state()
            .columns
            .get(cell.column)
            .map(|c| c.field.clone())
            .unwrap_or_default();
        log::debug!("{} at {cell}", kind.name());
        // No subscribers is fine.
        let _ = self
            .events
            .send(TableEvent::new(kind, cell, field).with_errors(errors));
    }

    pub fn is_editing(&self) -> bool {
        self.state().is_cell_edit_mode
    }

    /// Check if one specific cell is being edited.
    pub fn is_cell_editing(&self, row: usize, column: usize) -> bool {
        self.state().editing_cell() == Some(CellIndex::new(row, column))
    }

    pub fn edit_phase(&self) -> EditPhase {
        self.state().edit_phase()
    }

    /// Check if a cell can enter edit mode.
    ///
    /// Data rows need an `editable` column; the insert row needs an
    /// `insertable` one and adding to be enabled.
    pub fn can_edit_cell(&self, row: usize, column: usize) -> bool {
        let state = self.state();
        if !state.config.cell_selection {
            return false;
        }
        let Some(def) = state.columns.get(column) else {
            return false;
        };
        if state.is_insert_row(row) {
            def.insertable
        } else {
            state.is_data_row(row) && def.editable
        }
    }

    pub fn can_add(&self) -> bool {
        self.state().config.can_add()
    }

    pub fn can_delete(&self) -> bool {
        let config = self.get_config();
        config.allow_delete && config.row_selection()
    }

    /// Number of real data rows.
    pub fn get_total_rows_count(&self) -> usize {
        self.state().row_count()
    }

    /// Derived view of the table. `None` until the store is bound.
    pub fn get_table_element(&self) -> Option<TableElement> {
        let state = self.state();
        if state.dispatch.is_none() {
            return None;
        }
        Some(render::build_element(self.id, &state))
    }

    /// Put a cell in edit mode.
    ///
    /// A different cell that is still being edited gets committed first; if
    /// that commit fails, the other cell stays in edit mode and this returns
    /// false.
    pub async fn enter_cell_edit_mode(&self, row: usize, column: usize) -> bool {
        let _lane = self.lane.lock().await;
        self.enter_locked(CellIndex::new(row, column)).await
    }

    /// Leave edit mode.
    ///
    /// With `should_save` the pending value is validated and saved; on any
    /// failure the errors land in `selected_row_errors` and the cell stays
    /// in edit mode. Without it the pending value is discarded.
    pub async fn exit_cell_edit_mode(&self, should_save: bool) -> EditOutcome {
        let _lane = self.lane.lock().await;
        self.exit_locked(should_save).await
    }

    /// Validate a cell's pending value without committing it.
    pub async fn validate_cell(&self, row: usize, column: usize) -> Result<CellValue, Vec<String>> {
        let _lane = self.lane.lock().await;
        self.validate_locked(CellIndex::new(row, column)).await
    }

    /// Save and apply an already validated value, then leave edit mode.
    ///
    /// Only the cell being edited can be committed.
    pub async fn commit_cell(
        &self,
        row: usize,
        column: usize,
        value: CellValue,
    ) -> Result<(), Vec<String>> {
        let _lane = self.lane.lock().await;
        let cell = CellIndex::new(row, column);
        if self.state().editing_cell() != Some(cell) {
            return Err(vec![format!("Cell {cell} is not being edited")]);
        }
        self.commit_locked(cell, value).await
    }

    /// Select a cell the way a click does.
    ///
    /// While another cell is being edited its value is committed first, and
    /// the selection only moves if that commit succeeds.
    pub async fn click_cell(&self, row: usize, column: usize) -> bool {
        let _lane = self.lane.lock().await;
        self.click_locked(CellIndex::new(row, column)).await
    }

    /// Clear the cell selection, as a click outside the table does.
    ///
    /// A cell being edited is committed first; if that fails the selection
    /// stays where it is and this returns false.
    pub async fn clear_cell(&self) -> bool {
        let _lane = self.lane.lock().await;
        if self.state().editing_cell().is_some()
            && self.exit_locked(true).await != EditOutcome::Saved
        {
            return false;
        }
        self.selection.clear();
        !self.selection.have_selected_cells()
    }

    /// Select a cell and put it in edit mode, as on double-click.
    pub async fn activate_cell(&self, row: usize, column: usize) -> bool {
        let _lane = self.lane.lock().await;
        let cell = CellIndex::new(row, column);
        self.click_locked(cell).await && self.enter_locked(cell).await
    }

    pub(crate) async fn click_locked(&self, cell: CellIndex) -> bool {
        let state = self.state();
        if let Some(editing) = state.editing_cell() {
            if editing == cell {
                return true;
            }
            if self.exit_locked(true).await != EditOutcome::Saved {
                log::debug!("Staying on {editing}, commit failed");
                return false;
            }
        }
        self.selection.select_cell(cell.row, cell.column);
        self.state().selected_cell_index == Some(cell)
    }

    pub(crate) async fn enter_locked(&self, cell: CellIndex) -> bool {
        if !self.can_edit_cell(cell.row, cell.column) {
            return false;
        }
        let state = self.state();
        if state.pending_cell == Some(cell) {
            return false;
        }
        if let Some(editing) = state.editing_cell() {
            if editing == cell {
                return true;
            }
            if self.exit_locked(true).await != EditOutcome::Saved {
                return false;
            }
        }

        if self.state().selected_cell_index != Some(cell) {
            self.selection.select_cell(cell.row, cell.column);
        }
        if self.state().selected_cell_index != Some(cell) {
            return false;
        }
        self.store.dispatch(TableAction::EnterCellEditMode);
        self.emit(TableEventKind::EditingStart, cell, Vec::new());
        true
    }

    pub(crate) async fn exit_locked(&self, should_save: bool) -> EditOutcome {
        let state = self.state();
        let Some(cell) = state.editing_cell() else {
            return EditOutcome::NotEditing;
        };

        if !should_save {
            if let Some(form) = state.form(cell) {
                form.discard();
            }
            self.store.dispatch(TableAction::ExitCellEditMode);
            self.emit(TableEventKind::EditingExit, cell, Vec::new());
            return EditOutcome::Discarded;
        }

        let value = match self.validate_locked(cell).await {
            Ok(value) => value,
            Err(_) => return EditOutcome::Rejected,
        };
        match self.commit_locked(cell, value).await {
            Ok(()) => EditOutcome::Saved,
            Err(_) => EditOutcome::Rejected,
        }
    }

    async fn validate_locked(&self, cell: CellIndex) -> Result<CellValue, Vec<String>> {
        let state = self.state();
        let Some(form) = state.form(cell).cloned() else {
            // Nothing to edit, so nothing can be invalid.
            return Ok(self
                .create_cell_context(cell.row, cell.column)
                .map(|c| c.value)
                .unwrap_or_default());
        };
        let rules = match state.columns.get(cell.column) {
            Some(column) => state.config.validators.rules_for(&column.props, &column.validators),
            None => Vec::new(),
        };
        let form_state = form.form_state(state.is_insert_row(cell.row));

        let result = form.validate(&rules, &form_state).await;
        if result.is_valid() {
            if state.selected_row_errors.is_some() {
                self.store.dispatch(TableAction::SetRowErrors(None));
                self.emit(TableEventKind::ValidationErrorChange, cell, Vec::new());
            }
            self.emit(TableEventKind::ValidationSuccess, cell, Vec::new());
            Ok(form.value())
        } else {
            let messages = result.messages();
            self.fail(cell, messages.clone());
            Err(messages)
        }
    }

    async fn commit_locked(&self, cell: CellIndex, value: CellValue) -> Result<(), Vec<String>> {
        let state = self.state();
        let Some(column) = state.columns.get(cell.column) else {
            return Err(vec![
                TableError::ColumnOutOfRange {
                    index: cell.column,
                    count: state.columns.len(),
                }
                .to_string(),
            ]);
        };

        if let Some(handler) = column.on_save.clone() {
            let Some(context) = CellContext::build(&state, cell) else {
                return Err(vec![format!("Cell {cell} no longer exists")]);
            };
            self.store.dispatch(TableAction::SetPendingCell(Some(cell)));
            let save = handler.save(value.clone(), context);
            let outcome = match state.config.save_timeout {
                Some(limit) => tokio::time::timeout(limit, save)
                    .await
                    .unwrap_or(Err(SaveError::TimedOut(limit))),
                None => save.await,
            };
            self.store.dispatch(TableAction::SetPendingCell(None));

            let failure = match outcome {
                Ok(true) => None,
                Ok(false) => Some(SaveError::Rejected),
                Err(err) => Some(err),
            };
            if let Some(err) = failure {
                log::warn!("Save of {} at {cell} failed: {err}", column.field);
                let messages = vec![err.to_string()];
                self.fail(cell, messages.clone());
                return Err(messages);
            }
        }

        let state = self.state();
        if state.is_insert_row(cell.row) {
            self.insert_from_forms(&state, cell, value);
        } else {
            match (&column.value_setter, state.row(cell.row)) {
                (Some(set), Some(row)) => {
                    let mut row = row.clone();
                    set(&mut row, value);
                    self.store.dispatch(TableAction::UpdateRow {
                        index: cell.row,
                        data: row,
                    });
                }
                _ => {
                    if let Some(form) = state.form(cell) {
                        form.reset(value);
                    }
                }
            }
        }

        self.store.dispatch(TableAction::ExitCellEditMode);
        self.emit(TableEventKind::EditingSave, cell, Vec::new());
        self.emit(TableEventKind::EditingExit, cell, Vec::new());
        Ok(())
    }

    /// Build a row from the insert row's forms and append it.
    fn insert_from_forms(&self, state: &TableState<T>, cell: CellIndex, value: CellValue) {
        let Some(new_row) = &state.config.new_row else {
            return;
        };
        let mut row = new_row();
        for (index, column) in state.columns.iter().enumerate() {
            let Some(set) = &column.value_setter else {
                continue;
            };
            if index == cell.column {
                set(&mut row, value.clone());
            } else if let Some(form) = state.form(CellIndex::new(cell.row, index)) {
                if form.is_dirty() {
                    set(&mut row, form.value());
                }
            }
        }
        self.store.dispatch(TableAction::InsertRow(row));
    }

    fn fail(&self, cell: CellIndex, messages: Vec<String>) {
        let changed = self.state().selected_row_errors.as_ref() != Some(&messages);
        self.store
            .dispatch(TableAction::SetRowErrors(Some(messages.clone())));
        self.emit(TableEventKind::ValidationError, cell, messages.clone());
        if changed {
            self.emit(TableEventKind::ValidationErrorChange, cell, messages);
        }
    }

    /// Delete rows by row index.
    ///
    /// Indexes outside the data (including the insert row) are skipped.
    /// Returns the number of rows removed.
    pub async fn delete_rows(&self, indexes: Vec<usize>) -> usize {
        let _lane = self.lane.lock().await;
        self.delete_locked(indexes)
    }

    pub(crate) fn delete_locked(&self, indexes: Vec<usize>) -> usize {
        if !self.can_delete() {
            return 0;
        }
        let state = self.state();
        let indexes: BTreeSet<usize> = indexes
            .into_iter()
            .filter(|&i| state.is_data_row(i))
            .collect();
        if indexes.is_empty() {
            return 0;
        }

        if let Some(on_delete) = &state.config.on_delete {
            let rows: Vec<T> = indexes
                .iter()
                .filter_map(|&i| state.row(i).cloned())
                .collect();
            on_delete(&rows);
        }
        let editing = state.editing_cell().filter(|c| indexes.contains(&c.row));

        let count = indexes.len();
        self.store
            .dispatch(TableAction::DeleteRows(indexes.into_iter().collect()));
        if let Some(cell) = editing {
            self.emit(TableEventKind::EditingExit, cell, Vec::new());
        }
        log::debug!("Deleted {count} rows");
        count
    }

    /// Sort by a column. `None` restores the original row order.
    pub async fn sort_rows(
        &self,
        column: usize,
        direction: Option<SortDirection>,
    ) -> Result<(), TableError> {
        let _lane = self.lane.lock().await;
        self.sort_locked(column, direction)
    }

    /// Advance a column's sort the way a header click does.
    pub async fn toggle_sort(&self, column: usize) -> Result<(), TableError> {
        let _lane = self.lane.lock().await;
        let next = next_sort(self.state().sort_state, column);
        self.sort_locked(column, next.map(|s| s.direction))
    }

    fn sort_locked(&self, column: usize, direction: Option<SortDirection>) -> Result<(), TableError> {
        let state = self.state();
        let Some(def) = state.columns.get(column) else {
            return Err(TableError::ColumnOutOfRange {
                index: column,
                count: state.columns.len(),
            });
        };
        let sort = match direction {
            Some(direction) if def.sortable => Some(SortState {
                column_index: column,
                direction,
            }),
            Some(_) => {
                log::debug!("Column {} is not sortable", def.field);
                return Ok(());
            }
            None => None,
        };
        self.store.dispatch(TableAction::SetSortState(sort));
        Ok(())
    }

    /// Append a row. Returns false when adding is disabled.
    pub fn add_row(&self, row: T) -> bool {
        if !self.can_add() {
            return false;
        }
        self.store.dispatch(TableAction::InsertRow(row));
        true
    }

    /// Replace every row. A pending edit is discarded.
    pub async fn set_data(&self, rows: Vec<T>) {
        let _lane = self.lane.lock().await;
        self.replace_locked(TableAction::SetData(rows));
    }

    /// Restore the rows last passed to [`set_data`](Self::set_data) or
    /// the table constructor. A pending edit is discarded.
    pub async fn reset_data(&self) {
        let _lane = self.lane.lock().await;
        self.replace_locked(TableAction::ResetData);
    }

    fn replace_locked(&self, action: TableAction<T>) {
        let editing = self.state().editing_cell();
        self.store.dispatch(action);
        if let Some(cell) = editing {
            self.emit(TableEventKind::EditingExit, cell, Vec::new());
        }
    }
}

impl<T> Clone for TableApi<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            store: self.store.clone(),
            selection: self.selection.clone(),
            events: self.events.clone(),
            lane: Arc::clone(&self.lane),
        }
    }
}

impl<T> fmt::Debug for TableApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableApi")
            .field("id", &self.id)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
