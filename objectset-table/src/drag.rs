//! Drag-and-drop row reordering.

use std::collections::BTreeSet;

use crate::TableRow;
use crate::action::TableAction;
use crate::api::{EditOutcome, TableApi};

/// Rows carried by an in-progress drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    /// Dragged row indexes, ascending.
    pub indexes: Vec<usize>,
    /// Label shown instead of the row itself when several rows move.
    pub preview: Option<String>,
}

impl DragPayload {
    pub fn new(indexes: Vec<usize>) -> Self {
        let preview = (indexes.len() > 1).then(|| format!("{} rows", indexes.len()));
        Self { indexes, preview }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// What the reorder callback receives on drop.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReorder<T> {
    /// The moved rows in display order.
    pub rows: Vec<T>,
    /// Row index of the drop target.
    pub target: usize,
}

/// Move the rows at `dragged` next to `target`. Positions, not row indexes.
///
/// Rows left of the target stay left, the rest stay right, and the dragged
/// block lands between them in its original relative order. Moving down
/// places the block after the target, moving up places it before. Dropping
/// onto one of the dragged rows changes nothing.
pub fn reorder_rows<R: Clone>(rows: &[R], dragged: &[usize], target: usize) -> Vec<R> {
    let dragged: BTreeSet<usize> = dragged.iter().copied().filter(|&p| p < rows.len()).collect();
    if dragged.is_empty() || dragged.contains(&target) || target >= rows.len() {
        return rows.to_vec();
    }
    let moving_down = dragged.last().is_some_and(|&last| target > last);

    let mut left = Vec::new();
    let mut block = Vec::with_capacity(dragged.len());
    let mut right = Vec::new();
    for (position, row) in rows.iter().enumerate() {
        if dragged.contains(&position) {
            block.push(row.clone());
        } else if position < target || (moving_down && position == target) {
            left.push(row.clone());
        } else {
            right.push(row.clone());
        }
    }

    left.extend(block);
    left.extend(right);
    left
}

impl<T: TableRow> TableApi<T> {
    /// Start dragging `row`. Returns `None` when reordering is disabled.
    ///
    /// The whole selection moves when `row` is part of it; otherwise only
    /// `row` does.
    pub fn drag_start(&self, row: usize) -> Option<DragPayload> {
        let state = self.state();
        if !state.config.allow_reorder || !state.is_data_row(row) {
            return None;
        }
        let indexes = if state.selected_row_indexes.contains(&row) {
            // Selection order follows the display, not the row index.
            state
                .data
                .iter()
                .map(|r| r.index)
                .filter(|i| state.selected_row_indexes.contains(i))
                .collect()
        } else {
            vec![row]
        };
        log::debug!("Drag started with rows {indexes:?}");
        Some(DragPayload::new(indexes))
    }

    /// Hover over `row`. Returns whether it accepts the drop.
    pub fn drag_over(&self, row: usize) -> bool {
        let state = self.state();
        let valid = state.config.allow_reorder && state.is_data_row(row);
        let target = valid.then_some(row);
        if state.drop_target != target {
            self.store().dispatch(TableAction::SetDropTarget(target));
        }
        valid
    }

    /// Abandon the drag.
    pub fn drag_end(&self) {
        if self.state().drop_target.is_some() {
            self.store().dispatch(TableAction::SetDropTarget(None));
        }
    }

    /// Drop the payload onto `target`.
    ///
    /// A cell being edited is committed first. Notifies the reorder callback
    /// with the moved rows, applies the move and clears the selection.
    /// Returns false when nothing moved.
    pub async fn drop_rows(&self, payload: DragPayload, target: usize) -> bool {
        let _lane = self.lane().lock().await;
        let state = self.state();
        if !state.config.allow_reorder
            || !state.is_data_row(target)
            || payload.is_empty()
            || payload.indexes.contains(&target)
        {
            self.drag_end();
            return false;
        }
        if state.editing_cell().is_some() && self.exit_locked(true).await != EditOutcome::Saved {
            log::debug!("Drop cancelled, the edited cell could not be saved");
            self.drag_end();
            return false;
        }
        let state = self.state();

        let moved: BTreeSet<usize> = payload.indexes.iter().copied().collect();
        let rows: Vec<T> = state
            .data
            .iter()
            .filter(|r| moved.contains(&r.index))
            .map(|r| r.data.clone())
            .collect();
        if let Some(on_reorder) = &state.config.on_reorder {
            on_reorder(RowReorder { rows, target });
        }

        self.store().dispatch(TableAction::ReorderRows {
            dragged: payload.indexes,
            target,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

    #[test]
    fn test_move_block_down() {
        assert_eq!(reorder_rows(&ROWS, &[1, 2], 3), vec!['A', 'D', 'B', 'C', 'E']);
    }

    #[test]
    fn test_move_up() {
        assert_eq!(reorder_rows(&ROWS, &[3], 1), vec!['A', 'D', 'B', 'C', 'E']);
        assert_eq!(reorder_rows(&ROWS, &[3, 4], 0), vec!['D', 'E', 'A', 'B', 'C']);
    }

    #[test]
    fn test_scattered_block_keeps_order() {
        assert_eq!(reorder_rows(&ROWS, &[4, 0], 2), vec!['B', 'A', 'E', 'C', 'D']);
    }

    #[test]
    fn test_drop_on_dragged_row_is_noop() {
        assert_eq!(reorder_rows(&ROWS, &[1, 2], 2), ROWS.to_vec());
        assert_eq!(reorder_rows(&ROWS, &[1], 9), ROWS.to_vec());
    }

    #[test]
    fn test_preview_label() {
        assert_eq!(DragPayload::new(vec![2]).preview, None);
        assert_eq!(DragPayload::new(vec![1, 2, 4]).preview.as_deref(), Some("3 rows"));
    }
}
