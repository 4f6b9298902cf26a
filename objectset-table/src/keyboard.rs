//! Keyboard handling.
//!
//! [`TableApi::handle_key`] is the listener scoped to the table itself: it
//! drives cell navigation and edit mode. [`TableApi::handle_document_key`]
//! is the document-wide listener that deletes selected rows.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::TableRow;
use crate::api::TableApi;
use crate::state::{CellIndex, TableState};

/// Modifier keys state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };

    /// Check if any modifier is active
    pub fn any(&self) -> bool {
        self.ctrl || self.shift || self.alt
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            shift: mods.contains(KeyModifiers::SHIFT),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }
}

/// Keys the table reacts to, plus text input for editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
}

/// A key combination (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a key combo without modifiers
    pub const fn key(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub const fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    /// Convert a terminal key event. Releases and unsupported keys map to `None`.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let mut modifiers = Modifiers::from(event.modifiers);
        let key = match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => {
                modifiers.shift = true;
                Key::Tab
            }
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Delete => Key::Delete,
            _ => return None,
        };
        Some(Self::new(key, modifiers))
    }
}

/// Result of handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a table key; let the host handle it.
    Ignored,
    /// Handled by the table.
    Handled,
    /// Handled, and the host's default action (form submit, focus
    /// traversal) must not run.
    HandledPreventDefault,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

/// Cell one step away in display order, clamped to the grid.
fn step(state: &TableState<impl TableRow>, cell: CellIndex, key: &KeyCombo) -> Option<CellIndex> {
    let rows = state.grid_rows();
    let columns = state.columns.len();
    if rows == 0 || columns == 0 {
        return None;
    }
    let position = state.position_of(cell.row)?;
    let (position, column) = match key.key {
        Key::Up => (position.saturating_sub(1), cell.column),
        Key::Down => ((position + 1).min(rows - 1), cell.column),
        Key::Left => (position, cell.column.saturating_sub(1)),
        Key::Right => (position, (cell.column + 1).min(columns - 1)),
        Key::Tab => {
            // Reading order: across the row, then wrap to the next one.
            let linear = position * columns + cell.column;
            let linear = if key.modifiers.shift {
                linear.saturating_sub(1)
            } else {
                (linear + 1).min(rows * columns - 1)
            };
            (linear / columns, linear % columns)
        }
        _ => return None,
    };
    Some(CellIndex::new(state.index_at(position)?, column))
}

impl<T: TableRow> TableApi<T> {
    /// Handle a key pressed while the table has focus.
    pub async fn handle_key(&self, key: &KeyCombo) -> KeyOutcome {
        let _lane = self.lane().lock().await;
        let state = self.state();

        if state.is_cell_edit_mode {
            return match key.key {
                Key::Enter => {
                    self.exit_locked(true).await;
                    KeyOutcome::HandledPreventDefault
                }
                Key::Escape => {
                    self.exit_locked(false).await;
                    KeyOutcome::Handled
                }
                _ => KeyOutcome::Ignored,
            };
        }

        let Some(cell) = state.selected_cell_index else {
            return KeyOutcome::Ignored;
        };
        match key.key {
            Key::Enter => {
                if state.pending_cell != Some(cell) && self.can_edit_cell(cell.row, cell.column) {
                    self.enter_locked(cell).await;
                    KeyOutcome::HandledPreventDefault
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Up | Key::Down | Key::Left | Key::Right | Key::Tab => {
                if let Some(next) = step(&state, cell, key) {
                    if next != cell {
                        self.selection().select_cell(next.row, next.column);
                    }
                }
                if key.key == Key::Tab {
                    KeyOutcome::HandledPreventDefault
                } else {
                    KeyOutcome::Handled
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Handle a key pressed anywhere in the document.
    ///
    /// `Delete` removes the selected rows when deleting is allowed. The
    /// insert row is never part of a delete.
    pub async fn handle_document_key(&self, key: &KeyCombo) -> KeyOutcome {
        if key.key != Key::Delete {
            return KeyOutcome::Ignored;
        }
        let _lane = self.lane().lock().await;
        if !self.can_delete() || self.is_editing() {
            return KeyOutcome::Ignored;
        }
        let state = self.state();
        let indexes: Vec<usize> = state
            .selected_row_indexes
            .iter()
            .copied()
            .filter(|&i| state.is_data_row(i))
            .collect();
        if indexes.is_empty() {
            return KeyOutcome::Ignored;
        }
        self.delete_locked(indexes);
        KeyOutcome::Handled
    }
}
