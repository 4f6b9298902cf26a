//! Derived view of a table snapshot.
//!
//! [`TableElement`] is what a renderer draws: formatted cell text plus the
//! highlight, edit and drop-target flags derived from the state. Its
//! `Display` impl lays it out as a plain text grid.

use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::TableRow;
use crate::api::CellContext;
use crate::column::Alignment;
use crate::state::{CellIndex, SortDirection, TableState};
use crate::table::TableId;

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub field: String,
    pub title: String,
    pub align: Alignment,
    pub sortable: bool,
    /// Direction if the table is sorted by this column.
    pub sort: Option<SortDirection>,
    pub width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellElement {
    pub column: usize,
    pub text: String,
    pub align: Alignment,
    pub selected: bool,
    pub editing: bool,
    /// A save for this cell is still running.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowElement {
    /// Row index. For the insert row this is the number of data rows.
    pub index: usize,
    pub is_insert_row: bool,
    /// Row highlight. Suppressed while a cell is selected.
    pub selected: bool,
    pub drop_target: bool,
    pub cells: Vec<CellElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableElement {
    pub id: TableId,
    pub headers: Vec<HeaderCell>,
    /// Rows in display order, insert row last.
    pub rows: Vec<RowElement>,
    /// Errors for the row holding the selected cell.
    pub errors: Vec<String>,
}

impl TableElement {
    /// Row by row index.
    pub fn row(&self, index: usize) -> Option<&RowElement> {
        self.rows.iter().find(|r| r.index == index)
    }

    pub fn cell(&self, cell: CellIndex) -> Option<&CellElement> {
        self.row(cell.row)?.cells.get(cell.column)
    }
}

pub(crate) fn build_element<T: TableRow>(id: TableId, state: &TableState<T>) -> TableElement {
    let headers = state
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| HeaderCell {
            field: column.field.clone(),
            title: column.header().to_string(),
            align: column.alignment(),
            sortable: column.sortable,
            sort: state
                .sort_state
                .filter(|s| s.column_index == index)
                .map(|s| s.direction),
            width: column.effective_width(),
        })
        .collect();

    let cell_mode = state.selected_cell_index.is_some();
    let row_indexes = state
        .data
        .iter()
        .map(|r| r.index)
        .chain(state.config.can_add().then_some(state.data.len()));

    let rows = row_indexes
        .map(|index| RowElement {
            index,
            is_insert_row: state.is_insert_row(index),
            selected: !cell_mode && state.selected_row_indexes.contains(&index),
            drop_target: state.drop_target == Some(index),
            cells: (0..state.columns.len())
                .filter_map(|column| build_cell(state, CellIndex::new(index, column)))
                .collect(),
        })
        .collect();

    TableElement {
        id,
        headers,
        rows,
        errors: state.selected_row_errors.clone().unwrap_or_default(),
    }
}

fn build_cell<T: TableRow>(state: &TableState<T>, cell: CellIndex) -> Option<CellElement> {
    let column = state.columns.get(cell.column)?;
    let context = CellContext::build(state, cell)?;
    let text = if context.is_editing {
        let pending = context.form.as_ref().map(|f| f.value());
        match &column.render_cell_editor {
            Some(render) => render(&context),
            None => column.format(pending.as_ref().unwrap_or(&context.value)),
        }
    } else {
        match &column.render_cell {
            Some(render) => render(&context),
            None => column.format(&context.value),
        }
    };
    Some(CellElement {
        column: cell.column,
        text,
        align: column.alignment(),
        selected: context.is_selected,
        editing: context.is_editing,
        pending: state.pending_cell == Some(cell),
    })
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let target = max_width - 1;
    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > target {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

fn pad(s: &str, width: usize, align: Alignment) -> String {
    let s = truncate_to_width(s, width);
    let gap = width.saturating_sub(s.width());
    match align {
        Alignment::Left => format!("{s}{}", " ".repeat(gap)),
        Alignment::Right => format!("{}{s}", " ".repeat(gap)),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{s}{}", " ".repeat(left), " ".repeat(gap - left))
        }
    }
}

impl TableElement {
    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                if let Some(width) = header.width {
                    return usize::from(width);
                }
                let content = self
                    .rows
                    .iter()
                    .filter_map(|r| r.cells.get(index))
                    .map(|c| c.text.width() + 3)
                    .max()
                    .unwrap_or(0);
                let marker = if header.sort.is_some() { 2 } else { 0 };
                content.max(header.title.width() + marker + 1)
            })
            .collect()
    }
}

impl fmt::Display for TableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        write!(f, "  ")?;
        for (header, &width) in self.headers.iter().zip(&widths) {
            let marker = match header.sort {
                Some(SortDirection::Asc) => " ▲",
                Some(SortDirection::Desc) => " ▼",
                None => "",
            };
            write!(f, "{} ", pad(&format!("{}{marker}", header.title), width, header.align))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            let gutter = if row.drop_target {
                '_'
            } else if row.selected {
                '>'
            } else if row.is_insert_row {
                '+'
            } else {
                ' '
            };
            write!(f, "{gutter} ")?;
            for (cell, &width) in row.cells.iter().zip(&widths) {
                let text = if cell.editing {
                    format!("[{}▏]", cell.text)
                } else if cell.selected {
                    format!("[{}]", cell.text)
                } else {
                    cell.text.clone()
                };
                write!(f, "{} ", pad(&text, width, cell.align))?;
            }
            writeln!(f)?;
        }

        for error in &self.errors {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}
