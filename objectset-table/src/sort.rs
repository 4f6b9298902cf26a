//! Row sorting.

use std::cmp::Ordering;

use crate::TableRow;
use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::state::{IndexedRow, SortDirection, SortState};
use crate::value::CellValue;

/// Sort rows by one column.
///
/// Returns a new vector and leaves `rows` untouched. With no sort state the
/// rows come back in their given order. Rows whose value is null go last in
/// both directions; everything else uses the column comparator (falling back
/// to the table default, then to the column type), reversed for
/// [`SortDirection::Desc`]. The sort is stable.
pub fn sort_data<T: TableRow>(
    rows: &[IndexedRow<T>],
    sort_state: Option<&SortState>,
    column: &ColumnDef<T>,
    config: &TableConfig<T>,
) -> Vec<IndexedRow<T>> {
    let Some(sort) = sort_state else {
        return rows.to_vec();
    };

    let mut keyed: Vec<(CellValue, &IndexedRow<T>)> =
        rows.iter().map(|row| (column.value(&row.data), row)).collect();

    let compare = |a: &CellValue, b: &CellValue| -> Ordering {
        if let Some(cmp) = &column.row_comparator {
            cmp(a, b)
        } else if let Some(cmp) = &config.default_comparator {
            cmp(a, b)
        } else {
            column.column_type.compare(a, b)
        }
    };

    keyed.sort_by(|(a, _), (b, _)| match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare(a, b);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    });

    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}

/// Next sort for a header click: ascending, descending, then unsorted.
pub fn next_sort(current: Option<SortState>, column_index: usize) -> Option<SortState> {
    match current {
        Some(SortState {
            column_index: c,
            direction: SortDirection::Asc,
        }) if c == column_index => Some(SortState {
            column_index,
            direction: SortDirection::Desc,
        }),
        Some(SortState {
            column_index: c,
            direction: SortDirection::Desc,
        }) if c == column_index => None,
        _ => Some(SortState {
            column_index,
            direction: SortDirection::Asc,
        }),
    }
}
