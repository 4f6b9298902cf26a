//! Table configuration.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::TableRow;
use crate::column::RowComparator;
use crate::drag::RowReorder;
use crate::error::TableError;
use crate::selection::SelectionMode;
use crate::validation::ValidatorRegistry;
use crate::value::CellValue;

pub type RowFactory<T> = Arc<dyn Fn() -> T + Send + Sync>;
pub type DeleteHandler<T> = Arc<dyn Fn(&[T]) + Send + Sync>;
pub type ReorderHandler<T> = Arc<dyn Fn(RowReorder<T>) + Send + Sync>;

/// Per-table configuration.
///
/// Capabilities that are switched off turn the matching operations into
/// silent no-ops rather than errors.
pub struct TableConfig<T> {
    /// Row selection behaviour.
    pub selection_mode: SelectionMode,
    /// Whether single cells can be selected (and therefore edited).
    pub cell_selection: bool,
    /// Whether selected rows may be deleted.
    pub allow_delete: bool,
    /// Whether rows may be reordered by dragging.
    pub allow_reorder: bool,
    /// Upper bound for a column's save handler. `None` waits indefinitely.
    pub save_timeout: Option<Duration>,
    /// Creates blank rows for the trailing insert row. Enables adding.
    pub new_row: Option<RowFactory<T>>,
    /// Notified with the rows removed by a delete.
    pub on_delete: Option<DeleteHandler<T>>,
    /// Notified with the rows moved by a drop.
    pub on_reorder: Option<ReorderHandler<T>>,
    /// Comparator for sortable columns without their own.
    pub default_comparator: Option<RowComparator>,
    /// Validators available to columns by name.
    pub validators: ValidatorRegistry,
}

impl<T: TableRow> Default for TableConfig<T> {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::Multiple,
            cell_selection: true,
            allow_delete: false,
            allow_reorder: false,
            save_timeout: None,
            new_row: None,
            on_delete: None,
            on_reorder: None,
            default_comparator: None,
            validators: ValidatorRegistry::with_builtins(),
        }
    }
}

impl<T: TableRow> TableConfig<T> {
    /// Create a config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row selection mode.
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Enable or disable cell selection.
    pub fn cell_selection(mut self, enabled: bool) -> Self {
        self.cell_selection = enabled;
        self
    }

    /// Allow deleting selected rows.
    pub fn deletable(mut self) -> Self {
        self.allow_delete = true;
        self
    }

    pub fn on_delete(mut self, f: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Arc::new(f));
        self
    }

    /// Allow drag-reordering rows.
    pub fn reorderable(mut self) -> Self {
        self.allow_reorder = true;
        self
    }

    pub fn on_reorder(mut self, f: impl Fn(RowReorder<T>) + Send + Sync + 'static) -> Self {
        self.on_reorder = Some(Arc::new(f));
        self
    }

    /// Enable the insert row, building new rows with `f`.
    pub fn addable(mut self, f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.new_row = Some(Arc::new(f));
        self
    }

    pub fn save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = Some(timeout);
        self
    }

    pub fn default_comparator(
        mut self,
        f: impl Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.default_comparator = Some(Arc::new(f));
        self
    }

    pub fn validators(mut self, registry: ValidatorRegistry) -> Self {
        self.validators = registry;
        self
    }

    /// Apply plain options on top of this config.
    pub fn with_options(mut self, options: &TableOptions) -> Self {
        self.selection_mode = options.selection_mode;
        self.cell_selection = options.cell_selection;
        self.allow_delete = options.allow_delete;
        self.allow_reorder = options.allow_reorder;
        self.save_timeout = options.save_timeout_ms.map(Duration::from_millis);
        self
    }

    /// Check if the insert row is enabled.
    pub fn can_add(&self) -> bool {
        self.new_row.is_some()
    }

    /// Check if row selection is enabled at all.
    pub fn row_selection(&self) -> bool {
        self.selection_mode != SelectionMode::None
    }
}

impl<T> fmt::Debug for TableConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("selection_mode", &self.selection_mode)
            .field("cell_selection", &self.cell_selection)
            .field("allow_delete", &self.allow_delete)
            .field("allow_reorder", &self.allow_reorder)
            .field("save_timeout", &self.save_timeout)
            .field("can_add", &self.new_row.is_some())
            .finish_non_exhaustive()
    }
}

/// Serializable capability flags, e.g. loaded from a host's settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    pub selection_mode: SelectionMode,
    pub cell_selection: bool,
    pub allow_delete: bool,
    pub allow_reorder: bool,
    pub save_timeout_ms: Option<u64>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::Multiple,
            cell_selection: true,
            allow_delete: false,
            allow_reorder: false,
            save_timeout_ms: None,
        }
    }
}

impl TableOptions {
    /// Parse options from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }
}
