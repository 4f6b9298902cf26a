//! Headless state engine for the Object Set Table.
//!
//! The table keeps one authoritative [`TableState`] behind a reducer. Every
//! change, whether it comes from a click, a key press, a drag or a host
//! application call, is expressed as a [`TableAction`] and applied by
//! [`reduce`]. On top of the store sit the [`SelectionManager`], the private
//! [`TableApi`] used by renderers, and the restricted [`PublicTableApi`]
//! handed to host applications.

pub mod action;
pub mod api;
pub mod column;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod keyboard;
pub mod reducer;
pub mod render;
pub mod selection;
pub mod sort;
pub mod state;
pub mod store;
pub mod table;
pub mod validation;
pub mod value;

pub use action::TableAction;
pub use api::{CellContext, EditOutcome, PublicMethod, PublicTableApi, TableApi};
pub use reducer::reduce;
pub use selection::{SelectionManager, SelectionMode};
pub use state::{CellIndex, EditPhase, IndexedRow, SortDirection, SortState, TableState};
pub use store::{Dispatcher, TableStore};
pub use table::{ObjectSetTable, TableId};

/// Bound shared by every row type a table can hold.
///
/// Rows are cloned into each new state snapshot and handed to async save
/// handlers, so they must be cheap enough to clone and safe to send.
pub trait TableRow: Clone + std::fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + std::fmt::Debug + Send + Sync + 'static> TableRow for T {}

pub mod prelude {
    pub use crate::TableRow;
    pub use crate::api::{CellContext, EditOutcome, PublicMethod, PublicTableApi, TableApi};
    pub use crate::column::{Alignment, ColumnDef, ColumnType, FnSaveHandler, SaveHandler};
    pub use crate::config::{TableConfig, TableOptions};
    pub use crate::drag::{DragPayload, RowReorder};
    pub use crate::error::{SaveError, TableError};
    pub use crate::events::{TableEvent, TableEventKind};
    pub use crate::keyboard::{Key, KeyCombo, KeyOutcome, Modifiers};
    pub use crate::render::TableElement;
    pub use crate::selection::{SelectionManager, SelectionMode};
    pub use crate::state::{CellIndex, EditPhase, SortDirection, SortState, TableState};
    pub use crate::table::ObjectSetTable;
    pub use crate::validation::{FieldProps, FormState, Rule, ValidationResult, ValidatorRegistry};
    pub use crate::value::CellValue;
}
