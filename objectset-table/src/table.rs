//! Table mounting.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::TableRow;
use crate::api::{PublicTableApi, TableApi};
use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::state::TableState;
use crate::store::TableStore;

static NEXT_TABLE_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique id of a mounted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    fn next() -> Self {
        Self(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__table_{}", self.0)
    }
}

/// A mounted table.
///
/// Owns the store. API handles share it, so an awaited call always reads
/// the latest snapshot. Dispatchers inside snapshots are weak and stop
/// working once the table and every API handle are gone.
pub struct ObjectSetTable<T> {
    api: TableApi<T>,
}

impl<T: TableRow> ObjectSetTable<T> {
    /// Mount a table. Fails if two columns share a field key or a column
    /// names a validator missing from the registry.
    pub fn new(
        columns: Vec<ColumnDef<T>>,
        rows: Vec<T>,
        config: TableConfig<T>,
    ) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.field.as_str()) {
                return Err(TableError::DuplicateField(column.field.clone()));
            }
            if let Some(name) = column
                .validators
                .iter()
                .find(|name| !config.validators.contains(name))
            {
                return Err(TableError::UnknownValidator {
                    field: column.field.clone(),
                    name: name.clone(),
                });
            }
        }

        let id = TableId::next();
        let store = TableStore::new(TableState::new(columns, rows, Arc::new(config)));
        log::debug!(
            "Mounted table {id} with {} rows",
            store.state().row_count()
        );
        Ok(Self {
            api: TableApi::new(id, store),
        })
    }

    pub fn id(&self) -> TableId {
        self.api.id()
    }

    /// The full API, for renderers and input handling.
    pub fn api_ref(&self) -> &TableApi<T> {
        &self.api
    }

    /// The restricted API for host applications.
    pub fn api(&self) -> PublicTableApi<T> {
        PublicTableApi::new(self.api.clone())
    }
}

impl<T> fmt::Debug for ObjectSetTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSetTable")
            .field("api", &self.api)
            .finish()
    }
}
