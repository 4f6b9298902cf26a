//! The single-writer state store.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::TableRow;
use crate::action::TableAction;
use crate::reducer::reduce;
use crate::state::TableState;

struct StoreInner<T> {
    state: RwLock<Arc<TableState<T>>>,
    dirty: AtomicBool,
}

/// Holds the current snapshot and applies actions through the reducer.
///
/// Cloning is cheap; clones share the same snapshot. Readers get an
/// `Arc` to an immutable snapshot, so a reader holding an old snapshot
/// never blocks the writer.
pub struct TableStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T: TableRow> TableStore<T> {
    /// Create a store and bind its dispatcher into the initial state.
    pub fn new(initial: TableState<T>) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Arc::new(initial)),
                dirty: AtomicBool::new(false),
            }),
        };
        // The dispatcher can only exist once the store does.
        store.dispatch(TableAction::SetDispatch(store.dispatcher()));
        store
    }

    /// Apply an action.
    pub fn dispatch(&self, action: TableAction<T>) {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = reduce(&guard, action);
        *guard = Arc::new(next);
        self.inner.dirty.store(true, Ordering::SeqCst);
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<TableState<T>> {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// A dispatch handle that does not keep the store alive.
    pub fn dispatcher(&self) -> Dispatcher<T> {
        Dispatcher {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Check if the state changed since the last `take_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Read and reset the dirty flag.
    pub fn take_dirty(&self) -> bool {
        self.inner.dirty.swap(false, Ordering::SeqCst)
    }
}

impl<T> Clone for TableStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for TableStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("dirty", &self.inner.dirty.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Weak back-reference to a store, carried inside the state it manages.
pub struct Dispatcher<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T: TableRow> Dispatcher<T> {
    /// Dispatch to the owning store. Returns false once the table is gone.
    pub fn dispatch(&self, action: TableAction<T>) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                TableStore { inner }.dispatch(action);
                true
            }
            None => {
                log::debug!("Dropping {} for an unmounted table", action.name());
                false
            }
        }
    }
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
