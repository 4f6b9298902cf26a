//! Table APIs.
//!
//! [`TableApi`] is the full API used by the table's own renderers and input
//! handlers. It can read the raw state and configuration. Host applications
//! get a [`PublicTableApi`] instead, which only forwards the documented
//! surface.

mod context;
mod private;
mod public;

pub use context::CellContext;
pub use private::{EditOutcome, TableApi};
pub use public::{PublicMethod, PublicTableApi};
