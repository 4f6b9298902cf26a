//! Cell validation.
//!
//! Each editable cell owns an isolated [`CellForm`]. When a commit is
//! requested the form runs the rules its column names, looked up in the
//! table's [`ValidatorRegistry`]:
//!
//! ```ignore
//! let column = ColumnDef::new("email")
//!     .editable()
//!     .validate_with("required")
//!     .validate_with("email");
//!
//! let form = CellForm::new("email", "not-an-email".into());
//! let rules = registry.rules_for(&column.props, &column.validators);
//! let result = form.validate(&rules, &form.form_state(false)).await;
//! assert!(result.is_invalid());
//! ```

mod form;
mod registry;
mod result;
mod validatable;

pub use form::CellForm;
pub use registry::{AsyncRule, FieldProps, FormState, Rule, SyncRule, ValidatorFactory, ValidatorRegistry};
pub use result::{FieldError, ValidationResult};
pub use validatable::Validatable;
