//! Per-cell form handles.

use std::sync::{Arc, PoisonError, RwLock};

use super::registry::{FormState, Rule};
use super::result::{FieldError, ValidationResult};
use super::validatable::Validatable;
use crate::value::CellValue;

#[derive(Debug)]
struct FormInner {
    field: String,
    original: CellValue,
    value: CellValue,
    error: Option<String>,
}

/// An isolated form scope for one editable cell.
///
/// Editors write the pending value here; the table reads it back and
/// validates it before committing. Clones share the same form.
#[derive(Debug, Clone)]
pub struct CellForm {
    inner: Arc<RwLock<FormInner>>,
}

impl CellForm {
    pub fn new(field: impl Into<String>, value: CellValue) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FormInner {
                field: field.into(),
                original: value.clone(),
                value,
                error: None,
            })),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&FormInner) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut FormInner) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Pending value.
    pub fn value(&self) -> CellValue {
        self.read(|f| f.value.clone())
    }

    /// Value the form was mounted with.
    pub fn original(&self) -> CellValue {
        self.read(|f| f.original.clone())
    }

    /// Replace the pending value.
    pub fn set_value(&self, value: impl Into<CellValue>) {
        let value = value.into();
        self.write(|f| f.value = value);
    }

    /// Check if the pending value differs from the mounted value.
    pub fn is_dirty(&self) -> bool {
        self.read(|f| f.value != f.original)
    }

    /// Mount the form on a fresh value, dropping any pending input.
    pub fn reset(&self, value: CellValue) {
        self.write(|f| {
            f.original = value.clone();
            f.value = value;
            f.error = None;
        });
    }

    /// Throw away pending input.
    pub fn discard(&self) {
        self.write(|f| {
            f.value = f.original.clone();
            f.error = None;
        });
    }

    /// Snapshot handed to the rules.
    pub fn form_state(&self, is_new_row: bool) -> FormState {
        self.read(|f| FormState {
            field: f.field.clone(),
            original: f.original.clone(),
            dirty: f.value != f.original,
            is_new_row,
        })
    }

    /// Run every rule against the pending value.
    ///
    /// Synchronous and asynchronous rules run in the given order. All
    /// failures are collected; the first one is kept on the form.
    pub async fn validate(&self, rules: &[Rule], state: &FormState) -> ValidationResult {
        let value = self.validation_value();
        let field = self.field_id();
        let mut errors = Vec::new();

        for rule in rules {
            let outcome = match rule {
                Rule::Sync(f) => f(&value, state),
                Rule::Async(f) => f(value.clone(), state.clone()).await,
            };
            if let Err(message) = outcome {
                errors.push(FieldError {
                    field_name: field.clone(),
                    message,
                });
            }
        }

        match errors.first() {
            Some(first) => {
                self.set_error(first.message.clone());
                ValidationResult::Invalid(errors)
            }
            None => {
                self.clear_error();
                ValidationResult::Valid
            }
        }
    }
}

impl Validatable for CellForm {
    type Value = CellValue;

    fn validation_value(&self) -> CellValue {
        self.value()
    }

    fn set_error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        self.write(|f| f.error = Some(msg));
    }

    fn clear_error(&self) {
        self.write(|f| f.error = None);
    }

    fn error(&self) -> Option<String> {
        self.read(|f| f.error.clone())
    }

    fn field_id(&self) -> String {
        self.read(|f| f.field.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_empty() -> Rule {
        Rule::sync(|v, _| if v.is_blank() { Err("empty".into()) } else { Ok(()) })
    }

    fn not_taken() -> Rule {
        Rule::with_async(|v: CellValue, _| async move {
            if v.as_text() == Some("taken") { Err("taken".into()) } else { Ok(()) }
        })
    }

    #[tokio::test]
    async fn test_validate_collects_all_errors() {
        let form = CellForm::new("name", "bob".into());
        form.set_value("");
        let rules = [not_empty(), Rule::sync(|_, _| Err("always".into()))];
        let result = form.validate(&rules, &form.form_state(false)).await;
        assert_eq!(result.messages(), vec!["empty", "always"]);
        assert_eq!(form.error().as_deref(), Some("empty"));
    }

    #[tokio::test]
    async fn test_async_rule() {
        let form = CellForm::new("name", CellValue::Null);
        form.set_value("taken");
        let rules = [not_empty(), not_taken()];
        let result = form.validate(&rules, &form.form_state(true)).await;
        assert_eq!(result.messages(), vec!["taken"]);

        form.set_value("free");
        let result = form.validate(&rules, &form.form_state(true)).await;
        assert!(result.is_valid());
        assert!(!form.has_error());
    }

    #[test]
    fn test_discard_and_reset() {
        let form = CellForm::new("name", "a".into());
        form.set_value("b");
        assert!(form.is_dirty());
        form.discard();
        assert_eq!(form.value(), CellValue::from("a"));

        form.reset("c".into());
        assert_eq!(form.original(), CellValue::from("c"));
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_clones_share_state() {
        let form = CellForm::new("name", "a".into());
        let other = form.clone();
        other.set_value("z");
        assert_eq!(form.value(), CellValue::from("z"));
    }
}
