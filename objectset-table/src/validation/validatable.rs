//! Validatable trait for form handles.

/// Common interface for anything whose value can be validated and which can
/// carry an error message.
pub trait Validatable: Send + Sync {
    /// The value type used for validation.
    type Value;

    /// Extract the current value for validation.
    fn validation_value(&self) -> Self::Value;

    /// Set a validation error.
    fn set_error(&self, msg: impl Into<String>);

    /// Clear the validation error.
    fn clear_error(&self);

    /// Check if there is a validation error.
    fn has_error(&self) -> bool {
        self.error().is_some()
    }

    /// Get the current validation error message (if any).
    fn error(&self) -> Option<String>;

    /// Field key the errors are reported under.
    fn field_id(&self) -> String;
}
