/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Column field key.
    pub field_name: String,
    /// Error message.
    pub message: String,
}

/// Result of validating a cell form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every rule passed.
    #[default]
    Valid,
    /// One or more rules failed.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Error messages, in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.errors().iter().map(|e| e.message.clone()).collect()
    }
}
