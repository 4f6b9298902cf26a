//! Named validator factories.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;

use crate::value::CellValue;

/// Props a column hands to validator factories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldProps {
    /// Column field key.
    pub field: String,
    /// Human-readable name used in messages.
    pub label: String,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Replaces the built-in message of every rule on this column.
    pub message: Option<String>,
}

impl FieldProps {
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            label: field.clone(),
            field,
            ..Default::default()
        }
    }

    fn message_or(&self, fallback: String) -> String {
        self.message.clone().unwrap_or(fallback)
    }
}

/// Snapshot of the cell form handed to every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub field: String,
    /// Value before editing started.
    pub original: CellValue,
    /// Whether the value changed since editing started.
    pub dirty: bool,
    /// Whether the cell is on the insert row.
    pub is_new_row: bool,
}

pub type SyncRule = Arc<dyn Fn(&CellValue, &FormState) -> Result<(), String> + Send + Sync>;
pub type AsyncRule =
    Arc<dyn Fn(CellValue, FormState) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// A single validation rule produced by a factory.
#[derive(Clone)]
pub enum Rule {
    Sync(SyncRule),
    Async(AsyncRule),
}

impl Rule {
    pub fn sync(
        f: impl Fn(&CellValue, &FormState) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self::Sync(Arc::new(f))
    }

    pub fn with_async<F, Fut>(f: F) -> Self
    where
        F: Fn(CellValue, FormState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        Self::Async(Arc::new(
            move |value, state| -> BoxFuture<'static, Result<(), String>> {
                Box::pin(f(value, state))
            },
        ))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Sync(_) => f.write_str("Rule::Sync"),
            Rule::Async(_) => f.write_str("Rule::Async"),
        }
    }
}

/// Builds a rule from a column's props. `None` means the props do not
/// configure this validator and it is skipped.
pub type ValidatorFactory = Arc<dyn Fn(&FieldProps) -> Option<Rule> + Send + Sync>;

/// Validators available to columns by name.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `required`, `min_length`, `max_length`,
    /// `pattern`, `email` and `range`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("required", |props| {
            let msg = props.message_or(format!("{} is required", props.label));
            Some(Rule::sync(move |v, _| {
                if v.is_blank() { Err(msg.clone()) } else { Ok(()) }
            }))
        });
        registry.register("min_length", |props| {
            let min = props.min_length?;
            let msg = props.message_or(format!(
                "{} must be at least {min} characters",
                props.label
            ));
            Some(Rule::sync(move |v, _| match v {
                CellValue::Null => Ok(()),
                v if v.to_string().chars().count() >= min => Ok(()),
                _ => Err(msg.clone()),
            }))
        });
        registry.register("max_length", |props| {
            let max = props.max_length?;
            let msg = props.message_or(format!(
                "{} must be at most {max} characters",
                props.label
            ));
            Some(Rule::sync(move |v, _| {
                if v.to_string().chars().count() <= max {
                    Ok(())
                } else {
                    Err(msg.clone())
                }
            }))
        });
        registry.register("pattern", |props| {
            let pattern = props.pattern.as_deref()?;
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(err) => {
                    log::warn!("Skipping pattern validator on '{}': {err}", props.field);
                    return None;
                }
            };
            let msg = props.message_or(format!("{} has an invalid format", props.label));
            Some(Rule::sync(move |v, _| match v {
                CellValue::Null => Ok(()),
                v if re.is_match(&v.to_string()) => Ok(()),
                _ => Err(msg.clone()),
            }))
        });
        registry.register("email", |props| {
            let msg = props.message_or(format!("{} must be a valid email address", props.label));
            Some(Rule::sync(move |v, _| {
                // Empty is valid; use required() for non-empty.
                if v.is_blank() || email_address::EmailAddress::is_valid(&v.to_string()) {
                    Ok(())
                } else {
                    Err(msg.clone())
                }
            }))
        });
        registry.register("range", |props| {
            if props.min.is_none() && props.max.is_none() {
                return None;
            }
            let (min, max) = (props.min, props.max);
            let label = props.label.clone();
            let custom = props.message.clone();
            Some(Rule::sync(move |v, _| {
                if v.is_null() {
                    return Ok(());
                }
                let Some(x) = v.as_f64() else {
                    return Err(custom.clone().unwrap_or(format!("{label} must be a number")));
                };
                let below = min.is_some_and(|min| x < min);
                let above = max.is_some_and(|max| x > max);
                if below || above {
                    Err(custom.clone().unwrap_or_else(|| match (min, max) {
                        (Some(min), Some(max)) => format!("{label} must be between {min} and {max}"),
                        (Some(min), None) => format!("{label} must be at least {min}"),
                        (None, Some(max)) => format!("{label} must be at most {max}"),
                        (None, None) => format!("{label} is out of range"),
                    }))
                } else {
                    Ok(())
                }
            }))
        });
        registry
    }

    /// Register (or replace) a validator factory.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&FieldProps) -> Option<Rule> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the rules named by a column. Unknown names are logged and skipped.
    pub fn rules_for(&self, props: &FieldProps, names: &[String]) -> Vec<Rule> {
        names
            .iter()
            .filter_map(|name| match self.factories.get(name) {
                Some(factory) => factory(props),
                None => {
                    log::warn!("Unknown validator '{name}' on column '{}'", props.field);
                    None
                }
            })
            .collect()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
