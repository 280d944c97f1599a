//! Validation rules.
//!
//! Two styles share one set of rule checks:
//!
//! - [`ValidatorRules`]: fail-fast chain over a single value. The first violated rule
//!   returns `DomainError::Validation("<property> <reason>")` and nothing after it runs.
//! - [`FieldsValidator`]: declarative per-field rule lists. Every rule of every field is
//!   evaluated and the violations are collected into [`FieldErrors`].
//!
//! Values are inspected as JSON so that both typed props (via `serde`) and raw input
//! can be checked the same way. `null` stands for an absent value.

use std::fmt;
use std::sync::Arc;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{DomainError, DomainResult, FieldErrors};

fn is_absent(value: &JsonValue) -> bool {
    value.is_null()
}

fn check_required(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => Some("is required".to_string()),
        JsonValue::String(s) if s.is_empty() => Some("is required".to_string()),
        _ => None,
    }
}

fn check_string(value: &JsonValue) -> Option<String> {
    if is_absent(value) || value.is_string() {
        None
    } else {
        Some("must be a string".to_string())
    }
}

fn check_boolean(value: &JsonValue) -> Option<String> {
    if is_absent(value) || value.is_boolean() {
        None
    } else {
        Some("must be a boolean".to_string())
    }
}

fn check_max_length(value: &JsonValue, max: usize) -> Option<String> {
    match value {
        JsonValue::String(s) if s.chars().count() > max => {
            Some(format!("must be less or equal than {max} characters"))
        }
        _ => None,
    }
}

fn check_date(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if DateTime::parse_from_rfc3339(s).is_ok() => None,
        _ => Some("must be a valid date".to_string()),
    }
}

/// Fail-fast rule chain over one value.
///
/// ```ignore
/// ValidatorRules::values(&json!(name), "name").required()?.string()?.max_length(255)?;
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorRules<'a> {
    value: &'a JsonValue,
    property: &'a str,
}

impl<'a> ValidatorRules<'a> {
    pub fn values(value: &'a JsonValue, property: &'a str) -> Self {
        Self { value, property }
    }

    pub fn value(&self) -> &JsonValue {
        self.value
    }

    pub fn property(&self) -> &str {
        self.property
    }

    /// Fails on `null` and the empty string. `0` and `false` are present values.
    pub fn required(self) -> DomainResult<Self> {
        let violation = check_required(self.value);
        self.check(violation)
    }

    pub fn string(self) -> DomainResult<Self> {
        let violation = check_string(self.value);
        self.check(violation)
    }

    pub fn boolean(self) -> DomainResult<Self> {
        let violation = check_boolean(self.value);
        self.check(violation)
    }

    pub fn max_length(self, max: usize) -> DomainResult<Self> {
        let violation = check_max_length(self.value, max);
        self.check(violation)
    }

    fn check(self, violation: Option<String>) -> DomainResult<Self> {
        match violation {
            None => Ok(self),
            Some(reason) => Err(DomainError::validation(format!("{} {}", self.property, reason))),
        }
    }
}

/// A single declarative rule.
#[derive(Clone)]
pub enum Rule {
    Required,
    String,
    Boolean,
    MaxLength(usize),
    /// RFC 3339 timestamp (how `chrono` serializes `DateTime`).
    Date,
    /// Arbitrary check returning the reason (without the property name) on failure.
    Custom(Arc<dyn Fn(&JsonValue) -> Option<String> + Send + Sync>),
}

impl Rule {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&JsonValue) -> Option<String> + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(check))
    }

    fn violation(&self, value: &JsonValue) -> Option<String> {
        match self {
            Rule::Required => check_required(value),
            Rule::String => check_string(value),
            Rule::Boolean => check_boolean(value),
            Rule::MaxLength(max) => check_max_length(value, *max),
            Rule::Date => check_date(value),
            Rule::Custom(check) => check(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("Required"),
            Rule::String => f.write_str("String"),
            Rule::Boolean => f.write_str("Boolean"),
            Rule::MaxLength(max) => write!(f, "MaxLength({max})"),
            Rule::Date => f.write_str("Date"),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Field name → ordered rule list, evaluated all at once.
#[derive(Debug, Clone, Default)]
pub struct FieldsValidator {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FieldsValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rules of one field. Rules run in the given order.
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Validate a JSON object. Missing fields are treated as `null`.
    pub fn validate_json(&self, data: &JsonValue) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for (name, rules) in &self.fields {
            let value = data.get(name).unwrap_or(&JsonValue::Null);
            for rule in rules {
                if let Some(reason) = rule.violation(value) {
                    errors.push(name.as_str(), format!("{name} {reason}"));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate any serializable value (typically an entity's props).
    pub fn validate<T: Serialize>(&self, data: &T) -> Result<(), FieldErrors> {
        let json = serde_json::to_value(data).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.push("_", format!("data could not be serialized: {e}"));
            errors
        })?;
        self.validate_json(&json)
    }
}
