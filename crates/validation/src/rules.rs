//! Schemas and the rules they are built from

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// JSON value kinds a [`Rule::Kind`] check can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::Object => write!(f, "object"),
        }
    }
}

/// A single validation rule applied to one field.
///
/// Every rule except [`Rule::Required`] is skipped when the field is absent
/// or explicitly null; combine with `Required` to forbid absence.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Field must be present and non-null
    Required,
    /// Field must be of the given JSON kind
    Kind(ValueKind),
    /// Minimum length for strings (characters) and arrays (elements)
    MinLength(usize),
    /// Maximum length for strings (characters) and arrays (elements)
    MaxLength(usize),
    /// Minimum numeric value, inclusive
    Min(f64),
    /// Maximum numeric value, inclusive
    Max(f64),
    /// Strings must match the pattern
    Pattern(Regex),
}

/// An ordered set of per-field validation rules
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, Vec<Rule>>,
}

impl Schema {
    /// Create an empty schema, which accepts every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rules for a field
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.insert(name.into(), rules.into_iter().collect());
        self
    }

    /// Append one rule to a field
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.fields.entry(name.into()).or_default().push(rule);
        self
    }

    /// Shorthand for `rule(name, Rule::Required)`
    pub fn require(self, name: impl Into<String>) -> Self {
        self.rule(name, Rule::Required)
    }

    /// True when the schema declares no rules at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over declared fields and their rules
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }
}

/// Validate an attribute mapping against a schema.
///
/// Returns one error descriptor per failed rule; an empty vector means the
/// document is valid.
pub fn validate(attributes: &Map<String, Value>, schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, rules) in schema.fields() {
        let value = attributes.get(field);
        for rule in rules {
            if let Some(error) = check(field, value, rule) {
                errors.push(error);
            }
        }
    }

    errors
}

fn check(field: &str, value: Option<&Value>, rule: &Rule) -> Option<ValidationError> {
    let present = match value {
        None | Some(Value::Null) => {
            if matches!(rule, Rule::Required) {
                return Some(ValidationError::with_code(field, "is required", "required"));
            }
            return None;
        }
        Some(value) => value,
    };

    match rule {
        Rule::Required => None,
        Rule::Kind(kind) => (!kind.matches(present)).then(|| {
            ValidationError::with_code(field, format!("must be a {}", kind), "type")
        }),
        Rule::MinLength(min) => {
            let length = value_length(present)?;
            (length < *min).then(|| {
                ValidationError::with_code(
                    field,
                    format!("must have at least {} element(s), found {}", min, length),
                    "min_length",
                )
            })
        }
        Rule::MaxLength(max) => {
            let length = value_length(present)?;
            (length > *max).then(|| {
                ValidationError::with_code(
                    field,
                    format!("must have at most {} element(s), found {}", max, length),
                    "max_length",
                )
            })
        }
        Rule::Min(min) => {
            let number = present.as_f64()?;
            (number < *min).then(|| {
                ValidationError::with_code(field, format!("must be at least {}", min), "min")
            })
        }
        Rule::Max(max) => {
            let number = present.as_f64()?;
            (number > *max).then(|| {
                ValidationError::with_code(field, format!("must be at most {}", max), "max")
            })
        }
        Rule::Pattern(pattern) => {
            let text = present.as_str()?;
            (!pattern.is_match(text)).then(|| {
                ValidationError::with_code(
                    field,
                    format!("does not match pattern {}", pattern),
                    "pattern",
                )
            })
        }
    }
}

fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}
