//! Argument validation against the tool catalog.
//!
//! `validate` is a pure function of (registry, tool name, raw arguments):
//! rules are applied in a fixed order and the first failure wins. Error
//! messages name the offending field but never echo the offending value,
//! so attacker-controlled content is not reflected back through the
//! protocol stream.

use crate::registry::{FieldKind, FieldSpec, Pattern, Registry, ScalarKind, StringConstraint};
use serde_json::{Map, Value};
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown tool")]
    ToolNotFound,
    #[error("arguments must be an object")]
    NotAnObject,
    #[error("unexpected field '{0}'")]
    UnknownField(String),
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("field '{0}' has the wrong type")]
    WrongType(String),
    #[error("field '{0}' is outside its length bounds")]
    LengthOutOfBounds(String),
    #[error("field '{0}' does not match the expected format")]
    PatternMismatch(String),
    #[error("field '{0}' is out of range")]
    OutOfRange(String),
    #[error("field '{0}' has too many items")]
    TooManyItems(String),
}

/// A tool invocation whose arguments passed every rule: only declared
/// fields, defaults filled, strings trimmed. Produced fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCall {
    pub tool: String,
    pub arguments: Map<String, Value>,
}

/// Validate `raw_arguments` for `tool_name` against the registry.
///
/// Absent arguments validate as an empty mapping (required-field checks
/// still apply).
///
/// # Errors
///
/// Returns the first rule violation: unknown tool, non-mapping arguments,
/// undeclared key, then per-field type/length/pattern/bounds failures in
/// declaration order.
pub fn validate(
    registry: &Registry,
    tool_name: &str,
    raw_arguments: Option<&Value>,
) -> Result<ValidatedCall, ValidationError> {
    let descriptor = registry
        .describe(tool_name)
        .ok_or(ValidationError::ToolNotFound)?;

    let empty = Map::new();
    let raw = match raw_arguments {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ValidationError::NotAnObject),
    };

    // Reject undeclared keys before looking at any value, so nothing
    // unvalidated can be smuggled through to the upstream call.
    for key in raw.keys() {
        if descriptor.field(key).is_none() {
            return Err(ValidationError::UnknownField(key.clone()));
        }
    }

    let mut arguments = Map::new();
    for field in &descriptor.fields {
        match raw.get(field.name) {
            Some(value) => {
                arguments.insert(field.name.to_string(), check_field(field, value)?);
            }
            None if field.required => {
                return Err(ValidationError::MissingField(field.name.to_string()));
            }
            None => {
                if let Some(default) = &field.default {
                    arguments.insert(field.name.to_string(), default.clone());
                }
            }
        }
    }

    Ok(ValidatedCall {
        tool: descriptor.name.to_string(),
        arguments,
    })
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<Value, ValidationError> {
    match &field.kind {
        FieldKind::Scalar(kind) => check_scalar(field.name, kind, value),
        FieldKind::Array { element, max_items } => {
            let items = value
                .as_array()
                .ok_or_else(|| ValidationError::WrongType(field.name.to_string()))?;
            if items.len() > *max_items {
                return Err(ValidationError::TooManyItems(field.name.to_string()));
            }
            let checked: Vec<Value> = items
                .iter()
                .map(|item| check_scalar(field.name, element, item))
                .collect::<Result<_, _>>()?;
            Ok(Value::Array(checked))
        }
    }
}

fn check_scalar(
    field_name: &str,
    kind: &ScalarKind,
    value: &Value,
) -> Result<Value, ValidationError> {
    match kind {
        ScalarKind::String(constraint) => {
            let raw = value
                .as_str()
                .ok_or_else(|| ValidationError::WrongType(field_name.to_string()))?;
            let trimmed = raw.trim();
            check_string(field_name, constraint, trimmed)?;
            Ok(Value::String(trimmed.to_string()))
        }
        ScalarKind::Boolean => {
            value
                .as_bool()
                .ok_or_else(|| ValidationError::WrongType(field_name.to_string()))?;
            Ok(value.clone())
        }
        ScalarKind::Integer { min, max } => {
            let n = value
                .as_i64()
                .ok_or_else(|| ValidationError::WrongType(field_name.to_string()))?;
            if n < *min || n > *max {
                return Err(ValidationError::OutOfRange(field_name.to_string()));
            }
            Ok(value.clone())
        }
    }
}

fn check_string(
    field_name: &str,
    constraint: &StringConstraint,
    value: &str,
) -> Result<(), ValidationError> {
    if value.len() < constraint.min_len || value.len() > constraint.max_len {
        return Err(ValidationError::LengthOutOfBounds(field_name.to_string()));
    }
    if let Some(pattern) = constraint.pattern
        && !pattern_matches(pattern, value)
    {
        return Err(ValidationError::PatternMismatch(field_name.to_string()));
    }
    Ok(())
}

fn pattern_matches(pattern: Pattern, value: &str) -> bool {
    match pattern {
        Pattern::Identifier => {
            !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_ascii_whitespace())
        }
        Pattern::Hostname => is_hostname(value),
        Pattern::Url => match url::Url::parse(value) {
            Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
            Err(_) => false,
        },
        Pattern::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
        Pattern::HexDigest => {
            matches!(value.len(), 32 | 40 | 64) && value.chars().all(|c| c.is_ascii_hexdigit())
        }
        Pattern::YaraSource => {
            value.contains("rule ") && value.contains('{') && value.contains('}')
        }
    }
}

fn is_hostname(value: &str) -> bool {
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }
    let Some((head, tld)) = value.rsplit_once('.') else {
        return false;
    };
    !head.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
