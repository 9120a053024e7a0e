//! Static tool catalog: tool name → argument shape → constraint records.
//!
//! Registry content is fixed at process start. Argument shapes are
//! declarative constraint records interpreted by one generic validation
//! routine (see [`crate::validate`]); there are no per-tool validation
//! functions.

use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate tool name '{0}'")]
    DuplicateTool(String),
    #[error("duplicate field '{1}' in tool '{0}'")]
    DuplicateField(String, String),
}

/// Named format constraint for string values.
///
/// Validation is native Rust (`std::net::Ipv4Addr`, the `url` crate, char
/// classes); the regex literals here exist only so `tools/list` can
/// advertise the constraint in JSON Schema form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Letters, digits, underscore, hyphen, whitespace.
    Identifier,
    /// Hostname-like string with an alphabetic top-level label.
    Hostname,
    /// Absolute `http(s)://` URL.
    Url,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// Hex digest of exactly 32, 40 or 64 characters (MD5/SHA-1/SHA-256).
    HexDigest,
    /// YARA source: must contain at least one `rule` block.
    YaraSource,
}

impl Pattern {
    pub(crate) fn schema_pattern(self) -> Option<&'static str> {
        match self {
            Self::Identifier => Some(r"^[a-zA-Z0-9_\-\s]+$"),
            Self::Hostname => Some(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"),
            Self::Url => Some(r"^https?://[^\s/$.?#].[^\s]*$"),
            Self::Ipv4 => Some(
                r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
            ),
            Self::HexDigest => Some(r"^[a-fA-F0-9]{32}$|^[a-fA-F0-9]{40}$|^[a-fA-F0-9]{64}$"),
            Self::YaraSource => None,
        }
    }
}

/// Length bounds and optional format constraint for a string value.
#[derive(Debug, Clone, Copy)]
pub struct StringConstraint {
    pub min_len: usize,
    pub max_len: usize,
    pub pattern: Option<Pattern>,
}

impl StringConstraint {
    #[must_use]
    pub const fn bounded(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            pattern: None,
        }
    }

    #[must_use]
    pub const fn pattern(min_len: usize, max_len: usize, pattern: Pattern) -> Self {
        Self {
            min_len,
            max_len,
            pattern: Some(pattern),
        }
    }
}

/// One scalar argument type with its constraints.
#[derive(Debug, Clone, Copy)]
pub enum ScalarKind {
    String(StringConstraint),
    Boolean,
    Integer { min: i64, max: i64 },
}

/// Declared type of a tool argument.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Homogeneous array of scalars with a hard element-count ceiling
    /// (bounds amplification against the upstream).
    Array {
        element: ScalarKind,
        max_items: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    #[must_use]
    pub fn required(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        default: Option<Value>,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ToolDescriptor {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render the argument shape as a JSON Schema object
    /// (`additionalProperties: false`; unknown keys are rejected).
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(field.name.to_string(), field_schema(field));
            if field.required {
                required.push(Value::String(field.name.to_string()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    #[must_use]
    pub fn to_tool_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

fn scalar_schema(kind: &ScalarKind) -> Value {
    match kind {
        ScalarKind::String(c) => {
            let mut schema = Map::new();
            schema.insert("type".to_string(), json!("string"));
            if c.min_len > 0 {
                schema.insert("minLength".to_string(), json!(c.min_len));
            }
            schema.insert("maxLength".to_string(), json!(c.max_len));
            if let Some(p) = c.pattern.and_then(Pattern::schema_pattern) {
                schema.insert("pattern".to_string(), json!(p));
            }
            Value::Object(schema)
        }
        ScalarKind::Boolean => json!({ "type": "boolean" }),
        ScalarKind::Integer { min, max } => {
            json!({ "type": "integer", "minimum": min, "maximum": max })
        }
    }
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = match &field.kind {
        FieldKind::Scalar(kind) => scalar_schema(kind),
        FieldKind::Array { element, max_items } => {
            json!({
                "type": "array",
                "items": scalar_schema(element),
                "maxItems": max_items,
            })
        }
    };
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("description".to_string(), json!(field.description));
        if let Some(default) = &field.default {
            obj.insert("default".to_string(), default.clone());
        }
    }
    schema
}

/// Ordered, immutable catalog of tool descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: Vec<ToolDescriptor>,
}

impl Registry {
    /// Build a registry, preserving registration order.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate tool names or duplicate field names
    /// within a tool.
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self, RegistryError> {
        let mut tool_names = std::collections::HashSet::new();
        for tool in &tools {
            if !tool_names.insert(tool.name) {
                return Err(RegistryError::DuplicateTool(tool.name.to_string()));
            }
            let mut field_names = std::collections::HashSet::new();
            for field in &tool.fields {
                if !field_names.insert(field.name) {
                    return Err(RegistryError::DuplicateField(
                        tool.name.to_string(),
                        field.name.to_string(),
                    ));
                }
            }
        }
        Ok(Self { tools })
    }

    #[must_use]
    pub fn describe(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// The `tools/list` result, stable across calls.
    #[must_use]
    pub fn catalog_json(&self) -> Value {
        let tools: Vec<Value> = self.tools.iter().map(ToolDescriptor::to_tool_json).collect();
        json!({ "tools": tools })
    }
}
