//! Declarative tool parameter schemas
//!
//! Each tool declares its parameters as a flat, ordered list of
//! [`ParamSpec`]s. The same declaration drives both argument validation at
//! dispatch time and the JSON Schema rendering served to clients via
//! `tools/list`.
//!
//! Validation reports the FIRST violation only; the dispatcher turns that
//! string into an error-flagged tool result, never a transport fault.

use serde_json::{json, Map, Value};

/// The closed set of parameter types tools may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// Array of strings (e.g. assignee ids).
    StringArray,
}

impl ParamKind {
    /// The `type` value used in the JSON Schema rendering.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringArray => "array",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    /// Short phrase used in violation messages.
    fn expectation(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::StringArray => "an array of strings",
        }
    }
}

/// One declared tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

/// Ordered parameter declarations for one tool.
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required parameter.
    pub fn required(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            required: true,
            description,
        });
        self
    }

    /// Declare an optional parameter.
    pub fn optional(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            required: false,
            description,
        });
        self
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validate raw arguments against the declaration.
    ///
    /// Returns the first violation as a human-readable message. An explicit
    /// JSON `null` counts as absent, so `null` for an optional parameter is
    /// accepted and `null` for a required one reports it as missing.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), String> {
        for spec in &self.params {
            match args.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(format!("missing required parameter '{}'", spec.name));
                    }
                }
                Some(value) => {
                    if !spec.kind.accepts(value) {
                        return Err(format!(
                            "parameter '{}' must be {}",
                            spec.name,
                            spec.kind.expectation()
                        ));
                    }
                }
            }
        }

        for name in args.keys() {
            if !self.params.iter().any(|spec| spec.name == name) {
                return Err(format!("unexpected parameter '{}'", name));
            }
        }

        Ok(())
    }

    /// Render the declaration as the JSON Schema object served in
    /// `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(spec.kind.json_type()));
            property.insert("description".to_string(), json!(spec.description));
            if spec.kind == ParamKind::StringArray {
                property.insert("items".to_string(), json!({ "type": "string" }));
            }
            properties.insert(spec.name.to_string(), Value::Object(property));
            if spec.required {
                required.push(json!(spec.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
