//! Tool registry and dispatcher
//!
//! The registry is built once at process start and shared read-only behind
//! an `Arc` for the lifetime of the process; dispatch is a map lookup over
//! that closed set. Handler failures of every kind are converted into
//! error-flagged tool results here - a failing tool call never aborts the
//! RPC exchange that carried it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ToolError;
use crate::schema::ToolSchema;

/// Validated arguments handed to a tool handler.
pub type ToolArgs = Map<String, Value>;

/// A tool's executable body.
///
/// Handlers receive arguments that already passed schema validation and
/// return either a JSON value to serialize as the result payload or a
/// typed [`ToolError`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError>;
}

/// One registered tool: name, description, schema, handler.
pub struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    schema: ToolSchema,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    pub fn new(
        name: &'static str,
        description: &'static str,
        schema: ToolSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }
}

/// Outcome of a dispatched call, in either direction.
///
/// The protocol has no separate fault channel for tool-level failures: an
/// error is still a payload, flagged with `is_error`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            text: message,
            is_error: true,
        }
    }
}

/// Dispatch failures that are NOT tool results.
///
/// An unknown tool name is a caller error surfaced at the protocol level;
/// it never reaches a handler or the upstream adapter.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Name-keyed set of tool definitions. Immutable after startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A duplicate name is a wiring bug; registration
    /// happens once at startup and a duplicate is fatal.
    pub fn register(&mut self, definition: ToolDefinition) {
        let name = definition.name;
        let previous = self.tools.insert(name, definition);
        assert!(previous.is_none(), "duplicate tool name: {}", name);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Iterate definitions for catalog rendering (`tools/list`).
    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// Validate and execute one tool call.
    ///
    /// `raw_args` is the untrusted `arguments` member of the request;
    /// absent arguments are treated as an empty object.
    pub async fn dispatch(
        &self,
        name: &str,
        raw_args: Option<Value>,
    ) -> Result<ToolResult, DispatchError> {
        let Some(definition) = self.tools.get(name) else {
            warn!("[Dispatch] Unknown tool requested: {}", name);
            return Err(DispatchError::UnknownTool(name.to_string()));
        };

        let args = match raw_args {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Ok(ToolResult::error(
                    "arguments must be a JSON object".to_string(),
                ));
            }
        };

        if let Err(violation) = definition.schema.validate(&args) {
            info!(tool = name, violation = %violation, "[Dispatch] Rejected arguments");
            return Ok(ToolResult::error(violation));
        }

        info!(tool = name, "[Dispatch] Calling tool");

        match definition.handler.call(args).await {
            Ok(value) => {
                let text = match serde_json::to_string_pretty(&value) {
                    Ok(text) => text,
                    Err(e) => {
                        // Handler produced a value serde cannot serialize
                        // (non-string map keys etc.); report, don't abort.
                        warn!(tool = name, "[Dispatch] Result serialization failed: {}", e);
                        return Ok(ToolResult::error(format!(
                            "failed to serialize tool result: {}",
                            e
                        )));
                    }
                };
                Ok(ToolResult::success(text))
            }
            Err(tool_error) => {
                warn!(tool = name, error = %tool_error, "[Dispatch] Tool failed");
                Ok(ToolResult::error(tool_error.user_message()))
            }
        }
    }
}
