//! # TaskDeck Core Library
//!
//! Tool registry, parameter schemas, error taxonomy, and the upstream
//! API adapter for the TaskDeck MCP gateway.
//!
//! ## Modules
//!
//! - `error` - Typed upstream and tool errors
//! - `schema` - Declarative tool parameter schemas and validation
//! - `registry` - Tool definitions, registration, and dispatch
//! - `upstream` - HTTP client for the TaskDeck REST API

pub mod error;
pub mod registry;
pub mod schema;
pub mod upstream;

// Re-export commonly used types
pub use error::{ToolError, UpstreamError};
pub use registry::{DispatchError, ToolArgs, ToolDefinition, ToolHandler, ToolRegistry, ToolResult};
pub use schema::{ParamKind, ParamSpec, ToolSchema};
pub use upstream::{UpstreamClient, UpstreamConfig};
