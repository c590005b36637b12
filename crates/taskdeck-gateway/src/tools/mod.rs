//! TaskDeck tool catalog
//!
//! Every tool is a thin handler over the upstream adapter: build a path,
//! issue the call, return the decoded payload. The one exception is the
//! composite `create_task_in_list`, which resolves a list by name before
//! writing.
//!
//! The catalog is registered once at startup; the registry it produces is
//! shared read-only for the life of the process.

mod lists;
mod tasks;
mod workspaces;

use std::sync::Arc;

use serde_json::Value;

use taskdeck_core::{ToolArgs, ToolRegistry, UpstreamClient};

/// Build the full tool registry over one upstream client.
pub fn build_registry(upstream: Arc<UpstreamClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    workspaces::register(&mut registry, upstream.clone());
    lists::register(&mut registry, upstream.clone());
    tasks::register(&mut registry, upstream);

    registry
}

/// Fetch a validated required string argument.
///
/// Schema validation ran before the handler, so absence here would be a
/// wiring bug; the empty string keeps handlers panic-free regardless.
pub(crate) fn str_arg<'a>(args: &'a ToolArgs, name: &str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Fetch an optional boolean argument.
pub(crate) fn opt_bool_arg(args: &ToolArgs, name: &str) -> Option<bool> {
    args.get(name).and_then(Value::as_bool)
}

/// Path-encode one identifier segment.
pub(crate) fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
