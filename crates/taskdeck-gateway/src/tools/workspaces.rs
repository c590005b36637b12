//! Workspace tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use taskdeck_core::{
    ToolArgs, ToolDefinition, ToolError, ToolHandler, ToolRegistry, ToolSchema, UpstreamClient,
};

pub fn register(registry: &mut ToolRegistry, upstream: Arc<UpstreamClient>) {
    registry.register(ToolDefinition::new(
        "list_workspaces",
        "List all workspaces the configured credential can see.",
        ToolSchema::new(),
        Arc::new(ListWorkspaces { upstream }),
    ));
}

struct ListWorkspaces {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for ListWorkspaces {
    async fn call(&self, _args: ToolArgs) -> Result<Value, ToolError> {
        Ok(self.upstream.get("/v1/workspaces").await?)
    }
}
