//! Folder and list tools

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use taskdeck_core::{
    ParamKind, ToolArgs, ToolDefinition, ToolError, ToolHandler, ToolRegistry, ToolSchema,
    UpstreamClient,
};

use super::{encode, str_arg};

pub fn register(registry: &mut ToolRegistry, upstream: Arc<UpstreamClient>) {
    registry.register(ToolDefinition::new(
        "list_folders",
        "List the folders in a workspace.",
        ToolSchema::new().required(
            "workspace_id",
            ParamKind::String,
            "Workspace to enumerate",
        ),
        Arc::new(ListFolders {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "list_lists",
        "List the task lists inside a folder.",
        ToolSchema::new().required("folder_id", ParamKind::String, "Folder to enumerate"),
        Arc::new(ListLists { upstream }),
    ));
}

struct ListFolders {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for ListFolders {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let workspace_id = str_arg(&args, "workspace_id");
        Ok(self
            .upstream
            .get(&format!("/v1/workspaces/{}/folders", encode(workspace_id)))
            .await?)
    }
}

struct ListLists {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for ListLists {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let folder_id = str_arg(&args, "folder_id");
        Ok(self
            .upstream
            .get(&format!("/v1/folders/{}/lists", encode(folder_id)))
            .await?)
    }
}
