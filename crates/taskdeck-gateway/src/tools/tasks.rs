//! Task tools
//!
//! Mostly one upstream call per tool. `create_task_in_list` is the
//! composite case: a read (resolve a list by name) followed by a write
//! (create the task). The read's side effects are nil and the write is not
//! rolled back on failure; error messages name the step that failed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use taskdeck_core::{
    ParamKind, ToolArgs, ToolDefinition, ToolError, ToolHandler, ToolRegistry, ToolSchema,
    UpstreamClient,
};

use super::{encode, opt_bool_arg, str_arg};

pub fn register(registry: &mut ToolRegistry, upstream: Arc<UpstreamClient>) {
    registry.register(ToolDefinition::new(
        "list_tasks",
        "List the tasks in a list.",
        ToolSchema::new()
            .required("list_id", ParamKind::String, "List to enumerate")
            .optional(
                "include_closed",
                ParamKind::Boolean,
                "Include closed tasks (default false)",
            ),
        Arc::new(ListTasks {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "get_task",
        "Fetch a single task by id.",
        ToolSchema::new().required("task_id", ParamKind::String, "Task to fetch"),
        Arc::new(GetTask {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "create_task",
        "Create a task in a list.",
        ToolSchema::new()
            .required("list_id", ParamKind::String, "List to create the task in")
            .required("name", ParamKind::String, "Task name")
            .optional("description", ParamKind::String, "Task description")
            .optional("priority", ParamKind::Integer, "Priority from 1 (urgent) to 4 (low)")
            .optional("due_date", ParamKind::String, "Due date, RFC 3339")
            .optional("assignees", ParamKind::StringArray, "Member ids to assign"),
        Arc::new(CreateTask {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "update_task",
        "Update fields on an existing task.",
        ToolSchema::new()
            .required("task_id", ParamKind::String, "Task to update")
            .optional("name", ParamKind::String, "New task name")
            .optional("description", ParamKind::String, "New description")
            .optional("status", ParamKind::String, "New status name")
            .optional("priority", ParamKind::Integer, "New priority from 1 to 4"),
        Arc::new(UpdateTask {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "delete_task",
        "Delete a task by id.",
        ToolSchema::new().required("task_id", ParamKind::String, "Task to delete"),
        Arc::new(DeleteTask {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "search_tasks",
        "Search tasks in a workspace by free text.",
        ToolSchema::new()
            .required("workspace_id", ParamKind::String, "Workspace to search")
            .required("query", ParamKind::String, "Search text"),
        Arc::new(SearchTasks {
            upstream: upstream.clone(),
        }),
    ));

    registry.register(ToolDefinition::new(
        "create_task_in_list",
        "Create a task in a list referenced by name instead of id. \
         Resolves the list within the workspace first, then creates the task.",
        ToolSchema::new()
            .required("workspace_id", ParamKind::String, "Workspace holding the list")
            .required("list_name", ParamKind::String, "List name (case-insensitive)")
            .required("name", ParamKind::String, "Task name")
            .optional("description", ParamKind::String, "Task description"),
        Arc::new(CreateTaskInList { upstream }),
    ));
}

struct ListTasks {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for ListTasks {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let list_id = str_arg(&args, "list_id");
        let mut path = format!("/v1/lists/{}/tasks", encode(list_id));
        if opt_bool_arg(&args, "include_closed") == Some(true) {
            path.push_str("?include_closed=true");
        }
        Ok(self.upstream.get(&path).await?)
    }
}

struct GetTask {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for GetTask {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let task_id = str_arg(&args, "task_id");
        Ok(self
            .upstream
            .get(&format!("/v1/tasks/{}", encode(task_id)))
            .await?)
    }
}

struct CreateTask {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for CreateTask {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let list_id = str_arg(&args, "list_id");
        let body = task_body(&args, &["name", "description", "priority", "due_date", "assignees"]);
        Ok(self
            .upstream
            .post(&format!("/v1/lists/{}/tasks", encode(list_id)), &body)
            .await?)
    }
}

struct UpdateTask {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for UpdateTask {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let task_id = str_arg(&args, "task_id");
        let body = task_body(&args, &["name", "description", "status", "priority"]);

        if body.as_object().is_some_and(Map::is_empty) {
            return Err(ToolError::Validation(
                "no fields to update; provide at least one of name, description, status, priority"
                    .to_string(),
            ));
        }

        Ok(self
            .upstream
            .put(&format!("/v1/tasks/{}", encode(task_id)), &body)
            .await?)
    }
}

struct DeleteTask {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for DeleteTask {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let task_id = str_arg(&args, "task_id");
        self.upstream
            .delete(&format!("/v1/tasks/{}", encode(task_id)))
            .await?;
        // Upstream answers 204; give the agent explicit confirmation.
        Ok(json!({ "deleted": true, "task_id": task_id }))
    }
}

struct SearchTasks {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for SearchTasks {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let workspace_id = str_arg(&args, "workspace_id");
        let query = str_arg(&args, "query");
        Ok(self
            .upstream
            .get(&format!(
                "/v1/workspaces/{}/tasks/search?q={}",
                encode(workspace_id),
                urlencoding::encode(query)
            ))
            .await?)
    }
}

struct CreateTaskInList {
    upstream: Arc<UpstreamClient>,
}

#[async_trait]
impl ToolHandler for CreateTaskInList {
    async fn call(&self, args: ToolArgs) -> Result<Value, ToolError> {
        let workspace_id = str_arg(&args, "workspace_id");
        let list_name = str_arg(&args, "list_name");

        // Step 1: resolve the list by name.
        let lists = self
            .upstream
            .get(&format!("/v1/workspaces/{}/lists", encode(workspace_id)))
            .await
            .map_err(|e| {
                ToolError::upstream_at(
                    format!("resolving list '{}' in workspace {}", list_name, workspace_id),
                    e,
                )
            })?;

        let list_id = find_list_id(&lists, list_name).ok_or_else(|| {
            ToolError::Validation(format!(
                "list '{}' not found in workspace {}",
                list_name, workspace_id
            ))
        })?;

        // Step 2: create the task. Step 1 was a read; nothing to roll back
        // if this fails, but the message says how far we got.
        let body = task_body(&args, &["name", "description"]);
        self.upstream
            .post(&format!("/v1/lists/{}/tasks", encode(&list_id)), &body)
            .await
            .map_err(|e| {
                ToolError::upstream_at(
                    format!("creating task in list '{}' (id {})", list_name, list_id),
                    e,
                )
            })
    }
}

/// Copy the named argument fields into an upstream request body.
fn task_body(args: &ToolArgs, fields: &[&str]) -> Value {
    let mut body = Map::new();
    for field in fields {
        if let Some(value) = args.get(*field) {
            if !value.is_null() {
                body.insert((*field).to_string(), value.clone());
            }
        }
    }
    Value::Object(body)
}

/// Case-insensitive list lookup over the `lists` array of an upstream
/// workspace-lists payload.
fn find_list_id(payload: &Value, name: &str) -> Option<String> {
    payload
        .get("lists")?
        .as_array()?
        .iter()
        .find(|list| {
            list.get("name")
                .and_then(Value::as_str)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        })?
        .get("id")?
        .as_str()
        .map(String::from)
}
