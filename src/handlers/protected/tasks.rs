// handlers/protected/tasks.rs - /tasks CRUD

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::ensure_valid;
use crate::api::{Payload, QueryParams, RequestContext};
use crate::database::execute_update;
use crate::database::repository::tasks::{self, TaskFilter};
use crate::database::repository::{clients, projects};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;
use crate::types::{Mode, TaskPriority, TaskStatus};
use crate::validation::task::TaskInput;
use crate::validation::{text, value, FieldErrors};

const DEFAULT_LIMIT: i64 = 100;

fn not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

/// Optional references must point at existing rows
async fn ensure_refs(ctx: &RequestContext, input: &TaskInput) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(&project_id) = value(&input.project_id) {
        if !projects::exists(ctx.db(), project_id).await? {
            errors.insert("project_id".into(), "Project not found".into());
        }
    }
    if let Some(&client_id) = value(&input.client_id) {
        if !clients::exists(ctx.db(), client_id).await? {
            errors.insert("client_id".into(), "Client not found".into());
        }
    }
    ensure_valid(errors)
}

/// GET /tasks - one task, or a page ordered by status, priority, then due date
pub async fn get(ctx: RequestContext, params: QueryParams) -> ApiResult<Json<Value>> {
    if let Some(id) = params.id() {
        let task = tasks::find(ctx.db(), id).await?.ok_or_else(not_found)?;
        return Ok(Json(json!({ "task": task })));
    }

    let filter = TaskFilter {
        status: params.str("status").and_then(TaskStatus::parse),
        priority: params.str("priority").and_then(TaskPriority::parse),
        project_id: params.int("project_id").filter(|id| *id > 0),
        client_id: params.int("client_id").filter(|id| *id > 0),
    };
    let page = params.page(DEFAULT_LIMIT, ctx.state.config.api.max_page_size);
    let tasks = tasks::list(ctx.db(), &filter, page).await?;

    Ok(Json(json!({ "tasks": tasks })))
}

/// POST /tasks
pub async fn create(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input: TaskInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Create))?;
    ensure_refs(&ctx, &input).await?;

    let id = tasks::insert(ctx.db(), &input).await?;
    ctx.record(
        "task_created",
        json!({ "task_id": id, "title": text(&input.title) }),
    );

    let task = tasks::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "task": task, "message": "Task created" })),
    ))
}

/// PUT /tasks
pub async fn update(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Task")?;
    if tasks::find(ctx.db(), id).await?.is_none() {
        return Err(not_found());
    }

    let input: TaskInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Update))?;
    ensure_refs(&ctx, &input).await?;

    let stmt = tasks::PATCH.build(payload.map(), id)?;
    execute_update(ctx.db(), &stmt).await?;
    ctx.record("task_updated", json!({ "task_id": id, "fields": stmt.columns }));

    let task = tasks::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok(Json(json!({ "task": task, "message": "Task updated" })))
}

/// DELETE /tasks
pub async fn delete(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Task")?;
    let title = tasks::delete(ctx.db(), id).await?.ok_or_else(not_found)?;
    ctx.record("task_deleted", json!({ "task_id": id, "title": title }));

    Ok(Json(json!({ "message": "Task deleted" })))
}
