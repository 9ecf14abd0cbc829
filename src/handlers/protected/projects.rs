// handlers/protected/projects.rs - /projects CRUD

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::ensure_valid;
use crate::api::{Payload, QueryParams, RequestContext};
use crate::database::execute_update;
use crate::database::repository::projects::{self, ProjectFilter};
use crate::database::repository::clients;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;
use crate::types::{Mode, ProjectStatus};
use crate::validation::project::ProjectInput;
use crate::validation::{text, value};

const DEFAULT_LIMIT: i64 = 50;

fn not_found() -> ApiError {
    ApiError::not_found("Project not found")
}

async fn ensure_client(ctx: &RequestContext, input: &ProjectInput) -> ApiResult<()> {
    if let Some(&client_id) = value(&input.client_id) {
        if !clients::exists(ctx.db(), client_id).await? {
            return Err(ApiError::not_found("Client not found"));
        }
    }
    Ok(())
}

/// GET /projects - one project with its tasks, or a page filtered by status / client
pub async fn get(ctx: RequestContext, params: QueryParams) -> ApiResult<Json<Value>> {
    if let Some(id) = params.id() {
        let project = projects::find(ctx.db(), id).await?.ok_or_else(not_found)?;
        return Ok(Json(json!({ "project": project })));
    }

    let filter = ProjectFilter {
        status: params.str("status").and_then(ProjectStatus::parse),
        client_id: params.int("client_id").filter(|id| *id > 0),
    };
    let page = params.page(DEFAULT_LIMIT, ctx.state.config.api.max_page_size);
    let projects = projects::list(ctx.db(), &filter, page).await?;

    Ok(Json(json!({ "projects": projects })))
}

/// POST /projects
pub async fn create(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input: ProjectInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Create))?;
    ensure_client(&ctx, &input).await?;

    let id = projects::insert(ctx.db(), &input).await?;
    ctx.record(
        "project_created",
        json!({
            "project_id": id,
            "name": text(&input.name),
            "client_id": value(&input.client_id),
        }),
    );

    let project = projects::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "project": project, "message": "Project created" })),
    ))
}

/// PUT /projects
pub async fn update(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Project")?;
    if !projects::exists(ctx.db(), id).await? {
        return Err(not_found());
    }

    let input: ProjectInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Update))?;
    ensure_client(&ctx, &input).await?;

    let stmt = projects::PATCH.build(payload.map(), id)?;
    execute_update(ctx.db(), &stmt).await?;
    ctx.record(
        "project_updated",
        json!({ "project_id": id, "fields": stmt.columns }),
    );

    let project = projects::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok(Json(json!({ "project": project, "message": "Project updated" })))
}

/// DELETE /projects - the project's tasks go with it
pub async fn delete(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Project")?;
    let name = projects::delete(ctx.db(), id).await?.ok_or_else(not_found)?;
    ctx.record("project_deleted", json!({ "project_id": id, "name": name }));

    Ok(Json(json!({ "message": "Project deleted" })))
}
