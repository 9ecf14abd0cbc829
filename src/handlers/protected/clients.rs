// handlers/protected/clients.rs - /clients CRUD

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::ensure_valid;
use crate::api::{Payload, QueryParams, RequestContext};
use crate::database::execute_update;
use crate::database::repository::clients::{self, ClientFilter};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;
use crate::types::{ClientStatus, Mode};
use crate::validation::client::ClientInput;
use crate::validation::text;

const DEFAULT_LIMIT: i64 = 100;

fn not_found() -> ApiError {
    ApiError::not_found("Client not found")
}

/// GET /clients - one client by `id`, or a filtered page with the matching total
pub async fn get(ctx: RequestContext, params: QueryParams) -> ApiResult<Json<Value>> {
    if let Some(id) = params.id() {
        let client = clients::find(ctx.db(), id).await?.ok_or_else(not_found)?;
        return Ok(Json(json!({ "client": client })));
    }

    let filter = ClientFilter {
        status: params.str("status").and_then(ClientStatus::parse),
        search: params.str("search").map(str::to_string),
    };
    let page = params.page(DEFAULT_LIMIT, ctx.state.config.api.max_page_size);
    let (clients, total) = clients::list(ctx.db(), &filter, page).await?;

    Ok(Json(json!({
        "clients": clients,
        "total": total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// POST /clients
pub async fn create(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input: ClientInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Create))?;

    let email = text(&input.email).unwrap_or_default();
    if clients::email_taken(ctx.db(), email, None).await? {
        return Err(ApiError::invalid_field("email", "Email already exists"));
    }

    let id = clients::insert(ctx.db(), &input).await?;
    ctx.record("client_created", json!({ "client_id": id, "email": email }));

    let client = clients::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "client": client, "message": "Client created successfully" })),
    ))
}

/// PUT /clients - partial update of the whitelisted fields present in the body
pub async fn update(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Client")?;
    if !clients::exists(ctx.db(), id).await? {
        return Err(not_found());
    }

    let input: ClientInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Update))?;

    if let Some(email) = text(&input.email) {
        if clients::email_taken(ctx.db(), email, Some(id)).await? {
            return Err(ApiError::invalid_field("email", "Email already exists"));
        }
    }

    let stmt = clients::PATCH.build(payload.map(), id)?;
    execute_update(ctx.db(), &stmt).await?;
    ctx.record(
        "client_updated",
        json!({ "client_id": id, "fields": stmt.columns }),
    );

    let client = clients::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok(Json(json!({ "client": client, "message": "Client updated successfully" })))
}

/// DELETE /clients - cascades to the client's invoices, projects and tasks
pub async fn delete(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Client")?;
    let email = clients::delete(ctx.db(), id).await?.ok_or_else(not_found)?;
    ctx.record("client_deleted", json!({ "client_id": id, "email": email }));

    Ok(Json(json!({ "message": "Client deleted successfully" })))
}
