// handlers/protected/invoices.rs - /invoices CRUD with line items

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::ensure_valid;
use crate::api::{Payload, QueryParams, RequestContext};
use crate::database::execute_update;
use crate::database::patch::PatchError;
use crate::database::repository::{clients, invoices};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;
use crate::types::{InvoiceStatus, Mode};
use crate::validation::invoice::InvoiceInput;
use crate::validation::{text, value};

const DEFAULT_LIMIT: i64 = 50;

fn not_found() -> ApiError {
    ApiError::not_found("Invoice not found")
}

async fn ensure_client(ctx: &RequestContext, client_id: Option<i64>) -> ApiResult<()> {
    if let Some(id) = client_id {
        if !clients::exists(ctx.db(), id).await? {
            return Err(ApiError::not_found("Client not found"));
        }
    }
    Ok(())
}

async fn ensure_reference_free(
    ctx: &RequestContext,
    input: &InvoiceInput,
    exclude_id: Option<i64>,
) -> ApiResult<()> {
    if let Some(reference) = text(&input.reference) {
        if invoices::reference_taken(ctx.db(), reference, exclude_id).await? {
            return Err(ApiError::invalid_field("reference", "Reference already exists"));
        }
    }
    Ok(())
}

/// GET /invoices - one invoice with items and payments, or a page filtered by status
pub async fn get(ctx: RequestContext, params: QueryParams) -> ApiResult<Json<Value>> {
    if let Some(id) = params.id() {
        let invoice = invoices::find(ctx.db(), id).await?.ok_or_else(not_found)?;
        return Ok(Json(json!({ "invoice": invoice })));
    }

    let status = params.str("status").and_then(InvoiceStatus::parse);
    let page = params.page(DEFAULT_LIMIT, ctx.state.config.api.max_page_size);
    let invoices = invoices::list(ctx.db(), status, page).await?;

    Ok(Json(json!({ "invoices": invoices })))
}

/// POST /invoices - the invoice and its `items` are written in one transaction
pub async fn create(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input: InvoiceInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Create))?;
    ensure_client(&ctx, value(&input.client_id).copied()).await?;
    ensure_reference_free(&ctx, &input, None).await?;

    let mut tx = ctx.db().begin().await?;
    let id = invoices::insert(&mut tx, &input).await?;
    if let Some(items) = &input.items {
        invoices::insert_items(&mut tx, id, items).await?;
    }
    tx.commit().await?;

    ctx.record(
        "invoice_created",
        json!({
            "invoice_id": id,
            "reference": text(&input.reference),
            "client_id": value(&input.client_id),
            "items": input.items.as_ref().map_or(0, Vec::len),
        }),
    );

    let invoice = invoices::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "invoice": invoice, "message": "Invoice created" })),
    ))
}

/// PUT /invoices - patch the whitelisted columns; `items`, when given,
/// replaces every line item in the same transaction
pub async fn update(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Invoice")?;
    if !invoices::exists(ctx.db(), id).await? {
        return Err(not_found());
    }

    let input: InvoiceInput = payload.into_input()?;
    ensure_valid(input.validate(Mode::Update))?;
    ensure_client(&ctx, value(&input.client_id).copied()).await?;
    ensure_reference_free(&ctx, &input, Some(id)).await?;

    let stmt = match invoices::PATCH.build(payload.map(), id) {
        Ok(stmt) => Some(stmt),
        Err(PatchError::NoFieldsToUpdate) if input.items.is_some() => None,
        Err(e) => return Err(e.into()),
    };

    let mut tx = ctx.db().begin().await?;
    match &stmt {
        Some(stmt) => {
            execute_update(&mut *tx, stmt).await?;
        }
        None => invoices::touch(&mut tx, id).await?,
    }
    if let Some(items) = &input.items {
        invoices::replace_items(&mut tx, id, items).await?;
    }
    tx.commit().await?;

    let mut fields: Vec<&str> = stmt.map(|s| s.columns).unwrap_or_default();
    if input.items.is_some() {
        fields.push("items");
    }
    ctx.record("invoice_updated", json!({ "invoice_id": id, "fields": fields }));

    let invoice = invoices::find(ctx.db(), id).await?.ok_or_else(not_found)?;
    Ok(Json(json!({ "invoice": invoice, "message": "Invoice updated" })))
}

/// DELETE /invoices - items and payments go with it
pub async fn delete(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    let id = payload.require_id("Invoice")?;
    let reference = invoices::delete(ctx.db(), id).await?.ok_or_else(not_found)?;
    ctx.record(
        "invoice_deleted",
        json!({ "invoice_id": id, "reference": reference }),
    );

    Ok(Json(json!({ "message": "Invoice deleted" })))
}
