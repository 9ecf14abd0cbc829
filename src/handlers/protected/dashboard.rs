// handlers/protected/dashboard.rs - GET /dashboard summary figures

use axum::response::Json;

use crate::api::RequestContext;
use crate::database::repository::dashboard::{self, DashboardStats};
use crate::error::ApiResult;

pub async fn show(ctx: RequestContext) -> ApiResult<Json<DashboardStats>> {
    let stats = dashboard::stats(ctx.db()).await?;
    Ok(Json(stats))
}
