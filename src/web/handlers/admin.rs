use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use crate::account::{AccountSummary, PlatformStats};
use crate::auth::{Credential, Tier};
use crate::utils::http::HttpResponse;
use crate::web::error::ApiError;
use crate::web::identity::CallerId;
use crate::AppContext;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn admin_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/admin/accounts", get(list_accounts))
        .route("/admin/accounts/:id/tier", put(set_tier))
        .route("/admin/keys/:id/toggle", post(toggle_key))
        .route("/admin/stats", get(stats))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
pub struct SetTierRequest {
    pub tier: String,
}

pub async fn list_accounts(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
) -> Result<Json<HttpResponse<Vec<AccountSummary>>>, ApiError> {
    ctx.accounts.require_operator(&user_id).await?;
    let accounts = ctx.accounts.list_accounts().await?;
    Ok(Json(HttpResponse::ok(accounts)))
}

pub async fn set_tier(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Path(account_id): Path<String>,
    Json(req): Json<SetTierRequest>,
) -> Result<Json<HttpResponse<AccountSummary>>, ApiError> {
    ctx.accounts.require_operator(&user_id).await?;
    let tier: Tier = req
        .tier
        .parse()
        .map_err(|e: crate::auth::types::ParseEnumError| ApiError::BadRequest(e.to_string()))?;

    let summary = ctx.accounts.set_tier(&account_id, tier).await?;
    info!(operator = %user_id, account = %account_id, tier = %tier, "operator changed tier");
    Ok(Json(HttpResponse::ok(summary)))
}

pub async fn toggle_key(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Path(key_id): Path<String>,
) -> Result<Json<HttpResponse<Credential>>, ApiError> {
    ctx.accounts.require_operator(&user_id).await?;
    let key = ctx.accounts.toggle_key(&key_id).await?;
    Ok(Json(HttpResponse::ok(key)))
}

pub async fn stats(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
) -> Result<Json<HttpResponse<PlatformStats>>, ApiError> {
    ctx.accounts.require_operator(&user_id).await?;
    let stats = ctx.accounts.stats().await?;
    Ok(Json(HttpResponse::ok(stats)))
}
