use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use crate::auth::Credential;
use crate::storage::{ListingMode, Profile, Property, PropertyFilter, DEFAULT_PAGE_SIZE};
use crate::utils::http::HttpResponse;
use crate::web::error::ApiError;
use crate::web::identity::CallerId;
use crate::AppContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn dashboard_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/dashboard/register", post(register))
        .route("/dashboard/profile", get(get_profile).patch(update_profile))
        .route("/dashboard/keys", get(list_keys).post(create_key))
        .route("/dashboard/keys/:id", delete(revoke_key))
        .route("/dashboard/keys/:id/regenerate", post(regenerate_key))
        .route("/dashboard/properties", get(explore_properties))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registration {
    pub profile: Profile,
    pub api_key: Credential,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Revoked {
    pub id: String,
}

/// Explorer search. Malformed values are ignored like on the metered API.
#[derive(Debug, Default, Deserialize)]
pub struct ExplorerQuery {
    /// Title search
    pub q: Option<String>,
    pub mode: Option<String>,
    pub location: Option<String>,
    pub page: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ExplorerQuery {
    /// 1-based page number, never below 1.
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.max(1) as u64)
            .unwrap_or(1)
    }

    pub fn to_filter(&self) -> PropertyFilter {
        let offset = (self.page() - 1).saturating_mul(DEFAULT_PAGE_SIZE);
        let mut filter = PropertyFilter::paged(None, None);
        filter.offset = offset;
        filter.title = non_blank(&self.q);
        filter.location = non_blank(&self.location);
        filter.mode = self.mode.as_deref().and_then(ListingMode::parse);
        filter
    }
}

#[derive(Debug, Serialize)]
pub struct ExplorerPage {
    pub properties: Vec<Property>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (profile, api_key) = ctx.accounts.register(&user_id, &req.email, req.full_name).await?;
    Ok((
        StatusCode::CREATED,
        Json(HttpResponse::ok(Registration { profile, api_key })),
    ))
}

pub async fn get_profile(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
) -> Result<Json<HttpResponse<Profile>>, ApiError> {
    let profile = ctx.accounts.require_profile(&user_id).await?;
    Ok(Json(HttpResponse::ok(profile)))
}

pub async fn update_profile(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<HttpResponse<Profile>>, ApiError> {
    ctx.accounts.require_profile(&user_id).await?;
    let profile = ctx.accounts.update_profile(&user_id, req.full_name).await?;
    Ok(Json(HttpResponse::ok(profile)))
}

pub async fn list_keys(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
) -> Result<Json<HttpResponse<Vec<Credential>>>, ApiError> {
    ctx.accounts.require_profile(&user_id).await?;
    let keys = ctx.accounts.list_keys(&user_id).await?;
    Ok(Json(HttpResponse::ok(keys)))
}

pub async fn create_key(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Json(req): Json<CreateKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = ctx.accounts.issue_key(&user_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(HttpResponse::ok(key))))
}

pub async fn revoke_key(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> Result<Json<HttpResponse<Revoked>>, ApiError> {
    ctx.accounts.require_profile(&user_id).await?;
    ctx.accounts.revoke_key(&user_id, &id).await?;
    Ok(Json(HttpResponse::ok(Revoked { id })))
}

pub async fn regenerate_key(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> Result<Json<HttpResponse<Credential>>, ApiError> {
    ctx.accounts.require_profile(&user_id).await?;
    let key = ctx.accounts.regenerate_key(&user_id, &id).await?;
    Ok(Json(HttpResponse::ok(key)))
}

/// Unmetered browsing for signed-in accounts.
pub async fn explore_properties(
    State(ctx): State<Arc<AppContext>>,
    CallerId(user_id): CallerId,
    Query(query): Query<ExplorerQuery>,
) -> Result<Json<HttpResponse<ExplorerPage>>, ApiError> {
    ctx.accounts.require_profile(&user_id).await?;
    let filter = query.to_filter();
    let result = ctx.properties.find(&filter).await?;
    Ok(Json(HttpResponse::ok(ExplorerPage {
        properties: result.properties,
        total: result.total,
        page: query.page(),
        total_pages: result.total.div_ceil(filter.limit),
    })))
}
