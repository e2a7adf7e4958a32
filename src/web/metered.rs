use super::error::ApiError;
use crate::auth::{MeteredEndpoint, API_KEY_HEADER};
use crate::storage::RequestLog;
use crate::utils::http::{HttpResponse, ResponseMeta};
use crate::AppContext;
use axum::{
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Runs one metered request through the gate.
///
/// `query` is only invoked once the caller is authorized. Usage is recorded
/// after it returns a body and never for rejected or failed requests.
pub async fn serve_metered<T, F, Fut>(
    ctx: &AppContext,
    endpoint: MeteredEndpoint,
    headers: &HeaderMap,
    query: F,
) -> Result<Json<HttpResponse<T>>, ApiError>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let started = Instant::now();
    let presented = headers
        .get(API_KEY_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let credential = ctx
        .gate
        .authorize(presented.as_deref(), endpoint.required_tiers)
        .await?;

    let data = query().await?;
    let meta = ResponseMeta::for_credential(&credential);

    ctx.gate.record_usage(&credential.id).await;

    let entry = RequestLog {
        id: Uuid::new_v4().to_string(),
        api_key_id: credential.id.clone(),
        endpoint: endpoint.name.to_string(),
        method: "GET".to_string(),
        status_code: 200,
        response_time_ms: started.elapsed().as_millis() as i64,
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        created_at: Utc::now(),
    };
    if let Err(e) = ctx.request_logs.append(entry).await {
        warn!(key_id = %credential.id, error = %e, "failed to write request log");
    }

    debug!(
        endpoint = endpoint.name,
        key_id = %credential.id,
        remaining = meta.requests_remaining,
        "served metered request"
    );
    Ok(Json(HttpResponse::metered(data, meta)))
}
