use crate::account::AccountError;
use crate::auth::GateError;
use crate::utils::http::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Anything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Gate(GateError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Gate(err) => {
                if let GateError::Internal(message) = &err {
                    error!(error = %message, "metered request failed");
                }
                return err.into_response();
            }
            ApiError::Account(err) => match err {
                AccountError::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::new("unauthenticated", "A signed-in account is required"),
                ),
                AccountError::Forbidden(message) => {
                    (StatusCode::FORBIDDEN, ErrorBody::new("forbidden", message))
                }
                AccountError::NotFound(what) => (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new("not_found", format!("{} not found", what)),
                ),
                AccountError::BadRequest(message) => {
                    (StatusCode::BAD_REQUEST, ErrorBody::new("bad_request", message))
                }
                AccountError::Conflict(message) => {
                    (StatusCode::CONFLICT, ErrorBody::new("conflict", message))
                }
                AccountError::Storage(e) => {
                    error!(error = %e, "account operation failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::new("internal_error", e.to_string()),
                    )
                }
            },
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("not_found", format!("{} not found", what)),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("bad_request", message))
            }
        };

        (status, Json(body)).into_response()
    }
}
