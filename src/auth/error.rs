use super::types::Tier;
use crate::utils::http::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Every way a metered request can be turned away or fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    #[error("Missing API key")]
    MissingCredential,
    #[error("Invalid API key")]
    InvalidCredential,
    #[error("Tier {current_tier} is not permitted for this endpoint")]
    TierInsufficient { current_tier: Tier },
    #[error("Monthly limit of {limit} requests exceeded")]
    QuotaExceeded { limit: i64 },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::MissingCredential | GateError::InvalidCredential => StatusCode::UNAUTHORIZED,
            GateError::TierInsufficient { .. } => StatusCode::FORBIDDEN,
            GateError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GateError::MissingCredential => "missing_credential",
            GateError::InvalidCredential => "invalid_credential",
            GateError::TierInsufficient { .. } => "tier_insufficient",
            GateError::QuotaExceeded { .. } => "quota_exceeded",
            GateError::Internal(_) => "internal_error",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let message = match self {
            GateError::MissingCredential => {
                "Please provide your API key in the X-API-Key header".to_string()
            }
            // unknown and inactive keys share this text
            GateError::InvalidCredential => "The provided API key is invalid or inactive".to_string(),
            GateError::TierInsufficient { current_tier } => format!(
                "This endpoint is not available on the {} plan, please upgrade",
                current_tier
            ),
            GateError::QuotaExceeded { limit } => format!(
                "You have exceeded your monthly limit of {} requests, please upgrade your plan",
                limit
            ),
            GateError::Internal(message) => message.clone(),
        };

        let body = ErrorBody::new(self.kind(), message);
        match self {
            GateError::TierInsufficient { current_tier } => body.with_current_tier(*current_tier),
            GateError::QuotaExceeded { limit } => body.with_limit(*limit),
            _ => body,
        }
    }
}

impl From<anyhow::Error> for GateError {
    fn from(err: anyhow::Error) -> Self {
        GateError::Internal(err.to_string())
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
