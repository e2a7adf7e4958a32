use super::error::ApiError;
use crate::account::AccountError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Set by the upstream identity service once it has verified the session.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Id of the signed-in caller. Whether that account exists is checked by
/// the account service, not here.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CallerId(id.to_string()))
            .ok_or(ApiError::Account(AccountError::Unauthenticated))
    }
}
