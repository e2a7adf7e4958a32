use crate::auth::{Credential, Tier};
use serde::{Deserialize, Serialize};

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

impl<T> HttpResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    pub fn metered(data: T, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub requests_remaining: i64,
    pub tier: Tier,
}

impl ResponseMeta {
    pub fn for_credential(credential: &Credential) -> Self {
        Self {
            requests_remaining: credential.requests_remaining(),
            tier: credential.tier,
        }
    }
}

/// Failure envelope. `error` is the stable machine-readable kind.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl ErrorBody {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: message.into(),
            current_tier: None,
            limit: None,
        }
    }

    pub fn with_current_tier(mut self, tier: Tier) -> Self {
        self.current_tier = Some(tier);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
