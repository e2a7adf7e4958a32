use super::error::GateError;
use super::policy::TierPolicy;
use super::types::{Credential, Tier};
use crate::storage::CredentialStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header that carries the bearer token on metered requests.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A metered route: its name for logs and the tiers allowed to call it.
#[derive(Debug, Clone, Copy)]
pub struct MeteredEndpoint {
    pub name: &'static str,
    pub required_tiers: Option<&'static [Tier]>,
}

impl MeteredEndpoint {
    pub const fn open(name: &'static str) -> Self {
        Self {
            name,
            required_tiers: None,
        }
    }

    pub const fn restricted(name: &'static str, tiers: &'static [Tier]) -> Self {
        Self {
            name,
            required_tiers: Some(tiers),
        }
    }
}

/// Authorization and usage accounting for metered endpoints.
///
/// Holds no per-request state: every call reads the live credential row.
pub struct Gate {
    store: Arc<dyn CredentialStore>,
    policy: TierPolicy,
}

impl Gate {
    pub fn new(store: Arc<dyn CredentialStore>, policy: TierPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Decides whether a call may be served. Never touches the usage counter.
    ///
    /// Checks run in order: presence, lookup (unknown and inactive tokens are
    /// both `InvalidCredential`), tier membership, then quota with `>=`.
    pub async fn authorize(
        &self,
        presented: Option<&str>,
        required_tiers: Option<&[Tier]>,
    ) -> Result<Credential, GateError> {
        let token = match presented.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(GateError::MissingCredential),
        };

        let credential = self
            .store
            .find_active(token)
            .await?
            .ok_or(GateError::InvalidCredential)?;

        if let Some(required) = required_tiers {
            if !required.contains(&credential.tier) {
                debug!(key_id = %credential.id, tier = %credential.tier, "tier not permitted");
                return Err(GateError::TierInsufficient {
                    current_tier: credential.tier,
                });
            }
        }

        if credential.is_exhausted() {
            debug!(key_id = %credential.id, limit = credential.usage_limit, "quota exhausted");
            return Err(GateError::QuotaExceeded {
                limit: credential.usage_limit,
            });
        }

        Ok(credential)
    }

    /// Counts one served request. Call once, after the response body exists.
    ///
    /// Failures are logged and swallowed: the response has already been
    /// promised to the caller.
    pub async fn record_usage(&self, credential_id: &str) {
        match self.store.increment_usage(credential_id).await {
            Ok(true) => {}
            Ok(false) => warn!(
                key_id = credential_id,
                "usage increment not applied, key missing or already at its limit"
            ),
            Err(e) => warn!(key_id = credential_id, error = %e, "failed to record usage"),
        }
    }
}
