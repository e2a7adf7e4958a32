//! Account and key management behind the dashboard and admin endpoints.


use crate::auth::{generate_token, Credential, Role, Tier, TierPolicy};
use crate::storage::{KeyStorage, Profile, ProfileStorage, PropertyStorage, RequestLogStorage};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_KEY_NAME: &str = "Default Key";
const TOKEN_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// A profile together with every key it owns.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub profile: Profile,
    pub keys: Vec<Credential>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_properties: u64,
    pub total_requests: u64,
    pub total_api_keys: u64,
}

pub struct AccountService {
    keys: Arc<dyn KeyStorage>,
    profiles: Arc<dyn ProfileStorage>,
    properties: Arc<dyn PropertyStorage>,
    request_logs: Arc<dyn RequestLogStorage>,
    policy: TierPolicy,
}

impl AccountService {
    pub fn new(
        keys: Arc<dyn KeyStorage>,
        profiles: Arc<dyn ProfileStorage>,
        properties: Arc<dyn PropertyStorage>,
        request_logs: Arc<dyn RequestLogStorage>,
        policy: TierPolicy,
    ) -> Self {
        Self {
            keys,
            profiles,
            properties,
            request_logs,
            policy,
        }
    }

    /// Creates the profile for a freshly signed-up identity and its first key.
    pub async fn register(
        &self,
        user_id: &str,
        email: &str,
        full_name: Option<String>,
    ) -> AccountResult<(Profile, Credential)> {
        self.register_as(user_id, email, full_name, Role::User, Tier::Free).await
    }

    pub async fn register_as(
        &self,
        user_id: &str,
        email: &str,
        full_name: Option<String>,
        role: Role,
        tier: Tier,
    ) -> AccountResult<(Profile, Credential)> {
        let email = email.trim();
        if user_id.trim().is_empty() || email.is_empty() {
            return Err(AccountError::BadRequest("user id and email are required".into()));
        }
        if self.profiles.get(user_id).await?.is_some() {
            return Err(AccountError::Conflict(format!("profile {} already exists", user_id)));
        }

        let now = Utc::now();
        let profile = Profile {
            id: user_id.to_string(),
            email: email.to_string(),
            full_name: full_name.filter(|n| !n.trim().is_empty()),
            role,
            tier,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let credential = self.new_credential(&profile, DEFAULT_KEY_NAME).await?;
        self.profiles.create(profile.clone(), credential.clone()).await?;
        info!(user_id, tier = %tier, "registered account");
        Ok((profile, credential))
    }

    /// Profile of a caller, rejecting unknown or deactivated accounts.
    pub async fn require_profile(&self, user_id: &str) -> AccountResult<Profile> {
        match self.profiles.get(user_id).await? {
            Some(profile) if profile.is_active => Ok(profile),
            _ => Err(AccountError::Unauthenticated),
        }
    }

    pub async fn require_operator(&self, user_id: &str) -> AccountResult<Profile> {
        let profile = self.require_profile(user_id).await?;
        if !profile.role.can_administer() {
            return Err(AccountError::Forbidden("operator role required".into()));
        }
        Ok(profile)
    }

    pub async fn update_profile(&self, user_id: &str, full_name: Option<String>) -> AccountResult<Profile> {
        let full_name = full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if !self.profiles.update_full_name(user_id, full_name).await? {
            return Err(AccountError::NotFound("profile"));
        }
        self.require_profile(user_id).await
    }

    pub async fn list_keys(&self, owner_id: &str) -> AccountResult<Vec<Credential>> {
        Ok(self.keys.list_by_owner(owner_id).await?)
    }

    /// New key at the owner's current tier.
    pub async fn issue_key(&self, owner_id: &str, name: &str) -> AccountResult<Credential> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::BadRequest("key name is required".into()));
        }
        let profile = self.require_profile(owner_id).await?;
        self.issue_for(&profile, name).await
    }

    pub async fn revoke_key(&self, owner_id: &str, key_id: &str) -> AccountResult<()> {
        self.owned_key(owner_id, key_id).await?;
        if !self.keys.remove(key_id).await? {
            return Err(AccountError::NotFound("api key"));
        }
        info!(owner_id, key_id, "revoked api key");
        Ok(())
    }

    /// Replaces the token. The old one stops working immediately.
    pub async fn regenerate_key(&self, owner_id: &str, key_id: &str) -> AccountResult<Credential> {
        self.owned_key(owner_id, key_id).await?;
        let token = self.unique_token().await?;
        if !self.keys.rotate_token(key_id, &token).await? {
            return Err(AccountError::NotFound("api key"));
        }
        info!(owner_id, key_id, "regenerated api key");
        self.keys
            .get(key_id)
            .await?
            .ok_or(AccountError::NotFound("api key"))
    }

    pub async fn list_accounts(&self) -> AccountResult<Vec<AccountSummary>> {
        let profiles = self.profiles.list().await?;
        let mut accounts = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let keys = self.keys.list_by_owner(&profile.id).await?;
            accounts.push(AccountSummary { profile, keys });
        }
        Ok(accounts)
    }

    /// Moves an account and all of its keys to `tier`. Usage counts are kept.
    pub async fn set_tier(&self, user_id: &str, tier: Tier) -> AccountResult<AccountSummary> {
        let profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or(AccountError::NotFound("profile"))?;
        if profile.role == Role::Owner {
            return Err(AccountError::Forbidden("the owner's tier cannot be changed".into()));
        }

        let limit = self.policy.limit_for(tier);
        let updated = self
            .profiles
            .update_tier(user_id, tier, limit)
            .await?
            .ok_or(AccountError::NotFound("profile"))?;
        info!(user_id, tier = %tier, limit, keys = updated, "changed account tier");

        let profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or(AccountError::NotFound("profile"))?;
        let keys = self.keys.list_by_owner(user_id).await?;
        Ok(AccountSummary { profile, keys })
    }

    /// Flips a key between active and inactive.
    pub async fn toggle_key(&self, key_id: &str) -> AccountResult<Credential> {
        let key = self
            .keys
            .get(key_id)
            .await?
            .ok_or(AccountError::NotFound("api key"))?;
        self.keys.set_active(key_id, !key.active).await?;
        info!(key_id, active = !key.active, "toggled api key");
        self.keys
            .get(key_id)
            .await?
            .ok_or(AccountError::NotFound("api key"))
    }

    pub async fn stats(&self) -> AccountResult<PlatformStats> {
        Ok(PlatformStats {
            total_users: self.profiles.count().await?,
            total_properties: self.properties.count(None).await?,
            total_requests: self.request_logs.count().await?,
            total_api_keys: self.keys.count().await?,
        })
    }

    async fn owned_key(&self, owner_id: &str, key_id: &str) -> AccountResult<Credential> {
        match self.keys.get(key_id).await? {
            Some(key) if key.owner_id == owner_id => Ok(key),
            // other owners' keys are reported as missing
            _ => Err(AccountError::NotFound("api key")),
        }
    }

    async fn issue_for(&self, profile: &Profile, name: &str) -> AccountResult<Credential> {
        let credential = self.new_credential(profile, name).await?;
        self.keys.create(credential.clone()).await?;
        info!(owner_id = %profile.id, key_id = %credential.id, tier = %credential.tier, "issued api key");
        Ok(credential)
    }

    /// Fresh, unsaved key at the profile's tier.
    async fn new_credential(&self, profile: &Profile, name: &str) -> AccountResult<Credential> {
        Ok(Credential {
            id: Uuid::new_v4().to_string(),
            token: self.unique_token().await?,
            name: name.to_string(),
            owner_id: profile.id.clone(),
            owner_email: profile.email.clone(),
            tier: profile.tier,
            usage_count: 0,
            usage_limit: self.policy.limit_for(profile.tier),
            active: true,
            created_at: Utc::now(),
        })
    }

    async fn unique_token(&self) -> AccountResult<String> {
        for _ in 0..TOKEN_ATTEMPTS {
            let token = generate_token();
            if !self.keys.token_exists(&token).await? {
                return Ok(token);
            }
            warn!("generated token collided with an existing one, retrying");
        }
        Err(AccountError::Storage(anyhow::anyhow!(
            "could not generate a unique api key"
        )))
    }
}
