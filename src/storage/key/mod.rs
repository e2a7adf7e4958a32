pub(crate) mod key_entity;
mod retired_entity;
pub mod sqlite;


pub use sqlite::SqliteKeyStorage;
use crate::auth::types::Credential;
use anyhow::Result;
use async_trait::async_trait;

/// The two store operations the request gate depends on.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Active key whose token matches exactly, if any.
    async fn find_active(&self, token: &str) -> Result<Option<Credential>>;

    /// Adds one to the usage counter unless it already reached the limit.
    /// Returns whether a row was updated.
    async fn increment_usage(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait KeyStorage: CredentialStore {
    async fn get(&self, id: &str) -> Result<Option<Credential>>;
    async fn create(&self, credential: Credential) -> Result<()>;
    /// Deletes the key and retires its token.
    async fn remove(&self, id: &str) -> Result<bool>;
    async fn list(&self) -> Result<Vec<Credential>>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Credential>>;
    /// Swaps in a new token and retires the old one.
    async fn rotate_token(&self, id: &str, token: &str) -> Result<bool>;
    async fn set_active(&self, id: &str, active: bool) -> Result<bool>;
    /// True for tokens that are live or have ever been retired.
    async fn token_exists(&self, token: &str) -> Result<bool>;
    async fn count(&self) -> Result<u64>;
}
