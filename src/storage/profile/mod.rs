mod profile_entity;
pub mod sqlite;


pub use profile_entity::Model as Profile;
pub use sqlite::SqliteProfileStorage;
use crate::auth::types::{Credential, Tier};
use anyhow::Result;
use async_trait::async_trait;

/// Account records. Identity itself lives in the upstream provider; this
/// table only carries role, tier and display data keyed by its user id.
#[async_trait]
pub trait ProfileStorage: Send + Sync + 'static {
    async fn get(&self, id: &str) -> Result<Option<Profile>>;
    /// Inserts the profile together with its first key, both or neither.
    async fn create(&self, profile: Profile, first_key: Credential) -> Result<()>;
    async fn list(&self) -> Result<Vec<Profile>>;
    async fn update_full_name(&self, id: &str, full_name: Option<String>) -> Result<bool>;
    /// Moves the profile and every key it owns to `tier` with the given
    /// limit in one transaction. Usage counters are untouched. `None` when
    /// the profile does not exist, otherwise the number of keys changed.
    async fn update_tier(&self, id: &str, tier: Tier, limit: i64) -> Result<Option<u64>>;
    async fn count(&self) -> Result<u64>;
}
