mod log_entity;
pub mod sqlite;

pub use log_entity::Model as RequestLog;
pub use sqlite::SqliteRequestLogStorage;
use anyhow::Result;
use async_trait::async_trait;

/// Append-only record of served metered requests.
#[async_trait]
pub trait RequestLogStorage: Send + Sync + 'static {
    async fn append(&self, entry: RequestLog) -> Result<()>;
    async fn count(&self) -> Result<u64>;
    async fn count_for_key(&self, api_key_id: &str) -> Result<u64>;
}
