use sea_orm::*;
use anyhow::Result;
use super::log_entity::{self, Model as RequestLog};
use super::RequestLogStorage;
use crate::storage::{connect, Db};
use async_trait::async_trait;
use tracing::info;

#[derive(Clone)]
pub struct SqliteRequestLogStorage {
    db: Db,
}

impl SqliteRequestLogStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Initializing SQLite request log storage at {}", database_url);
        let db = connect(database_url).await?;
        Self::from_db(db).await
    }

    pub async fn from_db(db: Db) -> Result<Self> {
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"
            CREATE TABLE IF NOT EXISTS request_logs (
                id TEXT PRIMARY KEY NOT NULL,
                api_key_id TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                method TEXT NOT NULL,
                status_code INTEGER NOT NULL,
                response_time_ms INTEGER NOT NULL,
                user_agent TEXT,
                created_at TEXT NOT NULL
            )
            "#.to_owned(),
        ))
        .await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl RequestLogStorage for SqliteRequestLogStorage {
    async fn append(&self, entry: RequestLog) -> Result<()> {
        let active_model: log_entity::ActiveModel = entry.into();
        log_entity::Entity::insert(active_model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(log_entity::Entity::find().count(&self.db).await?)
    }

    async fn count_for_key(&self, api_key_id: &str) -> Result<u64> {
        let count = log_entity::Entity::find()
            .filter(log_entity::Column::ApiKeyId.eq(api_key_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
