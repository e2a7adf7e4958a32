use sea_orm::*;
use sea_query::Expr;
use anyhow::Result;
use chrono::Utc;
use super::key_entity;
use super::retired_entity;
use super::{CredentialStore, KeyStorage};
use crate::auth::types::Credential;
use crate::storage::{connect, Db};
use async_trait::async_trait;
use tracing::info;

#[derive(Clone)]
pub struct SqliteKeyStorage {
    db: Db,
}

impl SqliteKeyStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Initializing SQLite API key storage at {}", database_url);
        let db = connect(database_url).await?;
        Self::from_db(db).await
    }

    pub async fn from_db(db: Db) -> Result<Self> {
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id TEXT PRIMARY KEY NOT NULL,
                key TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                user_id TEXT NOT NULL,
                user_email TEXT NOT NULL,
                tier TEXT NOT NULL,
                requests_count INTEGER NOT NULL DEFAULT 0,
                requests_limit INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#.to_owned(),
        ))
        .await?;

        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            "CREATE INDEX IF NOT EXISTS idx_api_keys_user_id ON api_keys (user_id)".to_owned(),
        ))
        .await?;

        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"
            CREATE TABLE IF NOT EXISTS retired_keys (
                key TEXT PRIMARY KEY NOT NULL,
                retired_at TEXT NOT NULL
            )
            "#.to_owned(),
        ))
        .await?;

        Ok(Self { db })
    }

    async fn retire<C: ConnectionTrait>(conn: &C, token: String) -> Result<()> {
        let retired = retired_entity::ActiveModel {
            key: Set(token),
            retired_at: Set(Utc::now()),
        };
        retired_entity::Entity::insert(retired)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteKeyStorage {
    async fn find_active(&self, token: &str) -> Result<Option<Credential>> {
        let key = key_entity::Entity::find()
            .filter(key_entity::Column::Key.eq(token))
            .filter(key_entity::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;
        Ok(key.map(Credential::from))
    }

    async fn increment_usage(&self, id: &str) -> Result<bool> {
        let result = key_entity::Entity::update_many()
            .col_expr(
                key_entity::Column::RequestsCount,
                Expr::col(key_entity::Column::RequestsCount).add(1),
            )
            .filter(key_entity::Column::Id.eq(id))
            .filter(
                Expr::col(key_entity::Column::RequestsCount)
                    .lt(Expr::col(key_entity::Column::RequestsLimit)),
            )
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl KeyStorage for SqliteKeyStorage {
    async fn get(&self, id: &str) -> Result<Option<Credential>> {
        let key = key_entity::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?;
        Ok(key.map(Credential::from))
    }

    async fn create(&self, credential: Credential) -> Result<()> {
        let active_model: key_entity::ActiveModel = credential.into();
        key_entity::Entity::insert(active_model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let txn = self.db.begin().await?;
        let Some(existing) = key_entity::Entity::find_by_id(id.to_owned()).one(&txn).await? else {
            return Ok(false);
        };

        key_entity::Entity::delete_by_id(id.to_owned())
            .exec(&txn)
            .await?;
        Self::retire(&txn, existing.key).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Credential>> {
        let keys = key_entity::Entity::find()
            .order_by_desc(key_entity::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(keys.into_iter().map(Credential::from).collect())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Credential>> {
        let keys = key_entity::Entity::find()
            .filter(key_entity::Column::UserId.eq(owner_id))
            .order_by_desc(key_entity::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(keys.into_iter().map(Credential::from).collect())
    }

    async fn rotate_token(&self, id: &str, token: &str) -> Result<bool> {
        let txn = self.db.begin().await?;
        let Some(existing) = key_entity::Entity::find_by_id(id.to_owned()).one(&txn).await? else {
            return Ok(false);
        };

        key_entity::Entity::update_many()
            .col_expr(key_entity::Column::Key, Expr::value(token))
            .filter(key_entity::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        Self::retire(&txn, existing.key).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<bool> {
        let result = key_entity::Entity::update_many()
            .set(key_entity::ActiveModel {
                is_active: Set(active),
                ..Default::default()
            })
            .filter(key_entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn token_exists(&self, token: &str) -> Result<bool> {
        let live = key_entity::Entity::find()
            .filter(key_entity::Column::Key.eq(token))
            .count(&self.db)
            .await?;
        if live > 0 {
            return Ok(true);
        }

        let retired = retired_entity::Entity::find_by_id(token.to_owned())
            .one(&self.db)
            .await?;
        Ok(retired.is_some())
    }

    async fn count(&self) -> Result<u64> {
        let count = key_entity::Entity::find().count(&self.db).await?;
        Ok(count)
    }
}
