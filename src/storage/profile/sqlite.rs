use sea_orm::*;
use anyhow::Result;
use chrono::Utc;
use super::profile_entity::{self, Model as Profile};
use super::ProfileStorage;
use crate::auth::types::{Credential, Tier};
use crate::storage::key::key_entity;
use crate::storage::Db;
use async_trait::async_trait;

#[derive(Clone)]
pub struct SqliteProfileStorage {
    db: Db,
}

impl SqliteProfileStorage {
    /// Expects the key tables to exist on `db`: account writes span both.
    pub async fn from_db(db: Db) -> Result<Self> {
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY NOT NULL,
                email TEXT NOT NULL,
                full_name TEXT,
                role TEXT NOT NULL,
                tier TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#.to_owned(),
        ))
        .await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl ProfileStorage for SqliteProfileStorage {
    async fn get(&self, id: &str) -> Result<Option<Profile>> {
        let profile = profile_entity::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?;
        Ok(profile)
    }

    async fn create(&self, profile: Profile, first_key: Credential) -> Result<()> {
        let profile: profile_entity::ActiveModel = profile.into();
        let key: key_entity::ActiveModel = first_key.into();

        let txn = self.db.begin().await?;
        profile_entity::Entity::insert(profile)
            .exec_without_returning(&txn)
            .await?;
        key_entity::Entity::insert(key)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Profile>> {
        let profiles = profile_entity::Entity::find()
            .order_by_desc(profile_entity::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(profiles)
    }

    async fn update_full_name(&self, id: &str, full_name: Option<String>) -> Result<bool> {
        let result = profile_entity::Entity::update_many()
            .set(profile_entity::ActiveModel {
                full_name: Set(full_name),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(profile_entity::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn update_tier(&self, id: &str, tier: Tier, limit: i64) -> Result<Option<u64>> {
        let txn = self.db.begin().await?;
        let profile = profile_entity::Entity::update_many()
            .set(profile_entity::ActiveModel {
                tier: Set(tier),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(profile_entity::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if profile.rows_affected != 1 {
            return Ok(None);
        }

        let keys = key_entity::Entity::update_many()
            .set(key_entity::ActiveModel {
                tier: Set(tier),
                requests_limit: Set(limit),
                ..Default::default()
            })
            .filter(key_entity::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(Some(keys.rows_affected))
    }

    async fn count(&self) -> Result<u64> {
        let count = profile_entity::Entity::find().count(&self.db).await?;
        Ok(count)
    }
}
