use sea_orm::entity::prelude::*;
use chrono::{DateTime, Utc};
use crate::auth::types::{Credential, Tier};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "api_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    pub user_id: String,
    pub user_email: String,
    pub tier: Tier,
    pub requests_count: i64,
    pub requests_limit: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Credential {
    fn from(model: Model) -> Self {
        Credential {
            id: model.id,
            token: model.key,
            name: model.name,
            owner_id: model.user_id,
            owner_email: model.user_email,
            tier: model.tier,
            usage_count: model.requests_count,
            usage_limit: model.requests_limit,
            active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<Credential> for ActiveModel {
    fn from(credential: Credential) -> Self {
        use sea_orm::ActiveValue::Set;

        ActiveModel {
            id: Set(credential.id),
            key: Set(credential.token),
            name: Set(credential.name),
            user_id: Set(credential.owner_id),
            user_email: Set(credential.owner_email),
            tier: Set(credential.tier),
            requests_count: Set(credential.usage_count),
            requests_limit: Set(credential.usage_limit),
            is_active: Set(credential.active),
            created_at: Set(credential.created_at),
        }
    }
}
