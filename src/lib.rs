pub mod account;
pub mod auth;
pub mod config;
pub mod storage;
pub mod utils;
pub mod web;

use account::AccountService;
use anyhow::Result;
use auth::{Gate, TierPolicy};
use std::sync::Arc;
use storage::{
    PropertyStorage, RequestLogStorage, SqliteKeyStorage, SqliteProfileStorage,
    SqlitePropertyStorage, SqliteRequestLogStorage,
};

/// Shared state handed to every handler.
pub struct AppContext {
    pub gate: Arc<Gate>,
    pub accounts: Arc<AccountService>,
    pub properties: Arc<dyn PropertyStorage>,
    pub request_logs: Arc<dyn RequestLogStorage>,
}

impl AppContext {
    /// Opens every store on one connection pool and wires the services.
    pub async fn open(database_url: &str, policy: TierPolicy) -> Result<Self> {
        let db = storage::connect(database_url).await?;

        let keys = Arc::new(SqliteKeyStorage::from_db(db.clone()).await?);
        let profiles = Arc::new(SqliteProfileStorage::from_db(db.clone()).await?);
        let properties = Arc::new(SqlitePropertyStorage::from_db(db.clone()).await?);
        let request_logs = Arc::new(SqliteRequestLogStorage::from_db(db).await?);

        let gate = Arc::new(Gate::new(keys.clone(), policy));
        let accounts = Arc::new(AccountService::new(
            keys,
            profiles,
            properties.clone(),
            request_logs.clone(),
            policy,
        ));

        Ok(Self {
            gate,
            accounts,
            properties,
            request_logs,
        })
    }
}

pub fn init_env() {
    dotenv::dotenv().ok();
}
