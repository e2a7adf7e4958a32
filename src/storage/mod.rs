pub mod key;
pub mod log;
pub mod profile;
pub mod property;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use anyhow::Result;

pub type Db = DatabaseConnection;

pub async fn connect(database_url: &str) -> Result<Db> {
    let db = Database::connect(
        ConnectOptions::new(database_url.to_owned())
            .sqlx_logging(false)
            .to_owned(),
    )
    .await?;
    Ok(db)
}

pub use key::{CredentialStore, KeyStorage, SqliteKeyStorage};
pub use log::{RequestLog, RequestLogStorage, SqliteRequestLogStorage};
pub use profile::{Profile, ProfileStorage, SqliteProfileStorage};
pub use property::{
    ListingMode, LocationCount, Property, PropertyFilter, PropertyPage, PropertyStorage,
    SqlitePropertyStorage, DEFAULT_PAGE_SIZE,
};
