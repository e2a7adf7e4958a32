use sea_orm::*;
use sea_query::{Expr, OnConflict};
use anyhow::Result;
use super::property_entity::{self, ListingMode, Model as Property};
use super::{LocationCount, PropertyFilter, PropertyPage, PropertyStorage};
use crate::storage::{connect, Db};
use async_trait::async_trait;
use tracing::info;

const INSERT_CHUNK: usize = 50;

#[derive(Clone)]
pub struct SqlitePropertyStorage {
    db: Db,
}

impl SqlitePropertyStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Initializing SQLite property storage at {}", database_url);
        let db = connect(database_url).await?;
        Self::from_db(db).await
    }

    pub async fn from_db(db: Db) -> Result<Self> {
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            r#"
            CREATE TABLE IF NOT EXISTS properties (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                price TEXT NOT NULL,
                price_numeric INTEGER,
                bedrooms INTEGER,
                bathrooms INTEGER,
                building_area REAL,
                location TEXT NOT NULL,
                posting_date TEXT NOT NULL,
                image_url TEXT NOT NULL,
                mode TEXT NOT NULL,
                slug TEXT NOT NULL,
                prop_type TEXT,
                scraped_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#.to_owned(),
        ))
        .await?;

        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            "CREATE INDEX IF NOT EXISTS idx_properties_created_at ON properties (created_at)".to_owned(),
        ))
        .await?;

        Ok(Self { db })
    }

    fn filtered(filter: &PropertyFilter) -> Select<property_entity::Entity> {
        let mut select = property_entity::Entity::find();

        // SQLite LIKE is case-insensitive for ASCII
        if let Some(location) = filter.location.as_deref().filter(|l| !l.is_empty()) {
            select = select.filter(property_entity::Column::Location.contains(location));
        }
        if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
            select = select.filter(property_entity::Column::Title.contains(title));
        }
        if let Some(mode) = filter.mode {
            select = select.filter(property_entity::Column::Mode.eq(mode));
        }
        if let Some(min_price) = filter.min_price {
            select = select.filter(property_entity::Column::PriceNumeric.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            select = select.filter(property_entity::Column::PriceNumeric.lte(max_price));
        }
        if let Some(bedrooms) = filter.bedrooms {
            select = select.filter(property_entity::Column::Bedrooms.eq(bedrooms));
        }

        select
    }
}

#[async_trait]
impl PropertyStorage for SqlitePropertyStorage {
    async fn find(&self, filter: &PropertyFilter) -> Result<PropertyPage> {
        let select = Self::filtered(filter);
        let total = select.clone().count(&self.db).await?;

        let properties = select
            .order_by_desc(property_entity::Column::CreatedAt)
            .order_by_asc(property_entity::Column::Id)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await?;

        Ok(PropertyPage { properties, total })
    }

    async fn get(&self, id: &str) -> Result<Option<Property>> {
        let property = property_entity::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?;
        Ok(property)
    }

    async fn count(&self, mode: Option<ListingMode>) -> Result<u64> {
        let mut select = property_entity::Entity::find();
        if let Some(mode) = mode {
            select = select.filter(property_entity::Column::Mode.eq(mode));
        }
        Ok(select.count(&self.db).await?)
    }

    async fn sorted_prices(&self) -> Result<Vec<i64>> {
        let prices = property_entity::Entity::find()
            .select_only()
            .column(property_entity::Column::PriceNumeric)
            .filter(property_entity::Column::PriceNumeric.is_not_null())
            .filter(property_entity::Column::PriceNumeric.ne(0))
            .order_by_asc(property_entity::Column::PriceNumeric)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;
        Ok(prices)
    }

    async fn location_counts(&self) -> Result<Vec<LocationCount>> {
        let rows = property_entity::Entity::find()
            .select_only()
            .column(property_entity::Column::Location)
            .column_as(Expr::col(property_entity::Column::Id).count(), "count")
            .group_by(property_entity::Column::Location)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(location, count)| LocationCount { location, count })
            .collect())
    }

    async fn insert_many(&self, properties: Vec<Property>) -> Result<u64> {
        let mut inserted = 0;
        // keep each statement under SQLite's bound-parameter limit
        for chunk in properties.chunks(INSERT_CHUNK) {
            let models: Vec<property_entity::ActiveModel> =
                chunk.iter().cloned().map(Into::into).collect();
            inserted += property_entity::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(property_entity::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
        }
        Ok(inserted)
    }
}
