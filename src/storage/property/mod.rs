mod property_entity;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use property_entity::{ListingMode, Model as Property};
pub use sqlite::SqlitePropertyStorage;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub mode: Option<ListingMode>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub bedrooms: Option<i32>,
    pub limit: u64,
    pub offset: u64,
}

impl PropertyFilter {
    /// Clamps raw query-string paging into the supported window.
    pub fn paged(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .map(|l| l.clamp(1, MAX_PAGE_SIZE as i64) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = offset.map(|o| o.max(0) as u64).unwrap_or(0);
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyPage {
    pub properties: Vec<Property>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}

/// Read side of the listing dataset, plus bulk import for seeding.
#[async_trait]
pub trait PropertyStorage: Send + Sync + 'static {
    async fn find(&self, filter: &PropertyFilter) -> Result<PropertyPage>;
    async fn get(&self, id: &str) -> Result<Option<Property>>;
    async fn count(&self, mode: Option<ListingMode>) -> Result<u64>;
    /// Non-null, non-zero numeric prices in ascending order.
    async fn sorted_prices(&self) -> Result<Vec<i64>>;
    /// Listing count per raw location value.
    async fn location_counts(&self) -> Result<Vec<LocationCount>>;
    async fn insert_many(&self, properties: Vec<Property>) -> Result<u64>;
}

#[cfg(test)]
pub(crate) fn sample_property(id: &str, location: &str, mode: ListingMode, price: Option<i64>) -> Property {
    use chrono::{Duration, TimeZone, Utc};

    // the numeric suffix of the id doubles as its creation minute
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let offset: i64 = id
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(0);
    Property {
        id: id.to_string(),
        title: format!("Rumah {}", id),
        url: format!("https://www.olx.co.id/item/{}", id),
        price: price.map(|p| format!("Rp {}", p)).unwrap_or_default(),
        price_numeric: price,
        bedrooms: Some(3),
        bathrooms: Some(2),
        building_area: Some(120.0),
        location: location.to_string(),
        posting_date: "2024-01-01".to_string(),
        image_url: String::new(),
        mode,
        slug: format!("rumah-{}", id),
        prop_type: Some("rumah".to_string()),
        scraped_at: base,
        created_at: base + Duration::minutes(offset),
    }
}
