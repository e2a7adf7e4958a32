use sea_orm::entity::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a listing is for sale (`jual`) or for rent (`sewa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    #[sea_orm(string_value = "jual")]
    Jual,
    #[sea_orm(string_value = "sewa")]
    Sewa,
}

impl ListingMode {
    /// Lenient parse used for query strings: unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "jual" => Some(ListingMode::Jual),
            "sewa" => Some(ListingMode::Sewa),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub url: String,
    pub price: String,
    pub price_numeric: Option<i64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub building_area: Option<f64>,
    pub location: String,
    pub posting_date: String,
    pub image_url: String,
    pub mode: ListingMode,
    pub slug: String,
    pub prop_type: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
