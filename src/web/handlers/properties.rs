use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Router,
};
use crate::auth::MeteredEndpoint;
use crate::storage::{ListingMode, Property, PropertyFilter};
use crate::web::error::ApiError;
use crate::web::metered::serve_metered;
use crate::AppContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const LIST_PROPERTIES: MeteredEndpoint = MeteredEndpoint::open("/api/v1/properties");
pub const GET_PROPERTY: MeteredEndpoint = MeteredEndpoint::open("/api/v1/properties/:id");

pub fn properties_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/properties", get(list_properties))
        .route("/api/v1/properties/:id", get(get_property))
        .with_state(ctx)
}

/// Raw query string. Values that do not parse are ignored rather than
/// rejected so a bad parameter never masks an authorization failure.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyQuery {
    pub location: Option<String>,
    pub mode: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub bedrooms: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn parse_num<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl PropertyQuery {
    pub fn to_filter(&self) -> PropertyFilter {
        let mut filter = PropertyFilter::paged(parse_num(&self.limit), parse_num(&self.offset));
        filter.location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        filter.mode = self.mode.as_deref().and_then(ListingMode::parse);
        filter.min_price = parse_num(&self.min_price);
        filter.max_price = parse_num(&self.max_price);
        filter.bedrooms = parse_num(&self.bedrooms);
        filter
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct PropertyList {
    pub properties: Vec<Property>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    pub property: Property,
}

pub async fn list_properties(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<PropertyQuery>,
) -> impl IntoResponse {
    let filter = query.to_filter();
    let properties = ctx.properties.clone();

    serve_metered(&ctx, LIST_PROPERTIES, &headers, || async move {
        let page = properties.find(&filter).await?;
        Ok::<_, ApiError>(PropertyList {
            properties: page.properties,
            pagination: Pagination {
                total: page.total,
                limit: filter.limit,
                offset: filter.offset,
                has_more: page.total > filter.offset + filter.limit,
            },
        })
    })
    .await
}

pub async fn get_property(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let properties = ctx.properties.clone();

    serve_metered(&ctx, GET_PROPERTY, &headers, || async move {
        let property = properties
            .get(&id)
            .await?
            .ok_or(ApiError::NotFound("property"))?;
        Ok::<_, ApiError>(PropertyDetail { property })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing_is_lenient() {
        let query = PropertyQuery {
            location: Some("  ".into()),
            mode: Some("lease".into()),
            min_price: Some("abc".into()),
            max_price: Some("2000000000".into()),
            bedrooms: Some("3".into()),
            limit: Some("1000".into()),
            offset: Some("-5".into()),
        };
        let filter = query.to_filter();

        assert_eq!(filter.location, None);
        assert_eq!(filter.mode, None);
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(2_000_000_000));
        assert_eq!(filter.bedrooms, Some(3));
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_query_defaults() {
        let filter = PropertyQuery::default().to_filter();
        assert_eq!(filter.limit, 20);
        assert_eq!(filter.offset, 0);

        let query = PropertyQuery {
            mode: Some("sewa".into()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().mode, Some(ListingMode::Sewa));
    }
}
