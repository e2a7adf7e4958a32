use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use crate::auth::{MeteredEndpoint, Tier};
use crate::storage::{ListingMode, LocationCount};
use crate::web::error::ApiError;
use crate::web::metered::serve_metered;
use crate::AppContext;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const ANALYTICS: MeteredEndpoint =
    MeteredEndpoint::restricted("/api/v1/analytics", &[Tier::Pro, Tier::Enterprise]);

const TOP_LOCATIONS: usize = 10;
const UNKNOWN_LOCATION: &str = "Unknown";

pub fn analytics_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/analytics", get(analytics))
        .with_state(ctx)
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_properties: u64,
    pub for_sale: u64,
    pub for_rent: u64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub average: i64,
    pub median: i64,
    pub min: i64,
    pub max: i64,
    pub currency: &'static str,
}

impl PriceStatistics {
    /// `prices` must be sorted ascending.
    pub fn from_sorted(prices: &[i64]) -> Self {
        let mut stats = PriceStatistics {
            average: 0,
            median: 0,
            min: 0,
            max: 0,
            currency: "IDR",
        };
        if let (Some(first), Some(last)) = (prices.first(), prices.last()) {
            let sum: i128 = prices.iter().map(|p| i128::from(*p)).sum();
            stats.average = (sum as f64 / prices.len() as f64).round() as i64;
            stats.median = prices[prices.len() / 2];
            stats.min = *first;
            stats.max = *last;
        }
        stats
    }
}

/// Busiest locations first, blank locations folded into "Unknown".
pub fn top_locations(counts: Vec<LocationCount>, n: usize) -> Vec<LocationCount> {
    let mut merged: HashMap<String, i64> = HashMap::new();
    for LocationCount { location, count } in counts {
        let location = if location.trim().is_empty() {
            UNKNOWN_LOCATION.to_string()
        } else {
            location
        };
        *merged.entry(location).or_default() += count;
    }

    let mut ranked: Vec<LocationCount> = merged
        .into_iter()
        .map(|(location, count)| LocationCount { location, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Serialize)]
pub struct Analytics {
    pub overview: Overview,
    pub price_statistics: PriceStatistics,
    pub top_locations: Vec<LocationCount>,
    pub last_updated: DateTime<Utc>,
}

pub async fn analytics(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let properties = ctx.properties.clone();

    serve_metered(&ctx, ANALYTICS, &headers, || async move {
        let (total, for_sale, for_rent, prices, locations) = tokio::try_join!(
            properties.count(None),
            properties.count(Some(ListingMode::Jual)),
            properties.count(Some(ListingMode::Sewa)),
            properties.sorted_prices(),
            properties.location_counts()
        )?;

        Ok::<_, ApiError>(Analytics {
            overview: Overview {
                total_properties: total,
                for_sale,
                for_rent,
            },
            price_statistics: PriceStatistics::from_sorted(&prices),
            top_locations: top_locations(locations, TOP_LOCATIONS),
            last_updated: Utc::now(),
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(location: &str, count: i64) -> LocationCount {
        LocationCount {
            location: location.to_string(),
            count,
        }
    }

    #[test]
    fn test_price_statistics() {
        let stats = PriceStatistics::from_sorted(&[100, 200, 400, 1_000]);
        assert_eq!(stats.min, 100);
        assert_eq!(stats.max, 1_000);
        assert_eq!(stats.median, 400);
        assert_eq!(stats.average, 425);

        let stats = PriceStatistics::from_sorted(&[1, 2]);
        assert_eq!(stats.average, 2);
        assert_eq!(stats.median, 2);
    }

    #[test]
    fn test_price_statistics_empty() {
        let stats = PriceStatistics::from_sorted(&[]);
        assert_eq!(
            stats,
            PriceStatistics {
                average: 0,
                median: 0,
                min: 0,
                max: 0,
                currency: "IDR",
            }
        );
    }

    #[test]
    fn test_top_locations_merges_blank_and_ranks() {
        let ranked = top_locations(
            vec![
                count("Bandung", 3),
                count("", 2),
                count("  ", 2),
                count("Bali", 3),
                count("Depok", 1),
            ],
            3,
        );
        assert_eq!(
            ranked,
            vec![count("Unknown", 4), count("Bali", 3), count("Bandung", 3)]
        );
    }
}
