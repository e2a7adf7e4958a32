use axum::{extract::Query, routing::get, Json, Router};
use crate::utils::http::HttpResponse;
use serde::{Deserialize, Serialize};

pub fn locations_router() -> Router {
    Router::new().route("/api/v1/locations", get(locations))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub slug: &'static str,
    pub name: &'static str,
    pub region: &'static str,
}

const fn loc(slug: &'static str, name: &'static str, region: &'static str) -> Location {
    Location { slug, name, region }
}

/// Locations covered by the scraper.
pub const LOCATIONS: [Location; 20] = [
    loc("jakarta-dki_g2000007", "DKI Jakarta", "Jakarta"),
    loc("jakarta-pusat", "Jakarta Pusat", "Jakarta"),
    loc("jakarta-selatan", "Jakarta Selatan", "Jakarta"),
    loc("jakarta-barat", "Jakarta Barat", "Jakarta"),
    loc("jakarta-timur", "Jakarta Timur", "Jakarta"),
    loc("jakarta-utara", "Jakarta Utara", "Jakarta"),
    loc("tangerang", "Tangerang", "Banten"),
    loc("tangerang-selatan", "Tangerang Selatan", "Banten"),
    loc("bekasi", "Bekasi", "Jawa Barat"),
    loc("depok", "Depok", "Jawa Barat"),
    loc("bogor", "Bogor", "Jawa Barat"),
    loc("bandung", "Bandung", "Jawa Barat"),
    loc("surabaya", "Surabaya", "Jawa Timur"),
    loc("semarang", "Semarang", "Jawa Tengah"),
    loc("yogyakarta", "Yogyakarta", "DIY"),
    loc("bali", "Bali", "Bali"),
    loc("denpasar", "Denpasar", "Bali"),
    loc("medan", "Medan", "Sumatera Utara"),
    loc("makassar", "Makassar", "Sulawesi Selatan"),
    loc("palembang", "Palembang", "Sumatera Selatan"),
];

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationList {
    pub locations: Vec<Location>,
    pub total: usize,
}

pub fn filter_locations(region: Option<&str>) -> Vec<Location> {
    match region.map(str::trim).filter(|r| !r.is_empty()) {
        Some(region) => LOCATIONS
            .iter()
            .filter(|loc| loc.region.eq_ignore_ascii_case(region))
            .copied()
            .collect(),
        None => LOCATIONS.to_vec(),
    }
}

pub async fn locations(Query(query): Query<LocationQuery>) -> Json<HttpResponse<LocationList>> {
    let locations = filter_locations(query.region.as_deref());
    Json(HttpResponse::ok(LocationList {
        total: locations.len(),
        locations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_region() {
        assert_eq!(filter_locations(None).len(), 20);
        assert_eq!(filter_locations(Some("jakarta")).len(), 6);
        assert_eq!(filter_locations(Some("JAWA BARAT")).len(), 4);
        assert!(filter_locations(Some("Papua")).is_empty());
    }
}
