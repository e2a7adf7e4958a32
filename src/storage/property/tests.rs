use super::*;
use tempfile::NamedTempFile;

async fn setup_test_db() -> (SqlitePropertyStorage, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}?mode=rwc", temp_file.path().display());
    let storage = SqlitePropertyStorage::new(&db_url).await.unwrap();
    (storage, temp_file)
}

async fn seeded() -> (SqlitePropertyStorage, NamedTempFile) {
    let (storage, temp_file) = setup_test_db().await;
    let mut studio = sample_property("p4", "Jakarta Pusat", ListingMode::Sewa, Some(5_000_000));
    studio.bedrooms = Some(1);
    studio.title = "Studio Apartemen Menteng".to_string();

    let rows = vec![
        sample_property("p1", "Jakarta Selatan", ListingMode::Jual, Some(1_500_000_000)),
        sample_property("p2", "Jakarta Selatan", ListingMode::Jual, Some(900_000_000)),
        sample_property("p3", "Bandung", ListingMode::Jual, None),
        studio,
        sample_property("p5", "", ListingMode::Sewa, Some(0)),
    ];
    assert_eq!(storage.insert_many(rows).await.unwrap(), 5);
    (storage, temp_file)
}

#[tokio::test]
async fn test_find_newest_first_with_total() {
    let (storage, _temp_file) = seeded().await;

    let page = storage.find(&PropertyFilter::paged(None, None)).await.unwrap();
    assert_eq!(page.total, 5);
    let ids: Vec<_> = page.properties.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p5", "p4", "p3", "p2", "p1"]);
}

#[tokio::test]
async fn test_find_filters() {
    let (storage, _temp_file) = seeded().await;

    let mut filter = PropertyFilter::paged(None, None);
    filter.location = Some("jakarta".to_string());
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 3);

    filter.mode = Some(ListingMode::Jual);
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 2);

    filter.min_price = Some(1_000_000_000);
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.properties[0].id, "p1");

    let mut filter = PropertyFilter::paged(None, None);
    filter.max_price = Some(10_000_000);
    filter.bedrooms = Some(1);
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.properties[0].id, "p4");
}

#[tokio::test]
async fn test_find_by_title() {
    let (storage, _temp_file) = seeded().await;

    let mut filter = PropertyFilter::paged(None, None);
    filter.title = Some("apartemen".to_string());
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.properties[0].id, "p4");

    filter.title = Some("rumah".to_string());
    filter.mode = Some(ListingMode::Sewa);
    let page = storage.find(&filter).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.properties[0].id, "p5");
}

#[tokio::test]
async fn test_find_pagination() {
    let (storage, _temp_file) = seeded().await;

    let page = storage.find(&PropertyFilter::paged(Some(2), Some(2))).await.unwrap();
    assert_eq!(page.total, 5);
    let ids: Vec<_> = page.properties.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p2"]);
}

#[test]
fn test_paging_is_clamped() {
    let filter = PropertyFilter::paged(Some(500), Some(-3));
    assert_eq!(filter.limit, MAX_PAGE_SIZE);
    assert_eq!(filter.offset, 0);

    let filter = PropertyFilter::paged(Some(0), None);
    assert_eq!(filter.limit, 1);

    let filter = PropertyFilter::paged(None, None);
    assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
}

#[tokio::test]
async fn test_counts_and_prices() {
    let (storage, _temp_file) = seeded().await;

    assert_eq!(storage.count(None).await.unwrap(), 5);
    assert_eq!(storage.count(Some(ListingMode::Jual)).await.unwrap(), 3);
    assert_eq!(storage.count(Some(ListingMode::Sewa)).await.unwrap(), 2);

    let prices = storage.sorted_prices().await.unwrap();
    assert_eq!(prices, vec![5_000_000, 900_000_000, 1_500_000_000]);
}

#[tokio::test]
async fn test_location_counts() {
    let (storage, _temp_file) = seeded().await;

    let mut counts = storage.location_counts().await.unwrap();
    counts.sort_by(|a, b| a.location.cmp(&b.location));
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[0], LocationCount { location: String::new(), count: 1 });
    assert!(counts.contains(&LocationCount { location: "Jakarta Selatan".to_string(), count: 2 }));
}

#[tokio::test]
async fn test_get_and_duplicate_import() {
    let (storage, _temp_file) = seeded().await;

    assert_eq!(storage.get("p2").await.unwrap().unwrap().location, "Jakarta Selatan");
    assert!(storage.get("missing").await.unwrap().is_none());

    let again = vec![sample_property("p1", "Elsewhere", ListingMode::Jual, None)];
    assert_eq!(storage.insert_many(again).await.unwrap(), 0);
    assert_eq!(storage.get("p1").await.unwrap().unwrap().location, "Jakarta Selatan");
}
