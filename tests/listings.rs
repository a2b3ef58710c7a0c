mod common;

use common::*;
use marketplace::{
    data_formats::{ListingFilter, RealEstateFilter, VehicleFilter, VehicleSort, PAGE_SIZE},
    db_helpers,
    errors::RequestError,
    models::{ListingCategory, ListingDetails, ListingStatus},
    services,
};
use rust_decimal::Decimal;

fn price(value: &str) -> Decimal {
    value.parse().unwrap()
}

#[tokio::test]
async fn pages_concatenate_to_the_unpaginated_result() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    for i in 0..13 {
        // repeated prices force the tiebreak to decide page boundaries
        let amount = format!("{}.00", 10_000 + (i % 4) * 500);
        post_vehicle(&pool, seller.id, &format!("Model {i}"), 2010 + i, 1_000 * i, &amount).await;
    }

    let mut filter = VehicleFilter {
        sort: VehicleSort::Price,
        ..Default::default()
    };
    let all = db_helpers::filter_all_vehicles(&pool, &filter).await.unwrap();
    assert_eq!(all.len(), 13);

    let first = db_helpers::filter_vehicles(&pool, &filter).await.unwrap();
    assert_eq!(first.total_elements, 13);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), PAGE_SIZE as usize);

    let mut paged = Vec::new();
    for page in 0..first.total_pages {
        filter.page = page;
        let result = db_helpers::filter_vehicles(&pool, &filter).await.unwrap();
        paged.extend(result.items);
    }
    assert_eq!(ids(&paged), ids(&all));

    let prices: Vec<Decimal> = all.iter().map(|l| l.price).collect();
    let mut sorted = prices.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(prices, sorted);
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_totals() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    for i in 0..13 {
        post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 50_000, &format!("{}", 200_000 + i)).await;
    }

    let filter = VehicleFilter {
        page: 5,
        ..Default::default()
    };
    let page = db_helpers::filter_vehicles(&pool, &filter).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_elements, 13);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_next);
}

#[tokio::test]
async fn vehicle_keyword_matches_case_insensitively() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let bmw = post_vehicle(&pool, seller.id, "2018 BMW X5", 2018, 90_000, "1500000").await;
    post_vehicle(&pool, seller.id, "2020 Audi A4", 2020, 40_000, "1200000").await;

    let page = db_helpers::search_vehicles(&pool, Some("bmw"), 0).await.unwrap();
    assert_eq!(ids(&page.items), vec![bmw.id]);

    let filter = VehicleFilter {
        model_name: Some("BmW".into()),
        ..Default::default()
    };
    let all = db_helpers::filter_all_vehicles(&pool, &filter).await.unwrap();
    assert_eq!(ids(&all), vec![bmw.id]);
}

#[tokio::test]
async fn inverted_price_bounds_match_nothing() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "350000").await;

    let filter = VehicleFilter {
        min_price: Some(price("500000")),
        max_price: Some(price("100000")),
        ..Default::default()
    };
    let page = db_helpers::filter_vehicles(&pool, &filter).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn price_bounds_are_inclusive() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let cheap = post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "100.50").await;
    let dear = post_vehicle(&pool, seller.id, "Toyota Corolla", 2019, 30_000, "200.00").await;
    post_vehicle(&pool, seller.id, "Honda Civic", 2021, 10_000, "200.01").await;

    let filter = VehicleFilter {
        min_price: Some(price("100.50")),
        max_price: Some(price("200")),
        sort: VehicleSort::Price,
        ..Default::default()
    };
    let all = db_helpers::filter_all_vehicles(&pool, &filter).await.unwrap();
    assert_eq!(ids(&all), vec![dear.id, cheap.id]);
}

#[tokio::test]
async fn absent_bounds_equal_the_unfiltered_result() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "350000").await;
    post_vehicle(&pool, seller.id, "Toyota Corolla", 2019, 30_000, "650000").await;
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "2500000").await;

    let unfiltered = db_helpers::all_vehicles(&pool, 0).await.unwrap();
    let filtered = db_helpers::filter_vehicles(&pool, &VehicleFilter::default())
        .await
        .unwrap();
    assert_eq!(ids(&filtered.items), ids(&unfiltered.items));
    assert_eq!(filtered.total_elements, 2);

    let listings = db_helpers::filter_listings(&pool, &ListingFilter::default())
        .await
        .unwrap();
    assert_eq!(listings.total_elements, 3);
}

#[tokio::test]
async fn listing_filter_combines_category_keyword_and_seller() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    let wanted = post_vehicle(&pool, ayse.id, "Ford Focus", 2017, 70_000, "400000").await;
    post_vehicle(&pool, mehmet.id, "Ford Fiesta", 2015, 90_000, "300000").await;
    post_real_estate(&pool, ayse.id, "Ford", "Center", "1+1", 50, "900000").await;

    let filter = ListingFilter {
        category: Some(ListingCategory::Vehicle),
        keyword: Some("ford".into()),
        seller: Some("demir".into()),
        ..Default::default()
    };
    let all = db_helpers::filter_all_listings(&pool, &filter).await.unwrap();
    assert_eq!(ids(&all), vec![wanted.id]);
}

#[tokio::test]
async fn like_wildcards_in_keywords_match_literally() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let literal = post_vehicle(&pool, seller.id, "100% Original", 2012, 150_000, "250000").await;
    post_vehicle(&pool, seller.id, "1000 Series", 2013, 140_000, "260000").await;

    let page = db_helpers::search_vehicles(&pool, Some("100%"), 0).await.unwrap();
    assert_eq!(ids(&page.items), vec![literal.id]);

    for keyword in ["_", "\\", "'; DROP TABLE listings; --"] {
        let page = db_helpers::search_listings(&pool, Some(keyword), 0).await.unwrap();
        assert!(page.items.is_empty(), "keyword {keyword:?} matched");
    }
}

#[tokio::test]
async fn real_estate_filter_matches_location_keyword() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let bornova = post_real_estate(&pool, seller.id, "Izmir", "Bornova", "3+1", 140, "4200000").await;
    post_real_estate(&pool, seller.id, "Ankara", "Cankaya", "2+1", 90, "3100000").await;

    let filter = RealEstateFilter {
        keyword: Some("BORNOVA".into()),
        min_area: Some(100),
        ..Default::default()
    };
    let all = db_helpers::filter_all_real_estate(&pool, &filter).await.unwrap();
    assert_eq!(ids(&all), vec![bornova.id]);
    match &all[0].details {
        ListingDetails::RealEstate(details) => assert_eq!(details.city, "Izmir"),
        other => panic!("unexpected details {other:?}"),
    }
}

#[tokio::test]
async fn distinct_lookups_skip_inactive_listings() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "1200000").await;
    post_vehicle(&pool, seller.id, "Audi A4", 2018, 60_000, "1000000").await;
    let old = post_vehicle(&pool, seller.id, "Lada Niva", 1999, 300_000, "150000").await;
    let house = post_real_estate(&pool, seller.id, "Bursa", "Nilufer", "4+1", 180, "5000000").await;
    post_real_estate(&pool, seller.id, "Antalya", "Muratpasa", "2+1", 85, "2900000").await;

    db_helpers::update_listing_status(&pool, old.id, seller.id, ListingStatus::Deleted)
        .await
        .unwrap();
    db_helpers::update_listing_status(&pool, house.id, seller.id, ListingStatus::Sold)
        .await
        .unwrap();

    let years = db_helpers::distinct_vehicle_years(&pool).await.unwrap();
    assert_eq!(years, vec![2020, 2018]);
    let models = db_helpers::distinct_model_names(&pool).await.unwrap();
    assert_eq!(models, vec!["Audi A4".to_string()]);
    let cities = db_helpers::distinct_cities(&pool).await.unwrap();
    assert_eq!(cities, vec!["Antalya".to_string()]);
}

#[tokio::test]
async fn filter_ranges_are_empty_without_active_listings() {
    let pool = test_pool().await;

    let vehicles = services::vehicle_filter_ranges(&pool).await.unwrap();
    assert_eq!(vehicles.min_year, None);
    assert_eq!(vehicles.max_price, None);
    let real_estate = services::real_estate_filter_ranges(&pool).await.unwrap();
    assert_eq!(real_estate.min_area_sqm, None);

    let json = serde_json::to_value(&vehicles).unwrap();
    assert!(json["minYear"].is_null());
}

#[tokio::test]
async fn filter_ranges_span_active_vehicles() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "1200000.50").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "400000").await;

    let ranges = services::vehicle_filter_ranges(&pool).await.unwrap();
    assert_eq!(ranges.min_year, Some(2015));
    assert_eq!(ranges.max_year, Some(2020));
    assert_eq!(ranges.min_price, Some(price("400000.00")));
    assert_eq!(ranges.max_price, Some(price("1200000.50")));
    assert_eq!(ranges.min_kilometers, Some(40_000));
    assert_eq!(ranges.max_kilometers, Some(120_000));
}

#[tokio::test]
async fn posting_a_vehicle_writes_both_tables() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let listing = post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "1200000").await;

    assert_eq!(listing.status, ListingStatus::Active);
    assert_eq!(listing.category(), ListingCategory::Vehicle);
    assert_eq!(listing.owner.id, seller.id);

    let (listings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (vehicle_id,): (i64,) = sqlx::query_as("SELECT listing_id FROM vehicles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(listings, 1);
    assert_eq!(vehicle_id, listing.id);
}

#[tokio::test]
async fn posting_for_a_missing_owner_leaves_no_rows() {
    let pool = test_pool().await;
    let request = vehicle_request("Audi A4", 2020, 40_000, "1200000");

    let result = db_helpers::create_vehicle_listing(&pool, 999, &request).await;
    assert!(matches!(result, Err(RequestError::Conflict(_))));

    let (vehicles,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(vehicles, 0);
}

#[tokio::test]
async fn status_changes_are_owner_only_and_one_way() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    let listing = post_vehicle(&pool, ayse.id, "Audi A4", 2020, 40_000, "1200000").await;

    let result =
        db_helpers::update_listing_status(&pool, listing.id, mehmet.id, ListingStatus::Sold).await;
    assert!(matches!(result, Err(RequestError::Forbidden)));

    db_helpers::update_listing_status(&pool, listing.id, ayse.id, ListingStatus::Sold)
        .await
        .unwrap();
    let result =
        db_helpers::update_listing_status(&pool, listing.id, ayse.id, ListingStatus::Sold).await;
    assert!(matches!(result, Err(RequestError::Conflict(_))));

    // sold listings stay visible on their detail page but leave browsing
    let sold = db_helpers::get_listing_by_id(&pool, listing.id).await.unwrap().unwrap();
    assert_eq!(sold.status, ListingStatus::Sold);
    let page = db_helpers::all_listings(&pool, 0).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn deleted_listings_cannot_come_back() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let listing = post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "1200000").await;

    db_helpers::update_listing_status(&pool, listing.id, seller.id, ListingStatus::Deleted)
        .await
        .unwrap();
    let result =
        db_helpers::update_listing_status(&pool, listing.id, seller.id, ListingStatus::Sold).await;
    assert!(matches!(result, Err(RequestError::NotFound(_))));
    assert!(db_helpers::get_listing_by_id(&pool, listing.id)
        .await
        .unwrap()
        .is_none());

    let raw = sqlx::query("UPDATE listings SET status = 'Active' WHERE id = ?")
        .bind(listing.id)
        .execute(&pool)
        .await;
    assert!(raw.is_err());
}

#[tokio::test]
async fn favorites_reject_duplicates_and_hidden_listings() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    let listing = post_vehicle(&pool, ayse.id, "Audi A4", 2020, 40_000, "1200000").await;
    let gone = post_vehicle(&pool, ayse.id, "Fiat Egea", 2015, 120_000, "400000").await;
    db_helpers::update_listing_status(&pool, gone.id, ayse.id, ListingStatus::Deleted)
        .await
        .unwrap();

    db_helpers::add_favorite(&pool, mehmet.id, listing.id).await.unwrap();
    let duplicate = db_helpers::add_favorite(&pool, mehmet.id, listing.id).await;
    assert!(matches!(duplicate, Err(RequestError::Conflict(_))));
    let hidden = db_helpers::add_favorite(&pool, mehmet.id, gone.id).await;
    assert!(matches!(hidden, Err(RequestError::NotFound(_))));

    assert!(db_helpers::is_favorited(&pool, mehmet.id, listing.id).await.unwrap());
    assert!(!db_helpers::is_favorited(&pool, ayse.id, listing.id).await.unwrap());
    assert_eq!(db_helpers::favorite_count(&pool, listing.id).await.unwrap(), 1);
    let favorites = db_helpers::favorite_listings(&pool, mehmet.id).await.unwrap();
    assert_eq!(ids(&favorites), vec![listing.id]);

    db_helpers::remove_favorite(&pool, mehmet.id, listing.id).await.unwrap();
    let again = db_helpers::remove_favorite(&pool, mehmet.id, listing.id).await;
    assert!(matches!(again, Err(RequestError::NotFound(_))));
}

#[tokio::test]
async fn active_sellers_need_the_minimum_listing_count() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    let first = post_vehicle(&pool, ayse.id, "Audi A4", 2020, 40_000, "1200000").await;
    let second = post_real_estate(&pool, ayse.id, "Izmir", "Bornova", "2+1", 95, "2500000").await;
    post_vehicle(&pool, mehmet.id, "Fiat Egea", 2015, 120_000, "400000").await;

    let mut found = ids(&db_helpers::listings_from_active_sellers(&pool, None, 2).await.unwrap());
    found.sort_unstable();
    assert_eq!(found, vec![first.id, second.id]);

    // the count spans categories, the result does not
    let vehicles = db_helpers::vehicles_from_active_sellers(&pool, 2).await.unwrap();
    assert_eq!(ids(&vehicles), vec![first.id]);
}

#[tokio::test]
async fn above_average_compares_within_the_category() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "100").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "200").await;
    let dear = post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "600").await;
    // far above the vehicle average but alone in its category
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "2500000").await;

    let vehicles = db_helpers::vehicles_above_average(&pool).await.unwrap();
    assert_eq!(ids(&vehicles), vec![dear.id]);
    let all = db_helpers::listings_above_category_average(&pool, None).await.unwrap();
    assert_eq!(ids(&all), vec![dear.id]);
}

#[tokio::test]
async fn top_vehicles_per_year_ranks_with_tiebreak() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2018, 120_000, "100").await;
    let older_tie = post_vehicle(&pool, seller.id, "Audi A4", 2018, 60_000, "300").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2018, 80_000, "200").await;
    let newer_tie = post_vehicle(&pool, seller.id, "BMW 320", 2018, 50_000, "300").await;
    let only = post_vehicle(&pool, seller.id, "Honda Civic", 2020, 10_000, "150").await;
    set_listing_date(&pool, older_tie.id, "2024-01-10").await;
    set_listing_date(&pool, newer_tie.id, "2024-03-05").await;

    let ranked = services::top_vehicles_per_year(&pool, 2).await.unwrap();
    let summary: Vec<(String, i64, i64)> = ranked
        .iter()
        .map(|r| (r.group.clone(), r.listing_id, r.rank))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2020".to_string(), only.id, 1),
            ("2018".to_string(), newer_tie.id, 1),
            ("2018".to_string(), older_tie.id, 2),
        ]
    );
}

#[tokio::test]
async fn category_statistics_include_empty_categories() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "100.00").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "200.01").await;

    let stats = services::category_statistics(&pool).await.unwrap();
    let vehicle = stats.iter().find(|s| s.category == "Vehicle").unwrap();
    assert_eq!(vehicle.listing_count, 2);
    assert_eq!(vehicle.average_price, price("150.01"));
    assert_eq!(vehicle.min_price, price("100.00"));
    assert_eq!(vehicle.max_price, price("200.01"));
    assert_eq!(vehicle.total_value, price("300.01"));

    let real_estate = stats.iter().find(|s| s.category == "RealEstate").unwrap();
    assert_eq!(real_estate.listing_count, 0);
    assert_eq!(real_estate.average_price, Decimal::ZERO);
    assert_eq!(real_estate.total_value, Decimal::ZERO);
}

#[tokio::test]
async fn city_statistics_report_area_and_price_per_sqm() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 100, "2000000").await;
    post_real_estate(&pool, seller.id, "Izmir", "Karsiyaka", "3+1", 150, "4000000").await;

    let stats = services::city_statistics(&pool).await.unwrap();
    assert_eq!(stats.len(), 1);
    let izmir = &stats[0];
    assert_eq!(izmir.city, "Izmir");
    assert_eq!(izmir.listing_count, 2);
    assert_eq!(izmir.average_price, price("3000000.00"));
    assert_eq!(izmir.average_area_sqm, price("125.00"));
    assert_eq!(izmir.average_price_per_sqm, price("24000.00"));
}

#[tokio::test]
async fn top_users_are_ordered_by_total_value() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    post_vehicle(&pool, ayse.id, "Fiat Egea", 2015, 120_000, "100").await;
    post_vehicle(&pool, ayse.id, "Renault Clio", 2016, 80_000, "200").await;
    post_vehicle(&pool, mehmet.id, "Audi A4", 2020, 40_000, "1000").await;

    let top = services::top_users_by_listing_value(&pool, 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].user_id, mehmet.id);
    assert_eq!(top[0].total_listing_value, price("1000.00"));
}

#[tokio::test]
async fn listing_details_count_favorites() {
    let pool = test_pool().await;
    let ayse = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let mehmet = create_user(&pool, "Mehmet Kaya", "mehmet@example.com").await;
    let listing = post_vehicle(&pool, ayse.id, "Audi A4", 2020, 40_000, "1200000").await;
    db_helpers::add_favorite(&pool, mehmet.id, listing.id).await.unwrap();

    let details = services::listing_details(&pool).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].listing_id, listing.id);
    assert_eq!(details[0].favorite_count, 1);
    assert_eq!(details[0].full_name, "Ayse Demir");
    assert_eq!(details[0].listing_date, Some(listing.listing_date));
}

#[tokio::test]
async fn keyword_search_folds_turkish_case() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayşe Yılmaz", "ayse@example.com").await;
    let sisli = post_real_estate(&pool, seller.id, "İstanbul", "Şişli", "2+1", 90, "6500000").await;
    post_real_estate(&pool, seller.id, "Ankara", "Çankaya", "3+1", 120, "4800000").await;

    for keyword in ["Şişli", "şişli", "ŞİŞLİ", "istanbul", "İSTANBUL"] {
        let filter = RealEstateFilter {
            keyword: Some(keyword.into()),
            ..Default::default()
        };
        let all = db_helpers::filter_all_real_estate(&pool, &filter).await.unwrap();
        assert_eq!(ids(&all), vec![sisli.id], "keyword {keyword:?}");
    }

    let page = db_helpers::search_real_estate(&pool, Some("ÇANKAYA"), 0).await.unwrap();
    assert_eq!(page.total_elements, 1);

    let filter = ListingFilter {
        seller: Some("YILMAZ".into()),
        ..Default::default()
    };
    let all = db_helpers::filter_all_listings(&pool, &filter).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn date_range_includes_both_ends() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let before = post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "100").await;
    let first = post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "200").await;
    let middle = post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "300").await;
    let last = post_vehicle(&pool, seller.id, "BMW 320", 2019, 50_000, "400").await;
    let after = post_vehicle(&pool, seller.id, "Honda Civic", 2021, 10_000, "500").await;
    set_listing_date(&pool, before.id, "2023-12-31").await;
    set_listing_date(&pool, first.id, "2024-01-01").await;
    set_listing_date(&pool, middle.id, "2024-01-15").await;
    set_listing_date(&pool, last.id, "2024-02-01").await;
    set_listing_date(&pool, after.id, "2024-02-02").await;

    let filter = ListingFilter {
        start_date: "2024-01-01".parse().ok(),
        end_date: "2024-02-01".parse().ok(),
        ..Default::default()
    };
    let all = db_helpers::filter_all_listings(&pool, &filter).await.unwrap();
    assert_eq!(ids(&all), vec![last.id, middle.id, first.id]);

    let single_day = ListingFilter {
        start_date: "2024-01-15".parse().ok(),
        end_date: "2024-01-15".parse().ok(),
        ..Default::default()
    };
    let all = db_helpers::filter_all_listings(&pool, &single_day).await.unwrap();
    assert_eq!(ids(&all), vec![middle.id]);
}

#[tokio::test]
async fn categories_above_the_overall_average() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "100").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "200").await;
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "900").await;

    let categories = services::categories_above_average(&pool).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].category, "RealEstate");
    assert_eq!(categories[0].listing_count, 1);
    assert_eq!(categories[0].average_price, price("900.00"));
}

#[tokio::test]
async fn years_strictly_above_the_vehicle_average() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2018, 120_000, "100").await;
    post_vehicle(&pool, seller.id, "Renault Clio", 2018, 80_000, "200").await;
    // exactly the overall average of 300, so not above it
    post_vehicle(&pool, seller.id, "Toyota Corolla", 2019, 60_000, "300").await;
    post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "600").await;
    // real estate does not count towards the vehicle average
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "9000").await;

    let years = services::years_above_average(&pool).await.unwrap();
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].model_year, 2020);
    assert_eq!(years[0].listing_count, 1);
    assert_eq!(years[0].average_price, price("600.00"));
}

#[tokio::test]
async fn top_listings_per_category_keeps_the_priciest() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_vehicle(&pool, seller.id, "Fiat Egea", 2015, 120_000, "100").await;
    let vehicle = post_vehicle(&pool, seller.id, "Renault Clio", 2016, 80_000, "200").await;
    let house = post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "900").await;

    let ranked = services::top_listings_per_category(&pool, 1).await.unwrap();
    let summary: Vec<(String, i64, i64)> = ranked
        .iter()
        .map(|r| (r.group.clone(), r.listing_id, r.rank))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("RealEstate".to_string(), house.id, 1),
            ("Vehicle".to_string(), vehicle.id, 1),
        ]
    );
    assert_eq!(ranked[1].price, price("200.00"));
}

#[tokio::test]
async fn top_real_estate_per_city_ranks_within_each_city() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    post_real_estate(&pool, seller.id, "Izmir", "Bornova", "2+1", 95, "300").await;
    let izmir_top = post_real_estate(&pool, seller.id, "Izmir", "Karsiyaka", "3+1", 140, "500").await;
    let izmir_second = post_real_estate(&pool, seller.id, "Izmir", "Buca", "2+1", 100, "400").await;
    let ankara = post_real_estate(&pool, seller.id, "Ankara", "Cankaya", "1+1", 60, "100").await;

    let ranked = services::top_real_estate_per_city(&pool, 2).await.unwrap();
    let summary: Vec<(String, i64, i64)> = ranked
        .iter()
        .map(|r| (r.group.clone(), r.listing_id, r.rank))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Ankara".to_string(), ankara.id, 1),
            ("Izmir".to_string(), izmir_top.id, 1),
            ("Izmir".to_string(), izmir_second.id, 2),
        ]
    );
}

#[tokio::test]
async fn favorites_for_an_unknown_user_are_not_found() {
    let pool = test_pool().await;
    let seller = create_user(&pool, "Ayse Demir", "ayse@example.com").await;
    let listing = post_vehicle(&pool, seller.id, "Audi A4", 2020, 40_000, "1200000").await;

    let result = db_helpers::add_favorite(&pool, 999, listing.id).await;
    assert!(matches!(result, Err(RequestError::NotFound("User not found"))));
}
