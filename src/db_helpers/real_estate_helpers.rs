use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{Page, RealEstateFilter, RealEstateSort},
    errors::RequestError,
    models::{lower_bound_cents, upper_bound_cents, Listing},
};

use super::{fetch_listing_page, fetch_listings, QueryBuilder, ACTIVE};

const REAL_ESTATE: &str = "l.category = 'RealEstate'";
const LOCATION_COLUMNS: [&str; 3] = ["r.city_folded", "r.district_folded", "r.neighborhood_folded"];

impl RealEstateSort {
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            RealEstateSort::Price => "l.price_cents DESC, l.listing_date DESC, l.id DESC",
            RealEstateSort::Date => "l.listing_date DESC, l.price_cents DESC, l.id DESC",
            RealEstateSort::Area => {
                "r.area_sqm DESC, l.price_cents DESC, l.listing_date DESC, l.id DESC"
            }
            RealEstateSort::Title => {
                "l.title ASC, l.price_cents DESC, l.listing_date DESC, l.id DESC"
            }
        }
    }
}

fn active_real_estate() -> QueryBuilder {
    QueryBuilder::new().condition(ACTIVE).condition(REAL_ESTATE)
}

pub async fn all_real_estate(pool: &SqlitePool, page: u32) -> Result<Page<Listing>, RequestError> {
    fetch_listing_page(pool, active_real_estate(), RealEstateSort::Date.order_by(), page).await
}

/// Location search over city, district and neighborhood.
pub async fn search_real_estate(
    pool: &SqlitePool,
    keyword: Option<&str>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = active_real_estate().contains(&LOCATION_COLUMNS, keyword);
    fetch_listing_page(pool, filters, RealEstateSort::Price.order_by(), page).await
}

pub async fn real_estate_by_city(
    pool: &SqlitePool,
    city: Option<&str>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = active_real_estate().equals("r.city", city);
    fetch_listing_page(pool, filters, RealEstateSort::Price.order_by(), page).await
}

/// Cheapest first.
pub async fn real_estate_by_room_config(
    pool: &SqlitePool,
    room_config: Option<&str>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = active_real_estate().equals("r.room_config", room_config);
    fetch_listing_page(
        pool,
        filters,
        "l.price_cents ASC, l.listing_date DESC, l.id DESC",
        page,
    )
    .await
}

fn real_estate_filters(filter: &RealEstateFilter) -> Result<QueryBuilder, RequestError> {
    Ok(active_real_estate()
        .equals("r.city", filter.city.as_deref())
        .equals("r.room_config", filter.room_config.as_deref())
        .equals("r.seller_type", filter.seller_type.as_deref())
        .at_least("l.price_cents", filter.min_price.map(lower_bound_cents).transpose()?)
        .at_most("l.price_cents", filter.max_price.map(upper_bound_cents).transpose()?)
        .at_least("r.area_sqm", filter.min_area)
        .at_most("r.area_sqm", filter.max_area)
        .contains(&LOCATION_COLUMNS, filter.keyword.as_deref()))
}

pub async fn filter_real_estate(
    pool: &SqlitePool,
    filter: &RealEstateFilter,
) -> Result<Page<Listing>, RequestError> {
    fetch_listing_page(pool, real_estate_filters(filter)?, filter.sort.order_by(), filter.page)
        .await
}

/// Unpaginated form of [`filter_real_estate`].
pub async fn filter_all_real_estate(
    pool: &SqlitePool,
    filter: &RealEstateFilter,
) -> Result<Vec<Listing>, RequestError> {
    fetch_listings(pool, real_estate_filters(filter)?, filter.sort.order_by()).await
}

async fn distinct_real_estate_values(
    pool: &SqlitePool,
    column: &str,
) -> Result<Vec<String>, RequestError> {
    let query = format!(
        r#"
        SELECT DISTINCT r.{column} FROM real_estate r
        JOIN listings l ON l.id = r.listing_id
        WHERE l.status = 'Active' AND r.{column} IS NOT NULL
        ORDER BY r.{column} ASC
        "#
    );
    let values = sqlx::query_scalar::<Sqlite, String>(&query)
        .fetch_all(pool)
        .await?;
    Ok(values)
}

pub async fn distinct_cities(pool: &SqlitePool) -> Result<Vec<String>, RequestError> {
    distinct_real_estate_values(pool, "city").await
}

pub async fn distinct_room_configs(pool: &SqlitePool) -> Result<Vec<String>, RequestError> {
    distinct_real_estate_values(pool, "room_config").await
}

pub async fn distinct_seller_types(pool: &SqlitePool) -> Result<Vec<String>, RequestError> {
    distinct_real_estate_values(pool, "seller_type").await
}
