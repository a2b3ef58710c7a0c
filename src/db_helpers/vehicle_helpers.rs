use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{Page, VehicleFilter, VehicleSort},
    errors::RequestError,
    models::{lower_bound_cents, upper_bound_cents, Listing, ListingCategory},
};

use super::{
    fetch_listing_page, fetch_listings, listings_above_category_average,
    listings_from_active_sellers, QueryBuilder, ACTIVE,
};

const VEHICLE: &str = "l.category = 'Vehicle'";

impl VehicleSort {
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            VehicleSort::Price => "l.price_cents DESC, l.listing_date DESC, l.id DESC",
            VehicleSort::Year => {
                "v.model_year DESC, l.price_cents DESC, l.listing_date DESC, l.id DESC"
            }
            VehicleSort::Kilometers => {
                "v.kilometers ASC, l.price_cents DESC, l.listing_date DESC, l.id DESC"
            }
            VehicleSort::Name => {
                "v.model_name ASC, l.price_cents DESC, l.listing_date DESC, l.id DESC"
            }
            VehicleSort::Date => "l.listing_date DESC, l.price_cents DESC, l.id DESC",
        }
    }
}

fn active_vehicles() -> QueryBuilder {
    QueryBuilder::new().condition(ACTIVE).condition(VEHICLE)
}

pub async fn all_vehicles(pool: &SqlitePool, page: u32) -> Result<Page<Listing>, RequestError> {
    fetch_listing_page(pool, active_vehicles(), VehicleSort::Date.order_by(), page).await
}

/// Model-name search, most expensive first.
pub async fn search_vehicles(
    pool: &SqlitePool,
    keyword: Option<&str>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = active_vehicles().contains(&["v.model_name_folded"], keyword);
    fetch_listing_page(pool, filters, VehicleSort::Price.order_by(), page).await
}

pub async fn vehicles_by_year(
    pool: &SqlitePool,
    year: Option<i64>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = active_vehicles().equals("v.model_year", year);
    fetch_listing_page(pool, filters, VehicleSort::Price.order_by(), page).await
}

fn vehicle_filters(filter: &VehicleFilter) -> Result<QueryBuilder, RequestError> {
    Ok(active_vehicles()
        .at_least("v.model_year", filter.min_year)
        .at_most("v.model_year", filter.max_year)
        .at_least("l.price_cents", filter.min_price.map(lower_bound_cents).transpose()?)
        .at_most("l.price_cents", filter.max_price.map(upper_bound_cents).transpose()?)
        .at_least("v.kilometers", filter.min_km)
        .at_most("v.kilometers", filter.max_km)
        .contains(&["v.model_name_folded"], filter.model_name.as_deref()))
}

pub async fn filter_vehicles(
    pool: &SqlitePool,
    filter: &VehicleFilter,
) -> Result<Page<Listing>, RequestError> {
    fetch_listing_page(pool, vehicle_filters(filter)?, filter.sort.order_by(), filter.page).await
}

/// Unpaginated form of [`filter_vehicles`].
pub async fn filter_all_vehicles(
    pool: &SqlitePool,
    filter: &VehicleFilter,
) -> Result<Vec<Listing>, RequestError> {
    fetch_listings(pool, vehicle_filters(filter)?, filter.sort.order_by()).await
}

pub async fn distinct_vehicle_years(pool: &SqlitePool) -> Result<Vec<i64>, RequestError> {
    let years = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT DISTINCT v.model_year FROM vehicles v
        JOIN listings l ON l.id = v.listing_id
        WHERE l.status = 'Active'
        ORDER BY v.model_year DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(years)
}

pub async fn distinct_model_names(pool: &SqlitePool) -> Result<Vec<String>, RequestError> {
    let names = sqlx::query_scalar::<Sqlite, String>(
        r#"
        SELECT DISTINCT v.model_name FROM vehicles v
        JOIN listings l ON l.id = v.listing_id
        WHERE l.status = 'Active'
        ORDER BY v.model_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

/// Active vehicles priced above the Active vehicle average.
pub async fn vehicles_above_average(pool: &SqlitePool) -> Result<Vec<Listing>, RequestError> {
    listings_above_category_average(pool, Some(ListingCategory::Vehicle)).await
}

pub async fn vehicles_from_active_sellers(
    pool: &SqlitePool,
    min_listing_count: i64,
) -> Result<Vec<Listing>, RequestError> {
    listings_from_active_sellers(pool, Some(ListingCategory::Vehicle), min_listing_count).await
}
