use sqlx::SqlitePool;

use crate::{
    db_helpers::{
        categories_above_average_rows, category_statistics_rows, city_statistics_rows,
        listing_detail_rows, real_estate_filter_range_rows, top_listings_per_category_rows,
        top_real_estate_per_city_rows, top_users_rows, top_vehicles_per_year_rows,
        vehicle_filter_range_rows, year_statistics_rows, years_above_average_rows,
    },
    errors::RequestError,
    row_mapper::{self, *},
};

// ----------------- Category Reports -----------------

pub async fn category_statistics(pool: &SqlitePool) -> Result<Vec<CategoryStatistics>, RequestError> {
    let rows = decode_rows(&CATEGORY_STATISTICS, &category_statistics_rows(pool).await?)?;
    Ok(map_rows(&CATEGORY_STATISTICS, &rows, row_mapper::category_statistics))
}

/// Categories whose Active average beats the overall Active average,
/// highest average first.
pub async fn categories_above_average(pool: &SqlitePool) -> Result<Vec<CategoryAverage>, RequestError> {
    let rows = decode_rows(&CATEGORIES_ABOVE_AVERAGE, &categories_above_average_rows(pool).await?)?;
    let mut categories = map_rows(&CATEGORIES_ABOVE_AVERAGE, &rows, category_average);
    categories.sort_by(|a, b| {
        b.average_price
            .cmp(&a.average_price)
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(categories)
}

pub async fn top_listings_per_category(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<RankedListing>, RequestError> {
    let rows = decode_rows(&TOP_PER_CATEGORY, &top_listings_per_category_rows(pool, top_n).await?)?;
    Ok(map_rows(&TOP_PER_CATEGORY, &rows, ranked_listing))
}

pub async fn listing_details(pool: &SqlitePool) -> Result<Vec<ListingDetail>, RequestError> {
    let rows = decode_rows(&LISTING_DETAILS, &listing_detail_rows(pool).await?)?;
    Ok(map_rows(&LISTING_DETAILS, &rows, listing_detail))
}

pub async fn top_users_by_listing_value(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<UserListingStats>, RequestError> {
    let rows = decode_rows(&TOP_USERS, &top_users_rows(pool, limit).await?)?;
    Ok(map_rows(&TOP_USERS, &rows, user_listing_stats))
}

// ----------------- Vehicle Reports -----------------

pub async fn year_statistics(pool: &SqlitePool) -> Result<Vec<YearStatistics>, RequestError> {
    let rows = decode_rows(&YEAR_STATISTICS, &year_statistics_rows(pool).await?)?;
    Ok(map_rows(&YEAR_STATISTICS, &rows, row_mapper::year_statistics))
}

pub async fn years_above_average(pool: &SqlitePool) -> Result<Vec<YearAverage>, RequestError> {
    let rows = decode_rows(&YEARS_ABOVE_AVERAGE, &years_above_average_rows(pool).await?)?;
    Ok(map_rows(&YEARS_ABOVE_AVERAGE, &rows, year_average))
}

pub async fn top_vehicles_per_year(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<RankedListing>, RequestError> {
    let rows = decode_rows(&TOP_PER_YEAR, &top_vehicles_per_year_rows(pool, top_n).await?)?;
    Ok(map_rows(&TOP_PER_YEAR, &rows, ranked_listing))
}

pub async fn vehicle_filter_ranges(pool: &SqlitePool) -> Result<VehicleFilterRanges, RequestError> {
    let rows = decode_rows(&VEHICLE_FILTER_RANGES, &vehicle_filter_range_rows(pool).await?)?;
    Ok(map_single_row(
        &VEHICLE_FILTER_RANGES,
        &rows,
        row_mapper::vehicle_filter_ranges,
    ))
}

// ----------------- Real Estate Reports -----------------

pub async fn city_statistics(pool: &SqlitePool) -> Result<Vec<CityStatistics>, RequestError> {
    let rows = decode_rows(&CITY_STATISTICS, &city_statistics_rows(pool).await?)?;
    Ok(map_rows(&CITY_STATISTICS, &rows, row_mapper::city_statistics))
}

pub async fn top_real_estate_per_city(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<RankedListing>, RequestError> {
    let rows = decode_rows(&TOP_PER_CITY, &top_real_estate_per_city_rows(pool, top_n).await?)?;
    Ok(map_rows(&TOP_PER_CITY, &rows, ranked_listing))
}

pub async fn real_estate_filter_ranges(
    pool: &SqlitePool,
) -> Result<RealEstateFilterRanges, RequestError> {
    let rows = decode_rows(
        &REAL_ESTATE_FILTER_RANGES,
        &real_estate_filter_range_rows(pool).await?,
    )?;
    Ok(map_single_row(
        &REAL_ESTATE_FILTER_RANGES,
        &rows,
        row_mapper::real_estate_filter_ranges,
    ))
}
