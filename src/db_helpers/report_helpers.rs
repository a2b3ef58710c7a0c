use sqlx::{sqlite::SqliteRow, SqlitePool};

use crate::errors::RequestError;

// Column order of every query here is pinned by the matching shape in
// `row_mapper`.

const CATEGORY_STATISTICS_QUERY: &str = r#"
    SELECT c.name                AS category,
           COUNT(l.id)           AS listing_count,
           SUM(l.price_cents)    AS total_cents,
           MIN(l.price_cents)    AS min_cents,
           MAX(l.price_cents)    AS max_cents
    FROM   categories c
           LEFT JOIN listings l
                  ON l.category = c.name
                 AND l.status = 'Active'
    GROUP  BY c.id, c.name
    ORDER  BY COALESCE(SUM(l.price_cents), 0) DESC, listing_count DESC, c.name ASC
"#;

const CATEGORIES_ABOVE_AVERAGE_QUERY: &str = r#"
    SELECT l.category            AS category,
           COUNT(*)              AS listing_count,
           SUM(l.price_cents)    AS total_cents
    FROM   listings l
    WHERE  l.status = 'Active'
    GROUP  BY l.category
    HAVING SUM(l.price_cents) * (SELECT COUNT(*) FROM listings WHERE status = 'Active')
           > COUNT(*) * (SELECT SUM(price_cents) FROM listings WHERE status = 'Active')
"#;

const YEAR_STATISTICS_QUERY: &str = r#"
    SELECT v.model_year          AS model_year,
           COUNT(*)              AS listing_count,
           SUM(l.price_cents)    AS total_cents,
           MIN(l.price_cents)    AS min_cents,
           MAX(l.price_cents)    AS max_cents
    FROM   vehicles v
           JOIN listings l ON l.id = v.listing_id
    WHERE  l.status = 'Active'
    GROUP  BY v.model_year
    ORDER  BY v.model_year DESC
"#;

const YEARS_ABOVE_AVERAGE_QUERY: &str = r#"
    WITH active_vehicles AS (
        SELECT v.model_year, l.price_cents
        FROM   vehicles v
               JOIN listings l ON l.id = v.listing_id
        WHERE  l.status = 'Active'
    )
    SELECT model_year            AS model_year,
           COUNT(*)              AS listing_count,
           SUM(price_cents)      AS total_cents
    FROM   active_vehicles
    GROUP  BY model_year
    HAVING SUM(price_cents) * (SELECT COUNT(*) FROM active_vehicles)
           > COUNT(*) * (SELECT SUM(price_cents) FROM active_vehicles)
    ORDER  BY model_year DESC
"#;

const CITY_STATISTICS_QUERY: &str = r#"
    SELECT r.city                AS city,
           COUNT(*)              AS listing_count,
           SUM(l.price_cents)    AS total_cents,
           MIN(l.price_cents)    AS min_cents,
           MAX(l.price_cents)    AS max_cents,
           SUM(r.area_sqm)       AS total_area_sqm
    FROM   real_estate r
           JOIN listings l ON l.id = r.listing_id
    WHERE  l.status = 'Active'
    GROUP  BY r.city
    ORDER  BY listing_count DESC, r.city ASC
"#;

const TOP_USERS_QUERY: &str = r#"
    SELECT u.id                  AS user_id,
           u.full_name           AS full_name,
           u.email               AS email,
           COUNT(l.id)           AS listing_count,
           SUM(l.price_cents)    AS total_cents
    FROM   users u
           JOIN listings l
             ON l.user_id = u.id
            AND l.status = 'Active'
    GROUP  BY u.id, u.full_name, u.email
    ORDER  BY total_cents DESC, listing_count DESC, u.id ASC
    LIMIT  ?
"#;

const LISTING_DETAILS_QUERY: &str = r#"
    SELECT l.id                  AS listing_id,
           l.title               AS title,
           l.description         AS description,
           l.price_cents         AS price_cents,
           l.listing_date        AS listing_date,
           l.category            AS category,
           u.id                  AS user_id,
           u.full_name           AS full_name,
           u.email               AS email,
           (SELECT COUNT(*) FROM favorites f WHERE f.listing_id = l.id) AS favorite_count
    FROM   listings l
           JOIN users u ON u.id = l.user_id
    WHERE  l.status = 'Active'
    ORDER  BY l.listing_date DESC, l.price_cents DESC, l.id DESC
"#;

/// `group_column` must be a fixed expression, never user input.
fn top_per_group_query(group_column: &str, group_alias: &str, group_order: &str, from: &str) -> String {
    format!(
        r#"
    SELECT {group_alias}, listing_id, title, price_cents, listing_date, owner_name, owner_email, row_rank
    FROM   (SELECT {group_column}         AS {group_alias},
                   l.id                   AS listing_id,
                   l.title                AS title,
                   l.price_cents          AS price_cents,
                   l.listing_date         AS listing_date,
                   u.full_name            AS owner_name,
                   u.email                AS owner_email,
                   ROW_NUMBER() OVER (
                       PARTITION BY {group_column}
                       ORDER BY l.price_cents DESC, l.listing_date DESC, l.id DESC
                   )                      AS row_rank
            {from}
            WHERE  l.status = 'Active') ranked
    WHERE  row_rank <= ?
    ORDER  BY {group_alias} {group_order}, row_rank ASC
"#
    )
}

const VEHICLE_FILTER_RANGE_QUERY: &str = r#"
    SELECT MIN(v.model_year)     AS min_year,
           MAX(v.model_year)     AS max_year,
           MIN(l.price_cents)    AS min_cents,
           MAX(l.price_cents)    AS max_cents,
           MIN(v.kilometers)     AS min_kilometers,
           MAX(v.kilometers)     AS max_kilometers
    FROM   vehicles v
           JOIN listings l ON l.id = v.listing_id
    WHERE  l.status = 'Active'
"#;

const REAL_ESTATE_FILTER_RANGE_QUERY: &str = r#"
    SELECT MIN(l.price_cents)    AS min_cents,
           MAX(l.price_cents)    AS max_cents,
           MIN(r.area_sqm)       AS min_area_sqm,
           MAX(r.area_sqm)       AS max_area_sqm
    FROM   real_estate r
           JOIN listings l ON l.id = r.listing_id
    WHERE  l.status = 'Active'
"#;

async fn fetch_report(pool: &SqlitePool, query: &str) -> Result<Vec<SqliteRow>, RequestError> {
    let rows = sqlx::query(query).fetch_all(pool).await?;
    Ok(rows)
}

async fn fetch_report_with_limit(
    pool: &SqlitePool,
    query: &str,
    limit: i64,
) -> Result<Vec<SqliteRow>, RequestError> {
    let rows = sqlx::query(query).bind(limit).fetch_all(pool).await?;
    Ok(rows)
}

/// Every category, including ones without Active listings.
pub async fn category_statistics_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, CATEGORY_STATISTICS_QUERY).await
}

pub async fn categories_above_average_rows(
    pool: &SqlitePool,
) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, CATEGORIES_ABOVE_AVERAGE_QUERY).await
}

pub async fn year_statistics_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, YEAR_STATISTICS_QUERY).await
}

pub async fn years_above_average_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, YEARS_ABOVE_AVERAGE_QUERY).await
}

pub async fn city_statistics_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, CITY_STATISTICS_QUERY).await
}

/// Users ranked by the total value of their Active listings.
pub async fn top_users_rows(pool: &SqlitePool, limit: i64) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report_with_limit(pool, TOP_USERS_QUERY, limit).await
}

pub async fn listing_detail_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, LISTING_DETAILS_QUERY).await
}

pub async fn top_listings_per_category_rows(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<SqliteRow>, RequestError> {
    let query = top_per_group_query(
        "l.category",
        "category",
        "ASC",
        "FROM listings l JOIN users u ON u.id = l.user_id",
    );
    fetch_report_with_limit(pool, &query, top_n).await
}

pub async fn top_vehicles_per_year_rows(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<SqliteRow>, RequestError> {
    let query = top_per_group_query(
        "v.model_year",
        "model_year",
        "DESC",
        "FROM listings l JOIN users u ON u.id = l.user_id JOIN vehicles v ON v.listing_id = l.id",
    );
    fetch_report_with_limit(pool, &query, top_n).await
}

pub async fn top_real_estate_per_city_rows(
    pool: &SqlitePool,
    top_n: i64,
) -> Result<Vec<SqliteRow>, RequestError> {
    let query = top_per_group_query(
        "r.city",
        "city",
        "ASC",
        "FROM listings l JOIN users u ON u.id = l.user_id JOIN real_estate r ON r.listing_id = l.id",
    );
    fetch_report_with_limit(pool, &query, top_n).await
}

pub async fn vehicle_filter_range_rows(pool: &SqlitePool) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, VEHICLE_FILTER_RANGE_QUERY).await
}

pub async fn real_estate_filter_range_rows(
    pool: &SqlitePool,
) -> Result<Vec<SqliteRow>, RequestError> {
    fetch_report(pool, REAL_ESTATE_FILTER_RANGE_QUERY).await
}
