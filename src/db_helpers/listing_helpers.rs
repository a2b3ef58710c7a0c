use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{
    data_formats::{
        CreateRealEstateRequest, CreateVehicleRequest, ListingFilter, ListingSort, Page,
    },
    errors::{constraint_violation, RequestError},
    models::{
        lower_bound_cents, price_to_cents, upper_bound_cents, Listing, ListingCategory, ListingRow,
        ListingStatus,
    },
};

use super::{
    fetch_listing_page, fetch_listings, fold_case, QueryBuilder, ACTIVE, LISTING_COLUMNS,
    LISTING_FROM,
};

const ACTIVE_SELLER: &str = r#"l.user_id IN (
        SELECT user_id FROM listings
        WHERE status = 'Active'
        GROUP BY user_id
        HAVING COUNT(*) >= ?
    )"#;

// price * count > sum keeps the average comparison in integers.
const ABOVE_CATEGORY_AVERAGE: &str = r#"l.price_cents * (
        SELECT COUNT(*) FROM listings c WHERE c.status = 'Active' AND c.category = l.category
    ) > (
        SELECT SUM(c.price_cents) FROM listings c WHERE c.status = 'Active' AND c.category = l.category
    )"#;

impl ListingSort {
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            ListingSort::Price => "l.price_cents DESC, l.listing_date DESC, l.id DESC",
            ListingSort::Date => "l.listing_date DESC, l.price_cents DESC, l.id DESC",
            ListingSort::Title => "l.title ASC, l.price_cents DESC, l.listing_date DESC, l.id DESC",
        }
    }
}

// ----------------- Listing Queries -----------------

/// Looks up a listing that has not been deleted. Sold listings stay visible.
pub async fn get_listing_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Listing>, RequestError> {
    let query = format!("SELECT {LISTING_COLUMNS} {LISTING_FROM} WHERE l.id = ? AND l.status <> 'Deleted'");
    let row = sqlx::query_as::<Sqlite, ListingRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Listing::try_from).transpose()
}

pub async fn all_listings(pool: &SqlitePool, page: u32) -> Result<Page<Listing>, RequestError> {
    let filters = QueryBuilder::new().condition(ACTIVE);
    fetch_listing_page(pool, filters, ListingSort::Date.order_by(), page).await
}

pub async fn search_listings(
    pool: &SqlitePool,
    keyword: Option<&str>,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let filters = QueryBuilder::new()
        .condition(ACTIVE)
        .contains(&["l.title_folded", "l.description_folded"], keyword);
    fetch_listing_page(pool, filters, ListingSort::Date.order_by(), page).await
}

fn listing_filters(filter: &ListingFilter) -> Result<QueryBuilder, RequestError> {
    Ok(QueryBuilder::new()
        .condition(ACTIVE)
        .equals("l.category", filter.category.map(|c| c.as_str()))
        .at_least("l.price_cents", filter.min_price.map(lower_bound_cents).transpose()?)
        .at_most("l.price_cents", filter.max_price.map(upper_bound_cents).transpose()?)
        .at_least("date(l.listing_date)", filter.start_date.map(|d| d.to_string()))
        .at_most("date(l.listing_date)", filter.end_date.map(|d| d.to_string()))
        .contains(
            &["l.title_folded", "l.description_folded", "LOWER(l.category)"],
            filter.keyword.as_deref(),
        )
        .contains(&["u.full_name_folded"], filter.seller.as_deref()))
}

pub async fn filter_listings(
    pool: &SqlitePool,
    filter: &ListingFilter,
) -> Result<Page<Listing>, RequestError> {
    fetch_listing_page(pool, listing_filters(filter)?, filter.sort.order_by(), filter.page).await
}

/// Unpaginated form of [`filter_listings`].
pub async fn filter_all_listings(
    pool: &SqlitePool,
    filter: &ListingFilter,
) -> Result<Vec<Listing>, RequestError> {
    fetch_listings(pool, listing_filters(filter)?, filter.sort.order_by()).await
}

/// Active listings whose owner has at least `min_listing_count` Active
/// listings across all categories.
pub async fn listings_from_active_sellers(
    pool: &SqlitePool,
    category: Option<ListingCategory>,
    min_listing_count: i64,
) -> Result<Vec<Listing>, RequestError> {
    let filters = QueryBuilder::new()
        .condition(ACTIVE)
        .equals("l.category", category.map(|c| c.as_str()))
        .add_param(ACTIVE_SELLER, Some(min_listing_count));
    fetch_listings(pool, filters, ListingSort::Date.order_by()).await
}

pub async fn listings_above_category_average(
    pool: &SqlitePool,
    category: Option<ListingCategory>,
) -> Result<Vec<Listing>, RequestError> {
    let filters = QueryBuilder::new()
        .condition(ACTIVE)
        .equals("l.category", category.map(|c| c.as_str()))
        .condition(ABOVE_CATEGORY_AVERAGE);
    fetch_listings(
        pool,
        filters,
        "l.category ASC, l.price_cents DESC, l.listing_date DESC, l.id DESC",
    )
    .await
}

// ----------------- Listing Mutations -----------------

async fn insert_listing(
    tx: &mut Transaction<'_, Sqlite>,
    owner_id: i64,
    title: &str,
    description: Option<&str>,
    price_cents: i64,
    category: ListingCategory,
) -> Result<i64, RequestError> {
    sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO listings
            (user_id, title, title_folded, description, description_folded, price_cents, category)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .bind(fold_case(title))
    .bind(description)
    .bind(description.map(fold_case))
    .bind(price_cents)
    .bind(category.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| constraint_violation(e, "Listing owner does not exist"))
}

async fn created_listing(pool: &SqlitePool, id: i64) -> Result<Listing, RequestError> {
    get_listing_by_id(pool, id).await?.ok_or_else(|| {
        tracing::error!(listing_id = id, "listing missing right after creation");
        RequestError::ServerError
    })
}

/// Inserts the listing and its vehicle record in one transaction.
pub async fn create_vehicle_listing(
    pool: &SqlitePool,
    owner_id: i64,
    request: &CreateVehicleRequest,
) -> Result<Listing, RequestError> {
    let price_cents = price_to_cents(request.price)?;
    let mut tx = pool.begin().await?;
    let id = insert_listing(
        &mut tx,
        owner_id,
        &request.title,
        request.description.as_deref(),
        price_cents,
        ListingCategory::Vehicle,
    )
    .await?;
    sqlx::query(
        r#"
        INSERT INTO vehicles (listing_id, model_year, model_name, model_name_folded, kilometers)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(request.model_year)
    .bind(&request.model_name)
    .bind(fold_case(&request.model_name))
    .bind(request.kilometers)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    tracing::info!(listing_id = id, owner_id, "vehicle listing created");
    created_listing(pool, id).await
}

/// Inserts the listing and its real estate record in one transaction.
pub async fn create_real_estate_listing(
    pool: &SqlitePool,
    owner_id: i64,
    request: &CreateRealEstateRequest,
) -> Result<Listing, RequestError> {
    let price_cents = price_to_cents(request.price)?;
    let mut tx = pool.begin().await?;
    let id = insert_listing(
        &mut tx,
        owner_id,
        &request.title,
        request.description.as_deref(),
        price_cents,
        ListingCategory::RealEstate,
    )
    .await?;
    sqlx::query(
        r#"
        INSERT INTO real_estate
            (listing_id, seller_type, area_sqm, room_config,
             city, city_folded, district, district_folded, neighborhood, neighborhood_folded)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&request.seller_type)
    .bind(request.area_sqm)
    .bind(&request.room_config)
    .bind(&request.city)
    .bind(fold_case(&request.city))
    .bind(&request.district)
    .bind(request.district.as_deref().map(fold_case))
    .bind(&request.neighborhood)
    .bind(request.neighborhood.as_deref().map(fold_case))
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    tracing::info!(listing_id = id, owner_id, "real estate listing created");
    created_listing(pool, id).await
}

/// Moves an Active listing owned by `owner_id` to `next`.
pub async fn update_listing_status(
    pool: &SqlitePool,
    id: i64,
    owner_id: i64,
    next: ListingStatus,
) -> Result<(), RequestError> {
    let current = sqlx::query_as::<Sqlite, (i64, String)>(
        "SELECT user_id, status FROM listings WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let (user_id, status) = current.ok_or(RequestError::NotFound("Listing not found"))?;
    let status: ListingStatus = status.parse().map_err(|e: String| {
        tracing::error!(listing_id = id, "{e}");
        RequestError::ServerError
    })?;
    if status == ListingStatus::Deleted {
        return Err(RequestError::NotFound("Listing not found"));
    }
    if user_id != owner_id {
        return Err(RequestError::Forbidden);
    }
    if !status.can_transition_to(next) {
        return Err(RequestError::Conflict("Listing is no longer active"));
    }

    let result = sqlx::query("UPDATE listings SET status = ? WHERE id = ? AND status = 'Active'")
        .bind(next.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::Conflict("Listing is no longer active"));
    }

    tracing::info!(listing_id = id, status = next.as_str(), "listing status changed");
    Ok(())
}
