use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::{constraint_violation, RequestError},
    models::{Favorite, Listing, ListingRow},
};

use super::{get_listing_by_id, get_user_by_id, into_listings, LISTING_COLUMNS, LISTING_FROM};

pub async fn add_favorite(
    pool: &SqlitePool,
    user_id: i64,
    listing_id: i64,
) -> Result<Favorite, RequestError> {
    if get_user_by_id(pool, user_id).await?.is_none() {
        return Err(RequestError::NotFound("User not found"));
    }
    if get_listing_by_id(pool, listing_id).await?.is_none() {
        return Err(RequestError::NotFound("Listing not found"));
    }
    sqlx::query_as::<Sqlite, Favorite>(
        r#"
        INSERT INTO favorites (user_id, listing_id)
        VALUES (?, ?)
        RETURNING user_id, listing_id, added_at
        "#,
    )
    .bind(user_id)
    .bind(listing_id)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_violation(e, "Listing is already a favorite"))
}

pub async fn remove_favorite(
    pool: &SqlitePool,
    user_id: i64,
    listing_id: i64,
) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND listing_id = ?")
        .bind(user_id)
        .bind(listing_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Favorite not found"));
    }
    Ok(())
}

/// The user's favorited listings that are not deleted, most recently
/// favorited first.
pub async fn favorite_listings(pool: &SqlitePool, user_id: i64) -> Result<Vec<Listing>, RequestError> {
    let query = format!(
        r#"
        SELECT {LISTING_COLUMNS} {LISTING_FROM}
        JOIN favorites f ON f.listing_id = l.id
        WHERE f.user_id = ? AND l.status <> 'Deleted'
        ORDER BY f.added_at DESC, l.id DESC
        "#
    );
    let rows = sqlx::query_as::<Sqlite, ListingRow>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    into_listings(rows)
}

pub async fn is_favorited(
    pool: &SqlitePool,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, RequestError> {
    let count = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM favorites WHERE user_id = ? AND listing_id = ?",
    )
    .bind(user_id)
    .bind(listing_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn favorite_count(pool: &SqlitePool, listing_id: i64) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM favorites WHERE listing_id = ?")
        .bind(listing_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
