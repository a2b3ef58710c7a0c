#![allow(dead_code)]

use marketplace::{
    data_formats::{CreateRealEstateRequest, CreateVehicleRequest},
    db_helpers,
    models::{Listing, NewUser, User},
    MIGRATOR,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Fresh migrated in-memory database. A single connection keeps every query
/// on the same in-memory instance.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}

pub async fn create_user(pool: &SqlitePool, full_name: &str, email: &str) -> User {
    let user = NewUser {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: None,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
    };
    db_helpers::insert_user(pool, &user).await.unwrap()
}

pub fn vehicle_request(model_name: &str, model_year: i64, kilometers: i64, price: &str) -> CreateVehicleRequest {
    CreateVehicleRequest {
        title: format!("{model_year} {model_name}"),
        description: Some(format!("{model_name} in good condition")),
        price: price.parse().unwrap(),
        model_year,
        model_name: model_name.to_string(),
        kilometers,
    }
}

pub fn real_estate_request(
    city: &str,
    district: &str,
    room_config: &str,
    area_sqm: i64,
    price: &str,
) -> CreateRealEstateRequest {
    CreateRealEstateRequest {
        title: format!("{room_config} flat in {district}"),
        description: None,
        price: price.parse().unwrap(),
        seller_type: Some("Owner".to_string()),
        area_sqm,
        room_config: Some(room_config.to_string()),
        city: city.to_string(),
        district: Some(district.to_string()),
        neighborhood: None,
    }
}

pub async fn post_vehicle(
    pool: &SqlitePool,
    owner_id: i64,
    model_name: &str,
    model_year: i64,
    kilometers: i64,
    price: &str,
) -> Listing {
    let request = vehicle_request(model_name, model_year, kilometers, price);
    db_helpers::create_vehicle_listing(pool, owner_id, &request)
        .await
        .unwrap()
}

pub async fn post_real_estate(
    pool: &SqlitePool,
    owner_id: i64,
    city: &str,
    district: &str,
    room_config: &str,
    area_sqm: i64,
    price: &str,
) -> Listing {
    let request = real_estate_request(city, district, room_config, area_sqm, price);
    db_helpers::create_real_estate_listing(pool, owner_id, &request)
        .await
        .unwrap()
}

pub async fn set_listing_date(pool: &SqlitePool, listing_id: i64, date: &str) {
    sqlx::query("UPDATE listings SET listing_date = ? WHERE id = ?")
        .bind(date)
        .bind(listing_id)
        .execute(pool)
        .await
        .unwrap();
}

pub fn ids(listings: &[Listing]) -> Vec<i64> {
    listings.iter().map(|l| l.id).collect()
}
