pub mod authentication;
pub mod config;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
pub mod models;
pub mod row_mapper;
pub mod services;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
use config::Config;
pub use data_formats::*;
use handlers::*;
use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    sqlite::SqlitePoolOptions,
    Sqlite, SqlitePool,
};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marketplace=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run_app(app: Router, config: Config) -> Result<()> {
    let db = init_db(&config).await?;
    let address = config.bind_address;
    serve(app, address, db, config).await
}

/// Serves `app` on `address` with the pool and configuration attached to
/// every request.
pub async fn serve(app: Router, address: SocketAddr, db: SqlitePool, config: Config) -> Result<()> {
    let app = app
        .layer(Extension(Arc::new(db)))
        .layer(Extension(Arc::new(config)))
        .layer(TraceLayer::new_for_http());
    tracing::info!(%address, "server listening");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let db_url = &config.database_url;
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!(db_url = %db_url, "creating database");
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        tracing::info!(db_url = %db_url, "database already exists");
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(db_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("running migrations");
    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    let users = Router::new()
        .route("/users/login", post(login_user))
        .route("/users", post(register_user))
        .route("/user", get(get_current_user));

    let listings = Router::new()
        .route("/listings", get(list_listings))
        .route("/listings/filter", get(filter_listings))
        .route("/listings/active-sellers", get(listings_from_active_sellers))
        .route("/listings/above-average", get(listings_above_average))
        .route("/listings/vehicles", post(create_vehicle_listing))
        .route("/listings/real-estate", post(create_real_estate_listing))
        .route("/listings/:id", get(get_listing).delete(delete_listing))
        .route("/listings/:id/sold", post(mark_listing_sold))
        .route(
            "/listings/:id/favorite",
            post(favorite_listing).delete(unfavorite_listing),
        )
        .route("/favorites", get(list_favorites));

    let vehicles = Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles/search", get(search_vehicles))
        .route("/vehicles/by-year", get(vehicles_by_year))
        .route("/vehicles/filter", get(filter_vehicles))
        .route("/vehicles/years", get(vehicle_years))
        .route("/vehicles/models", get(vehicle_models))
        .route("/vehicles/ranges", get(vehicle_ranges))
        .route("/vehicles/above-average", get(vehicles_above_average))
        .route("/vehicles/active-sellers", get(vehicles_from_active_sellers));

    let real_estate = Router::new()
        .route("/real-estate", get(list_real_estate))
        .route("/real-estate/search", get(search_real_estate))
        .route("/real-estate/by-city", get(real_estate_by_city))
        .route("/real-estate/by-rooms", get(real_estate_by_rooms))
        .route("/real-estate/filter", get(filter_real_estate))
        .route("/real-estate/cities", get(real_estate_cities))
        .route("/real-estate/room-configs", get(real_estate_room_configs))
        .route("/real-estate/seller-types", get(real_estate_seller_types))
        .route("/real-estate/ranges", get(real_estate_ranges));

    let reports = Router::new()
        .route("/reports/categories", get(category_statistics))
        .route(
            "/reports/categories/above-average",
            get(categories_above_average),
        )
        .route("/reports/years", get(year_statistics))
        .route("/reports/years/above-average", get(years_above_average))
        .route("/reports/cities", get(city_statistics))
        .route("/reports/top-users", get(top_users))
        .route("/reports/listing-details", get(listing_details))
        .route("/reports/top-per-category", get(top_per_category))
        .route("/reports/top-per-year", get(top_per_year))
        .route("/reports/top-per-city", get(top_per_city));

    Router::new()
        .route("/check_health", get(alive))
        .merge(users)
        .merge(listings)
        .merge(vehicles)
        .merge(real_estate)
        .merge(reports)
        .fallback(not_found)
}
