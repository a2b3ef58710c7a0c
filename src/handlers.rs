use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode, Uri},
    Extension, Json,
};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    config::Config,
    data_formats::*,
    db_helpers,
    errors::RequestError,
    models::{Favorite, Listing, ListingStatus, NewUser},
    row_mapper::{
        CategoryAverage, CategoryStatistics, CityStatistics, ListingDetail, RankedListing,
        RealEstateFilterRanges, UserListingStats, VehicleFilterRanges, YearAverage,
        YearStatistics,
    },
    services,
};

type JsonResult<T> = Result<Json<T>, RequestError>;
type CreatedResult<T> = Result<(StatusCode, Json<T>), RequestError>;

type UserJson = UserWrapper<UserResponse>;
type ListingsJson = MultipleListingsWrapper<Listing>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

/// `axum::extract::Query` whose rejection renders like every other error.
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| RequestError::Validation(rejection.body_text()))?;
        Ok(Query(value))
    }
}

fn issue_token(config: &Config, id: i64) -> Result<String, RequestError> {
    get_jwt_token(id, &config.jwt_secret).map_err(|e| {
        tracing::error!(error = %e, "could not issue token");
        RequestError::ServerError
    })
}

// ----------------- User Handlers -----------------
pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    request.validate()?;
    let user = db_helpers::get_user_by_email(&pool, &request.email)
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid email or password"))?;

    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification failed");
            RequestError::ServerError
        })?;
    if !is_password_correct {
        return Err(RequestError::NotAuthorized("Invalid email or password"));
    }

    let token = issue_token(&config, user.id)?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<RegisterRequest>>,
) -> CreatedResult<UserJson> {
    request.validate()?;
    if !request.passwords_match() {
        return Err(RequestError::Validation("Passwords do not match".into()));
    }

    let password_hash = hash_password_argon2(request.password).await.map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        RequestError::ServerError
    })?;
    let new_user = NewUser {
        full_name: request.full_name.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        phone: request.phone.filter(|p| !p.trim().is_empty()),
        password_hash,
    };
    let user = db_helpers::insert_user(&pool, &new_user).await?;
    tracing::info!(user_id = user.id, "user registered");

    let token = issue_token(&config, user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(UserWrapper::wrap_with_user_data(UserResponse::new(
            user, token,
        ))),
    ))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, token }: AuthUser,
) -> JsonResult<UserJson> {
    let user = db_helpers::get_user_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}
// ----------------- End User Handlers -----------------

// ----------------- Listing Handlers -----------------
pub async fn list_listings(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<KeywordParams>,
) -> JsonResult<Page<Listing>> {
    let page = match params.keyword.as_deref() {
        Some(keyword) => db_helpers::search_listings(&pool, Some(keyword), params.page).await?,
        None => db_helpers::all_listings(&pool, params.page).await?,
    };
    Ok(Json(page))
}

pub async fn filter_listings(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(filter): Query<ListingFilter>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(db_helpers::filter_listings(&pool, &filter).await?))
}

pub async fn listings_from_active_sellers(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<ActiveSellerParams>,
) -> JsonResult<ListingsJson> {
    let listings =
        db_helpers::listings_from_active_sellers(&pool, params.category, params.min_listing_count)
            .await?;
    Ok(Json(MultipleListingsWrapper::new(listings)))
}

pub async fn listings_above_average(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<CategoryParams>,
) -> JsonResult<ListingsJson> {
    let listings = db_helpers::listings_above_category_average(&pool, params.category).await?;
    Ok(Json(MultipleListingsWrapper::new(listings)))
}

pub async fn get_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> JsonResult<ListingWrapper<ListingDetailResponse>> {
    let listing = db_helpers::get_listing_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Listing not found"))?;
    let favorite_count = db_helpers::favorite_count(&pool, id).await?;
    let favorited = match maybe_user.get_id() {
        Some(user_id) => db_helpers::is_favorited(&pool, user_id, id).await?,
        None => false,
    };
    Ok(Json(ListingWrapper {
        listing: ListingDetailResponse {
            listing,
            favorite_count,
            favorited,
        },
    }))
}

pub async fn create_vehicle_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(ListingWrapper { listing: request }): Json<ListingWrapper<CreateVehicleRequest>>,
) -> CreatedResult<ListingWrapper<Listing>> {
    request.validate()?;
    let listing = db_helpers::create_vehicle_listing(&pool, user.id, &request).await?;
    Ok((StatusCode::CREATED, Json(ListingWrapper { listing })))
}

pub async fn create_real_estate_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(ListingWrapper { listing: request }): Json<ListingWrapper<CreateRealEstateRequest>>,
) -> CreatedResult<ListingWrapper<Listing>> {
    request.validate()?;
    let listing = db_helpers::create_real_estate_listing(&pool, user.id, &request).await?;
    Ok((StatusCode::CREATED, Json(ListingWrapper { listing })))
}

pub async fn mark_listing_sold(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<ListingWrapper<Listing>> {
    db_helpers::update_listing_status(&pool, id, user.id, ListingStatus::Sold).await?;
    let listing = db_helpers::get_listing_by_id(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Listing not found"))?;
    Ok(Json(ListingWrapper { listing }))
}

pub async fn delete_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    db_helpers::update_listing_status(&pool, id, user.id, ListingStatus::Deleted).await?;
    Ok(StatusCode::NO_CONTENT)
}
// ----------------- End Listing Handlers -----------------

// ----------------- Favorite Handlers -----------------
pub async fn favorite_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> CreatedResult<Favorite> {
    let favorite = db_helpers::add_favorite(&pool, user.id, id).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

pub async fn unfavorite_listing(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    db_helpers::remove_favorite(&pool, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_favorites(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> JsonResult<ListingsJson> {
    let listings = db_helpers::favorite_listings(&pool, user.id).await?;
    Ok(Json(MultipleListingsWrapper::new(listings)))
}

// ----------------- Vehicle Handlers -----------------
pub async fn list_vehicles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<PageParams>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(db_helpers::all_vehicles(&pool, params.page).await?))
}

pub async fn search_vehicles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<KeywordParams>,
) -> JsonResult<Page<Listing>> {
    let page = db_helpers::search_vehicles(&pool, params.keyword.as_deref(), params.page).await?;
    Ok(Json(page))
}

pub async fn vehicles_by_year(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<YearParams>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(
        db_helpers::vehicles_by_year(&pool, params.year, params.page).await?,
    ))
}

pub async fn filter_vehicles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(filter): Query<VehicleFilter>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(db_helpers::filter_vehicles(&pool, &filter).await?))
}

pub async fn vehicle_years(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ValuesWrapper<i64>> {
    let values = db_helpers::distinct_vehicle_years(&pool).await?;
    Ok(Json(ValuesWrapper { values }))
}

pub async fn vehicle_models(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ValuesWrapper<String>> {
    let values = db_helpers::distinct_model_names(&pool).await?;
    Ok(Json(ValuesWrapper { values }))
}

pub async fn vehicle_ranges(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<VehicleFilterRanges> {
    Ok(Json(services::vehicle_filter_ranges(&pool).await?))
}

pub async fn vehicles_above_average(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ListingsJson> {
    let listings = db_helpers::vehicles_above_average(&pool).await?;
    Ok(Json(MultipleListingsWrapper::new(listings)))
}

pub async fn vehicles_from_active_sellers(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<ActiveSellerParams>,
) -> JsonResult<ListingsJson> {
    let listings =
        db_helpers::vehicles_from_active_sellers(&pool, params.min_listing_count).await?;
    Ok(Json(MultipleListingsWrapper::new(listings)))
}

// ----------------- Real Estate Handlers -----------------
pub async fn list_real_estate(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<PageParams>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(db_helpers::all_real_estate(&pool, params.page).await?))
}

pub async fn search_real_estate(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<KeywordParams>,
) -> JsonResult<Page<Listing>> {
    let page =
        db_helpers::search_real_estate(&pool, params.keyword.as_deref(), params.page).await?;
    Ok(Json(page))
}

pub async fn real_estate_by_city(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<CityParams>,
) -> JsonResult<Page<Listing>> {
    let page = db_helpers::real_estate_by_city(&pool, params.city.as_deref(), params.page).await?;
    Ok(Json(page))
}

pub async fn real_estate_by_rooms(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<RoomConfigParams>,
) -> JsonResult<Page<Listing>> {
    let page =
        db_helpers::real_estate_by_room_config(&pool, params.room_config.as_deref(), params.page)
            .await?;
    Ok(Json(page))
}

pub async fn filter_real_estate(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(filter): Query<RealEstateFilter>,
) -> JsonResult<Page<Listing>> {
    Ok(Json(db_helpers::filter_real_estate(&pool, &filter).await?))
}

pub async fn real_estate_cities(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ValuesWrapper<String>> {
    let values = db_helpers::distinct_cities(&pool).await?;
    Ok(Json(ValuesWrapper { values }))
}

pub async fn real_estate_room_configs(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ValuesWrapper<String>> {
    let values = db_helpers::distinct_room_configs(&pool).await?;
    Ok(Json(ValuesWrapper { values }))
}

pub async fn real_estate_seller_types(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ValuesWrapper<String>> {
    let values = db_helpers::distinct_seller_types(&pool).await?;
    Ok(Json(ValuesWrapper { values }))
}

pub async fn real_estate_ranges(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<RealEstateFilterRanges> {
    Ok(Json(services::real_estate_filter_ranges(&pool).await?))
}

// ----------------- Report Handlers -----------------
pub async fn category_statistics(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<CategoryStatistics>> {
    let rows = services::category_statistics(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn categories_above_average(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<CategoryAverage>> {
    let rows = services::categories_above_average(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn year_statistics(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<YearStatistics>> {
    let rows = services::year_statistics(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn years_above_average(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<YearAverage>> {
    let rows = services::years_above_average(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn city_statistics(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<CityStatistics>> {
    let rows = services::city_statistics(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn top_users(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<LimitParams>,
) -> JsonResult<ReportWrapper<UserListingStats>> {
    let rows = services::top_users_by_listing_value(&pool, params.limit).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn listing_details(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<ReportWrapper<ListingDetail>> {
    let rows = services::listing_details(&pool).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn top_per_category(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<TopNParams>,
) -> JsonResult<ReportWrapper<RankedListing>> {
    let rows = services::top_listings_per_category(&pool, params.top_n).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn top_per_year(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<TopNParams>,
) -> JsonResult<ReportWrapper<RankedListing>> {
    let rows = services::top_vehicles_per_year(&pool, params.top_n).await?;
    Ok(Json(ReportWrapper { rows }))
}

pub async fn top_per_city(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<TopNParams>,
) -> JsonResult<ReportWrapper<RankedListing>> {
    let rows = services::top_real_estate_per_city(&pool, params.top_n).await?;
    Ok(Json(ReportWrapper { rows }))
}
