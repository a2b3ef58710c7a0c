use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    empty_as_none, get_default_min_listing_count, get_default_report_limit, get_default_top_n,
};
use crate::models::ListingCategory;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "Phone number is too long"))]
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

// ----------------- Listing Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 1900, max = 2100, message = "Model year is out of range"))]
    pub model_year: i64,
    #[validate(length(min = 1, max = 150, message = "Model name must be between 1 and 150 characters"))]
    pub model_name: String,
    #[validate(range(min = 0, message = "Kilometers must not be negative"))]
    pub kilometers: i64,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRealEstateRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    #[validate(length(max = 50, message = "Seller type is too long"))]
    pub seller_type: Option<String>,
    #[validate(range(min = 1, message = "Area must be positive"))]
    pub area_sqm: i64,
    #[serde(default)]
    #[validate(length(max = 20, message = "Room configuration is too long"))]
    pub room_config: Option<String>,
    #[validate(length(min = 1, max = 50, message = "City must be between 1 and 50 characters"))]
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

// ----------------- Query Params -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PageParams {
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct KeywordParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub keyword: Option<String>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct YearParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i64>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct CityParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfigParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub room_config: Option<String>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct CategoryParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<ListingCategory>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSellerParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<ListingCategory>,
    #[serde(default = "get_default_min_listing_count")]
    pub min_listing_count: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TopNParams {
    #[serde(default = "get_default_top_n")]
    pub top_n: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LimitParams {
    #[serde(default = "get_default_report_limit")]
    pub limit: i64,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingSort {
    Price,
    #[default]
    Date,
    #[serde(alias = "name")]
    Title,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleSort {
    Price,
    Year,
    #[serde(alias = "km")]
    Kilometers,
    #[serde(alias = "title")]
    Name,
    #[default]
    Date,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RealEstateSort {
    Price,
    #[default]
    Date,
    Area,
    #[serde(alias = "name")]
    Title,
}

/// Multi-condition filter over every listing category.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<ListingCategory>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub keyword: Option<String>,
    /// Substring of the owner's name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub seller: Option<String>,
    #[serde(default)]
    pub sort: ListingSort,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_year: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_year: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_km: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_km: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub sort: VehicleSort,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub room_config: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub seller_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_area: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_area: Option<i64>,
    /// Substring of city, district or neighborhood.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub keyword: Option<String>,
    #[serde(default)]
    pub sort: RealEstateSort,
    #[serde(default)]
    pub page: u32,
}
