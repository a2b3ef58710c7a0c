use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Argon2 PHC string, never the plaintext password.
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingCategory {
    Vehicle,
    RealEstate,
}

impl ListingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCategory::Vehicle => "Vehicle",
            ListingCategory::RealEstate => "RealEstate",
        }
    }
}

impl FromStr for ListingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Vehicle" => Ok(ListingCategory::Vehicle),
            "RealEstate" => Ok(ListingCategory::RealEstate),
            other => Err(format!("unknown listing category `{other}`")),
        }
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Sold,
    Deleted,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "Active",
            ListingStatus::Sold => "Sold",
            ListingStatus::Deleted => "Deleted",
        }
    }

    /// Only an Active listing can move, and only to Sold or Deleted.
    pub fn can_transition_to(&self, next: ListingStatus) -> bool {
        matches!(
            (self, next),
            (ListingStatus::Active, ListingStatus::Sold)
                | (ListingStatus::Active, ListingStatus::Deleted)
        )
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(ListingStatus::Active),
            "Sold" => Ok(ListingStatus::Sold),
            "Deleted" => Ok(ListingStatus::Deleted),
            other => Err(format!("unknown listing status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub model_year: i64,
    pub model_name: String,
    pub kilometers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstate {
    pub seller_type: Option<String>,
    pub area_sqm: i64,
    pub room_config: Option<String>,
    pub city: String,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

/// The category-specific half of a listing. Exactly one variant exists per
/// listing, so the category is read off the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", content = "details")]
pub enum ListingDetails {
    Vehicle(Vehicle),
    RealEstate(RealEstate),
}

impl ListingDetails {
    pub fn category(&self) -> ListingCategory {
        match self {
            ListingDetails::Vehicle(_) => ListingCategory::Vehicle,
            ListingDetails::RealEstate(_) => ListingCategory::RealEstate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub owner: Owner,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub listing_date: NaiveDate,
    pub status: ListingStatus,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl Listing {
    pub fn category(&self) -> ListingCategory {
        self.details.category()
    }
}

/// Flat row produced by the listing queries: the listing joined with its
/// owner and both extension tables (only one side is ever populated).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub user_id: i64,
    pub owner_name: String,
    pub owner_email: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub listing_date: NaiveDate,
    pub category: String,
    pub status: String,
    pub model_year: Option<i64>,
    pub model_name: Option<String>,
    pub kilometers: Option<i64>,
    pub seller_type: Option<String>,
    pub area_sqm: Option<i64>,
    pub room_config: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RequestError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let inconsistent = |reason: &str| {
            tracing::error!(listing_id = row.id, "inconsistent listing row: {reason}");
            RequestError::ServerError
        };
        let category: ListingCategory = row.category.parse().map_err(|e: String| inconsistent(&e))?;
        let status: ListingStatus = row.status.parse().map_err(|e: String| inconsistent(&e))?;

        let details = match category {
            ListingCategory::Vehicle => match (row.model_year, row.model_name.clone(), row.kilometers) {
                (Some(model_year), Some(model_name), Some(kilometers)) if row.city.is_none() => {
                    ListingDetails::Vehicle(Vehicle {
                        model_year,
                        model_name,
                        kilometers,
                    })
                }
                _ => return Err(inconsistent("vehicle listing without a single vehicle record")),
            },
            ListingCategory::RealEstate => match (row.area_sqm, row.city.clone()) {
                (Some(area_sqm), Some(city)) if row.model_year.is_none() => {
                    ListingDetails::RealEstate(RealEstate {
                        seller_type: row.seller_type.clone(),
                        area_sqm,
                        room_config: row.room_config.clone(),
                        city,
                        district: row.district.clone(),
                        neighborhood: row.neighborhood.clone(),
                    })
                }
                _ => return Err(inconsistent("real estate listing without a single real estate record")),
            },
        };

        Ok(Listing {
            id: row.id,
            owner: Owner {
                id: row.user_id,
                full_name: row.owner_name,
                email: row.owner_email,
            },
            title: row.title,
            description: row.description,
            price: cents_to_price(row.price_cents),
            listing_date: row.listing_date,
            status,
            details,
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: i64,
    pub listing_id: i64,
    pub added_at: NaiveDateTime,
}

// ----------------- Price Helpers -----------------

pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Converts a stored price. Rejects negative values and anything finer than
/// a cent.
pub fn price_to_cents(price: Decimal) -> Result<i64, RequestError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(RequestError::Validation("Price must not be negative".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(RequestError::Validation(
            "Price must have at most two decimal places".into(),
        ));
    }
    to_cents(price)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| RequestError::Validation("Price is out of range".into()))
}

fn to_cents(price: Decimal) -> Option<Decimal> {
    price.checked_mul(Decimal::ONE_HUNDRED)
}

/// Smallest whole-cent value satisfying `price >= bound`.
pub fn lower_bound_cents(bound: Decimal) -> Result<i64, RequestError> {
    to_cents(bound)
        .and_then(|cents| cents.ceil().to_i64())
        .ok_or_else(|| RequestError::Validation("Minimum price is out of range".into()))
}

/// Largest whole-cent value satisfying `price <= bound`.
pub fn upper_bound_cents(bound: Decimal) -> Result<i64, RequestError> {
    to_cents(bound)
        .and_then(|cents| cents.floor().to_i64())
        .ok_or_else(|| RequestError::Validation("Maximum price is out of range".into()))
}
