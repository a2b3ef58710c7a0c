//! Typed decoding of report rows.
//!
//! Report queries return positional rows that do not line up with any one
//! entity. Each report declares its column order as a [`RowShape`]; rows are
//! first decoded into [`Cell`]s (checked against the shape) and then mapped
//! into report records by pure functions that never fail on nulls or short
//! rows.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::FromPrimitive, Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Column, Row, TypeInfo, ValueRef};

use crate::{errors::RequestError, models::cents_to_price};

/// One column value by SQLite storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Column-order contract of a report query. Bump `version` whenever the
/// column list changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShape {
    pub name: &'static str,
    pub version: u32,
    pub columns: &'static [&'static str],
}

impl RowShape {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

pub const CATEGORY_STATISTICS: RowShape = RowShape {
    name: "category_statistics",
    version: 1,
    columns: &["category", "listing_count", "total_cents", "min_cents", "max_cents"],
};

pub const CATEGORIES_ABOVE_AVERAGE: RowShape = RowShape {
    name: "categories_above_average",
    version: 1,
    columns: &["category", "listing_count", "total_cents"],
};

pub const YEAR_STATISTICS: RowShape = RowShape {
    name: "year_statistics",
    version: 1,
    columns: &["model_year", "listing_count", "total_cents", "min_cents", "max_cents"],
};

pub const YEARS_ABOVE_AVERAGE: RowShape = RowShape {
    name: "years_above_average",
    version: 1,
    columns: &["model_year", "listing_count", "total_cents"],
};

pub const CITY_STATISTICS: RowShape = RowShape {
    name: "city_statistics",
    version: 1,
    columns: &[
        "city",
        "listing_count",
        "total_cents",
        "min_cents",
        "max_cents",
        "total_area_sqm",
    ],
};

pub const TOP_USERS: RowShape = RowShape {
    name: "top_users",
    version: 1,
    columns: &["user_id", "full_name", "email", "listing_count", "total_cents"],
};

pub const LISTING_DETAILS: RowShape = RowShape {
    name: "listing_details",
    version: 1,
    columns: &[
        "listing_id",
        "title",
        "description",
        "price_cents",
        "listing_date",
        "category",
        "user_id",
        "full_name",
        "email",
        "favorite_count",
    ],
};

pub const TOP_PER_CATEGORY: RowShape = RowShape {
    name: "top_listings_per_category",
    version: 1,
    columns: &[
        "category",
        "listing_id",
        "title",
        "price_cents",
        "listing_date",
        "owner_name",
        "owner_email",
        "row_rank",
    ],
};

pub const TOP_PER_YEAR: RowShape = RowShape {
    name: "top_vehicles_per_year",
    version: 1,
    columns: &[
        "model_year",
        "listing_id",
        "title",
        "price_cents",
        "listing_date",
        "owner_name",
        "owner_email",
        "row_rank",
    ],
};

pub const TOP_PER_CITY: RowShape = RowShape {
    name: "top_real_estate_per_city",
    version: 1,
    columns: &[
        "city",
        "listing_id",
        "title",
        "price_cents",
        "listing_date",
        "owner_name",
        "owner_email",
        "row_rank",
    ],
};

pub const VEHICLE_FILTER_RANGES: RowShape = RowShape {
    name: "vehicle_filter_ranges",
    version: 1,
    columns: &[
        "min_year",
        "max_year",
        "min_cents",
        "max_cents",
        "min_kilometers",
        "max_kilometers",
    ],
};

pub const REAL_ESTATE_FILTER_RANGES: RowShape = RowShape {
    name: "real_estate_filter_ranges",
    version: 1,
    columns: &["min_cents", "max_cents", "min_area_sqm", "max_area_sqm"],
};

// ----------------- Report Records -----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatistics {
    pub category: String,
    pub listing_count: i64,
    pub average_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAverage {
    pub category: String,
    pub listing_count: i64,
    pub average_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearStatistics {
    pub model_year: i64,
    pub listing_count: i64,
    pub average_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearAverage {
    pub model_year: i64,
    pub listing_count: i64,
    pub average_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStatistics {
    pub city: String,
    pub listing_count: i64,
    pub average_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub average_area_sqm: Decimal,
    pub average_price_per_sqm: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListingStats {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub listing_count: i64,
    pub total_listing_value: Decimal,
    pub average_listing_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub listing_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub listing_date: Option<NaiveDate>,
    pub category: String,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub favorite_count: i64,
}

/// A listing's position within its group (category, model year or city).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedListing {
    pub group: String,
    pub listing_id: i64,
    pub title: String,
    pub price: Decimal,
    pub listing_date: Option<NaiveDate>,
    pub owner_name: String,
    pub owner_email: String,
    pub rank: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilterRanges {
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_kilometers: Option<i64>,
    pub max_kilometers: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateFilterRanges {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_area_sqm: Option<i64>,
    pub max_area_sqm: Option<i64>,
}

// ----------------- Decoding -----------------

fn decode_cell(row: &SqliteRow, index: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = raw.type_info().name().to_owned();
    let cell = match type_name.as_str() {
        "INTEGER" => Cell::Integer(row.try_get(index)?),
        "REAL" => Cell::Real(row.try_get(index)?),
        "TEXT" => Cell::Text(row.try_get(index)?),
        other => {
            tracing::warn!(column = index, storage = other, "unsupported column storage class");
            Cell::Null
        }
    };
    Ok(cell)
}

/// Decodes `rows` into cells after checking that the query produced the
/// columns `shape` promises, in order.
pub fn decode_rows(shape: &RowShape, rows: &[SqliteRow]) -> Result<Vec<Vec<Cell>>, RequestError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Vec<&str> = first.columns().iter().map(|c| c.name()).collect();
    if columns.len() < shape.width() || columns[..shape.width()] != *shape.columns {
        tracing::error!(
            shape = shape.name,
            version = shape.version,
            ?columns,
            "report query does not match its row shape"
        );
        return Err(RequestError::ServerError);
    }

    rows.iter()
        .map(|row| {
            (0..shape.width())
                .map(|index| decode_cell(row, index))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(RequestError::from)
}

/// Applies `map` to every row wide enough for `shape`. Shorter rows are
/// skipped.
pub fn map_rows<T>(shape: &RowShape, rows: &[Vec<Cell>], map: fn(&[Cell]) -> T) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            if row.len() < shape.width() {
                tracing::warn!(
                    shape = shape.name,
                    version = shape.version,
                    row = index,
                    width = row.len(),
                    expected = shape.width(),
                    "skipping short report row"
                );
                return None;
            }
            Some(map(row))
        })
        .collect()
}

/// Like [`map_rows`] for single-row reports; a missing or short row maps to
/// `T::default()`.
pub fn map_single_row<T: Default>(shape: &RowShape, rows: &[Vec<Cell>], map: fn(&[Cell]) -> T) -> T {
    map_rows(shape, rows, map).into_iter().next().unwrap_or_default()
}

// ----------------- Coercions -----------------

fn integer(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Null => None,
        Cell::Integer(value) => Some(*value),
        Cell::Real(value) => Some(*value as i64),
        Cell::Text(value) => value.trim().parse().ok(),
    }
}

fn count(cell: &Cell) -> i64 {
    integer(cell).unwrap_or(0)
}

fn text(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Integer(value) => value.to_string(),
        Cell::Real(value) => value.to_string(),
        Cell::Text(value) => value.clone(),
    }
}

fn optional_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        other => Some(text(other)),
    }
}

/// Amount in cents.
fn cents(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Null => None,
        Cell::Integer(value) => Some(Decimal::from(*value)),
        Cell::Real(value) => Decimal::from_f64(*value),
        Cell::Text(value) => value.trim().parse().ok(),
    }
}

/// Rounds half away from zero and pins the scale so `3` renders as `3.00`.
fn two_places(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

fn optional_money(cell: &Cell) -> Option<Decimal> {
    cents(cell).map(|c| two_places(c / Decimal::ONE_HUNDRED))
}

fn money(cell: &Cell) -> Decimal {
    optional_money(cell).unwrap_or_else(|| cents_to_price(0))
}

/// `total / count` rounded half away from zero to two places; zero rows
/// average to zero.
fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        return cents_to_price(0);
    }
    two_places(total / Decimal::from(count))
}

fn date(cell: &Cell) -> Option<NaiveDate> {
    let value = match cell {
        Cell::Text(value) => value.trim(),
        _ => return None,
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| value.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()))
}

// ----------------- Row Mappers -----------------

pub fn category_statistics(row: &[Cell]) -> CategoryStatistics {
    let listing_count = count(&row[1]);
    let total_value = money(&row[2]);
    CategoryStatistics {
        category: text(&row[0]),
        listing_count,
        average_price: average(total_value, listing_count),
        min_price: money(&row[3]),
        max_price: money(&row[4]),
        total_value,
    }
}

pub fn category_average(row: &[Cell]) -> CategoryAverage {
    let listing_count = count(&row[1]);
    CategoryAverage {
        category: text(&row[0]),
        listing_count,
        average_price: average(money(&row[2]), listing_count),
    }
}

pub fn year_statistics(row: &[Cell]) -> YearStatistics {
    let listing_count = count(&row[1]);
    let total_value = money(&row[2]);
    YearStatistics {
        model_year: count(&row[0]),
        listing_count,
        average_price: average(total_value, listing_count),
        min_price: money(&row[3]),
        max_price: money(&row[4]),
        total_value,
    }
}

pub fn year_average(row: &[Cell]) -> YearAverage {
    let listing_count = count(&row[1]);
    YearAverage {
        model_year: count(&row[0]),
        listing_count,
        average_price: average(money(&row[2]), listing_count),
    }
}

pub fn city_statistics(row: &[Cell]) -> CityStatistics {
    let listing_count = count(&row[1]);
    let total_value = money(&row[2]);
    let total_area = count(&row[5]);
    CityStatistics {
        city: text(&row[0]),
        listing_count,
        average_price: average(total_value, listing_count),
        min_price: money(&row[3]),
        max_price: money(&row[4]),
        average_area_sqm: average(Decimal::from(total_area), listing_count),
        average_price_per_sqm: average(total_value, total_area),
    }
}

pub fn user_listing_stats(row: &[Cell]) -> UserListingStats {
    let listing_count = count(&row[3]);
    let total_listing_value = money(&row[4]);
    UserListingStats {
        user_id: count(&row[0]),
        full_name: text(&row[1]),
        email: text(&row[2]),
        listing_count,
        total_listing_value,
        average_listing_price: average(total_listing_value, listing_count),
    }
}

pub fn listing_detail(row: &[Cell]) -> ListingDetail {
    ListingDetail {
        listing_id: count(&row[0]),
        title: text(&row[1]),
        description: optional_text(&row[2]),
        price: money(&row[3]),
        listing_date: date(&row[4]),
        category: text(&row[5]),
        user_id: count(&row[6]),
        full_name: text(&row[7]),
        email: text(&row[8]),
        favorite_count: count(&row[9]),
    }
}

pub fn ranked_listing(row: &[Cell]) -> RankedListing {
    RankedListing {
        group: text(&row[0]),
        listing_id: count(&row[1]),
        title: text(&row[2]),
        price: money(&row[3]),
        listing_date: date(&row[4]),
        owner_name: text(&row[5]),
        owner_email: text(&row[6]),
        rank: count(&row[7]),
    }
}

pub fn vehicle_filter_ranges(row: &[Cell]) -> VehicleFilterRanges {
    VehicleFilterRanges {
        min_year: integer(&row[0]),
        max_year: integer(&row[1]),
        min_price: optional_money(&row[2]),
        max_price: optional_money(&row[3]),
        min_kilometers: integer(&row[4]),
        max_kilometers: integer(&row[5]),
    }
}

pub fn real_estate_filter_ranges(row: &[Cell]) -> RealEstateFilterRanges {
    RealEstateFilterRanges {
        min_price: optional_money(&row[0]),
        max_price: optional_money(&row[1]),
        min_area_sqm: integer(&row[2]),
        max_area_sqm: integer(&row[3]),
    }
}
