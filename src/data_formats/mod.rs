mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer};

/// Fixed page size for every paginated listing query.
pub const PAGE_SIZE: u32 = 12;

/// Query-string values come in as text; a blank form field means "no
/// constraint", not a parse error.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

fn get_default_top_n() -> i64 {
    3
}

fn get_default_min_listing_count() -> i64 {
    2
}

fn get_default_report_limit() -> i64 {
    10
}
