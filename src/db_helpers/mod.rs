use sqlx::{
    query::{Query, QueryAs, QueryScalar},
    sqlite::SqliteArguments,
    Sqlite, SqlitePool,
};

use crate::{
    data_formats::{Page, PAGE_SIZE},
    errors::RequestError,
    models::{Listing, ListingRow},
};

mod favorite_helpers;
mod listing_helpers;
mod real_estate_helpers;
mod report_helpers;
mod user_helpers;
mod vehicle_helpers;

pub use favorite_helpers::*;
pub use listing_helpers::*;
pub use real_estate_helpers::*;
pub use report_helpers::*;
pub use user_helpers::*;
pub use vehicle_helpers::*;

/// Columns selected by every listing query; the names line up with
/// [`ListingRow`].
pub(crate) const LISTING_COLUMNS: &str = r#"
    l.id, l.user_id, u.full_name AS owner_name, u.email AS owner_email,
    l.title, l.description, l.price_cents, l.listing_date, l.category, l.status,
    v.model_year, v.model_name, v.kilometers,
    r.seller_type, r.area_sqm, r.room_config, r.city, r.district, r.neighborhood
"#;

pub(crate) const LISTING_FROM: &str = r#"
    FROM listings l
    JOIN users u ON u.id = l.user_id
    LEFT JOIN vehicles v ON v.listing_id = l.id
    LEFT JOIN real_estate r ON r.listing_id = l.id
"#;

pub(crate) const ACTIVE: &str = "l.status = 'Active'";

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Int(value)
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Text(value)
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Text(value.to_owned())
    }
}

/// Builds a `WHERE` clause out of optional conditions. A condition whose
/// parameter is `None` is left out entirely, so an absent filter never
/// narrows the result.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    params: Vec<BindValue>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional predicate without parameters.
    pub fn condition(mut self, condition: &str) -> Self {
        self.conditions.push(condition.to_owned());
        self
    }

    /// `condition` must contain exactly one `?`.
    pub fn add_param<T: Into<BindValue>>(mut self, condition: &str, param: Option<T>) -> Self {
        if let Some(value) = param {
            self.conditions.push(condition.to_owned());
            self.params.push(value.into());
        }
        self
    }

    pub fn equals<T: Into<BindValue>>(self, column: &str, param: Option<T>) -> Self {
        self.add_param(&format!("{column} = ?"), param)
    }

    pub fn at_least<T: Into<BindValue>>(self, column: &str, param: Option<T>) -> Self {
        self.add_param(&format!("{column} >= ?"), param)
    }

    pub fn at_most<T: Into<BindValue>>(self, column: &str, param: Option<T>) -> Self {
        self.add_param(&format!("{column} <= ?"), param)
    }

    /// Case-insensitive substring match of `keyword` against any of
    /// `columns`, which must already hold [`fold_case`]d text. Blank
    /// keywords are ignored.
    pub fn contains(mut self, columns: &[&str], keyword: Option<&str>) -> Self {
        let keyword = match keyword.map(str::trim) {
            Some(keyword) if !keyword.is_empty() => keyword,
            _ => return self,
        };
        let pattern = like_pattern(&fold_case(keyword));
        let matches = columns
            .iter()
            .map(|column| format!("{column} LIKE ? ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({matches})"));
        self.params
            .extend(columns.iter().map(|_| BindValue::Text(pattern.clone())));
        self
    }

    pub fn build(self) -> (String, Vec<BindValue>) {
        let query = if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        };
        (query, self.params)
    }
}

/// Lowercases `text` for keyword matching. SQLite's `LOWER` only folds
/// ASCII, so search columns are stored folded. Turkish dotted and dotless
/// i both fold to `i`.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|ch| *ch != '\u{307}')
        .map(|ch| if ch == 'ı' { 'i' } else { ch })
        .collect()
}

/// Wraps `keyword` in `%…%`, escaping the characters LIKE treats specially.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) trait BindParams: Sized {
    fn bind_value(self, value: BindValue) -> Self;

    fn bind_params(mut self, params: &[BindValue]) -> Self {
        for param in params {
            self = self.bind_value(param.clone());
        }
        self
    }
}

impl<'q> BindParams for Query<'q, Sqlite, SqliteArguments<'q>> {
    fn bind_value(self, value: BindValue) -> Self {
        match value {
            BindValue::Int(value) => self.bind(value),
            BindValue::Text(value) => self.bind(value),
        }
    }
}

impl<'q, O> BindParams for QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    fn bind_value(self, value: BindValue) -> Self {
        match value {
            BindValue::Int(value) => self.bind(value),
            BindValue::Text(value) => self.bind(value),
        }
    }
}

impl<'q, O> BindParams for QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
    fn bind_value(self, value: BindValue) -> Self {
        match value {
            BindValue::Int(value) => self.bind(value),
            BindValue::Text(value) => self.bind(value),
        }
    }
}

// ----------------- Helper Functions -----------------

fn into_listings(rows: Vec<ListingRow>) -> Result<Vec<Listing>, RequestError> {
    rows.into_iter().map(Listing::try_from).collect()
}

/// Runs `filters` as a page of listings plus the total match count. The
/// order must end in a unique key so pages never overlap.
pub(crate) async fn fetch_listing_page(
    pool: &SqlitePool,
    filters: QueryBuilder,
    order_by: &str,
    page: u32,
) -> Result<Page<Listing>, RequestError> {
    let (where_clause, params) = filters.build();

    let count_query = format!("SELECT COUNT(*) {LISTING_FROM}{where_clause}");
    let total = sqlx::query_scalar::<Sqlite, i64>(&count_query)
        .bind_params(&params)
        .fetch_one(pool)
        .await?;

    let query = format!(
        "SELECT {LISTING_COLUMNS} {LISTING_FROM}{where_clause} ORDER BY {order_by} LIMIT ? OFFSET ?"
    );
    tracing::debug!(sql = %query, "paged listing query");
    let rows = sqlx::query_as::<Sqlite, ListingRow>(&query)
        .bind_params(&params)
        .bind(i64::from(PAGE_SIZE))
        .bind(Page::<Listing>::offset(page, PAGE_SIZE))
        .fetch_all(pool)
        .await?;

    Ok(Page::new(into_listings(rows)?, page, PAGE_SIZE, total))
}

/// Same as [`fetch_listing_page`] without paging.
pub(crate) async fn fetch_listings(
    pool: &SqlitePool,
    filters: QueryBuilder,
    order_by: &str,
) -> Result<Vec<Listing>, RequestError> {
    let (where_clause, params) = filters.build();
    let query = format!("SELECT {LISTING_COLUMNS} {LISTING_FROM}{where_clause} ORDER BY {order_by}");
    tracing::debug!(sql = %query, "listing query");
    let rows = sqlx::query_as::<Sqlite, ListingRow>(&query)
        .bind_params(&params)
        .fetch_all(pool)
        .await?;
    into_listings(rows)
}
