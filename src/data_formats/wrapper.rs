use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListingWrapper<T> {
    pub listing: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleListingsWrapper<T> {
    pub listings: Vec<T>,
    #[serde(rename = "listingsCount")]
    pub listings_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValuesWrapper<T> {
    pub values: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportWrapper<T> {
    pub rows: Vec<T>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

impl<T> MultipleListingsWrapper<T> {
    pub fn new(listings: Vec<T>) -> Self {
        Self {
            listings_count: listings.len(),
            listings,
        }
    }
}
