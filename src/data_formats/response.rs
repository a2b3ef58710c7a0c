use serde::{Deserialize, Serialize};

use crate::models::{Listing, User};

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub token: String,
    pub full_name: String,
    pub phone: Option<String>,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            full_name,
            email,
            phone,
            ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            id,
            email,
            token,
            full_name,
            phone,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: Listing,
    pub favorite_count: i64,
    pub favorited: bool,
}

/// One page of a paginated query plus what a client needs to render page
/// controls. `page` is 0-based.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_elements: i64) -> Self {
        let total = total_elements.max(0) as u64;
        let size = u64::from(page_size.max(1));
        let total_pages = ((total + size - 1) / size) as u32;
        Self {
            items,
            total_elements,
            page,
            page_size,
            total_pages,
            has_next: u64::from(page) + 1 < u64::from(total_pages),
            has_previous: page > 0,
        }
    }

    pub fn offset(page: u32, page_size: u32) -> i64 {
        i64::from(page) * i64::from(page_size)
    }
}
