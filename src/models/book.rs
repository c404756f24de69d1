// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry. Prices are in Indonesian Rupiah.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "coverUrl", default)]
    pub cover_url: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One page of the book listing, as returned by `GET /books`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
