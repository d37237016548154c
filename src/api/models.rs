//! Wire models for the library REST API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::identity::Role;

/// One page of a listing endpoint (`{ <items>, has_next }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BooksPage {
    #[serde(default)]
    pub books: Vec<BookSummary>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available_copies: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularBook {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub recent_orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: Option<i32>,
    pub description: String,
    pub num_copies: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Borrow,
    ReadInLibrary,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Borrow => "borrow",
            OrderType::ReadInLibrary => "read_in_library",
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "borrow" => Ok(OrderType::Borrow),
            "read_in_library" | "read-in-library" => Ok(OrderType::ReadInLibrary),
            other => Err(AppError::Validation {
                code: "unknown_order_type".into(),
                message: format!("Unknown order type '{}'. Choose borrow or read_in_library.", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Overdue,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub book_title: Option<String>,
    pub order_type: OrderType,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub book_id: Uuid,
    pub order_type: OrderType,
}

/// Body of `POST /users/login`. The backend names the password field
/// `password_hash` and hashes it server-side.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(rename = "password_hash")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    #[serde(rename = "password_hash")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// Backend timestamps come with or without an offset; naive ones are UTC.
fn lenient_datetime<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    let Some(s) = raw.filter(|s| !s.trim().is_empty()) else { return Ok(None) };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|n| Some(n.and_utc()))
        .map_err(serde::de::Error::custom)
}
