//! Backend table rows.
//!
//! These types map directly to the JSON the REST API returns for the
//! `barbershops`, `user_favorites`, `reviews` and `bookings` tables. Almost
//! every column is nullable, so fields are `Option` and validation happens
//! in [`super::convert`].

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A row of the `barbershops` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShopRow {
    pub id: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// "HH:MM" or "HH:MM:SS"
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,

    /// Weekday indices, 0 = Sunday
    pub opening_days: Option<Vec<i64>>,

    pub rating: Option<f64>,
    pub ratings_count: Option<u32>,

    /// Approximate distance in km. Older rows store it as a string.
    #[serde(default, deserialize_with = "number_or_string")]
    pub distance: Option<f64>,

    pub gallery: Option<Vec<String>>,
    pub services: Option<Vec<ServiceRow>>,
}

/// An entry of the `services` JSON column.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceRow {
    pub name: String,
    pub price: Option<f64>,
    pub duration: Option<u32>,
}

/// A row of `user_favorites`, as selected by favorite lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRow {
    pub barbershop_id: String,
}

/// Insert body for `user_favorites`.
#[derive(Debug, Serialize)]
pub struct FavoriteInsert<'a> {
    pub user_id: &'a str,
    pub barbershop_id: &'a str,
}

/// Insert body for `reviews`.
#[derive(Debug, Serialize)]
pub struct ReviewInsert<'a> {
    pub user_id: &'a str,
    pub barbershop_id: &'a str,
    pub rating: u8,
}

/// A row of the `bookings` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub barbershop_id: String,
    pub service_name: Option<String>,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub status: Option<String>,
}

/// Insert body for `bookings`.
#[derive(Debug, Serialize)]
pub struct BookingInsert<'a> {
    pub user_id: &'a str,
    pub barbershop_id: &'a str,
    pub service_name: &'a str,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub status: &'static str,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
