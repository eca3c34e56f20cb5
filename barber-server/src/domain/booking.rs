//! Appointments booked at a shop.
//!
//! Bookings are plain records: slot availability and conflicts are the
//! backend's concern.

use chrono::NaiveDate;
use serde::Serialize;

use super::shop::ShopId;
use super::time::ShopTime;

/// Lifecycle state of a booking as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Parse a backend status string. Unknown or missing values are pending.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("confirmed") => Self::Confirmed,
            Some("completed") => Self::Completed,
            Some("cancelled" | "canceled") => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A request to book a service at a shop.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub shop_id: ShopId,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: ShopTime,
}

/// A stored booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub shop_id: ShopId,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: ShopTime,
    pub status: BookingStatus,
}
