//! Backend access for shops, favorites, reviews and bookings.
//!
//! The production backend is a Supabase project reached over its PostgREST
//! API. Key characteristics:
//! - Nearly every column is nullable; rows are validated on conversion and
//!   invalid list entries are skipped rather than failing the whole list
//! - User-scoped calls forward the user's access token so the backend's
//!   row-level security decides what the user may see or change
//! - A user may review a shop once; duplicates come back as Postgres
//!   unique violations

mod client;
mod convert;
mod error;
mod mock;
mod session;
mod store;
mod types;

pub use client::{SupabaseClient, SupabaseConfig};
pub use convert::{convert_booking, convert_shop, convert_shops};
pub use error::BackendError;
pub use mock::{MockBackend, SHOPS_FILE};
pub use session::Session;
pub use store::Backend;
pub use types::{BookingRow, ServiceRow, ShopRow, UNIQUE_VIOLATION};

#[cfg(test)]
pub(crate) use session::test_token;
