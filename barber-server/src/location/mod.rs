//! User location handling.
//!
//! The last position each signed-in user shared is kept on disk so their
//! pages requested without coordinates can still show distances, and shops
//! link out to the device's maps app for directions.

mod cache;
mod directions;
mod error;

pub use cache::{LastKnownLocation, LocationCacheConfig};
pub use directions::{MapsPlatform, directions_url};
pub use error::LocationError;
