//! Domain types for the barbershop booking server.
//!
//! This module contains the business rules that don't depend on the backend
//! or the web layer: distances on the globe, distance labels, opening hours,
//! ratings and gallery navigation. Validated types enforce their invariants at
//! construction time.

mod booking;
mod distance;
mod error;
mod gallery;
mod geo;
mod hours;
mod rating;
mod shop;
mod time;

pub use booking::{Booking, BookingRequest, BookingStatus};
pub use distance::{VERY_CLOSE_KM, VERY_CLOSE_LABEL, format_distance};
pub use error::DomainError;
pub use gallery::{Direction, Gallery};
pub use geo::{Coordinate, EARTH_RADIUS_KM, InvalidCoordinate, distance_km};
pub use hours::{Availability, DEFAULT_ZONE, OpeningDays, OpeningWindow, is_open_at};
pub use rating::{
    InvalidRating, MAX_STARS, MIN_RATINGS_FOR_STARS, Rating, RatingSummary, StarFill, star_fills,
};
pub use shop::{InvalidIdentifier, Shop, ShopId, ShopService, Slug};
pub use time::{MINUTES_PER_DAY, ShopTime, TimeError};

#[cfg(test)]
pub(crate) use shop::fixtures;
