//! Web layer for the barbershop server.
//!
//! Serves shop listings, shop detail, favorites, reviews and bookings as
//! HTML pages or JSON depending on the `Accept` header.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
