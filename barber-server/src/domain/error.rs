//! Domain error types.
//!
//! These errors represent validation failures when turning backend records
//! into domain values. They are distinct from API/IO errors.

use super::{InvalidCoordinate, InvalidIdentifier, InvalidRating, TimeError};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A record is missing a field every shop must have
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Id or slug failed validation
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Coordinate out of range
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Rating outside 1-5
    #[error(transparent)]
    InvalidRating(#[from] InvalidRating),

    /// Unparseable time of day
    #[error(transparent)]
    InvalidTime(#[from] TimeError),
}
