//! Location error types.

/// Errors from the last-known location cache.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Cache operation failed
    #[error("location cache error: {message}")]
    Cache { message: String },
}
