//! Backend client error types.

use std::fmt;

use crate::domain::DomainError;

use super::types::UNIQUE_VIOLATION;

/// Errors from the backend HTTP client or the mock store.
#[derive(Debug)]
pub enum BackendError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code, with the Postgres error code when
    /// the body carried one
    ApiError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// No shop matches the requested slug or id
    ShopNotFound(String),

    /// The user already rated this shop
    AlreadyReviewed,

    /// Missing or rejected access token
    Unauthorized,

    /// Rate limited by the API
    RateLimited,

    /// A record came back that fails domain validation
    InvalidRecord(DomainError),

    /// Backend URL or key not configured
    NotConfigured(String),
}

impl BackendError {
    /// Whether the backend rejected a write because the row already exists.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, BackendError::ApiError { code: Some(code), .. } if code == UNIQUE_VIOLATION)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "HTTP error: {e}"),
            BackendError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            BackendError::ApiError {
                status,
                code: Some(code),
                message,
            } => write!(f, "API error {status} ({code}): {message}"),
            BackendError::ApiError {
                status, message, ..
            } => write!(f, "API error {status}: {message}"),
            BackendError::ShopNotFound(key) => write!(f, "shop not found: {key}"),
            BackendError::AlreadyReviewed => write!(f, "shop already reviewed by this user"),
            BackendError::Unauthorized => write!(f, "unauthorized (missing or expired session)"),
            BackendError::RateLimited => write!(f, "rate limited by backend"),
            BackendError::InvalidRecord(e) => write!(f, "invalid record: {e}"),
            BackendError::NotConfigured(msg) => write!(f, "not configured: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Http(e) => Some(e),
            BackendError::InvalidRecord(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err)
    }
}

impl From<DomainError> for BackendError {
    fn from(err: DomainError) -> Self {
        BackendError::InvalidRecord(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BackendError::ShopNotFound("central".into());
        assert_eq!(err.to_string(), "shop not found: central");

        let err = BackendError::ApiError {
            status: 500,
            code: None,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = BackendError::ApiError {
            status: 409,
            code: Some("23505".into()),
            message: "duplicate key value".into(),
        };
        assert_eq!(err.to_string(), "API error 409 (23505): duplicate key value");
        assert!(err.is_unique_violation());
        assert!(!BackendError::AlreadyReviewed.is_unique_violation());

        let err = BackendError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected string"));

        let err = BackendError::from(DomainError::MissingField("slug"));
        assert_eq!(
            err.to_string(),
            "invalid record: missing required field: slug"
        );
    }
}
