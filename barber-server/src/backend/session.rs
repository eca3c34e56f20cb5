//! User sessions derived from backend access tokens.
//!
//! The access token is a JWT issued by the backend's auth service. The
//! server only reads the user id (`sub`) and expiry (`exp`) from the
//! payload; the signature is checked by the backend on every call the
//! token is forwarded with.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::BackendError;

#[derive(Deserialize)]
struct Claims {
    sub: String,
    exp: Option<i64>,
}

/// An authenticated user.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    access_token: String,
}

impl Session {
    /// Build a session from an `Authorization` header value or a bare token.
    ///
    /// Fails with [`BackendError::Unauthorized`] when the token is not a JWT,
    /// has no subject, or expired before `now`.
    pub fn from_bearer(header: &str, now: DateTime<Utc>) -> Result<Self, BackendError> {
        let token = header
            .trim()
            .strip_prefix("Bearer ")
            .unwrap_or(header.trim())
            .trim();

        let mut parts = token.split('.');
        let (Some(_), Some(payload), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(BackendError::Unauthorized);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| BackendError::Unauthorized)?;
        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|_| BackendError::Unauthorized)?;

        if claims.sub.is_empty() {
            return Err(BackendError::Unauthorized);
        }
        if let Some(exp) = claims.exp
            && exp <= now.timestamp()
        {
            return Err(BackendError::Unauthorized);
        }

        Ok(Self {
            user_id: claims.sub,
            access_token: token.to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the token.
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_token(sub: &str, exp: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = match exp {
        Some(exp) => format!(r#"{{"sub":"{sub}","exp":{exp}}}"#),
        None => format!(r#"{{"sub":"{sub}"}}"#),
    };
    let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
    format!("{header}.{payload}.sig")
}
