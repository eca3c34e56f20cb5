//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::warn;

use crate::domain::DEFAULT_ZONE;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_LOCATION_CACHE: &str = "last_location.json";
const DEFAULT_STATIC_DIR: &str = "static";

/// Errors in environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BARBER_TIMEZONE: unknown time zone {0:?}")]
    InvalidTimezone(String),

    #[error("BARBER_BIND: invalid socket address {value:?}: {reason}")]
    InvalidBind { value: String, reason: String },
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Zone opening hours are evaluated in.
    pub timezone: Tz,
    pub bind: SocketAddr,
    /// Serve shops from this fixture directory instead of Supabase.
    pub mock_data: Option<PathBuf>,
    pub location_cache: PathBuf,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a lookup function.
    ///
    /// Missing backend credentials are not a configuration error; building
    /// the client reports them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mock_data = var("BARBER_MOCK_DATA").map(PathBuf::from);

        let supabase_url = var("SUPABASE_URL").unwrap_or_default();
        let supabase_anon_key = var("SUPABASE_ANON_KEY").unwrap_or_default();
        if mock_data.is_none() && (supabase_url.is_empty() || supabase_anon_key.is_empty()) {
            warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set and no mock data configured");
        }

        let timezone = match var("BARBER_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => DEFAULT_ZONE,
        };

        let bind_value = var("BARBER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBind {
                reason: e.to_string(),
                value: bind_value.clone(),
            })?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            timezone,
            bind,
            mock_data,
            location_cache: var("BARBER_LOCATION_CACHE")
                .unwrap_or_else(|| DEFAULT_LOCATION_CACHE.to_string())
                .into(),
            static_dir: var("BARBER_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }
}
