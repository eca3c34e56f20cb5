//! Supabase REST client.
//!
//! Talks to the PostgREST endpoints under `/rest/v1`. Every request carries
//! the project's anon key in the `apikey` header; user-scoped calls forward
//! the user's access token as the bearer so row-level security applies.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Booking, BookingRequest, Rating, Shop, ShopId, Slug};

use super::convert::{convert_booking, convert_shop, convert_shops};
use super::error::BackendError;
use super::session::Session;
use super::types::{
    ApiErrorBody, BookingInsert, BookingRow, FavoriteInsert, FavoriteRow, ReviewInsert, ShopRow,
};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Maximum ids per `in.(...)` filter.
const ID_BATCH_SIZE: usize = 50;

const SHOPS_TABLE: &str = "barbershops";
const FAVORITES_TABLE: &str = "user_favorites";
const REVIEWS_TABLE: &str = "reviews";
const BOOKINGS_TABLE: &str = "bookings";

/// Configuration for the Supabase client.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key
    pub anon_key: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("max_concurrent", &self.max_concurrent)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Supabase API client.
///
/// Uses a semaphore to limit concurrent requests.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    semaphore: Arc<Semaphore>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, BackendError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::NotConfigured("SUPABASE_URL is empty".into()));
        }
        if config.anon_key.is_empty() {
            return Err(BackendError::NotConfigured(
                "SUPABASE_ANON_KEY is empty".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.anon_key)
            .map_err(|_| BackendError::NotConfigured("invalid anon key format".into()))?;
        headers.insert("apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Send a request and return the response body of a successful call.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BackendError::ApiError {
                status: 0,
                code: None,
                message: "Semaphore closed".to_string(),
            })?;

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(api) => BackendError::ApiError {
                    status: status.as_u16(),
                    code: api.code,
                    message: api.message.or(api.details).unwrap_or(body),
                },
                Err(_) => BackendError::ApiError {
                    status: status.as_u16(),
                    code: None,
                    message: body,
                },
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }

    /// Fetch a single shop by its slug.
    pub async fn shop_by_slug(&self, slug: &Slug) -> Result<Shop, BackendError> {
        let request = self
            .http
            .get(self.table_url(SHOPS_TABLE))
            .bearer_auth(&self.anon_key)
            .query(&[
                ("select", "*".to_string()),
                ("slug", format!("eq.{slug}")),
                ("limit", "1".to_string()),
            ]);

        let rows: Vec<ShopRow> = self.fetch(request).await?;
        let row = rows
            .first()
            .ok_or_else(|| BackendError::ShopNotFound(slug.to_string()))?;
        Ok(convert_shop(row)?)
    }

    /// Fetch the shops with the given ids. Invalid rows are skipped.
    ///
    /// Ids are sent in batches to keep request URLs short; batches run
    /// concurrently within the client's request limit.
    pub async fn shops_by_ids(&self, ids: &[ShopId]) -> Result<Vec<Shop>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<_> = ids
            .chunks(ID_BATCH_SIZE)
            .map(|batch| {
                let request = self
                    .http
                    .get(self.table_url(SHOPS_TABLE))
                    .bearer_auth(&self.anon_key)
                    .query(&[("select", "*".to_string()), ("id", in_filter(batch))]);
                self.fetch::<Vec<ShopRow>>(request)
            })
            .collect();

        let mut shops = Vec::with_capacity(ids.len());
        for rows in join_all(requests).await {
            shops.extend(convert_shops(&rows?));
        }
        Ok(shops)
    }

    /// Fetch every shop, ordered by name.
    pub async fn list_shops(&self) -> Result<Vec<Shop>, BackendError> {
        let request = self
            .http
            .get(self.table_url(SHOPS_TABLE))
            .bearer_auth(&self.anon_key)
            .query(&[("select", "*"), ("order", "name.asc")]);

        let rows: Vec<ShopRow> = self.fetch(request).await?;
        debug!(count = rows.len(), "fetched shop list");
        Ok(convert_shops(&rows))
    }

    /// Ids of the shops the user marked as favorite.
    pub async fn favorite_ids(&self, session: &Session) -> Result<Vec<ShopId>, BackendError> {
        let request = self
            .http
            .get(self.table_url(FAVORITES_TABLE))
            .bearer_auth(session.access_token())
            .query(&[
                ("select", "barbershop_id".to_string()),
                ("user_id", format!("eq.{}", session.user_id())),
            ]);

        let rows: Vec<FavoriteRow> = self.fetch(request).await?;
        Ok(rows
            .iter()
            .filter_map(|row| ShopId::parse(&row.barbershop_id).ok())
            .collect())
    }

    pub async fn is_favorite(&self, session: &Session, shop: &ShopId) -> Result<bool, BackendError> {
        let request = self
            .http
            .get(self.table_url(FAVORITES_TABLE))
            .bearer_auth(session.access_token())
            .query(&[
                ("select", "barbershop_id".to_string()),
                ("user_id", format!("eq.{}", session.user_id())),
                ("barbershop_id", format!("eq.{shop}")),
                ("limit", "1".to_string()),
            ]);

        let rows: Vec<FavoriteRow> = self.fetch(request).await?;
        Ok(!rows.is_empty())
    }

    /// Mark a shop as favorite. Adding an existing favorite succeeds.
    pub async fn add_favorite(&self, session: &Session, shop: &ShopId) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.table_url(FAVORITES_TABLE))
            .bearer_auth(session.access_token())
            .header("Prefer", "return=minimal")
            .json(&FavoriteInsert {
                user_id: session.user_id(),
                barbershop_id: shop.as_str(),
            });

        match self.execute(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_unique_violation() => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn remove_favorite(
        &self,
        session: &Session,
        shop: &ShopId,
    ) -> Result<(), BackendError> {
        let request = self
            .http
            .delete(self.table_url(FAVORITES_TABLE))
            .bearer_auth(session.access_token())
            .query(&[
                ("user_id", format!("eq.{}", session.user_id())),
                ("barbershop_id", format!("eq.{shop}")),
            ]);

        self.execute(request).await.map(|_| ())
    }

    /// Record the user's rating of a shop.
    ///
    /// Each user may rate a shop once; a second rating fails with
    /// [`BackendError::AlreadyReviewed`].
    pub async fn submit_review(
        &self,
        session: &Session,
        shop: &ShopId,
        rating: Rating,
    ) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.table_url(REVIEWS_TABLE))
            .bearer_auth(session.access_token())
            .header("Prefer", "return=minimal")
            .json(&ReviewInsert {
                user_id: session.user_id(),
                barbershop_id: shop.as_str(),
                rating: rating.stars(),
            });

        match self.execute(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_unique_violation() => Err(BackendError::AlreadyReviewed),
            Err(e) => Err(e),
        }
    }

    /// Insert a pending booking and return the stored record.
    pub async fn create_booking(
        &self,
        session: &Session,
        booking: &BookingRequest,
    ) -> Result<Booking, BackendError> {
        let request = self
            .http
            .post(self.table_url(BOOKINGS_TABLE))
            .bearer_auth(session.access_token())
            .header("Prefer", "return=representation")
            .json(&BookingInsert {
                user_id: session.user_id(),
                barbershop_id: booking.shop_id.as_str(),
                service_name: &booking.service_name,
                booking_date: booking.date,
                booking_time: booking.time.to_string(),
                status: "pending",
            });

        let rows: Vec<BookingRow> = self.fetch(request).await?;
        let row = rows.first().ok_or_else(|| BackendError::Json {
            message: "insert returned no rows".to_string(),
            body: None,
        })?;
        Ok(convert_booking(row)?)
    }

    /// The user's bookings, most recent first.
    pub async fn bookings_for(&self, session: &Session) -> Result<Vec<Booking>, BackendError> {
        let request = self
            .http
            .get(self.table_url(BOOKINGS_TABLE))
            .bearer_auth(session.access_token())
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id())),
                ("order", "booking_date.desc,booking_time.desc".to_string()),
            ]);

        let rows: Vec<BookingRow> = self.fetch(request).await?;
        Ok(rows.iter().filter_map(|row| convert_booking(row).ok()).collect())
    }
}

/// PostgREST `in.(...)` filter for a set of ids.
fn in_filter(ids: &[ShopId]) -> String {
    let joined: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    format!("in.({})", joined.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SupabaseConfig::new("https://xyz.supabase.co", "anon")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.url, "https://xyz.supabase.co");
        assert_eq!(config.anon_key, "anon");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = SupabaseConfig::new("https://xyz.supabase.co", "anon");
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_debug_hides_key() {
        let config = SupabaseConfig::new("https://xyz.supabase.co", "secret-anon-key");
        assert!(!format!("{config:?}").contains("secret-anon-key"));
    }

    #[test]
    fn client_creation() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://xyz.supabase.co/", "anon"))
            .unwrap();
        assert_eq!(
            client.table_url(SHOPS_TABLE),
            "https://xyz.supabase.co/rest/v1/barbershops"
        );
    }

    #[test]
    fn client_requires_configuration() {
        assert!(matches!(
            SupabaseClient::new(SupabaseConfig::new("", "anon")),
            Err(BackendError::NotConfigured(_))
        ));
        assert!(matches!(
            SupabaseClient::new(SupabaseConfig::new("https://xyz.supabase.co", "")),
            Err(BackendError::NotConfigured(_))
        ));
        assert!(matches!(
            SupabaseClient::new(SupabaseConfig::new("https://xyz.supabase.co", "bad\nkey")),
            Err(BackendError::NotConfigured(_))
        ));
    }

    #[test]
    fn in_filter_joins_ids() {
        let ids = vec![ShopId::parse("a").unwrap(), ShopId::parse("b-2").unwrap()];
        assert_eq!(in_filter(&ids), "in.(a,b-2)");
    }

    #[tokio::test]
    async fn shops_by_ids_empty_makes_no_request() {
        // Unroutable URL: a request would fail.
        let client =
            SupabaseClient::new(SupabaseConfig::new("http://127.0.0.1:9", "anon")).unwrap();
        assert!(client.shops_by_ids(&[]).await.unwrap().is_empty());
    }
}
