//! In-memory backend for development and testing without a Supabase project.
//!
//! Shops are loaded from `shops.json` in a fixture directory (the same row
//! format the REST API returns). Favorites, reviews and bookings live in
//! memory and are lost on restart.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Booking, BookingRequest, BookingStatus, Rating, RatingSummary, Shop, ShopId, Slug};

use super::convert::convert_shops;
use super::error::BackendError;
use super::session::Session;
use super::types::ShopRow;

/// File name of the shop fixture inside the mock data directory.
pub const SHOPS_FILE: &str = "shops.json";

#[derive(Default)]
struct MockState {
    shops: Vec<Shop>,
    /// (user id, shop id)
    favorites: HashSet<(String, ShopId)>,
    reviews: HashMap<(String, ShopId), Rating>,
    /// Bookings with the id of the user who made them.
    bookings: Vec<(String, Booking)>,
    next_booking: u64,
}

impl MockState {
    fn shop(&self, id: &ShopId) -> Result<&Shop, BackendError> {
        self.shops
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| BackendError::ShopNotFound(id.to_string()))
    }
}

/// Mock backend that serves shops from a JSON fixture.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<RwLock<MockState>>,
}

impl MockBackend {
    /// Load `shops.json` from `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = data_dir.as_ref().join(SHOPS_FILE);

        let json = std::fs::read_to_string(&path).map_err(|e| BackendError::ApiError {
            status: 0,
            code: None,
            message: format!("Failed to read {:?}: {}", path, e),
        })?;

        let rows: Vec<ShopRow> = serde_json::from_str(&json).map_err(|e| BackendError::Json {
            message: format!("Failed to parse {:?}: {}", path, e),
            body: None,
        })?;

        let backend = Self::from_rows(&rows);
        info!(path = %path.display(), "loaded mock shop data");
        Ok(backend)
    }

    /// Build a mock backend from rows already in memory.
    pub fn from_rows(rows: &[ShopRow]) -> Self {
        Self::from_shops(convert_shops(rows))
    }

    pub fn from_shops(shops: Vec<Shop>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                shops,
                ..Default::default()
            })),
        }
    }

    pub async fn shop_by_slug(&self, slug: &Slug) -> Result<Shop, BackendError> {
        let state = self.state.read().await;
        state
            .shops
            .iter()
            .find(|s| &s.slug == slug)
            .cloned()
            .ok_or_else(|| BackendError::ShopNotFound(slug.to_string()))
    }

    pub async fn shops_by_ids(&self, ids: &[ShopId]) -> Result<Vec<Shop>, BackendError> {
        let state = self.state.read().await;
        Ok(state
            .shops
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    pub async fn list_shops(&self) -> Result<Vec<Shop>, BackendError> {
        let state = self.state.read().await;
        let mut shops = state.shops.clone();
        shops.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shops)
    }

    pub async fn favorite_ids(&self, session: &Session) -> Result<Vec<ShopId>, BackendError> {
        let state = self.state.read().await;
        Ok(state
            .shops
            .iter()
            .filter(|s| {
                state
                    .favorites
                    .contains(&(session.user_id().to_string(), s.id.clone()))
            })
            .map(|s| s.id.clone())
            .collect())
    }

    pub async fn is_favorite(&self, session: &Session, shop: &ShopId) -> Result<bool, BackendError> {
        let state = self.state.read().await;
        Ok(state
            .favorites
            .contains(&(session.user_id().to_string(), shop.clone())))
    }

    pub async fn add_favorite(&self, session: &Session, shop: &ShopId) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        state.shop(shop)?;
        state
            .favorites
            .insert((session.user_id().to_string(), shop.clone()));
        Ok(())
    }

    pub async fn remove_favorite(
        &self,
        session: &Session,
        shop: &ShopId,
    ) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        state
            .favorites
            .remove(&(session.user_id().to_string(), shop.clone()));
        Ok(())
    }

    /// Record a rating and fold it into the shop's summary.
    pub async fn submit_review(
        &self,
        session: &Session,
        shop: &ShopId,
        rating: Rating,
    ) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        state.shop(shop)?;

        let key = (session.user_id().to_string(), shop.clone());
        if state.reviews.contains_key(&key) {
            return Err(BackendError::AlreadyReviewed);
        }
        state.reviews.insert(key, rating);

        if let Some(s) = state.shops.iter_mut().find(|s| &s.id == shop) {
            let count = s.rating.count + 1;
            let total = s.rating.average * f64::from(s.rating.count) + f64::from(rating.stars());
            s.rating = RatingSummary::new(total / f64::from(count), count);
        }
        Ok(())
    }

    pub async fn create_booking(
        &self,
        session: &Session,
        booking: &BookingRequest,
    ) -> Result<Booking, BackendError> {
        let mut state = self.state.write().await;
        state.shop(&booking.shop_id)?;

        state.next_booking += 1;
        let stored = Booking {
            id: format!("mock-{}", state.next_booking),
            shop_id: booking.shop_id.clone(),
            service_name: booking.service_name.clone(),
            date: booking.date,
            time: booking.time,
            status: BookingStatus::Pending,
        };
        state
            .bookings
            .push((session.user_id().to_string(), stored.clone()));
        Ok(stored)
    }

    /// The user's bookings, most recent first.
    pub async fn bookings_for(&self, session: &Session) -> Result<Vec<Booking>, BackendError> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|(user, _)| user == session.user_id())
            .map(|(_, b)| b.clone())
            .collect();
        bookings.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(bookings)
    }
}
