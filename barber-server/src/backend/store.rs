//! Dispatch between the live and mock backends.

use crate::domain::{Booking, BookingRequest, Rating, Shop, ShopId, Slug};

use super::client::SupabaseClient;
use super::error::BackendError;
use super::mock::MockBackend;
use super::session::Session;

/// Either the live Supabase client or the in-memory mock.
#[derive(Clone)]
pub enum Backend {
    Supabase(SupabaseClient),
    Mock(MockBackend),
}

impl Backend {
    pub fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock(_))
    }

    pub async fn shop_by_slug(&self, slug: &Slug) -> Result<Shop, BackendError> {
        match self {
            Backend::Supabase(c) => c.shop_by_slug(slug).await,
            Backend::Mock(m) => m.shop_by_slug(slug).await,
        }
    }

    pub async fn shops_by_ids(&self, ids: &[ShopId]) -> Result<Vec<Shop>, BackendError> {
        match self {
            Backend::Supabase(c) => c.shops_by_ids(ids).await,
            Backend::Mock(m) => m.shops_by_ids(ids).await,
        }
    }

    pub async fn list_shops(&self) -> Result<Vec<Shop>, BackendError> {
        match self {
            Backend::Supabase(c) => c.list_shops().await,
            Backend::Mock(m) => m.list_shops().await,
        }
    }

    pub async fn favorite_ids(&self, session: &Session) -> Result<Vec<ShopId>, BackendError> {
        match self {
            Backend::Supabase(c) => c.favorite_ids(session).await,
            Backend::Mock(m) => m.favorite_ids(session).await,
        }
    }

    pub async fn is_favorite(&self, session: &Session, shop: &ShopId) -> Result<bool, BackendError> {
        match self {
            Backend::Supabase(c) => c.is_favorite(session, shop).await,
            Backend::Mock(m) => m.is_favorite(session, shop).await,
        }
    }

    pub async fn add_favorite(&self, session: &Session, shop: &ShopId) -> Result<(), BackendError> {
        match self {
            Backend::Supabase(c) => c.add_favorite(session, shop).await,
            Backend::Mock(m) => m.add_favorite(session, shop).await,
        }
    }

    pub async fn remove_favorite(
        &self,
        session: &Session,
        shop: &ShopId,
    ) -> Result<(), BackendError> {
        match self {
            Backend::Supabase(c) => c.remove_favorite(session, shop).await,
            Backend::Mock(m) => m.remove_favorite(session, shop).await,
        }
    }

    pub async fn submit_review(
        &self,
        session: &Session,
        shop: &ShopId,
        rating: Rating,
    ) -> Result<(), BackendError> {
        match self {
            Backend::Supabase(c) => c.submit_review(session, shop, rating).await,
            Backend::Mock(m) => m.submit_review(session, shop, rating).await,
        }
    }

    pub async fn create_booking(
        &self,
        session: &Session,
        booking: &BookingRequest,
    ) -> Result<Booking, BackendError> {
        match self {
            Backend::Supabase(c) => c.create_booking(session, booking).await,
            Backend::Mock(m) => m.create_booking(session, booking).await,
        }
    }

    pub async fn bookings_for(&self, session: &Session) -> Result<Vec<Booking>, BackendError> {
        match self {
            Backend::Supabase(c) => c.bookings_for(session).await,
            Backend::Mock(m) => m.bookings_for(session).await,
        }
    }
}

impl From<SupabaseClient> for Backend {
    fn from(client: SupabaseClient) -> Self {
        Backend::Supabase(client)
    }
}

impl From<MockBackend> for Backend {
    fn from(mock: MockBackend) -> Self {
        Backend::Mock(mock)
    }
}
