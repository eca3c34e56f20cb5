//! Caching layer for shop lookups.
//!
//! Shop pages are read far more often than shops change, so shop records are
//! cached by slug and the full listing under a single key. A successful
//! review changes the shop's rating summary and evicts its entries.
//! Favorites and bookings are per-user and always go to the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::backend::{Backend, BackendError, Session};
use crate::domain::{Rating, Shop, ShopId, Slug};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached shops.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Backend with cached shop reads.
pub struct CachedBackend {
    backend: Backend,
    shops: MokaCache<Slug, Arc<Shop>>,
    listing: MokaCache<(), Arc<Vec<Shop>>>,
}

impl CachedBackend {
    pub fn new(backend: Backend, config: &CacheConfig) -> Self {
        let shops = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let listing = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self {
            backend,
            shops,
            listing,
        }
    }

    /// Get a shop by slug, using the cache if available.
    pub async fn shop_by_slug(&self, slug: &Slug) -> Result<Arc<Shop>, BackendError> {
        if let Some(cached) = self.shops.get(slug).await {
            return Ok(cached);
        }

        let shop = Arc::new(self.backend.shop_by_slug(slug).await?);
        self.shops.insert(slug.clone(), shop.clone()).await;
        Ok(shop)
    }

    /// All shops, using the cache if available.
    pub async fn list_shops(&self) -> Result<Arc<Vec<Shop>>, BackendError> {
        if let Some(cached) = self.listing.get(&()).await {
            return Ok(cached);
        }

        let shops = Arc::new(self.backend.list_shops().await?);
        self.listing.insert((), shops.clone()).await;
        Ok(shops)
    }

    /// Submit a review and evict the reviewed shop so its rating refreshes.
    pub async fn submit_review(
        &self,
        session: &Session,
        shop: &ShopId,
        rating: Rating,
    ) -> Result<(), BackendError> {
        self.backend.submit_review(session, shop, rating).await?;
        self.invalidate_shop(shop).await;
        Ok(())
    }

    /// Evict every cached entry for the shop with this id.
    pub async fn invalidate_shop(&self, id: &ShopId) {
        let stale: Vec<Slug> = self
            .shops
            .iter()
            .filter(|(_, shop)| &shop.id == id)
            .map(|(slug, _)| (*slug).clone())
            .collect();

        for slug in stale {
            debug!(shop = %slug, "evicting cached shop");
            self.shops.invalidate(&slug).await;
        }
        self.listing.invalidate(&()).await;
    }

    /// Access the underlying backend for uncached operations.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }
}
