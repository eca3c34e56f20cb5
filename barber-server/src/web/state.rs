//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedBackend;
use crate::clock::{Clock, SystemClock};
use crate::domain::Availability;
use crate::listing::ListingConfig;
use crate::location::LastKnownLocation;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Backend with cached shop reads
    pub backend: Arc<CachedBackend>,

    /// Opening-hours evaluation in the configured zone
    pub availability: Arc<Availability>,

    /// Display defaults for shop cards
    pub listing: Arc<ListingConfig>,

    /// Last position each signed-in user shared
    pub location: Arc<LastKnownLocation>,

    /// Used to check session expiry
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        backend: CachedBackend,
        availability: Availability,
        listing: ListingConfig,
        location: LastKnownLocation,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            availability: Arc::new(availability),
            listing: Arc::new(listing),
            location: Arc::new(location),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
