//! Shop cards: a shop enriched with its open state and distance for display.
//!
//! This is where the display policy lives. Shops that never published their
//! hours are shown with default trading hours, and the distance falls back
//! from the measured great-circle distance to the backend's approximate
//! figure to a fixed placeholder.

use crate::domain::{Availability, Coordinate, Shop, format_distance};

/// Display policy for shop listings.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// Opening time assumed when a shop has none.
    pub default_opening: String,
    /// Closing time assumed when a shop has none.
    pub default_closing: String,
    /// Distance shown when neither the user nor the backend supplies one.
    pub fallback_distance_km: f64,
}

impl ListingConfig {
    pub fn with_default_hours(
        mut self,
        opening: impl Into<String>,
        closing: impl Into<String>,
    ) -> Self {
        self.default_opening = opening.into();
        self.default_closing = closing.into();
        self
    }

    pub fn with_fallback_distance(mut self, km: f64) -> Self {
        self.fallback_distance_km = km;
        self
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_opening: "08:00".to_string(),
            default_closing: "20:00".to_string(),
            fallback_distance_km: 1.0,
        }
    }
}

/// Where a card's distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSource {
    /// Great-circle distance from the user's coordinate.
    Measured,
    /// The backend's approximate distance.
    Approximate,
    /// Neither was available.
    Fallback,
}

/// A shop ready for display.
#[derive(Debug, Clone)]
pub struct ShopCard<'a> {
    pub shop: &'a Shop,
    pub is_open: bool,
    pub distance_km: f64,
    pub distance_source: DistanceSource,
    pub distance_label: String,
}

impl<'a> ShopCard<'a> {
    pub fn build(
        shop: &'a Shop,
        user: Option<Coordinate>,
        availability: &Availability,
        config: &ListingConfig,
    ) -> Self {
        let opening = present(shop.opening_time.as_deref()).unwrap_or(&config.default_opening);
        let closing = present(shop.closing_time.as_deref()).unwrap_or(&config.default_closing);
        let is_open =
            availability.is_open(Some(opening), Some(closing), Some(&shop.opening_days));

        let (distance_km, distance_source) = match (user, shop.coordinate) {
            (Some(user), Some(shop_at)) => (user.distance_to(&shop_at), DistanceSource::Measured),
            _ => match shop.approx_distance_km {
                Some(km) => (km, DistanceSource::Approximate),
                None => (config.fallback_distance_km, DistanceSource::Fallback),
            },
        };

        Self {
            shop,
            is_open,
            distance_km,
            distance_source,
            distance_label: format_distance(distance_km),
        }
    }

    /// Build cards for a list of shops.
    pub fn build_all(
        shops: &'a [Shop],
        user: Option<Coordinate>,
        availability: &Availability,
        config: &ListingConfig,
    ) -> Vec<Self> {
        shops
            .iter()
            .map(|shop| Self::build(shop, user, availability, config))
            .collect()
    }
}

fn present(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{DEFAULT_ZONE, OpeningDays, fixtures};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    /// Maputo is UTC+2, so 10:00 UTC is 12:00 local.
    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Availability {
        let instant: DateTime<Utc> = Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();
        Availability::with_clock(DEFAULT_ZONE, Arc::new(FixedClock(instant)))
    }

    fn friday_noon() -> Availability {
        at(2024, 3, 15, 10, 0)
    }

    #[test]
    fn measured_distance_with_user_coordinate() {
        let shop = fixtures::shop("central");
        let user = Coordinate::new(-25.9692, 32.5732).ok();
        let card = ShopCard::build(&shop, user, &friday_noon(), &ListingConfig::default());

        assert_eq!(card.distance_source, DistanceSource::Measured);
        assert!((card.distance_km - 1.65725).abs() < 1e-3);
        assert_eq!(card.distance_label, "1.7 km");
        assert!(card.is_open);
    }

    #[test]
    fn approximate_then_fallback_distance() {
        let mut shop = fixtures::shop("central");
        let card = ShopCard::build(&shop, None, &friday_noon(), &ListingConfig::default());
        assert_eq!(card.distance_source, DistanceSource::Approximate);
        assert_eq!(card.distance_label, "2.5 km");

        shop.approx_distance_km = None;
        let card = ShopCard::build(&shop, None, &friday_noon(), &ListingConfig::default());
        assert_eq!(card.distance_source, DistanceSource::Fallback);
        assert_eq!(card.distance_km, 1.0);
        assert_eq!(card.distance_label, "1.0 km");
    }

    #[test]
    fn user_without_shop_coordinate_uses_approximate() {
        let mut shop = fixtures::shop("central");
        shop.coordinate = None;
        let user = Coordinate::new(-25.9692, 32.5732).ok();
        let card = ShopCard::build(&shop, user, &friday_noon(), &ListingConfig::default());
        assert_eq!(card.distance_source, DistanceSource::Approximate);
    }

    #[test]
    fn missing_hours_use_defaults() {
        let mut shop = fixtures::shop("central");
        shop.opening_time = None;
        shop.closing_time = Some(String::new());
        shop.opening_days = OpeningDays::default();

        // 21:00 local: outside 08:00-20:00.
        let evening = at(2024, 3, 15, 19, 0);
        let config = ListingConfig::default();
        assert!(ShopCard::build(&shop, None, &friday_noon(), &config).is_open);
        assert!(!ShopCard::build(&shop, None, &evening, &config).is_open);

        let late = config.with_default_hours("08:00", "22:00");
        assert!(ShopCard::build(&shop, None, &evening, &late).is_open);
    }

    #[test]
    fn closed_on_unlisted_day() {
        // Fixture trades Monday to Friday; 2024-03-17 is a Sunday.
        let shop = fixtures::shop("central");
        let sunday_noon = at(2024, 3, 17, 10, 0);
        assert!(!ShopCard::build(&shop, None, &sunday_noon, &ListingConfig::default()).is_open);
    }

    #[test]
    fn build_all_keeps_order() {
        let shops = vec![fixtures::shop("b"), fixtures::shop("a")];
        let cards = ShopCard::build_all(&shops, None, &friday_noon(), &ListingConfig::default());
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].shop.slug.as_str(), "b");
    }

    #[test]
    fn fallback_distance_is_configurable() {
        let mut shop = fixtures::shop("central");
        shop.approx_distance_km = None;
        let config = ListingConfig::default().with_fallback_distance(0.02);
        let card = ShopCard::build(&shop, None, &friday_noon(), &config);
        assert_eq!(card.distance_label, "Muito perto");
    }
}
