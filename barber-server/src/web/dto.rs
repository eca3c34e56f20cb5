//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Booking, Direction, MAX_STARS, RatingSummary, Shop, StarFill, star_fills};
use crate::listing::{DistanceSource, ShopCard};

/// Optional user position attached to a page request.
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Request for the next or previous gallery image.
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    /// Image currently shown
    pub current: String,
    pub direction: Direction,
}

/// Body of a review submission.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// 1 to 5 stars
    pub rating: u8,
}

/// Body of a booking request.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub shop_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    /// "HH:MM"
    pub time: String,
}

/// Rating block of a shop.
#[derive(Debug, Serialize)]
pub struct RatingResult {
    pub average: f64,
    pub count: u32,
    /// Whether enough ratings exist to show stars
    pub shows_stars: bool,
    pub count_label: String,
    pub stars: Vec<StarFill>,
}

impl RatingResult {
    pub fn from_summary(summary: &RatingSummary) -> Self {
        Self {
            average: summary.average,
            count: summary.count,
            shows_stars: summary.shows_stars(),
            count_label: summary.count_label(),
            stars: star_fills(summary.average, MAX_STARS),
        }
    }
}

/// A shop in listing results.
#[derive(Debug, Serialize)]
pub struct ShopCardResult {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub neighborhood: Option<String>,
    pub image_url: Option<String>,
    pub is_open: bool,
    pub distance_km: f64,
    /// Whether the distance was measured from the user's position
    pub distance_measured: bool,
    pub distance_label: String,
    pub rating: RatingResult,
}

impl ShopCardResult {
    pub fn from_card(card: &ShopCard<'_>) -> Self {
        let shop = card.shop;
        Self {
            id: shop.id.to_string(),
            slug: shop.slug.to_string(),
            name: shop.name.clone(),
            neighborhood: shop.neighborhood.clone(),
            image_url: shop.image_url.clone(),
            is_open: card.is_open,
            distance_km: card.distance_km,
            distance_measured: card.distance_source == DistanceSource::Measured,
            distance_label: card.distance_label.clone(),
            rating: RatingResult::from_summary(&shop.rating),
        }
    }
}

/// Response listing shops.
#[derive(Debug, Serialize)]
pub struct ShopListResponse {
    pub shops: Vec<ShopCardResult>,
}

/// A service offered by a shop.
#[derive(Debug, Serialize)]
pub struct ServiceResult {
    pub name: String,
    pub price: Option<f64>,
    pub duration_mins: Option<u32>,
}

/// Full shop detail.
#[derive(Debug, Serialize)]
pub struct ShopDetailResponse {
    #[serde(flatten)]
    pub card: ShopCardResult,
    pub address: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    /// Weekday indices, 0 = Sunday; `None` means every day
    pub opening_days: Option<Vec<u8>>,
    pub gallery: Vec<String>,
    pub services: Vec<ServiceResult>,
    /// Present only for signed-in users
    pub is_favorite: Option<bool>,
    pub directions_url: String,
}

impl ShopDetailResponse {
    pub fn new(card: &ShopCard<'_>, is_favorite: Option<bool>, directions_url: String) -> Self {
        let shop: &Shop = card.shop;
        Self {
            card: ShopCardResult::from_card(card),
            address: shop.address.clone(),
            opening_time: shop.opening_time.clone(),
            closing_time: shop.closing_time.clone(),
            opening_days: (!shop.opening_days.is_unrestricted())
                .then(|| shop.opening_days.indices()),
            gallery: shop.gallery.images().to_vec(),
            services: shop
                .services
                .iter()
                .map(|s| ServiceResult {
                    name: s.name.clone(),
                    price: s.price,
                    duration_mins: s.duration_mins,
                })
                .collect(),
            is_favorite,
            directions_url,
        }
    }
}

/// Favorite state after a change.
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub shop_id: String,
    pub is_favorite: bool,
}

/// Gallery navigation result.
#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    /// `None` when there is nowhere to move to
    pub image: Option<String>,
}

/// A booking.
#[derive(Debug, Serialize)]
pub struct BookingResult {
    pub id: String,
    pub shop_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: &'static str,
}

impl BookingResult {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id.clone(),
            shop_id: booking.shop_id.to_string(),
            service_name: booking.service_name.clone(),
            date: booking.date,
            time: booking.time.to_string(),
            status: booking.status.as_str(),
        }
    }
}

/// Response listing bookings.
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, Coordinate, fixtures};
    use crate::listing::ListingConfig;

    #[test]
    fn detail_flattens_card() {
        let shop = fixtures::shop("central");
        let card = ShopCard::build(
            &shop,
            Coordinate::new(-25.9692, 32.5732).ok(),
            &Availability::default(),
            &ListingConfig::default(),
        );
        let detail = ShopDetailResponse::new(&card, Some(true), "https://maps".to_string());
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["slug"], "central");
        assert_eq!(json["distance_label"], "1.7 km");
        assert_eq!(json["distance_measured"], true);
        assert_eq!(json["opening_days"], serde_json::json!([1, 2, 3, 4, 5]));
        assert_eq!(json["is_favorite"], true);
        assert_eq!(json["rating"]["count_label"], "12 avaliações");
        assert_eq!(json["rating"]["stars"][4], "half");
    }

    #[test]
    fn gallery_query_parses_direction() {
        let q: GalleryQuery =
            serde_json::from_str(r#"{"current":"a.jpg","direction":"prev"}"#).unwrap();
        assert_eq!(q.direction, Direction::Prev);
    }

    #[test]
    fn booking_request_parses_date() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"shop_id":"s1","service_name":"Corte","date":"2024-03-15","time":"10:30"}"#,
        )
        .unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }
}
