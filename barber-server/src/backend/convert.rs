//! Conversion from backend rows to domain types.

use tracing::warn;

use crate::domain::{
    Booking, BookingStatus, Coordinate, DomainError, Gallery, OpeningDays, RatingSummary, Shop,
    ShopId, ShopService, ShopTime, Slug,
};

use super::types::{BookingRow, ShopRow};

/// Convert a `barbershops` row into a [`Shop`].
///
/// Id, slug and name are required. A coordinate is kept only when both
/// components are present and in range; otherwise it is dropped and callers
/// fall back to the approximate distance.
pub fn convert_shop(row: &ShopRow) -> Result<Shop, DomainError> {
    let id = ShopId::parse(&row.id)?;
    let slug = Slug::parse(row.slug.as_deref().ok_or(DomainError::MissingField("slug"))?)?;
    let name = row
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or(DomainError::MissingField("name"))?;

    let coordinate = match (row.latitude, row.longitude) {
        (Some(lat), Some(lon)) => match Coordinate::new(lat, lon) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(shop = %slug, error = %e, "dropping invalid shop coordinate");
                None
            }
        },
        _ => None,
    };

    let opening_days = row
        .opening_days
        .as_ref()
        .map(|days| OpeningDays::from_indices(days.iter().copied()))
        .unwrap_or_default();

    let services = row
        .services
        .iter()
        .flatten()
        .map(|s| ShopService {
            name: s.name.clone(),
            price: s.price,
            duration_mins: s.duration,
        })
        .collect();

    Ok(Shop {
        id,
        slug,
        name,
        neighborhood: row.neighborhood.clone(),
        address: row.address.clone(),
        image_url: row.image_url.clone(),
        coordinate,
        opening_time: row.opening_time.clone(),
        closing_time: row.closing_time.clone(),
        opening_days,
        rating: RatingSummary::new(row.rating.unwrap_or(0.0), row.ratings_count.unwrap_or(0)),
        approx_distance_km: row.distance.filter(|d| d.is_finite() && *d >= 0.0),
        gallery: Gallery::new(row.gallery.clone().unwrap_or_default()),
        services,
    })
}

/// Convert many rows, skipping (and logging) the ones that fail validation.
pub fn convert_shops(rows: &[ShopRow]) -> Vec<Shop> {
    rows.iter()
        .filter_map(|row| match convert_shop(row) {
            Ok(shop) => Some(shop),
            Err(e) => {
                warn!(id = %row.id, error = %e, "skipping invalid shop row");
                None
            }
        })
        .collect()
}

/// Convert a `bookings` row into a [`Booking`].
pub fn convert_booking(row: &BookingRow) -> Result<Booking, DomainError> {
    Ok(Booking {
        id: row.id.clone(),
        shop_id: ShopId::parse(&row.barbershop_id)?,
        service_name: row.service_name.clone().unwrap_or_default(),
        date: row.booking_date,
        time: ShopTime::parse(&row.booking_time)?,
        status: BookingStatus::parse(row.status.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::ServiceRow;
    use chrono::{NaiveDate, Weekday};

    fn row() -> ShopRow {
        ShopRow {
            id: "s1".to_string(),
            slug: Some("central".to_string()),
            name: Some("Barbearia Central".to_string()),
            latitude: Some(-25.9653),
            longitude: Some(32.5892),
            opening_time: Some("08:00".to_string()),
            closing_time: Some("20:00".to_string()),
            opening_days: Some(vec![1, 2, 3]),
            rating: Some(4.5),
            ratings_count: Some(4),
            distance: Some(1.5),
            gallery: Some(vec!["a.jpg".to_string()]),
            services: Some(vec![ServiceRow {
                name: "Corte".to_string(),
                price: Some(300.0),
                duration: Some(30),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn converts_complete_row() {
        let shop = convert_shop(&row()).unwrap();
        assert_eq!(shop.id.as_str(), "s1");
        assert_eq!(shop.slug.as_str(), "central");
        assert!(shop.coordinate.is_some());
        assert!(shop.opening_days.contains(Weekday::Mon));
        assert!(!shop.opening_days.contains(Weekday::Sun));
        assert_eq!(shop.rating.count, 4);
        assert_eq!(shop.approx_distance_km, Some(1.5));
        assert_eq!(shop.gallery.len(), 1);
        assert_eq!(shop.services[0].duration_mins, Some(30));
    }

    #[test]
    fn hours_are_kept_raw() {
        let mut r = row();
        r.opening_time = None;
        r.closing_time = Some("garbage".to_string());
        let shop = convert_shop(&r).unwrap();
        assert_eq!(shop.opening_time, None);
        assert_eq!(shop.closing_time.as_deref(), Some("garbage"));
    }

    #[test]
    fn missing_required_fields() {
        let mut r = row();
        r.slug = None;
        assert!(matches!(convert_shop(&r), Err(DomainError::MissingField("slug"))));

        let mut r = row();
        r.name = Some("  ".to_string());
        assert!(matches!(convert_shop(&r), Err(DomainError::MissingField("name"))));

        let mut r = row();
        r.id = String::new();
        assert!(matches!(convert_shop(&r), Err(DomainError::InvalidIdentifier(_))));
    }

    #[test]
    fn partial_or_invalid_coordinate_is_dropped() {
        let mut r = row();
        r.longitude = None;
        assert!(convert_shop(&r).unwrap().coordinate.is_none());

        let mut r = row();
        r.latitude = Some(123.0);
        assert!(convert_shop(&r).unwrap().coordinate.is_none());
    }

    #[test]
    fn defaults_for_missing_aggregates() {
        let r = ShopRow {
            id: "s2".to_string(),
            slug: Some("s2".to_string()),
            name: Some("Two".to_string()),
            ..Default::default()
        };
        let shop = convert_shop(&r).unwrap();
        assert_eq!(shop.rating, RatingSummary::default());
        assert!(shop.opening_days.is_unrestricted());
        assert!(shop.gallery.is_empty());
        assert!(shop.services.is_empty());
        assert!(shop.approx_distance_km.is_none());
    }

    #[test]
    fn invalid_day_list_still_restricts() {
        let mut r = row();
        r.opening_days = Some(vec![7]);
        let shop = convert_shop(&r).unwrap();
        assert!(!shop.opening_days.is_unrestricted());
        assert!(shop.opening_days.indices().is_empty());
    }

    #[test]
    fn negative_approx_distance_dropped() {
        let mut r = row();
        r.distance = Some(-1.0);
        assert!(convert_shop(&r).unwrap().approx_distance_km.is_none());
    }

    #[test]
    fn convert_shops_skips_invalid() {
        let mut bad = row();
        bad.slug = Some("Not A Slug".to_string());
        let shops = convert_shops(&[row(), bad]);
        assert_eq!(shops.len(), 1);
    }

    #[test]
    fn converts_booking() {
        let r = BookingRow {
            id: "b1".to_string(),
            user_id: "u1".to_string(),
            barbershop_id: "s1".to_string(),
            service_name: Some("Corte".to_string()),
            booking_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            booking_time: "10:30:00".to_string(),
            status: Some("confirmed".to_string()),
        };
        let booking = convert_booking(&r).unwrap();
        assert_eq!(booking.time.to_string(), "10:30");
        assert_eq!(booking.status, BookingStatus::Confirmed);

        let bad = BookingRow {
            booking_time: "late".to_string(),
            ..r
        };
        assert!(matches!(convert_booking(&bad), Err(DomainError::InvalidTime(_))));
    }
}
