//! Barbershop identity and listing data.

use std::fmt;

use serde::Serialize;

use super::gallery::Gallery;
use super::geo::Coordinate;
use super::hours::OpeningDays;
use super::rating::RatingSummary;

/// Error returned when parsing an invalid shop identifier or slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct InvalidIdentifier {
    kind: &'static str,
    reason: &'static str,
}

/// Opaque backend identifier of a shop (a UUID in practice).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ShopId(String);

impl ShopId {
    /// Parse a shop id. Surrounding whitespace is trimmed; empty ids and
    /// ids containing whitespace or commas are rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidIdentifier {
                kind: "shop id",
                reason: "must not be empty",
            });
        }
        // Ids are interpolated into `in.(...)` filters.
        if s.chars().any(|c| c.is_whitespace() || c == ',' || c == '(' || c == ')') {
            return Err(InvalidIdentifier {
                kind: "shop id",
                reason: "must not contain whitespace, commas or parentheses",
            });
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShopId({})", self.0)
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL slug of a shop, e.g. `"barbearia-central"`.
///
/// Slugs are lowercase ASCII letters, digits and hyphens.
///
/// # Examples
///
/// ```
/// use barber_server::domain::Slug;
///
/// assert!(Slug::parse("barbearia-central").is_ok());
/// assert!(Slug::parse("Barbearia Central").is_err());
/// assert!(Slug::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifier> {
        if s.is_empty() {
            return Err(InvalidIdentifier {
                kind: "slug",
                reason: "must not be empty",
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(InvalidIdentifier {
                kind: "slug",
                reason: "must be lowercase letters, digits or hyphens",
            });
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slug({})", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A service offered by a shop (haircut, beard trim, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopService {
    pub name: String,
    pub price: Option<f64>,
    pub duration_mins: Option<u32>,
}

/// A barbershop as shown to customers.
///
/// Opening and closing times are kept as the raw strings from the backend:
/// substituting defaults for missing hours is a display policy, see
/// [`crate::listing::ListingConfig`].
#[derive(Debug, Clone)]
pub struct Shop {
    pub id: ShopId,
    pub slug: Slug,
    pub name: String,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub opening_days: OpeningDays,
    pub rating: RatingSummary,
    /// Approximate distance supplied by the backend, in kilometres.
    pub approx_distance_km: Option<f64>,
    pub gallery: Gallery,
    pub services: Vec<ShopService>,
}

impl Shop {
    /// Free-text address used when directions can't use coordinates.
    pub fn maps_query(&self) -> String {
        format!(
            "{}, {}, Maputo",
            self.name,
            self.neighborhood.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A shop in central Maputo trading 08:00-20:00 on weekdays.
    pub fn shop(slug: &str) -> Shop {
        Shop {
            id: ShopId::parse(&format!("id-{slug}")).unwrap(),
            slug: Slug::parse(slug).unwrap(),
            name: "Barbearia Central".to_string(),
            neighborhood: Some("Polana".to_string()),
            address: None,
            image_url: None,
            coordinate: Coordinate::new(-25.9653, 32.5892).ok(),
            opening_time: Some("08:00".to_string()),
            closing_time: Some("20:00".to_string()),
            opening_days: OpeningDays::from_indices([1, 2, 3, 4, 5]),
            rating: RatingSummary::new(4.5, 12),
            approx_distance_km: Some(2.5),
            gallery: Gallery::new(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
            services: vec![],
        }
    }
}
