//! Great-circle distance between geographic coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when constructing a coordinate outside the valid range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// Distance in kilometres between two latitude/longitude pairs in degrees.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
/// Inputs are not range-checked; out-of-range degrees give an unspecified
/// result.
///
/// # Examples
///
/// ```
/// use barber_server::domain::distance_km;
///
/// // Two points in central Maputo
/// let d = distance_km(-25.9692, 32.5732, -25.9653, 32.5892);
/// assert!((d - 1.657).abs() < 0.01);
///
/// assert_eq!(distance_km(-25.9692, 32.5732, -25.9692, 32.5732), 0.0);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    // Rounding can push `a` just past 1 for antipodal points.
    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A validated latitude/longitude pair in degrees.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate {
                reason: "must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within -90..=90",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within -180..=180",
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a coordinate from optional components.
    ///
    /// Returns `None` unless both components are present and valid.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Self::new(latitude?, longitude?).ok()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another coordinate, in kilometres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn coordinate()(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) -> (f64, f64) {
            (lat, lon)
        }
    }

    proptest! {
        /// Distance does not depend on argument order
        #[test]
        fn symmetric(p in coordinate(), q in coordinate()) {
            let pq = distance_km(p.0, p.1, q.0, q.1);
            let qp = distance_km(q.0, q.1, p.0, p.1);
            prop_assert!((pq - qp).abs() < 1e-9);
        }

        /// A point is zero distance from itself
        #[test]
        fn zero_for_identical(p in coordinate()) {
            prop_assert_eq!(distance_km(p.0, p.1, p.0, p.1), 0.0);
        }

        /// Never negative, never NaN, never more than half the circumference
        #[test]
        fn bounded(p in coordinate(), q in coordinate()) {
            let d = distance_km(p.0, p.1, q.0, q.1);
            prop_assert!(d.is_finite());
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }

        /// Repeated calls agree exactly
        #[test]
        fn deterministic(p in coordinate(), q in coordinate()) {
            prop_assert_eq!(
                distance_km(p.0, p.1, q.0, q.1),
                distance_km(p.0, p.1, q.0, q.1)
            );
        }
    }
}
