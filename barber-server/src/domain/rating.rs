//! Customer ratings.

use serde::Serialize;

/// Shops need at least this many ratings before the average is shown.
pub const MIN_RATINGS_FOR_STARS: u32 = 3;

/// Highest possible rating.
pub const MAX_STARS: u8 = 5;

/// Error returned for a rating outside 1-5.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rating {0}: must be between 1 and 5")]
pub struct InvalidRating(pub u8);

/// A single customer rating, 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(stars: u8) -> Result<Self, InvalidRating> {
        if (1..=MAX_STARS).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(InvalidRating(stars))
        }
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

/// Aggregate rating of a shop as maintained by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    pub fn new(average: f64, count: u32) -> Self {
        Self { average, count }
    }

    /// Whether enough ratings exist for the average to be meaningful.
    pub fn shows_stars(&self) -> bool {
        self.count >= MIN_RATINGS_FOR_STARS
    }

    /// The average with one decimal, e.g. `"4.5"`.
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }

    /// Ratings count line shown under the stars.
    pub fn count_label(&self) -> String {
        if self.count > 0 {
            format!("{} avaliações", self.count)
        } else {
            "Seja o primeiro a avaliar".to_string()
        }
    }
}

/// How a single star is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

/// Star fills for a rating value.
///
/// Star `n` (1-based) is full when `n <= floor(value)`, half when it is the
/// star just above that and the fractional part is at least 0.5, otherwise
/// empty.
///
/// # Examples
///
/// ```
/// use barber_server::domain::{StarFill, star_fills};
///
/// assert_eq!(
///     star_fills(3.5, 5),
///     vec![StarFill::Full, StarFill::Full, StarFill::Full, StarFill::Half, StarFill::Empty]
/// );
/// ```
pub fn star_fills(value: f64, max: u8) -> Vec<StarFill> {
    let whole = value.floor();
    let has_half = value - whole >= 0.5;
    (1..=max)
        .map(|star| {
            let star = f64::from(star);
            if star <= whole {
                StarFill::Full
            } else if has_half && star == whole + 1.0 {
                StarFill::Half
            } else {
                StarFill::Empty
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use StarFill::*;

    #[test]
    fn rating_range() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), stars);
        }
    }

    #[test]
    fn rating_error_display() {
        assert_eq!(
            Rating::new(7).unwrap_err().to_string(),
            "invalid rating 7: must be between 1 and 5"
        );
    }

    #[test]
    fn stars_need_three_ratings() {
        assert!(!RatingSummary::new(5.0, 0).shows_stars());
        assert!(!RatingSummary::new(5.0, 2).shows_stars());
        assert!(RatingSummary::new(4.0, 3).shows_stars());
    }

    #[test]
    fn labels() {
        let summary = RatingSummary::new(4.26, 12);
        assert_eq!(summary.average_label(), "4.3");
        assert_eq!(summary.count_label(), "12 avaliações");
        assert_eq!(RatingSummary::default().count_label(), "Seja o primeiro a avaliar");
    }

    #[test]
    fn star_fill_patterns() {
        assert_eq!(star_fills(0.0, 5), vec![Empty; 5]);
        assert_eq!(star_fills(5.0, 5), vec![Full; 5]);
        assert_eq!(star_fills(4.0, 5), vec![Full, Full, Full, Full, Empty]);
        assert_eq!(star_fills(4.4, 5), vec![Full, Full, Full, Full, Empty]);
        assert_eq!(star_fills(4.5, 5), vec![Full, Full, Full, Full, Half]);
        assert_eq!(star_fills(0.5, 3), vec![Half, Empty, Empty]);
    }
}
