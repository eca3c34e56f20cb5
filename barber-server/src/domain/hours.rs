//! Opening hours and the "is this shop open right now" check.
//!
//! Shops publish an opening and closing time of day plus an optional list of
//! weekdays they trade on. "Now" is always taken in one reference timezone
//! (Africa/Maputo by default), never the viewer's local zone.
//!
//! The window is half-open, `[opening, closing)`. A closing time earlier than
//! the opening time means the shop trades past midnight. Equal opening and
//! closing times give an empty window: the shop is reported closed all day.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use crate::clock::{Clock, SystemClock};

use super::time::{ShopTime, TimeError};

/// Reference timezone used when none is configured.
pub const DEFAULT_ZONE: Tz = chrono_tz::Africa::Maputo;

/// The set of weekdays a shop trades on.
///
/// Days are indexed 0 = Sunday through 6 = Saturday. Only an empty list
/// places no restriction on the day: a list whose entries are all out of
/// range still restricts, and matches no day.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpeningDays {
    mask: u8,
    listed: bool,
}

impl OpeningDays {
    /// Build from weekday indices. Indices outside 0-6 match no day.
    ///
    /// # Examples
    ///
    /// ```
    /// use barber_server::domain::OpeningDays;
    /// use chrono::Weekday;
    ///
    /// let weekdays = OpeningDays::from_indices([1, 2, 3, 4, 5]);
    /// assert!(weekdays.contains(Weekday::Mon));
    /// assert!(!weekdays.contains(Weekday::Sun));
    /// ```
    pub fn from_indices(indices: impl IntoIterator<Item = i64>) -> Self {
        let mut days = Self::default();
        for index in indices {
            days.listed = true;
            match u8::try_from(index) {
                Ok(day @ 0..=6) => days.mask |= 1 << day,
                _ => debug!(index, "out-of-range weekday index matches no day"),
            }
        }
        days
    }

    /// Every day of the week.
    pub fn every_day() -> Self {
        Self {
            mask: 0b0111_1111,
            listed: true,
        }
    }

    /// True when no day list was given, meaning the shop is not day-restricted.
    pub fn is_unrestricted(&self) -> bool {
        !self.listed
    }

    /// Whether the shop trades on the given weekday.
    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_sunday()) != 0
    }

    /// The valid listed weekday indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        (0..7).filter(|d| self.mask & (1 << d) != 0).collect()
    }
}

impl fmt::Debug for OpeningDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrestricted() {
            f.write_str("OpeningDays(any)")
        } else {
            f.debug_tuple("OpeningDays").field(&self.indices()).finish()
        }
    }
}

/// A daily trading window, `[opening, closing)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningWindow {
    opening: ShopTime,
    closing: ShopTime,
}

impl OpeningWindow {
    pub fn new(opening: ShopTime, closing: ShopTime) -> Self {
        Self { opening, closing }
    }

    /// Parse both ends of the window.
    pub fn parse(opening: &str, closing: &str) -> Result<Self, TimeError> {
        Ok(Self::new(ShopTime::parse(opening)?, ShopTime::parse(closing)?))
    }

    pub fn opening(&self) -> ShopTime {
        self.opening
    }

    pub fn closing(&self) -> ShopTime {
        self.closing
    }

    /// True when the window runs past midnight into the next day.
    pub fn is_overnight(&self) -> bool {
        self.closing < self.opening
    }

    /// Whether a time of day falls inside the window.
    ///
    /// # Examples
    ///
    /// ```
    /// use barber_server::domain::{OpeningWindow, ShopTime};
    ///
    /// let late = OpeningWindow::parse("22:00", "02:00").unwrap();
    /// assert!(late.contains(ShopTime::parse("23:30").unwrap()));
    /// assert!(late.contains(ShopTime::parse("01:59").unwrap()));
    /// assert!(!late.contains(ShopTime::parse("02:00").unwrap()));
    /// ```
    pub fn contains(&self, now: ShopTime) -> bool {
        if self.is_overnight() {
            now >= self.opening || now < self.closing
        } else {
            self.opening <= now && now < self.closing
        }
    }
}

/// Whether a shop is open at a wall-clock time in the reference zone.
///
/// Missing or empty opening/closing times mean the hours are unknown and the
/// shop is reported closed. Times that fail to parse are treated the same
/// way. When `days` restricts the week, the shop is closed on any day
/// not listed.
pub fn is_open_at(
    opening: Option<&str>,
    closing: Option<&str>,
    days: Option<&OpeningDays>,
    local: NaiveDateTime,
) -> bool {
    let (Some(opening), Some(closing)) = (non_empty(opening), non_empty(closing)) else {
        return false;
    };

    if let Some(days) = days.filter(|d| !d.is_unrestricted())
        && !days.contains(local.weekday())
    {
        return false;
    }

    let window = match OpeningWindow::parse(opening, closing) {
        Ok(window) => window,
        Err(e) => {
            debug!(opening, closing, error = %e, "malformed opening hours, treating as closed");
            return false;
        }
    };

    window.contains(ShopTime::from(local.time()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Evaluates opening hours against the current instant in a fixed zone.
#[derive(Clone)]
pub struct Availability {
    zone: Tz,
    clock: Arc<dyn Clock>,
}

impl Availability {
    /// Evaluate against the system clock in `zone`.
    pub fn new(zone: Tz) -> Self {
        Self::with_clock(zone, Arc::new(SystemClock))
    }

    /// Evaluate against a custom clock (for testing).
    pub fn with_clock(zone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { zone, clock }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// The current wall-clock time in the reference zone.
    pub fn local_now(&self) -> NaiveDateTime {
        self.local_at(self.clock.now())
    }

    /// Convert an instant to wall-clock time in the reference zone.
    pub fn local_at(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.zone).naive_local()
    }

    /// Whether a shop with these hours is open now.
    pub fn is_open(
        &self,
        opening: Option<&str>,
        closing: Option<&str>,
        days: Option<&OpeningDays>,
    ) -> bool {
        is_open_at(opening, closing, days, self.local_now())
    }

    /// Whether a shop with these hours is open at the given instant.
    pub fn is_open_at_instant(
        &self,
        opening: Option<&str>,
        closing: Option<&str>,
        days: Option<&OpeningDays>,
        instant: DateTime<Utc>,
    ) -> bool {
        is_open_at(opening, closing, days, self.local_at(instant))
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE)
    }
}

impl fmt::Debug for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Availability")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn shop_time()(minutes in 0u32..1440) -> ShopTime {
            ShopTime::from_hm(minutes / 60, minutes % 60).unwrap()
        }
    }

    proptest! {
        /// An empty window never contains anything
        #[test]
        fn equal_window_is_empty(edge in shop_time(), now in shop_time()) {
            prop_assert!(!OpeningWindow::new(edge, edge).contains(now));
        }

        /// Opening time is inside, closing time is outside
        #[test]
        fn half_open_bounds(open in shop_time(), close in shop_time()) {
            prop_assume!(open != close);
            let window = OpeningWindow::new(open, close);
            prop_assert!(window.contains(open));
            prop_assert!(!window.contains(close));
        }

        /// A window and its reverse partition the day
        #[test]
        fn reverse_window_is_complement(
            open in shop_time(),
            close in shop_time(),
            now in shop_time()
        ) {
            prop_assume!(open != close);
            let forward = OpeningWindow::new(open, close);
            let reverse = OpeningWindow::new(close, open);
            prop_assert!(forward.contains(now) != reverse.contains(now));
        }

        /// Arbitrary strings never panic
        #[test]
        fn arbitrary_hours_never_panic(
            opening in "\\PC{0,8}",
            closing in "\\PC{0,8}",
            hour in 0u32..24,
            minute in 0u32..60
        ) {
            let local = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap();
            let _ = is_open_at(Some(&opening), Some(&closing), None, local);
        }
    }
}
