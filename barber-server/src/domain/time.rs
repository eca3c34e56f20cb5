//! Time-of-day handling for shop opening hours.
//!
//! The backend stores opening and closing times as "HH:MM" strings, or as
//! "HH:MM:SS" when the column is a Postgres `time`. This module parses both
//! into a minutes-since-midnight value that the availability check compares.

use chrono::{NaiveTime, Timelike};
use std::fmt;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day, at minute resolution.
///
/// # Examples
///
/// ```
/// use barber_server::domain::ShopTime;
///
/// let t = ShopTime::parse("09:30").unwrap();
/// assert_eq!(t.minutes(), 570);
/// assert_eq!(t.to_string(), "09:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShopTime(u16);

impl ShopTime {
    /// Midnight, the start of the day.
    pub const MIDNIGHT: ShopTime = ShopTime(0);

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Parse a time from "HH:MM", "H:MM" or "HH:MM:SS".
    ///
    /// Seconds are validated and then discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use barber_server::domain::ShopTime;
    ///
    /// assert!(ShopTime::parse("00:00").is_ok());
    /// assert!(ShopTime::parse("8:00").is_ok());
    /// assert!(ShopTime::parse("20:00:00").is_ok());
    ///
    /// assert!(ShopTime::parse("").is_err());
    /// assert!(ShopTime::parse("0800").is_err());
    /// assert!(ShopTime::parse("24:00").is_err());
    /// assert!(ShopTime::parse("ab:cd").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeError::new("empty"));
        }

        let mut parts = s.split(':');
        let hour_part = parts.next().unwrap_or_default();
        let minute_part = parts
            .next()
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;
        let second_part = parts.next();
        if parts.next().is_some() {
            return Err(TimeError::new("too many components"));
        }

        let hour = match hour_part.len() {
            1 | 2 => parse_digits(hour_part.as_bytes()),
            _ => None,
        }
        .ok_or_else(|| TimeError::new("invalid hour digits"))?;

        if minute_part.len() != 2 {
            return Err(TimeError::new("minutes must be two digits"));
        }
        let minute = parse_digits(minute_part.as_bytes())
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        if let Some(seconds) = second_part {
            let second = (seconds.len() == 2)
                .then(|| parse_digits(seconds.as_bytes()))
                .flatten()
                .ok_or_else(|| TimeError::new("invalid second digits"))?;
            if second > 59 {
                return Err(TimeError::new("second must be 0-59"));
            }
        }

        Self::from_hm(hour, minute)
    }

    /// Returns minutes since midnight (0-1439).
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        u32::from(self.0 / 60)
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        u32::from(self.0 % 60)
    }
}

impl From<NaiveTime> for ShopTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Debug for ShopTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShopTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ShopTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse one or two ASCII digit bytes into a u32.
fn parse_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 2 {
        return None;
    }
    bytes
        .iter()
        .try_fold(0u32, |acc, &b| Some(acc * 10 + (b as char).to_digit(10)?))
}
