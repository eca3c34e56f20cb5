//! Driving-directions links for the platform's native maps app.

use serde::Serialize;

use crate::domain::Coordinate;

/// Maps provider to link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapsPlatform {
    Apple,
    Google,
}

impl MapsPlatform {
    /// Apple Maps for iOS devices, Google Maps everywhere else.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ["iPad", "iPhone", "iPod"].iter().any(|d| ua.contains(d)) => Self::Apple,
            _ => Self::Google,
        }
    }
}

/// Build a driving-directions URL to a shop.
///
/// Coordinates are used when known; otherwise the destination is the
/// percent-encoded address query.
///
/// # Examples
///
/// ```
/// use barber_server::domain::Coordinate;
/// use barber_server::location::{MapsPlatform, directions_url};
///
/// let shop = Coordinate::new(-25.9653, 32.5892).unwrap();
/// assert_eq!(
///     directions_url(MapsPlatform::Apple, Some(shop), "Central, Polana, Maputo"),
///     "http://maps.apple.com/?daddr=-25.9653,32.5892&dirflg=d"
/// );
/// ```
pub fn directions_url(
    platform: MapsPlatform,
    destination: Option<Coordinate>,
    address_query: &str,
) -> String {
    let target = match destination {
        Some(c) => c.to_string(),
        None => urlencoding::encode(address_query).into_owned(),
    };

    match platform {
        MapsPlatform::Apple => format!("http://maps.apple.com/?daddr={target}&dirflg=d"),
        MapsPlatform::Google => format!(
            "https://www.google.com/maps/dir/?api=1&destination={target}&travelmode=driving"
        ),
    }
}
