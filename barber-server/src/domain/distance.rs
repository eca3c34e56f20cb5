//! Short human-readable distance labels.

/// Label shown instead of a number when the shop is within [`VERY_CLOSE_KM`].
pub const VERY_CLOSE_LABEL: &str = "Muito perto";

/// Distances below this are shown as [`VERY_CLOSE_LABEL`].
pub const VERY_CLOSE_KM: f64 = 0.05;

/// Format a distance in kilometres for display.
///
/// - below 50 m: [`VERY_CLOSE_LABEL`]
/// - below 1 km: whole metres, e.g. `"300 m"`
/// - otherwise: kilometres with one decimal, e.g. `"12.3 km"`
///
/// The input must be finite and non-negative; anything else is the caller's
/// responsibility and the output is unspecified.
///
/// # Examples
///
/// ```
/// use barber_server::domain::format_distance;
///
/// assert_eq!(format_distance(0.02), "Muito perto");
/// assert_eq!(format_distance(0.3), "300 m");
/// assert_eq!(format_distance(12.34), "12.3 km");
/// ```
pub fn format_distance(km: f64) -> String {
    if km < VERY_CLOSE_KM {
        return VERY_CLOSE_LABEL.to_string();
    }
    if km < 1.0 {
        let meters = (km * 1000.0).round();
        return format!("{meters:.0} m");
    }
    // `{:.1}` alone rounds ties to even; round half away from zero first.
    let tenths = (km * 10.0).round() / 10.0;
    format!("{tenths:.1} km")
}
