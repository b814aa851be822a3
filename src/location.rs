//! Approximate location heuristic
//!
//! Maps a client IANA timezone name to a coarse, human-readable location
//! string. This is an intentional approximation: there is no geolocation
//! capability in scope, so the timezone is the only signal available.

/// Static timezone -> coarse location table
const LOCATION_MAP: &[(&str, &str)] = &[
    ("Asia/Kolkata", "India"),
    ("Asia/Delhi", "Delhi, India"),
    ("Asia/Mumbai", "Mumbai, India"),
    ("Asia/Bangalore", "Bangalore, India"),
    ("Asia/Chennai", "Chennai, India"),
    ("Asia/Hyderabad", "Hyderabad, India"),
    ("America/New_York", "New York, USA"),
    ("America/Los_Angeles", "California, USA"),
    ("Europe/London", "London, UK"),
    ("Europe/Paris", "Paris, France"),
];

/// Fallback value when no signal is available at all
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Derives a coarse location string from an optional timezone name.
///
/// Known timezones map through the static table; unknown ones fall back to
/// the city segment of the timezone (`"Asia/Tokyo"` -> `"Tokyo"`), and a
/// missing or unsplittable timezone yields [`UNKNOWN_LOCATION`].
pub fn approximate_location(timezone: Option<&str>) -> String {
    let Some(tz) = timezone.filter(|tz| !tz.is_empty()) else {
        return UNKNOWN_LOCATION.to_string();
    };

    if let Some((_, location)) = LOCATION_MAP.iter().find(|(name, _)| *name == tz) {
        return location.to_string();
    }

    match tz.split('/').nth(1) {
        Some(city) if !city.is_empty() => city.to_string(),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}
