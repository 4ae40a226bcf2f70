use serde::{Deserialize, Serialize};

/// Mean earth radius in metres used for all great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A single mission point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

    /// Returns the point with both coordinates rounded to 8 decimal places,
    /// the precision of the mission file.
    pub fn rounded(self) -> Self { Self { lat: round_8(self.lat), lng: round_8(self.lng) } }

    /// Haversine distance to `other` in metres.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// Rounds `value` to 8 decimal places.
pub fn round_8(value: f64) -> f64 {
    let rounded = (value * 1e8).round() / 1e8;
    if rounded == 0.0 { 0.0_f64.copysign(value) } else { rounded }
}
