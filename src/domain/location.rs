use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::provenance::AttributeValue;

/// A WGS84 coordinate pair.
///
/// Ordered by latitude then longitude using IEEE total ordering, so sets of
/// locations sort deterministically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `(longitude, latitude)`, the GeoJSON position order.
    pub fn position(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Location {}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

impl AttributeValue for Location {
    fn is_blank(&self) -> bool {
        false
    }
}

/// Mean earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.009;
const KM_PER_MILE: f64 = 1.609344;

/// A great-circle distance.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance {
    kilometers: f64,
}

impl Distance {
    /// Distance to a station with no coordinates: never within any threshold.
    pub const INFINITE: Distance = Distance {
        kilometers: f64::INFINITY,
    };

    pub fn from_kilometers(kilometers: f64) -> Self {
        Self { kilometers }
    }

    pub fn from_miles(miles: f64) -> Self {
        Self {
            kilometers: miles * KM_PER_MILE,
        }
    }

    pub fn kilometers(&self) -> f64 {
        self.kilometers
    }

    pub fn miles(&self) -> f64 {
        self.kilometers / KM_PER_MILE
    }

    pub fn is_finite(&self) -> bool {
        self.kilometers.is_finite()
    }

    /// Great-circle distance between two coordinates (haversine form).
    pub fn great_circle(a: &Location, b: &Location) -> Self {
        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (b.longitude - a.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let central_angle = 2.0 * h.sqrt().min(1.0).asin();

        Self::from_kilometers(EARTH_RADIUS_KM * central_angle)
    }
}
