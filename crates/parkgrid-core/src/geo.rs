//! Geodesic primitives: validated coordinates, haversine distance, and
//! display formatting.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Placeholder label rendered when a distance cannot be computed.
pub const UNKNOWN_DISTANCE_LABEL: &str = "-- km";

/// A validated latitude/longitude pair in decimal degrees.
///
/// [`Coordinate::new`] is the only way to build one, so the distance math
/// never sees NaN or out-of-range components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validates and builds a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] if either component is
    /// non-finite, latitude is outside `[-90, 90]`, or longitude is outside
    /// `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidCoordinate {
            latitude,
            longitude,
            reason: reason.to_string(),
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid("components must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude outside [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude outside [-180, 180]"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance between two coordinates in kilometers, via the
/// haversine formula.
#[must_use]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human-readable label for a distance in kilometers.
///
/// Sub-kilometer distances render as whole meters (`"850 m"`), anything
/// larger as one decimal (`"2.3 km"`). Non-finite input — the unknown
/// sentinel — renders as [`UNKNOWN_DISTANCE_LABEL`].
#[must_use]
pub fn format_distance(distance_km: f64) -> String {
    if !distance_km.is_finite() {
        return UNKNOWN_DISTANCE_LABEL.to_string();
    }

    if distance_km < 1.0 {
        format!("{:.0} m", distance_km * 1000.0)
    } else {
        format!("{distance_km:.1} km")
    }
}
