//! Parking-spot catalog: record types, YAML loading, validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ConfigError;

/// A parking spot as supplied by the catalog.
///
/// Coordinates are optional: listings imported without geocoding still take
/// part in ranking, they just sort as infinitely far (see
/// [`crate::rank::rank_spots`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Unique catalog key, e.g. `"koramangala-5th-block"`.
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Hourly price as a decimal string, e.g. `"50.00"`.
    pub price_per_hour: String,
    /// ISO 4217 currency code (e.g., `"INR"`).
    pub currency_code: String,
    /// Average review rating, `0.0..=5.0`.
    pub rating: f64,
    pub review_count: u32,
    /// Number of currently free spaces.
    pub available_count: u32,
    /// Feature tags, e.g. `"covered"`, `"ev-charging"`.
    #[serde(default)]
    pub features: Vec<String>,
}

impl ParkingSpot {
    /// The spot's position, if it carries a usable coordinate pair.
    ///
    /// Returns `None` when either component is missing or the pair fails
    /// validation, so a malformed record degrades to "infinitely far"
    /// instead of breaking a ranking call.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SpotsFile {
    pub spots: Vec<ParkingSpot>,
}

/// Load and validate the spot catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_spots(path: &Path) -> Result<SpotsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SpotsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let spots_file: SpotsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SpotsFileParse)?;

    validate_spots(&spots_file)?;

    Ok(spots_file)
}

fn validate_spots(spots_file: &SpotsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for spot in &spots_file.spots {
        if spot.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "spot id must be non-empty".to_string(),
            ));
        }

        if spot.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "spot '{}' has an empty name",
                spot.id
            )));
        }

        if !seen_ids.insert(spot.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate spot id: '{}'",
                spot.id
            )));
        }

        if !(0.0..=5.0).contains(&spot.rating) {
            return Err(ConfigError::Validation(format!(
                "spot '{}' has invalid rating {}; must be within 0..=5",
                spot.id, spot.rating
            )));
        }

        match spot.price_per_hour.parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "spot '{}' has invalid price_per_hour '{}'",
                    spot.id, spot.price_per_hour
                )));
            }
        }

        match (spot.latitude, spot.longitude) {
            (Some(latitude), Some(longitude)) => {
                Coordinate::new(latitude, longitude)
                    .map_err(|e| ConfigError::Validation(format!("spot '{}': {e}", spot.id)))?;
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "spot '{}' has a half-specified coordinate pair",
                    spot.id
                )));
            }
        }
    }

    Ok(())
}
