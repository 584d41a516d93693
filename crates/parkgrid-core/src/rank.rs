//! Proximity ranking of catalog spots against an optional origin.

use crate::geo::{self, format_distance, Coordinate};
use crate::spots::ParkingSpot;

/// A [`ParkingSpot`] annotated with its distance from the ranking origin.
///
/// `distance_km` is `f64::INFINITY` when no distance could be computed —
/// either the ranking ran without an origin, or the spot carries no usable
/// coordinate pair. `distance_label` always agrees with `distance_km`.
#[derive(Debug, Clone)]
pub struct RankedSpot {
    pub spot: ParkingSpot,
    pub distance_km: f64,
    pub distance_label: String,
}

impl RankedSpot {
    fn unranked(spot: ParkingSpot) -> Self {
        Self {
            spot,
            distance_km: f64::INFINITY,
            distance_label: geo::UNKNOWN_DISTANCE_LABEL.to_string(),
        }
    }

    fn measured_from(origin: Coordinate, spot: ParkingSpot) -> Self {
        let distance_km = spot
            .coordinate()
            .map_or(f64::INFINITY, |position| geo::distance_km(origin, position));
        Self {
            distance_label: format_distance(distance_km),
            distance_km,
            spot,
        }
    }
}

/// Rank candidates by distance from `origin`.
///
/// With an origin, each candidate is annotated with its haversine distance
/// and the list is sorted ascending. The sort is stable, so equally distant
/// spots keep their input order. Candidates without a usable coordinate pair
/// are treated as infinitely far and sink to the end rather than failing the
/// whole call.
///
/// Without an origin no reordering is attempted: candidates come back in
/// input order, each carrying the unknown-distance placeholder.
#[must_use]
pub fn rank_spots(candidates: Vec<ParkingSpot>, origin: Option<Coordinate>) -> Vec<RankedSpot> {
    let Some(origin) = origin else {
        return candidates.into_iter().map(RankedSpot::unranked).collect();
    };

    let mut ranked: Vec<RankedSpot> = candidates
        .into_iter()
        .map(|spot| RankedSpot::measured_from(origin, spot))
        .collect();

    // Vec::sort_by is stable; total_cmp orders the INFINITY sentinel last.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
