use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use parkgrid_core::{rank_spots, Coordinate, ParkingSpot, RankedSpot};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SpotItem {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_hour: String,
    pub currency_code: String,
    pub rating: f64,
    pub review_count: u32,
    pub available_count: u32,
    pub features: Vec<String>,
}

impl From<ParkingSpot> for SpotItem {
    fn from(spot: ParkingSpot) -> Self {
        Self {
            id: spot.id,
            name: spot.name,
            address: spot.address,
            latitude: spot.latitude,
            longitude: spot.longitude,
            price_per_hour: spot.price_per_hour,
            currency_code: spot.currency_code,
            rating: spot.rating,
            review_count: spot.review_count,
            available_count: spot.available_count,
            features: spot.features,
        }
    }
}

/// A spot annotated with its distance from the requested origin.
///
/// `distance_km` is `null` when the distance is unknown (no origin supplied,
/// or the spot has no usable coordinates) — JSON has no representation for
/// the core's infinity sentinel.
#[derive(Debug, Serialize)]
pub(super) struct RankedSpotItem {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_hour: String,
    pub currency_code: String,
    pub rating: f64,
    pub review_count: u32,
    pub available_count: u32,
    pub features: Vec<String>,
    pub distance_km: Option<f64>,
    pub distance_label: String,
}

impl From<RankedSpot> for RankedSpotItem {
    fn from(ranked: RankedSpot) -> Self {
        let distance_km = ranked
            .distance_km
            .is_finite()
            .then_some(ranked.distance_km);
        let spot = ranked.spot;
        Self {
            id: spot.id,
            name: spot.name,
            address: spot.address,
            latitude: spot.latitude,
            longitude: spot.longitude,
            price_per_hour: spot.price_per_hour,
            currency_code: spot.currency_code,
            rating: spot.rating,
            review_count: spot.review_count,
            available_count: spot.available_count,
            features: spot.features,
            distance_km,
            distance_label: ranked.distance_label,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    limit: Option<i64>,
}

pub(super) async fn list_spots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<SpotItem>>>, ApiError> {
    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(50);

    let data = state
        .catalog
        .spots
        .iter()
        .take(limit)
        .cloned()
        .map(SpotItem::from)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    lat: Option<f64>,
    lng: Option<f64>,
    limit: Option<i64>,
}

pub(super) async fn nearby_spots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<RankedSpotItem>>>, ApiError> {
    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => {
            let coordinate = Coordinate::new(lat, lng)
                .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
            Some(coordinate)
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "lat and lng must be provided together",
            ));
        }
    };

    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(50);

    let data = rank_spots(state.catalog.spots.clone(), origin)
        .into_iter()
        .take(limit)
        .map(RankedSpotItem::from)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
