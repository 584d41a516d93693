use thiserror::Error;

/// Failures raised while resolving the device's location.
///
/// The first three variants are the user-distinguishable categories —
/// consumers react to them differently (a permission denial warrants a
/// settings hint, a timeout a retry). The rest are transport-level failures
/// from the HTTP lookup.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("position unavailable: {reason}")]
    PositionUnavailable { reason: String },

    #[error("location request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by geolocation service (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}
