use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use parkgrid_core::{load_spots, rank_spots, AppConfig, Coordinate, RankedSpot};
use parkgrid_geoloc::{IpLocateClient, LocationError, LocationProvider};

#[derive(Debug, Parser)]
#[command(name = "parkgrid-cli")]
#[command(about = "Parkgrid command line interface")]
struct Cli {
    /// Catalog path; overrides PARKGRID_SPOTS_PATH.
    #[arg(long, global = true)]
    spots_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the catalog in its stored order.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank spots by distance from an explicit origin.
    Nearby {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Resolve the origin via the geolocation service, then rank.
    Locate {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = parkgrid_core::load_app_config()?;
    let spots_path = cli.spots_path.unwrap_or_else(|| config.spots_path.clone());
    let catalog = load_spots(&spots_path)?;

    match cli.command {
        Commands::List { limit } => {
            let ranked = rank_spots(catalog.spots, None);
            print_ranked(&ranked, limit);
        }
        Commands::Nearby { lat, lng, limit } => {
            let origin = Coordinate::new(lat, lng)?;
            let ranked = rank_spots(catalog.spots, Some(origin));
            print_ranked(&ranked, limit);
        }
        Commands::Locate { limit } => {
            let origin = resolve_origin(&config).await;
            let ranked = rank_spots(catalog.spots, origin);
            print_ranked(&ranked, limit);
        }
    }

    Ok(())
}

/// Resolve the device origin, degrading to `None` (unranked output) when the
/// lookup fails for any reason.
async fn resolve_origin(config: &AppConfig) -> Option<Coordinate> {
    let client = match IpLocateClient::new(
        &config.geoloc_base_url,
        config.geoloc_api_key.clone(),
        config.geoloc_request_timeout_secs,
        &config.geoloc_user_agent,
        config.geoloc_max_retries,
        config.geoloc_retry_backoff_base_secs,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "geolocation client unavailable");
            eprintln!("geolocation unavailable: {e}");
            return None;
        }
    };

    let provider = LocationProvider::new(
        client,
        Duration::from_secs(config.geoloc_request_timeout_secs),
    );
    match provider.refresh().await {
        Ok(position) => Some(position),
        Err(e) => {
            eprintln!("{}", location_failure_hint(&e));
            None
        }
    }
}

/// Category-specific failure message; the listing continues unranked either
/// way.
fn location_failure_hint(err: &LocationError) -> String {
    match err {
        LocationError::PermissionDenied { .. } => {
            format!("{err}; check PARKGRID_GEOLOC_API_KEY and service permissions")
        }
        LocationError::Timeout { .. } => {
            format!("{err}; try again or raise PARKGRID_GEOLOC_REQUEST_TIMEOUT_SECS")
        }
        other => other.to_string(),
    }
}

fn print_ranked(ranked: &[RankedSpot], limit: Option<usize>) {
    for entry in ranked.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", render_spot(entry));
    }
}

fn render_spot(ranked: &RankedSpot) -> String {
    let spot = &ranked.spot;
    format!(
        "{:>9}  {:<40}  {} {}/hr  rating {:.1} ({} reviews)  {} free",
        ranked.distance_label,
        spot.name,
        spot.currency_code,
        spot.price_per_hour,
        spot.rating,
        spot.review_count,
        spot.available_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkgrid_core::ParkingSpot;

    fn ranked(label: &str, distance_km: f64) -> RankedSpot {
        RankedSpot {
            spot: ParkingSpot {
                id: "jyoti-nivas".to_string(),
                name: "Jyoti Nivas College Road Parking".to_string(),
                address: "5th Block, Koramangala".to_string(),
                latitude: Some(12.9357),
                longitude: Some(77.6101),
                price_per_hour: "30.00".to_string(),
                currency_code: "INR".to_string(),
                rating: 4.1,
                review_count: 64,
                available_count: 9,
                features: vec!["street".to_string()],
            },
            distance_km,
            distance_label: label.to_string(),
        }
    }

    #[test]
    fn render_spot_includes_distance_and_price() {
        let line = render_spot(&ranked("508 m", 0.508));
        assert!(line.contains("508 m"));
        assert!(line.contains("Jyoti Nivas College Road Parking"));
        assert!(line.contains("INR 30.00/hr"));
        assert!(line.contains("rating 4.1 (64 reviews)"));
        assert!(line.contains("9 free"));
    }

    #[test]
    fn render_spot_shows_placeholder_for_unknown_distance() {
        let line = render_spot(&ranked("-- km", f64::INFINITY));
        assert!(line.starts_with(&format!("{:>9}", "-- km")));
    }

    #[test]
    fn permission_denied_hint_mentions_api_key() {
        let hint = location_failure_hint(&LocationError::PermissionDenied {
            reason: "credentials rejected".to_string(),
        });
        assert!(hint.contains("PARKGRID_GEOLOC_API_KEY"));
    }

    #[test]
    fn timeout_hint_mentions_timeout_setting() {
        let hint = location_failure_hint(&LocationError::Timeout { timeout_secs: 10 });
        assert!(hint.contains("PARKGRID_GEOLOC_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn unavailable_hint_is_the_error_message() {
        let hint = location_failure_hint(&LocationError::PositionUnavailable {
            reason: "no fix".to_string(),
        });
        assert_eq!(hint, "position unavailable: no fix");
    }
}
