use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("PARKGRID_ENV", "development"))?;

    let bind_addr = parse_addr("PARKGRID_BIND_ADDR", "0.0.0.0:4000")?;
    let log_level = or_default("PARKGRID_LOG_LEVEL", "info");
    let spots_path = PathBuf::from(or_default("PARKGRID_SPOTS_PATH", "./config/spots.yaml"));

    let geoloc_base_url = or_default("PARKGRID_GEOLOC_BASE_URL", "https://ipapi.co");
    let geoloc_api_key = lookup("PARKGRID_GEOLOC_API_KEY").ok();
    let geoloc_user_agent = or_default("PARKGRID_GEOLOC_USER_AGENT", "parkgrid/0.1 (spot-search)");
    let geoloc_request_timeout_secs = parse_u64("PARKGRID_GEOLOC_REQUEST_TIMEOUT_SECS", "10")?;
    let geoloc_max_retries = parse_u32("PARKGRID_GEOLOC_MAX_RETRIES", "2")?;
    let geoloc_retry_backoff_base_secs =
        parse_u64("PARKGRID_GEOLOC_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        spots_path,
        geoloc_base_url,
        geoloc_api_key,
        geoloc_user_agent,
        geoloc_request_timeout_secs,
        geoloc_max_retries,
        geoloc_retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values; a typo'd
/// environment should fail startup rather than silently run as development.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PARKGRID_ENV".to_string(),
            reason: format!("unrecognized environment '{other}'"),
        }),
    }
}
