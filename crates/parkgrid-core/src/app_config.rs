use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub spots_path: PathBuf,
    pub geoloc_base_url: String,
    pub geoloc_api_key: Option<String>,
    pub geoloc_user_agent: String,
    pub geoloc_request_timeout_secs: u64,
    pub geoloc_max_retries: u32,
    pub geoloc_retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("spots_path", &self.spots_path)
            .field("geoloc_base_url", &self.geoloc_base_url)
            .field(
                "geoloc_api_key",
                &self.geoloc_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geoloc_user_agent", &self.geoloc_user_agent)
            .field(
                "geoloc_request_timeout_secs",
                &self.geoloc_request_timeout_secs,
            )
            .field("geoloc_max_retries", &self.geoloc_max_retries)
            .field(
                "geoloc_retry_backoff_base_secs",
                &self.geoloc_retry_backoff_base_secs,
            )
            .finish()
    }
}
