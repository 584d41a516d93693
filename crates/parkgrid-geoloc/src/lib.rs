pub mod client;
pub mod error;
pub mod provider;
mod retry;
pub mod source;

pub use client::IpLocateClient;
pub use error::LocationError;
pub use provider::{LocationProvider, LocationState};
pub use source::LocationSource;
