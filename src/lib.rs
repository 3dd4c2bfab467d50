pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use api::DonationApiClient;
pub use config::{Config, ConfigError, Environment};
pub use error::ClientError;

/// Shared state of the `/api` proxy.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }
}
