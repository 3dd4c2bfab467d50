// src/config.rs

use std::time::Duration;

const DEV_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROXY_HOST: &str = "0.0.0.0";
const DEFAULT_PROXY_PORT: u16 = 3000;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub proxy_host: String,
    pub proxy_port: u16,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("APP_ENV").as_deref() {
            None | Some("production") | Some("prod") => Environment::Production,
            Some("development") | Some("dev") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        // no silent fallback outside development
        let api_base_url = match (var("DONATION_API_BASE_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Development) => DEV_API_BASE_URL.to_string(),
            (None, Environment::Production) => {
                return Err(ConfigError::Missing("DONATION_API_BASE_URL"));
            }
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        if reqwest::Url::parse(&api_base_url).is_err() {
            return Err(ConfigError::Invalid {
                key: "DONATION_API_BASE_URL",
                value: api_base_url,
            });
        }

        let request_timeout = match var("DONATION_API_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DONATION_API_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
        };

        let proxy_port = match var("PROXY_PORT") {
            None => DEFAULT_PROXY_PORT,
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PROXY_PORT",
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            environment,
            api_base_url,
            api_token: var("DONATION_API_TOKEN"),
            request_timeout,
            proxy_host: var("PROXY_HOST").unwrap_or_else(|| DEFAULT_PROXY_HOST.to_string()),
            proxy_port,
        })
    }
}
