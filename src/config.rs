use std::env;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use tracing::info;

const DATA_URL: &str = "BOOKSHELF_DATA_URL";
const AUTH_URL: &str = "BOOKSHELF_AUTH_URL";
const API_KEY: &str = "BOOKSHELF_API_KEY";
const BIND_ADDR: &str = "BOOKSHELF_BIND_ADDR";
const REQUEST_TIMEOUT_MS: &str = "BOOKSHELF_REQUEST_TIMEOUT_MS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub remote: RemoteSettings,
}

/// Where the managed backend lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub data_url: String,
    pub auth_url: String,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
}

impl RemoteSettings {
    pub fn new(data_url: impl Into<String>) -> Self {
        let data_url = data_url.into();
        RemoteSettings {
            auth_url: default_auth_url(&data_url),
            data_url,
            api_key: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

fn default_auth_url(data_url: &str) -> String {
    format!("{}/auth", data_url.trim_end_matches('/'))
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "environment variable {key} must be set"),
            ConfigError::Invalid { key, message } => write!(f, "invalid {key} value: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded settings from .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_url = lookup(DATA_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATA_URL))?;
        let auth_url = lookup(AUTH_URL).unwrap_or_else(|| default_auth_url(&data_url));

        Ok(Config {
            bind_addr: parse_or(&lookup, BIND_ADDR, DEFAULT_BIND_ADDR.parse().ok())?,
            remote: RemoteSettings {
                data_url,
                auth_url,
                api_key: lookup(API_KEY),
                request_timeout_ms: parse_or(
                    &lookup,
                    REQUEST_TIMEOUT_MS,
                    Some(DEFAULT_REQUEST_TIMEOUT_MS),
                )?,
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default");
            default.ok_or(ConfigError::Missing(key))
        }
    }
}
