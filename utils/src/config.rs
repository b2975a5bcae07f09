use std::env;
use std::fmt;
use std::time::Duration;

use flowsync_defs::{NormalizeDefaults, SyncError};

pub const ENV_API_URL: &str = "FLOWSYNC_API_URL";
pub const ENV_API_TOKEN: &str = "FLOWSYNC_API_TOKEN";
pub const ENV_API_USER: &str = "FLOWSYNC_API_USER";
pub const ENV_API_PASSWORD: &str = "FLOWSYNC_API_PASSWORD";
pub const ENV_API_TIMEOUT_SECS: &str = "FLOWSYNC_API_TIMEOUT_SECS";
pub const ENV_DEFAULT_WORK_POOL: &str = "FLOWSYNC_DEFAULT_WORK_POOL";
pub const ENV_DEFAULT_WORK_QUEUE: &str = "FLOWSYNC_DEFAULT_WORK_QUEUE";
pub const ENV_DEFAULT_TIMEZONE: &str = "FLOWSYNC_DEFAULT_TIMEZONE";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, PartialEq)]
pub enum Credentials {
    Bearer { token: String },
    Basic { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer { .. } => f.write_str("Bearer(***)"),
            Credentials::Basic { username, .. } => write!(f, "Basic({}:***)", username),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub api_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub server: ServerConfig,
    pub defaults: NormalizeDefaults,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup, failing on the first
    /// missing or malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = get(ENV_API_URL).ok_or_else(|| {
            SyncError::Config(format!(
                "{} is not set, e.g. \"export {}=http://127.0.0.1:4200/api\"",
                ENV_API_URL, ENV_API_URL
            ))
        })?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_API_URL, api_url
            )));
        }

        let credentials = match (get(ENV_API_TOKEN), get(ENV_API_USER), get(ENV_API_PASSWORD)) {
            (Some(token), _, _) => Credentials::Bearer { token },
            (None, Some(username), Some(password)) => Credentials::Basic { username, password },
            (None, Some(_), None) => {
                return Err(SyncError::Config(format!(
                    "{} is set but {} is missing",
                    ENV_API_USER, ENV_API_PASSWORD
                )))
            }
            _ => {
                return Err(SyncError::Config(format!(
                    "No API credential configured, set {} or {} and {}",
                    ENV_API_TOKEN, ENV_API_USER, ENV_API_PASSWORD
                )))
            }
        };

        let timeout_secs = match get(ENV_API_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(SyncError::Config(format!(
                        "{} must be a positive number of seconds, got '{}'",
                        ENV_API_TIMEOUT_SECS, raw
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let fallback = NormalizeDefaults::default();
        let defaults = NormalizeDefaults {
            work_pool_name: get(ENV_DEFAULT_WORK_POOL).unwrap_or(fallback.work_pool_name),
            work_queue_name: get(ENV_DEFAULT_WORK_QUEUE).unwrap_or(fallback.work_queue_name),
            timezone: get(ENV_DEFAULT_TIMEZONE).unwrap_or(fallback.timezone),
        };

        Ok(SyncConfig {
            server: ServerConfig {
                api_url: api_url.trim_end_matches('/').to_string(),
                credentials,
                timeout: Duration::from_secs(timeout_secs),
            },
            defaults,
        })
    }
}
