//! Service configuration, read once from the environment at startup.

use std::net::SocketAddr;

use chrono_tz::Tz;
use tracing::warn;

use crate::http::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, HttpSettings};
use crate::planner::SearchSettings;

pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const HOTPEPPER_KEY: &str = "HOTPEPPER_KEY";
pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const MEETPOINT_TIMEZONE: &str = "MEETPOINT_TIMEZONE";
pub const MEETPOINT_BIND_ADDR: &str = "MEETPOINT_BIND_ADDR";
pub const MEETPOINT_HTTP_TIMEOUT_SECS: &str = "MEETPOINT_HTTP_TIMEOUT_SECS";
pub const MEETPOINT_HTTP_RETRIES: &str = "MEETPOINT_HTTP_RETRIES";

const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Tokyo;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    /// Provider credentials needed for finalization are not set
    #[error("Missing API Config: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// Provider API keys.
///
/// Either key may be absent at startup; finalization refuses to run until
/// both are present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub google_maps_key: Option<String>,
    pub hotpepper_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_maps_key", &self.google_maps_key.as_ref().map(|_| "<set>"))
            .field("hotpepper_key", &self.hotpepper_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Credentials {
    pub fn new(google_maps_key: impl Into<String>, hotpepper_key: impl Into<String>) -> Self {
        Self {
            google_maps_key: Some(google_maps_key.into()),
            hotpepper_key: Some(hotpepper_key.into()),
        }
    }

    /// Names of the keys that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_maps_key.is_none() {
            missing.push(GOOGLE_MAPS_API_KEY);
        }
        if self.hotpepper_key.is_none() {
            missing.push(HOTPEPPER_KEY);
        }
        missing
    }

    /// Fail with `MissingCredentials` unless every key is set.
    pub fn require(&self) -> Result<(), ConfigError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials(missing))
        }
    }
}

/// Supabase project access.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    /// `None` runs against the in-memory store
    pub supabase: Option<SupabaseConfig>,
    /// Zone for offset-less timestamps and the fallback meeting time
    pub timezone: Tz,
    pub bind_addr: SocketAddr,
    pub http: HttpSettings,
    pub search: SearchSettings,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = Credentials {
            google_maps_key: get(GOOGLE_MAPS_API_KEY),
            hotpepper_key: get(HOTPEPPER_KEY),
        };

        let supabase = match (get(SUPABASE_URL), get(SUPABASE_SERVICE_ROLE_KEY)) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig { url, service_key }),
            (Some(url), None) => {
                warn!(url = %url, "{SUPABASE_URL} set without {SUPABASE_SERVICE_ROLE_KEY}");
                Some(SupabaseConfig {
                    url,
                    service_key: String::new(),
                })
            }
            (None, _) => None,
        };

        let timezone = match get(MEETPOINT_TIMEZONE) {
            Some(v) => v.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: MEETPOINT_TIMEZONE,
                value: v,
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let bind_addr = parse_or(
            MEETPOINT_BIND_ADDR,
            get(MEETPOINT_BIND_ADDR),
            SocketAddr::from(DEFAULT_BIND_ADDR),
        )?;

        let http = HttpSettings {
            timeout_secs: parse_or(
                MEETPOINT_HTTP_TIMEOUT_SECS,
                get(MEETPOINT_HTTP_TIMEOUT_SECS),
                DEFAULT_TIMEOUT_SECS,
            )?,
            retries: parse_or(
                MEETPOINT_HTTP_RETRIES,
                get(MEETPOINT_HTTP_RETRIES),
                DEFAULT_RETRIES,
            )?,
            ..HttpSettings::default()
        };

        Ok(Self {
            credentials,
            supabase,
            timezone,
            bind_addr,
            http,
            search: SearchSettings::default(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}
