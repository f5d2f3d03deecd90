//! Sync and transport configuration.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(900);

/// Server address used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Unknown transport: {0}")]
    UnknownTransport(String),
}

/// Which transport implementation the deployment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// In-process call into a local store.
    Local,
    /// JSON-RPC over HTTP.
    #[default]
    Rpc,
    /// GraphQL over HTTP.
    Graphql,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "rpc" | "jsonrpc" => Ok(Self::Rpc),
            "graphql" | "gql" => Ok(Self::Graphql),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Rpc => "rpc",
            Self::Graphql => "graphql",
        })
    }
}

/// Client-side configuration: how often to poll and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between the end of one fetch and the start of the next.
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,
    /// Base address of the chat server.
    #[serde(rename = "endpoint_address")]
    pub endpoint: String,
    /// Selected transport.
    pub transport: TransportKind,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: TransportKind::default(),
        }
    }
}

impl SyncConfig {
    /// Read `CHAT_POLL_INTERVAL_MS`, `CHAT_ENDPOINT` and `CHAT_TRANSPORT`.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    ///
    /// # Errors
    /// Returns error if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("CHAT_POLL_INTERVAL_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CHAT_POLL_INTERVAL_MS",
                    value: raw.clone(),
                })?;
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(endpoint) = lookup("CHAT_ENDPOINT") {
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(kind) = lookup("CHAT_TRANSPORT") {
            config.transport = kind.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants.
    ///
    /// # Errors
    /// Returns error on a zero poll interval or a missing remote endpoint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_ms",
                value: "0".to_string(),
            });
        }
        if self.transport != TransportKind::Local && self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "endpoint_address",
                value: self.endpoint.clone(),
            });
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match u64::deserialize(deserializer)? {
            0 => Err(D::Error::custom("poll_interval_ms must be greater than zero")),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}
