//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("relay url must start with ws:// or wss://: {0:?}")]
    BadScheme(String),
}

/// Fixed retry budget applied after a connection is lost or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_RECONNECT_ATTEMPTS, delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Websocket endpoint of the relay server.
    pub url: String,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { url: DEFAULT_URL.to_owned(), reconnect: ReconnectPolicy::default() }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `DEEPBOARD_URL`: default `ws://127.0.0.1:3000/ws`
    /// - `DEEPBOARD_RECONNECT_ATTEMPTS`: default 5
    /// - `DEEPBOARD_RECONNECT_DELAY_MS`: default 1000
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable numbers or a non-websocket URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup("DEEPBOARD_URL").unwrap_or_else(|| DEFAULT_URL.to_owned());
        let max_attempts = parse_var(&lookup, "DEEPBOARD_RECONNECT_ATTEMPTS", DEFAULT_RECONNECT_ATTEMPTS)?;
        let delay_ms = parse_var(&lookup, "DEEPBOARD_RECONNECT_DELAY_MS", DEFAULT_RECONNECT_DELAY_MS)?;
        Self { url, reconnect: ReconnectPolicy { max_attempts, delay: Duration::from_millis(delay_ms) } }.validated()
    }

    /// Replace the relay URL, checking its scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadScheme`] for anything but `ws://` or `wss://`.
    pub fn with_url(self, url: impl Into<String>) -> Result<Self, ConfigError> {
        Self { url: url.into(), ..self }.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            Ok(self)
        } else {
            Err(ConfigError::BadScheme(self.url))
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}
