use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SUCCESS_STATUSES: [u16; 3] = [200, 201, 202];

/// Connection settings for one game client.
///
/// Passed explicitly to the client at construction so several clients can
/// point at different servers in the same process.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base address of the game server (`host:port` or a full `http://` URL)
    pub server_address: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Status codes treated as success; anything else is a protocol error
    pub success_statuses: Vec<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            success_statuses: DEFAULT_SUCCESS_STATUSES.to_vec(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// - `GAME_SERVER_ADDRESS`
    /// - `GAME_CLIENT_TIMEOUT_SECS` (`0` disables the timeout)
    /// - `GAME_CLIENT_SUCCESS_STATUSES` (comma separated, e.g. `200,201`)
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(address) = optional_var("GAME_SERVER_ADDRESS") {
            config.server_address = address;
        }
        if let Some(raw) = optional_var("GAME_CLIENT_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(raw) = optional_var("GAME_CLIENT_SUCCESS_STATUSES") {
            config.success_statuses = parse_statuses(&raw)?;
        }

        Ok(config)
    }

    pub fn with_server_address(mut self, address: impl Into<String>) -> Self {
        self.server_address = address.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_success_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.success_statuses = statuses.into();
        self
    }

    pub fn is_success(&self, status: u16) -> bool {
        self.success_statuses.contains(&status)
    }

    /// Parse the server address into a base URL ending in `/`, so paths can
    /// be joined onto it. A missing scheme defaults to `http`.
    pub fn base_url(&self) -> Result<Url, ClientError> {
        let trimmed = self.server_address.trim();
        if trimmed.is_empty() {
            return Err(ClientError::config("server address must not be empty"));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        let normalized = if with_scheme.ends_with('/') {
            with_scheme
        } else {
            format!("{with_scheme}/")
        };

        let url = Url::parse(&normalized).map_err(|e| {
            ClientError::config(format!("invalid server address '{trimmed}': {e}"))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::config(format!(
                "unsupported scheme '{other}' in server address '{trimmed}'"
            ))),
        }
    }

    /// Check the whole configuration up front.
    pub fn validate(&self) -> Result<(), ClientError> {
        self.base_url()?;
        if self.success_statuses.is_empty() {
            return Err(ClientError::config(
                "at least one success status is required",
            ));
        }
        Ok(())
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ClientError> {
    let secs = raw.trim().parse::<u64>().map_err(|_| {
        ClientError::config(format!(
            "GAME_CLIENT_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
        ))
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_statuses(raw: &str) -> Result<Vec<u16>, ClientError> {
    let statuses = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Ok(code),
            _ => Err(ClientError::config(format!(
                "invalid HTTP status '{s}' in GAME_CLIENT_SUCCESS_STATUSES"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if statuses.is_empty() {
        return Err(ClientError::config(
            "GAME_CLIENT_SUCCESS_STATUSES must list at least one status",
        ));
    }
    Ok(statuses)
}
