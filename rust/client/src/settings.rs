use crate::transport::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:3000/ws";

/// Connection and session settings shared by every session in the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    /// Websocket endpoint of the table server (`ws://` or `wss://`)
    pub server_url: String,
    /// Cap on retained chat lines; `None` keeps every line
    pub chat_history_limit: Option<usize>,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            chat_history_limit: None,
            reconnect_initial_ms: 250,
            reconnect_max_ms: 10_000,
        }
    }
}

impl ClientSettings {
    /// Validate settings values
    pub fn validate(&self) -> Result<(), SettingsError> {
        parse_server_url(&self.server_url)?;

        if self.reconnect_initial_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "reconnect_initial_ms must be greater than 0".to_string(),
            ));
        }

        if self.reconnect_max_ms < self.reconnect_initial_ms {
            return Err(SettingsError::InvalidValue(
                "reconnect_max_ms must not be below reconnect_initial_ms".to_string(),
            ));
        }

        if self.chat_history_limit == Some(0) {
            return Err(SettingsError::InvalidValue(
                "chat_history_limit must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial: Duration::from_millis(self.reconnect_initial_ms),
            max: Duration::from_millis(self.reconnect_max_ms),
            ..ReconnectPolicy::default()
        }
    }
}

/// Parses a server URL and requires a websocket scheme.
pub fn parse_server_url(raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw).map_err(|e| SettingsError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(SettingsError::InvalidUrl(format!(
            "{}: scheme `{}` is not ws or wss",
            raw, other
        ))),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
    #[error("Invalid server URL {0}")]
    InvalidUrl(String),
}
