//! Layered configuration for the `pokerfelt` binary.
//!
//! Values resolve in this order, later layers winning:
//!
//! 1. built-in defaults
//! 2. the TOML file named by `POKERFELT_CONFIG`
//! 3. `POKERFELT_*` environment variables
//! 4. command-line flags
//!
//! Every value remembers which layer it came from so `pokerfelt cfg` can show it.

use pokerfelt_client::settings::{ClientSettings, DEFAULT_SERVER_URL};
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "POKERFELT_CONFIG";
pub const SERVER_URL_ENV: &str = "POKERFELT_SERVER_URL";
pub const CHAT_HISTORY_LIMIT_ENV: &str = "POKERFELT_CHAT_HISTORY_LIMIT";
pub const RECONNECT_INITIAL_MS_ENV: &str = "POKERFELT_RECONNECT_INITIAL_MS";
pub const RECONNECT_MAX_MS_ENV: &str = "POKERFELT_RECONNECT_MAX_MS";
pub const RECORD_PATH_ENV: &str = "POKERFELT_RECORD_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub server_url: String,
    pub chat_history_limit: Option<usize>,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    pub record_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            chat_history_limit: client.chat_history_limit,
            reconnect_initial_ms: client.reconnect_initial_ms,
            reconnect_max_ms: client.reconnect_max_ms,
            record_path: None,
        }
    }
}

impl Config {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            server_url: self.server_url.clone(),
            chat_history_limit: self.chat_history_limit,
            reconnect_initial_ms: self.reconnect_initial_ms,
            reconnect_max_ms: self.reconnect_max_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub server_url: ValueSource,
    pub chat_history_limit: ValueSource,
    pub reconnect_initial_ms: ValueSource,
    pub reconnect_max_ms: ValueSource,
    pub record_path: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            server_url: ValueSource::Default,
            chat_history_limit: ValueSource::Default,
            reconnect_initial_ms: ValueSource::Default,
            reconnect_max_ms: ValueSource::Default,
            record_path: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub server_url: Option<String>,
    pub record_path: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_with_overrides(&FlagOverrides::default())
}

pub fn load_with_overrides(flags: &FlagOverrides) -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.server_url {
            cfg.server_url = v;
            sources.server_url = ValueSource::File;
        }
        if let Some(v) = f.chat_history_limit {
            cfg.chat_history_limit = Some(v);
            sources.chat_history_limit = ValueSource::File;
        }
        if let Some(v) = f.reconnect_initial_ms {
            cfg.reconnect_initial_ms = v;
            sources.reconnect_initial_ms = ValueSource::File;
        }
        if let Some(v) = f.reconnect_max_ms {
            cfg.reconnect_max_ms = v;
            sources.reconnect_max_ms = ValueSource::File;
        }
        if let Some(v) = f.record_path {
            cfg.record_path = Some(v);
            sources.record_path = ValueSource::File;
        }
    }

    if let Some(url) = env_value(SERVER_URL_ENV) {
        cfg.server_url = url;
        sources.server_url = ValueSource::Env;
    }
    if let Some(limit) = env_value(CHAT_HISTORY_LIMIT_ENV) {
        cfg.chat_history_limit = Some(parse_number(CHAT_HISTORY_LIMIT_ENV, &limit)?);
        sources.chat_history_limit = ValueSource::Env;
    }
    if let Some(ms) = env_value(RECONNECT_INITIAL_MS_ENV) {
        cfg.reconnect_initial_ms = parse_number(RECONNECT_INITIAL_MS_ENV, &ms)?;
        sources.reconnect_initial_ms = ValueSource::Env;
    }
    if let Some(ms) = env_value(RECONNECT_MAX_MS_ENV) {
        cfg.reconnect_max_ms = parse_number(RECONNECT_MAX_MS_ENV, &ms)?;
        sources.reconnect_max_ms = ValueSource::Env;
    }
    if let Some(path) = env_value(RECORD_PATH_ENV) {
        cfg.record_path = Some(path);
        sources.record_path = ValueSource::Env;
    }

    if let Some(url) = &flags.server_url {
        cfg.server_url = url.clone();
        sources.server_url = ValueSource::Flag;
    }
    if let Some(path) = &flags.record_path {
        cfg.record_path = Some(path.clone());
        sources.record_path = ValueSource::Flag;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    server_url: Option<String>,
    #[serde(default)]
    chat_history_limit: Option<usize>,
    #[serde(default)]
    reconnect_initial_ms: Option<u64>,
    #[serde(default)]
    reconnect_max_ms: Option<u64>,
    #[serde(default)]
    record_path: Option<String>,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", name, raw)))
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.client_settings()
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))?;
    if cfg.record_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "Invalid configuration: record_path must not be blank".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.client_settings(), ClientSettings::default());
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        let parsed: Result<FileConfig, _> = toml::from_str("server = \"ws://x\"");
        assert!(parsed.is_err());
        let parsed: FileConfig =
            toml::from_str("server_url = \"ws://x/ws\"\nreconnect_max_ms = 500").unwrap();
        assert_eq!(parsed.server_url.as_deref(), Some("ws://x/ws"));
        assert_eq!(parsed.reconnect_max_ms, Some(500));
    }

    #[test]
    fn invalid_values_are_reported() {
        let cfg = Config {
            server_url: "http://example.com".into(),
            ..Config::default()
        };
        let msg = validate(&cfg).unwrap_err().to_string();
        assert!(msg.contains("Invalid configuration"), "{}", msg);

        let cfg = Config {
            reconnect_initial_ms: 0,
            ..Config::default()
        };
        assert!(validate(&cfg).is_err());

        let cfg = Config {
            record_path: Some("  ".into()),
            ..Config::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn number_parse_errors_name_the_variable() {
        let err = parse_number::<u64>(RECONNECT_MAX_MS_ENV, "soon").unwrap_err();
        assert!(err.to_string().contains(RECONNECT_MAX_MS_ENV));
    }
}
