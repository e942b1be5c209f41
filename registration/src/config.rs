use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter;

use crate::session::{SessionSettings, DEFAULT_LOGIN_PATH, DEFAULT_TOKEN_COOKIE};

pub const DEFAULT_FILE_NAME: &str = "registration.toml";

fn default_token_cookie() -> String {
    DEFAULT_TOKEN_COOKIE.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Endpoint of the GraphQL API exposing the registration mutation.
    pub graphql_url: String,
    #[serde(default = "default_token_cookie")]
    pub token_cookie: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_login_path")]
    pub registered_path: String,
    /// log level, can be "info", "debug", "trace".
    pub log_level: Option<String>,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new(graphql_url: String) -> Self {
        Self {
            graphql_url,
            token_cookie: default_token_cookie(),
            login_path: default_login_path(),
            registered_path: default_login_path(),
            log_level: None,
            log_file: None,
        }
    }

    /// Read and validate the configuration at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read(e.to_string()),
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<filter::LevelFilter, ConfigError> {
        match self.log_level.as_deref() {
            None | Some("info") => Ok(filter::LevelFilter::INFO),
            Some("debug") => Ok(filter::LevelFilter::DEBUG),
            Some("trace") => Ok(filter::LevelFilter::TRACE),
            Some(level) => Err(ConfigError::InvalidField(
                "log_level",
                format!("Unknown value '{}'", level),
            )),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            token_cookie: self.token_cookie.clone(),
            login_path: self.login_path.clone(),
            registered_path: self.registered_path.clone(),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ConfigError {
    NotFound(PathBuf),
    NoConfigDir,
    Read(String),
    Parse(String),
    InvalidField(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "No configuration file at {}", path.display()),
            Self::NoConfigDir => write!(f, "Could not locate the configuration directory"),
            Self::Read(e) => write!(f, "Reading configuration file: {}", e),
            Self::Parse(e) => write!(f, "Parsing configuration file: {}", e),
            Self::InvalidField(field, message) => {
                write!(f, "Config field {} is invalid: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// `~/.registration/registration.toml` on Linux, `<config dir>/Registration/registration.toml`
/// elsewhere.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    #[cfg(target_os = "linux")]
    let mut path = dirs::home_dir().ok_or(ConfigError::NoConfigDir)?;
    #[cfg(target_os = "linux")]
    path.push(".registration");

    #[cfg(not(target_os = "linux"))]
    let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    #[cfg(not(target_os = "linux"))]
    path.push("Registration");

    path.push(DEFAULT_FILE_NAME);
    Ok(path)
}
