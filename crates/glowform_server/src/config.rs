//! Environment-driven server configuration.
//!
//! Every key falls back to a default when unset. A value that is set but
//! cannot be parsed is a startup error.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use axum::http::HeaderValue;
use log::info;
use thiserror::Error;

pub const PORT_KEY: &str = "GLOWFORM_PORT";
pub const DATABASE_PATH_KEY: &str = "GLOWFORM_DATABASE_PATH";
pub const ALLOWED_ORIGINS_KEY: &str = "GLOWFORM_ALLOWED_ORIGINS";
pub const LOG_LEVEL_KEY: &str = "GLOWFORM_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "GLOWFORM_LOG_DIR";
pub const SECURE_COOKIES_KEY: &str = "GLOWFORM_SECURE_COOKIES";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_PATH: &str = "glowform.sqlite3";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<HeaderValue>,
    /// `None` uses the build-mode default.
    pub log_level: Option<String>,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    /// Adds `Secure` to session cookies.
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            allowed_origins: Vec::new(),
            log_level: None,
            log_dir: None,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match var(PORT_KEY) {
            Some(raw) => parse(PORT_KEY, &raw)?,
            None => defaults.port,
        };
        let database_path = var(DATABASE_PATH_KEY)
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        let allowed_origins = match var(ALLOWED_ORIGINS_KEY) {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.allowed_origins,
        };
        let secure_cookies = match var(SECURE_COOKIES_KEY) {
            Some(raw) => parse_bool(SECURE_COOKIES_KEY, &raw)?,
            None => defaults.secure_cookies,
        };

        Ok(Self {
            port,
            database_path,
            allowed_origins,
            log_level: var(LOG_LEVEL_KEY),
            log_dir: var(LOG_DIR_KEY),
            secure_cookies,
        })
    }

    /// Logs effective values. Called once logging is up.
    pub fn log_summary(&self) {
        info!(
            "event=config_load module=server status=ok port={} database_path={} allowed_origins={} log_dir={} secure_cookies={}",
            self.port,
            self.database_path.display(),
            if self.allowed_origins.is_empty() {
                "any".to_string()
            } else {
                self.allowed_origins.len().to_string()
            },
            self.log_dir.as_deref().unwrap_or("stderr"),
            self.secure_cookies
        );
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|err| ConfigError::Invalid {
                key: ALLOWED_ORIGINS_KEY,
                value: origin.to_string(),
                reason: err.to_string(),
            })
        })
        .collect()
}
