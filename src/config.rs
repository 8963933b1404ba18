use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when absent
    #[serde(default)]
    pub database_dsn: Option<String>,
    /// Expose error details in 500 responses
    #[serde(default)]
    pub debug: bool,
    /// Fill an empty store with sample notes at startup
    #[serde(default)]
    pub seed: bool,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_dsn: None,
            debug: false,
            seed: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {name}: {reason}")]
    Env { name: &'static str, reason: String },
}

fn load_from_file(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Env {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Builds the config from `PG_DSN`, `NOTES_API_PORT`, `NOTES_API_DEBUG` and `NOTES_API_SEED`.
///
/// Every variable is optional; `lookup` stands in for `std::env::var`.
pub fn load_from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let mut config = Config {
        database_dsn: lookup("PG_DSN").filter(|dsn| !dsn.trim().is_empty()),
        ..Config::default()
    };

    if let Some(port) = lookup("NOTES_API_PORT") {
        config.port = port.trim().parse().map_err(|e| ConfigError::Env {
            name: "NOTES_API_PORT",
            reason: format!("{e}"),
        })?;
    }

    if let Some(debug) = lookup("NOTES_API_DEBUG") {
        config.debug = parse_flag("NOTES_API_DEBUG", &debug)?;
    }

    if let Some(seed) = lookup("NOTES_API_SEED") {
        config.seed = parse_flag("NOTES_API_SEED", &seed)?;
    }

    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env(|name| env::var(name).ok())
}
