use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;
use vocabot_core::{Languages, Settings};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where words and vocabularies are persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local tables; everything is lost on restart.
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub settings: Settings,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let backend_str = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string());
        let store_backend = match backend_str.to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("'{other}' is not one of 'postgres', 'memory'"),
                ));
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar(
                "DATABASE_URL must be set for the 'postgres' backend".to_string(),
            ));
        }

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", "10")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let quiz_options: usize = parse_var("QUIZ_OPTIONS", "4")?;
        if quiz_options == 0 {
            return Err(ConfigError::InvalidValue(
                "QUIZ_OPTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // Terms are stored in VARCHAR(255) columns.
        let max_term_length: usize = parse_var("MAX_TERM_LENGTH", "255")?;
        if !(1..=255).contains(&max_term_length) {
            return Err(ConfigError::InvalidValue(
                "MAX_TERM_LENGTH".to_string(),
                format!("{max_term_length} is outside 1..=255"),
            ));
        }

        let settings = Settings {
            quiz_options,
            words_per_page: parse_var("WORDS_PER_PAGE", "10")?,
            max_term_length,
            languages: Languages {
                native: std::env::var("NATIVE_LANGUAGE").unwrap_or_else(|_| "Russian".to_string()),
                target: std::env::var("TARGET_LANGUAGE").unwrap_or_else(|_| "English".to_string()),
            },
        };

        Ok(Self {
            bind_address,
            store_backend,
            database_url,
            db_max_connections,
            log_level,
            settings,
        })
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
