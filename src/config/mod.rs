pub mod session;

use std::{
    env,
    net::{IpAddr, Ipv4Addr},
};

pub use session::{validate_production_config, SessionConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://a.db?mode=rwc";
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Drop and recreate the users table at startup.
    pub reset_database: bool,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let host = match env::var("HOST") {
            Ok(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidValue { key: "HOST", value })?,
            Err(_) => DEFAULT_HOST,
        };

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            Err(_) => DEFAULT_PORT,
        };

        let reset_database = match env::var("RESET_DATABASE") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: "RESET_DATABASE",
                value,
            })?,
            Err(_) => true,
        };

        Ok(AppConfig {
            database_url,
            host,
            port,
            reset_database,
            session: SessionConfig::from_env(),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" => Some(true),
        "0" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

pub(crate) fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(false)
}
