use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных. Без DATABASE_URL работаем на in-memory хранилище
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки JWT
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Config {
            app: AppConfig {
                host: var("HOST", "0.0.0.0"),
                port: parse("PORT", var("PORT", "8000"))?,
                environment: var("ENVIRONMENT", "development"),
                rust_log: var("RUST_LOG", "community_events=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                pool_size: parse("DB_POOL_SIZE", var("DB_POOL_SIZE", "20"))?,
            },
            jwt: JwtConfig {
                secret: lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
                expires_in_hours: token_lifetime(var("JWT_EXPIRES_IN_HOURS", "24"))?,
            },
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

// Токен живёт от часа до года
const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 366;

fn token_lifetime(value: String) -> Result<i64, ConfigError> {
    let hours: i64 = parse("JWT_EXPIRES_IN_HOURS", value.clone())?;
    if !(1..=MAX_TOKEN_LIFETIME_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid { name: "JWT_EXPIRES_IN_HOURS", value });
    }
    Ok(hours)
}
