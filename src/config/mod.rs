use chrono_tz::Tz;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub jwt: JwtConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// `fmt` or `json`
    pub log_format: String,
    /// Time zone used to interpret naive show times and the `date` filter.
    pub time_zone: Tz,
}

// Настройки базы данных. Без DATABASE_URL используется in-memory хранилище
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки Redis (кеш авторизации, опционально)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub auth_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

// Настройки JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = optional(name).unwrap_or_else(|| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed("PORT", "8000")?,
                environment: optional("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                rust_log: optional("RUST_LOG")
                    .unwrap_or_else(|| "cinema_api=debug,tower_http=debug".to_string()),
                log_format: optional("LOG_FORMAT").unwrap_or_else(|| "fmt".to_string()),
                time_zone: parsed("TIME_ZONE", "UTC")?,
            },
            database: DatabaseConfig {
                url: optional("DATABASE_URL"),
                pool_size: parsed("DB_POOL_SIZE", "20")?,
            },
            redis: RedisConfig {
                url: optional("REDIS_URL"),
                auth_cache_ttl_seconds: parsed("AUTH_CACHE_TTL_SECONDS", "300")?,
            },
            auth: AuthConfig {
                bcrypt_cost: parsed("BCRYPT_COST", "12")?,
                admin_email: optional("ADMIN_EMAIL"),
                admin_password: optional("ADMIN_PASSWORD"),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                expires_in_hours: parsed("JWT_EXPIRES_IN_HOURS", "24")?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }
}
