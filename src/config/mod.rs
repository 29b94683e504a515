use serde::Deserialize;
use std::{env, env::VarError, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnvVar(String),

    #[error("{var} has an invalid value: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    pub geolocation: GeolocationConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub cache: CacheConfig,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

// Where admin venue records live. PostgreSQL wins over a JSON file; with
// neither set records are kept in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
    pub venue_store_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
    /// Set when `JWT_SECRET` was absent and the development fallback is in use.
    #[serde(default)]
    pub uses_development_secret: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// bcrypt hash of the admin password.
    pub password_hash: Option<String>,
    /// Plain password, hashed at startup. Development convenience only.
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationConfig {
    pub provider_url: String,
    pub timeout_seconds: u64,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub search_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_admin: bool,
    pub enable_search_cache: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let vars = Vars { lookup };

        let app = AppConfig {
            host: vars.or("HOST", "0.0.0.0"),
            port: vars.parse_or("PORT", 8000)?,
            environment: vars.or("ENVIRONMENT", "development"),
            rust_log: vars.or("RUST_LOG", "futsal_finder=debug,tower_http=debug"),
        };

        let (jwt_secret, uses_development_secret) = match vars.optional("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if app.is_development() => ("futsal-finder-development-secret".to_string(), true),
            None => return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string())),
        };

        Ok(Config {
            database: DatabaseConfig {
                url: vars.optional("DATABASE_URL"),
                pool_size: vars.parse_or("DB_POOL_SIZE", 10)?,
                venue_store_path: vars.optional("VENUE_STORE_PATH"),
            },
            redis: RedisConfig {
                url: vars.optional("REDIS_URL"),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expires_in_hours: vars.parse_or("JWT_EXPIRES_IN_HOURS", 24)?,
                uses_development_secret,
            },
            admin: AdminConfig {
                password_hash: vars.optional("ADMIN_PASSWORD_HASH"),
                password: vars.optional("ADMIN_PASSWORD"),
            },
            geolocation: GeolocationConfig {
                provider_url: vars.or("GEOLOCATION_URL", "http://ip-api.com/json"),
                timeout_seconds: vars.parse_or("GEOLOCATION_TIMEOUT_SECONDS", 10)?,
                default_latitude: vars.parse_or("DEFAULT_LATITUDE", 27.7172)?,
                default_longitude: vars.parse_or("DEFAULT_LONGITUDE", 85.324)?,
                default_label: vars.or("DEFAULT_LOCATION_LABEL", "Kathmandu (Default)"),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: vars.parse_or("CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5)?,
                timeout_seconds: vars.parse_or("CIRCUIT_BREAKER_TIMEOUT_SECONDS", 60)?,
            },
            cache: CacheConfig {
                search_ttl_seconds: vars.parse_or("SEARCH_CACHE_TTL_SECONDS", 300)?,
            },
            features: FeatureFlags {
                enable_admin: vars.parse_or("ENABLE_ADMIN", true)?,
                enable_search_cache: vars.parse_or("ENABLE_SEARCH_CACHE", true)?,
            },
            app,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
