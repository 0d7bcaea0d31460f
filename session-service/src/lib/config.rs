use std::env;

use auth::TokenLifetimes;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Prefix every route is mounted under, e.g. `/v1`.
    pub root_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    pub backend: DirectoryBackend,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    Postgres,
    Memory,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SECURITY__SECRET_KEY, DATABASE__HOST, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: SECURITY__ACCESS_TOKEN_EXPIRE_MINUTES=15
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins"),
            );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.token_lifetimes()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.http_port", 8000)?
            .set_default("server.root_path", "/v1")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.username", "postgres")?
            .set_default("database.password", "postgres")?
            .set_default("database.name", "postgres")?
            .set_default("database.max_connections", 15)?
            .set_default("security.secret_key", "SECRET")?
            .set_default("security.algorithm", "HS256")?
            .set_default("security.access_token_expire_minutes", 30)?
            .set_default("security.refresh_token_expire_days", 30)?
            .set_default("security.cors_origins", vec!["http://localhost:8000"])?
            .set_default("directory.backend", "postgres")
    }

    /// Postgres connection URL assembled from the database section.
    pub fn database_url(&self) -> String {
        let db = &self.database;
        format!(
            "postgres://{}:{}@{}:{}/{}",
            db.username, db.password, db.host, db.port, db.name
        )
    }

    /// Token lifetimes from the security section.
    ///
    /// # Errors
    /// * `ConfigError::Message` - A lifetime is not positive or exceeds its
    ///   upper bound
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        let security = &self.security;

        let access = bounded_lifetime(
            "security.access_token_expire_minutes",
            security.access_token_expire_minutes,
            MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
            Duration::try_minutes,
        )?;
        let refresh = bounded_lifetime(
            "security.refresh_token_expire_days",
            security.refresh_token_expire_days,
            MAX_REFRESH_TOKEN_EXPIRE_DAYS,
            Duration::try_days,
        )?;

        Ok(TokenLifetimes::new(access, refresh))
    }
}

/// One year.
const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;
/// Ten years.
const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 365 * 10;

fn bounded_lifetime(
    key: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if value <= 0 || value > max {
        return Err(ConfigError::Message(format!(
            "{} must be between 1 and {}, got {}",
            key, max, value
        )));
    }

    to_duration(value)
        .ok_or_else(|| ConfigError::Message(format!("{} is out of range: {}", key, value)))
}
