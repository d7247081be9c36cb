//! Service configuration
//!
//! Built once at startup and carried in the application state. Sources, from
//! lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. an optional `contactbook.toml` (or `.yaml`, `.json`) in the working directory
//! 3. `CONTACTBOOK__<SECTION>__<KEY>` environment variables
//! 4. the conventional `PORT`, `DATABASE_URL` and `JWT_SECRET` variables

use std::env;

use common::database::DatabaseConfig;
use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::store::NameFilterMode;

const ENV_PREFIX: &str = "CONTACTBOOK";
const CONFIG_FILE: &str = "contactbook";

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
}

/// Contact query behaviour
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactsConfig {
    #[serde(default)]
    pub name_filter: NameFilterMode,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub contacts: ContactsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            jwt: JwtConfig {
                secret: "contactbook-secret-key".to_string(),
            },
            contacts: ContactsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the file, environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("app.host", defaults.app.host)?
            .set_default("app.port", i64::from(defaults.app.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default("jwt.secret", defaults.jwt.secret)?
            .set_default("contacts.name_filter", "pattern")?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("app.port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()
    }
}
