//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use storefront_core::UserId;
use storefront_infra::StoreConfig;
use storefront_observability::{LogConfig, LogFormat};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

fn invalid(var: &'static str, message: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        message: message.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// True when `jwt_secret` is the built-in development default.
    pub insecure_jwt_secret: bool,
    pub store: StoreConfig,
    pub log: LogConfig,
    /// Seed demo products (in-memory stores only).
    pub seed_catalog: bool,
    /// Owner recorded as creator of seeded products; random when unset.
    pub seed_owner: Option<UserId>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", e))?;

        let development = get("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("development"));
        let (jwt_secret, insecure_jwt_secret) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if development => (DEV_JWT_SECRET.to_string(), true),
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("DATABASE_MAX_CONNECTIONS", format!("'{raw}' is not a positive integer")))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| invalid("LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        let seed_catalog = match get("SEED_CATALOG") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("SEED_CATALOG", format!("'{raw}' is not a boolean")))?,
            None => false,
        };

        let seed_owner = get("SEED_OWNER_ID")
            .map(|raw| raw.parse::<UserId>().map_err(|e| invalid("SEED_OWNER_ID", e)))
            .transpose()?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            insecure_jwt_secret,
            store: StoreConfig {
                database_url: get("DATABASE_URL"),
                max_connections,
            },
            log: LogConfig {
                format,
                ..LogConfig::default()
            },
            seed_catalog,
            seed_owner,
        })
    }

    /// In-memory configuration with the given secret (tests and local tooling).
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            insecure_jwt_secret: false,
            store: StoreConfig::in_memory(),
            log: LogConfig::default(),
            seed_catalog: false,
            seed_owner: None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_with_only_a_secret() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.store.database_url, None);
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(!config.seed_catalog);
        assert!(!config.insecure_jwt_secret);
    }

    #[test]
    fn secret_is_required_outside_development() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));

        let config = load(&[("APP_ENV", "development")]).unwrap();
        assert!(config.insecure_jwt_secret);
        assert_eq!(config.jwt_secret, "dev-secret");
    }

    #[test]
    fn reads_database_and_logging_settings() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://shop@localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("LOG_FORMAT", "pretty"),
            ("SEED_CATALOG", "true"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.store.is_persistent());
        assert_eq!(config.store.max_connections, 12);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert!(config.seed_catalog);
    }

    #[test]
    fn rejects_invalid_values() {
        for (var, value) in [
            ("BIND_ADDR", "not-an-addr"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("LOG_FORMAT", "xml"),
            ("SEED_CATALOG", "maybe"),
            ("SEED_OWNER_ID", "nope"),
        ] {
            let err = load(&[("JWT_SECRET", "s3cret"), (var, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { var: v, .. } if v == var),
                "{var}={value} gave {err:?}"
            );
        }
    }
}
