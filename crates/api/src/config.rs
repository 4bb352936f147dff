//! Process configuration, read from the environment (and an optional `.env`).

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use accessgate_auth::{AccessPolicy, Hs256TokenService};
use accessgate_observability::{LogFormat, LogSettings};

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Postgres when set, in-memory stores otherwise.
    pub database_url: Option<String>,
    pub policy: AccessPolicy,
    /// `None` keeps the argon2 defaults.
    pub hash_cost: Option<HashCost>,
    pub log: LogSettings,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e: std::net::AddrParseError| {
                invalid("BIND_ADDR", &raw, e.to_string())
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let token_ttl = match get("TOKEN_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => Duration::hours(hours),
                Ok(_) => return Err(invalid("TOKEN_TTL_HOURS", &raw, "must be positive")),
                Err(e) => return Err(invalid("TOKEN_TTL_HOURS", &raw, e.to_string())),
            },
            None => Duration::hours(Hs256TokenService::DEFAULT_TTL_HOURS),
        };

        let managers_may_request = match get("MANAGERS_MAY_REQUEST") {
            Some(raw) => parse_bool("MANAGERS_MAY_REQUEST", &raw)?,
            None => false,
        };

        let hash_cost = match (get("ARGON2_MEMORY_KIB"), get("ARGON2_ITERATIONS")) {
            (None, None) => None,
            (memory, iterations) => Some(HashCost {
                memory_kib: parse_u32("ARGON2_MEMORY_KIB", memory.as_deref(), 19 * 1024)?,
                iterations: parse_u32("ARGON2_ITERATIONS", iterations.as_deref(), 2)?,
            }),
        };

        let format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| invalid("LOG_FORMAT", &raw, reason))?,
            None => LogFormat::Json,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            database_url: get("DATABASE_URL"),
            policy: AccessPolicy::new(managers_may_request),
            hash_cost,
            log: LogSettings {
                default_directive: "info".to_string(),
                format,
            },
        })
    }

    /// In-memory configuration with cheap hashing, for tests and local runs.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.to_string(),
            token_ttl: Duration::hours(Hs256TokenService::DEFAULT_TTL_HOURS),
            database_url: None,
            policy: AccessPolicy::default(),
            hash_cost: Some(HashCost {
                memory_kib: 1024,
                iterations: 1,
            }),
            log: LogSettings::default(),
        }
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw, "expected true or false")),
    }
}

fn parse_u32(var: &'static str, raw: Option<&str>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| invalid(var, raw, e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.database_url, None);
        assert_eq!(config.policy, AccessPolicy::default());
        assert_eq!(config.hash_cost, None);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "2"),
            ("DATABASE_URL", "postgres://localhost/accessgate"),
            ("MANAGERS_MAY_REQUEST", "yes"),
            ("ARGON2_MEMORY_KIB", "4096"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl, Duration::hours(2));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/accessgate"));
        assert_eq!(config.policy, AccessPolicy::new(true));
        assert_eq!(
            config.hash_cost,
            Some(HashCost {
                memory_kib: 4096,
                iterations: 2
            })
        );
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("DATABASE_URL", "  "), ("JWT_SECRET", "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        for (var, value) in [
            ("BIND_ADDR", "not-an-addr"),
            ("TOKEN_TTL_HOURS", "0"),
            ("TOKEN_TTL_HOURS", "soon"),
            ("MANAGERS_MAY_REQUEST", "maybe"),
            ("ARGON2_ITERATIONS", "-1"),
            ("LOG_FORMAT", "xml"),
        ] {
            let err = load(&[(var, value)]).unwrap_err();
            let ConfigError::Invalid { var: got, .. } = &err;
            assert_eq!(*got, var, "{err}");
        }
    }
}
