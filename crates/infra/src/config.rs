//! Database configuration from the environment.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Read `DATABASE_URL` (required), `DATABASE_MAX_CONNECTIONS` and
    /// `DATABASE_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatabaseConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        let max_connections = match lookup(DATABASE_MAX_CONNECTIONS) {
            Some(raw) => parse_positive(DATABASE_MAX_CONNECTIONS, &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let acquire_timeout = match lookup(DATABASE_ACQUIRE_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_positive(DATABASE_ACQUIRE_TIMEOUT_SECS, &raw)?.into()),
            None => DEFAULT_ACQUIRE_TIMEOUT,
        };

        Ok(Self {
            url,
            max_connections,
            acquire_timeout,
        })
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn url_is_required() {
        assert_eq!(
            DatabaseConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(DATABASE_URL))
        );
        assert_eq!(
            DatabaseConfig::from_lookup(lookup(&[(DATABASE_URL, "  ")])),
            Err(ConfigError::Missing(DATABASE_URL))
        );
    }

    #[test]
    fn defaults_apply() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[(DATABASE_URL, "postgres://localhost/catalog")])).unwrap();
        assert_eq!(config, DatabaseConfig::new("postgres://localhost/catalog"));
    }

    #[test]
    fn reads_pool_settings() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            (DATABASE_URL, "postgres://localhost/catalog"),
            (DATABASE_MAX_CONNECTIONS, "12"),
            (DATABASE_ACQUIRE_TIMEOUT_SECS, " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_malformed_numbers() {
        for (key, value) in [
            (DATABASE_MAX_CONNECTIONS, "many"),
            (DATABASE_MAX_CONNECTIONS, "0"),
            (DATABASE_ACQUIRE_TIMEOUT_SECS, "-1"),
        ] {
            let err = DatabaseConfig::from_lookup(lookup(&[(DATABASE_URL, "postgres://x"), (key, value)]))
                .unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key,
                    value: value.to_string()
                }
            );
        }
    }
}
