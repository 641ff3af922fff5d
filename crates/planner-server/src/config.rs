use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use planner_api::token::DEFAULT_TOKEN_TTL_HOURS;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "brm5_secret_key",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub addr: SocketAddr,
    pub store: StoreBackend,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("PLANNER_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PLANNER_JWT_SECRET is unset or still a placeholder");
        }

        let host = get("PLANNER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("PLANNER_PORT")
            .unwrap_or_else(|| "8787".into())
            .parse()
            .context("PLANNER_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("PLANNER_HOST must be an IP address")?;

        let store = match get("PLANNER_STORE").as_deref().unwrap_or("sqlite") {
            "sqlite" => StoreBackend::Sqlite(
                get("PLANNER_DB_PATH")
                    .unwrap_or_else(|| "planner.db".into())
                    .into(),
            ),
            "memory" => StoreBackend::Memory,
            other => bail!("PLANNER_STORE must be 'sqlite' or 'memory', got '{}'", other),
        };

        let ttl_hours: i64 = match get("PLANNER_TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|h| *h > 0)
                .context("PLANNER_TOKEN_TTL_HOURS must be a positive number of hours")?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            jwt_secret,
            addr,
            store,
            token_ttl: Duration::hours(ttl_hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("PLANNER_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:8787".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.store, StoreBackend::Sqlite("planner.db".into()));
        assert_eq!(cfg.token_ttl, Duration::days(7));
    }

    #[test]
    fn refuses_missing_or_placeholder_secret() {
        assert!(config(&[]).is_err());
        assert!(config(&[("PLANNER_JWT_SECRET", "brm5_secret_key")]).is_err());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("PLANNER_JWT_SECRET", "s3cret"),
            ("PLANNER_HOST", "127.0.0.1"),
            ("PLANNER_PORT", "9000"),
            ("PLANNER_STORE", "memory"),
            ("PLANNER_TOKEN_TTL_HOURS", "1"),
        ])
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.store, StoreBackend::Memory);
        assert_eq!(cfg.token_ttl, Duration::hours(1));
    }

    #[test]
    fn rejects_bad_values() {
        let secret = ("PLANNER_JWT_SECRET", "s3cret");
        assert!(config(&[secret, ("PLANNER_PORT", "http")]).is_err());
        assert!(config(&[secret, ("PLANNER_STORE", "redis")]).is_err());
        assert!(config(&[secret, ("PLANNER_TOKEN_TTL_HOURS", "0")]).is_err());
    }
}
