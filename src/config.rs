//! Process configuration, read once from the environment at start-up.

use crate::auth::{Tier, TierPolicy};
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./propdata_data/propdata.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    /// sea-orm connection string
    pub database_url: String,

    pub http_host: IpAddr,
    pub http_port: u16,

    /// Directory for the rolling log files
    pub log_dir: String,

    /// Quota per tier, defaults overridden by `TIER_LIMIT_*`
    pub tier_policy: TierPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let http_host = lookup("HTTP_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_HOST"))?;

        let http_port = lookup("HTTP_PORT")
            .unwrap_or_else(|| "7200".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let log_dir = lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string());

        let mut tier_policy = TierPolicy::default();
        for (tier, var) in [
            (Tier::Free, "TIER_LIMIT_FREE"),
            (Tier::Basic, "TIER_LIMIT_BASIC"),
            (Tier::Pro, "TIER_LIMIT_PRO"),
            (Tier::Enterprise, "TIER_LIMIT_ENTERPRISE"),
        ] {
            if let Some(raw) = lookup(var) {
                let limit: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid(var))?;
                if limit <= 0 {
                    return Err(ConfigError::Invalid(var));
                }
                tier_policy = tier_policy.with_limit(tier, limit);
            }
        }

        Ok(Self {
            database_url,
            http_host,
            http_port,
            log_dir,
            tier_policy,
        })
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
