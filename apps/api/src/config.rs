//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory, if present, is read
//! first; variables already set in the environment win.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core::{CheckoutLimits, CheckoutPolicy, MAX_CHECKOUT_ITEMS, MAX_ITEM_QUANTITY};
use storefront_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// HTTP bind address
    pub host: IpAddr,

    /// SQLite file, or `:memory:`
    pub database_path: String,

    /// Pool upper bound
    pub db_max_connections: u32,

    /// Connections retained when idle
    pub db_min_connections: u32,

    /// Pool acquire timeout in seconds
    pub db_acquire_timeout_secs: u64,

    /// Wait on a locked database file, in seconds
    pub db_busy_timeout_secs: u64,

    /// Reject instead of skipping/clamping at checkout
    pub checkout_strict: bool,

    /// Most lines accepted in one checkout
    pub checkout_max_items: usize,

    /// Largest quantity accepted on one checkout line
    pub checkout_max_quantity: i64,
}

impl ApiConfig {
    /// Load configuration from `.env` (if any) and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: parse_var("APP_PORT", "8080")?,
            host: parse_var("APP_HOST", "0.0.0.0")?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./storefront.db".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "25")?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", "5")?,
            db_acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", "30")?,
            db_busy_timeout_secs: parse_var("DB_BUSY_TIMEOUT_SECS", "30")?,
            checkout_strict: parse_var("CHECKOUT_STRICT", "false")?,
            checkout_max_items: parse_var("CHECKOUT_MAX_ITEMS", &MAX_CHECKOUT_ITEMS.to_string())?,
            checkout_max_quantity: parse_var(
                "CHECKOUT_MAX_QUANTITY",
                &MAX_ITEM_QUANTITY.to_string(),
            )?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Rejects values that parse but cannot work.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if self.checkout_max_items == 0 {
            return Err(ConfigError::InvalidValue("CHECKOUT_MAX_ITEMS".to_string()));
        }

        if self.checkout_max_quantity < 1 {
            return Err(ConfigError::InvalidValue("CHECKOUT_MAX_QUANTITY".to_string()));
        }

        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_PATH".to_string()));
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Checkout policy selected by `CHECKOUT_STRICT`.
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        if self.checkout_strict {
            CheckoutPolicy::Strict
        } else {
            CheckoutPolicy::Lenient
        }
    }

    /// Per-request checkout caps from `CHECKOUT_MAX_ITEMS` and
    /// `CHECKOUT_MAX_QUANTITY`.
    pub fn checkout_limits(&self) -> CheckoutLimits {
        CheckoutLimits::new(self.checkout_max_items, self.checkout_max_quantity)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.database_path == storefront_db::pool::IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path)
                .max_connections(self.db_max_connections)
                .min_connections(self.db_min_connections)
        };

        base.connect_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
            .busy_timeout(Duration::from_secs(self.db_busy_timeout_secs))
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            port: 8080,
            host: IpAddr::from([0, 0, 0, 0]),
            database_path: "./storefront.db".to_string(),
            db_max_connections: 25,
            db_min_connections: 5,
            db_acquire_timeout_secs: 30,
            db_busy_timeout_secs: 30,
            checkout_strict: false,
            checkout_max_items: MAX_CHECKOUT_ITEMS,
            checkout_max_quantity: MAX_ITEM_QUANTITY,
        }
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(config().bind_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_checkout_policy() {
        let mut cfg = config();
        assert_eq!(cfg.checkout_policy(), CheckoutPolicy::Lenient);
        cfg.checkout_strict = true;
        assert_eq!(cfg.checkout_policy(), CheckoutPolicy::Strict);
    }

    #[test]
    fn test_db_config_bounds() {
        let db = config().db_config();
        assert_eq!(db.max_connections, 25);
        assert_eq!(db.min_connections, 5);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
        assert_eq!(db.busy_timeout, Duration::from_secs(30));

        let mut cfg = config();
        cfg.database_path = ":memory:".to_string();
        let db = cfg.db_config();
        assert!(db.is_in_memory());
        assert_eq!(db.max_connections, 1);
    }

    #[test]
    fn test_checkout_limits() {
        assert_eq!(config().checkout_limits(), CheckoutLimits::default());

        let mut cfg = config();
        cfg.checkout_max_items = 250;
        cfg.checkout_max_quantity = 5000;
        assert_eq!(cfg.checkout_limits(), CheckoutLimits::new(250, 5000));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unusable_limits_are_rejected() {
        let mut cfg = config();
        cfg.checkout_max_items = 0;
        assert_eq!(
            cfg.validate().unwrap_err().to_string(),
            "Invalid value for CHECKOUT_MAX_ITEMS"
        );

        let mut cfg = config();
        cfg.checkout_max_quantity = 0;
        assert_eq!(
            cfg.validate().unwrap_err().to_string(),
            "Invalid value for CHECKOUT_MAX_QUANTITY"
        );
    }

    #[test]
    fn test_parse_var_default_and_invalid() {
        let port: u16 = parse_var("STOREFRONT_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let err = parse_var::<u16>("STOREFRONT_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for STOREFRONT_TEST_UNSET_PORT");
    }
}
