//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use lending_ledger_core::LendingPolicy;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub policy: LendingPolicy,
    pub seed_demo_data: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address: SocketAddr = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:3000".parse().ok())?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Lending Policy ---
        let defaults = LendingPolicy::default();
        let daily_fine_rate: f64 = parse_or(&lookup, "FINE_PER_DAY", Some(defaults.daily_fine_rate))?;
        if !daily_fine_rate.is_finite() || daily_fine_rate < 0.0 {
            return Err(ConfigError::InvalidValue(
                "FINE_PER_DAY".to_string(),
                "must be a non-negative amount".to_string(),
            ));
        }
        let borrow_period_days: u32 =
            parse_or(&lookup, "BORROW_PERIOD_DAYS", Some(defaults.borrow_period_days))?;
        let max_loans_per_user: u32 =
            parse_or(&lookup, "MAX_BOOKS_PER_USER", Some(defaults.max_loans_per_user))?;
        for (var, value) in [
            ("BORROW_PERIOD_DAYS", borrow_period_days),
            ("MAX_BOOKS_PER_USER", max_loans_per_user),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(
                    var.to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }

        let seed_demo_data = parse_or(&lookup, "SEED_DEMO_DATA", Some(false))?;

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            policy: LendingPolicy {
                daily_fine_rate,
                borrow_period_days,
                max_loans_per_user,
            },
            seed_demo_data,
        })
    }
}

/// Parses `var` when set, otherwise falls back to `default`.
fn parse_or<T, F>(lookup: &F, var: &str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        None => default.ok_or_else(|| ConfigError::MissingVar(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.policy, LendingPolicy::default());
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn policy_values_are_read() {
        let config = config_from(&[
            ("FINE_PER_DAY", "0.25"),
            ("BORROW_PERIOD_DAYS", "14"),
            ("MAX_BOOKS_PER_USER", "3"),
            ("SEED_DEMO_DATA", "true"),
        ])
        .unwrap();
        assert_eq!(config.policy.daily_fine_rate, 0.25);
        assert_eq!(config.policy.borrow_period_days, 14);
        assert_eq!(config.policy.max_loans_per_user, 3);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("FINE_PER_DAY", "-1")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "FINE_PER_DAY"
        ));
        assert!(matches!(
            config_from(&[("BORROW_PERIOD_DAYS", "0")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "BORROW_PERIOD_DAYS"
        ));
        assert!(config_from(&[("BIND_ADDRESS", "nowhere")]).is_err());
        assert!(config_from(&[("RUST_LOG", "chatty")]).is_err());
    }
}
