use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::order::TransitionPolicy;

// ============================================================================
// Configuration - environment variables, optionally from a .env file
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub service_host: String,
    pub service_port: u16,
    pub metrics_port: u16,
    pub db_max_connections: u32,
    pub staff_tokens: Vec<String>,
    pub default_shipping_cost: Decimal,
    pub status_policy: TransitionPolicy,
    pub health_check_interval: Duration,
}

impl AppConfig {
    /// Read the process environment, after loading `.env` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &'static str| lookup(var).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let default_shipping_cost: Decimal = parse_or(&get, "DEFAULT_SHIPPING_COST", Decimal::ZERO)?;
        if default_shipping_cost < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_SHIPPING_COST",
                value: default_shipping_cost.to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        let interval_secs: u64 = parse_or(&get, "HEALTH_CHECK_INTERVAL_SECS", 10)?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "HEALTH_CHECK_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            database_url,
            service_host: get("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            service_port: parse_or(&get, "SERVICE_PORT", 8000)?,
            metrics_port: parse_or(&get, "METRICS_PORT", 9090)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            staff_tokens: get("STAFF_API_TOKENS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            default_shipping_cost,
            status_policy: parse_or(&get, "ORDER_STATUS_POLICY", TransitionPolicy::default())?,
            health_check_interval: Duration::from_secs(interval_secs),
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/orders")]).unwrap();

        assert_eq!(config.service_host, "0.0.0.0");
        assert_eq!(config.service_port, 8000);
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.db_max_connections, 5);
        assert!(config.staff_tokens.is_empty());
        assert_eq!(config.default_shipping_cost, Decimal::ZERO);
        assert_eq!(config.status_policy, TransitionPolicy::Permissive);
        assert_eq!(config.health_check_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_database_url_required() {
        assert!(matches!(config(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL")));
        assert!(matches!(
            config(&[("DATABASE_URL", "  ")]).unwrap_err(),
            ConfigError::Missing(_)
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/orders"),
            ("SERVICE_PORT", "8080"),
            ("STAFF_API_TOKENS", "alpha, beta,,"),
            ("DEFAULT_SHIPPING_COST", "300.00"),
            ("ORDER_STATUS_POLICY", "strict"),
            ("HEALTH_CHECK_INTERVAL_SECS", "30"),
        ])
        .unwrap();

        assert_eq!(config.service_port, 8080);
        assert_eq!(config.staff_tokens, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(config.default_shipping_cost, dec!(300));
        assert_eq!(config.status_policy, TransitionPolicy::Strict);
        assert_eq!(config.health_check_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("DATABASE_URL", "x"), ("SERVICE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SERVICE_PORT", .. }));

        let err = config(&[("DATABASE_URL", "x"), ("ORDER_STATUS_POLICY", "lenient")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "ORDER_STATUS_POLICY", .. }));

        let err = config(&[("DATABASE_URL", "x"), ("DEFAULT_SHIPPING_COST", "-1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DEFAULT_SHIPPING_COST", .. }));

        let err = config(&[("DATABASE_URL", "x"), ("HEALTH_CHECK_INTERVAL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
