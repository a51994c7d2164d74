use std::{env, fmt::Display, str::FromStr, time::Duration};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::pricing::PricingPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub pricing: PricingPolicy,
    pub nats_url: Option<String>,
    pub nats_subject_prefix: String,
    /// How long an idle session keeps its coupon.
    pub session_ttl: Duration,
}

impl Config {
    /// Reads configuration from the environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let currency: String = try_load(&lookup, "STORE_CURRENCY", "USD")?;
        let threshold: Decimal = try_load(&lookup, "FREE_SHIPPING_THRESHOLD", "50.00")?;
        let fee: Decimal = try_load(&lookup, "FLAT_SHIPPING_FEE", "4.99")?;
        if threshold.is_sign_negative() {
            return Err(invalid("FREE_SHIPPING_THRESHOLD", threshold, "must not be negative"));
        }
        if fee.is_sign_negative() {
            return Err(invalid("FLAT_SHIPPING_FEE", fee, "must not be negative"));
        }
        let session_ttl: u64 = try_load(&lookup, "SESSION_TTL_SECS", "86400")?;
        if session_ttl == 0 {
            return Err(invalid("SESSION_TTL_SECS", session_ttl, "must be at least one second"));
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "8083")?,
            backend_url: try_load(&lookup, "BACKEND_URL", "http://localhost:5000/api")?,
            backend_timeout: Duration::from_secs(try_load(&lookup, "BACKEND_TIMEOUT_SECS", "10")?),
            pricing: PricingPolicy { free_shipping_threshold: threshold, flat_shipping_fee: fee, currency: currency.trim().to_uppercase() },
            nats_url: lookup("NATS_URL").filter(|url| !url.trim().is_empty()),
            nats_subject_prefix: try_load(&lookup, "NATS_SUBJECT_PREFIX", "bakery.storefront")?,
            session_ttl: Duration::from_secs(session_ttl),
        })
    }

    pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn invalid(key: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError::Invalid { key, value: value.to_string(), reason: reason.to_string() }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        invalid(key, &raw, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_address(), "0.0.0.0:8083");
        assert_eq!(c.backend_timeout, Duration::from_secs(10));
        assert_eq!(c.pricing, PricingPolicy::default());
        assert!(c.nats_url.is_none());
        assert_eq!(c.session_ttl, crate::session::DEFAULT_SESSION_TTL);
    }

    #[test]
    fn test_overrides() {
        let c = config(&[("PORT", "9000"), ("STORE_CURRENCY", "inr"), ("FREE_SHIPPING_THRESHOLD", "499"), ("FLAT_SHIPPING_FEE", "40"), ("NATS_URL", "nats://localhost:4222")]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.pricing.currency, "INR");
        assert_eq!(c.pricing.free_shipping_threshold, Decimal::new(499, 0));
        assert_eq!(c.nats_url.as_deref(), Some("nats://localhost:4222"));
        assert_eq!(config(&[("SESSION_TTL_SECS", "900")]).unwrap().session_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(matches!(config(&[("PORT", "eighty")]), Err(ConfigError::Invalid { key: "PORT", .. })));
        assert!(matches!(config(&[("FLAT_SHIPPING_FEE", "-1")]), Err(ConfigError::Invalid { key: "FLAT_SHIPPING_FEE", .. })));
        assert!(matches!(config(&[("SESSION_TTL_SECS", "0")]), Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })));
    }
}
