//! Service configuration, read from the environment (and `.env` when present).

use crate::domain::aggregates::ShippingPolicy;
use crate::domain::value_objects::Vnd;
use crate::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub site_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub db_max_connections: u32,
    pub shipping: ShippingPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| get(key).filter(|v| !v.is_empty()).ok_or_else(|| StoreError::Config(format!("{key} must be set")));
        let parsed = |key: &str, default: u64| -> Result<u64> {
            match get(key) {
                Some(raw) => raw.parse().map_err(|_| StoreError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
                None => Ok(default),
            }
        };
        let defaults = ShippingPolicy::default();
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            site_url: get("SITE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            port: u16::try_from(parsed("PORT", 8083)?).map_err(|_| StoreError::Config("PORT out of range".into()))?,
            nats_url: get("NATS_URL").filter(|v| !v.is_empty()),
            db_max_connections: u32::try_from(parsed("DB_MAX_CONNECTIONS", 10)?).unwrap_or(u32::MAX),
            shipping: ShippingPolicy {
                free_threshold: Vnd::new(parsed("FREE_SHIPPING_THRESHOLD", defaults.free_threshold.amount())?),
                flat_fee: Vnd::new(parsed("FLAT_SHIPPING_FEE", defaults.flat_fee.amount())?),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/shop"),
        ("SUPABASE_URL", "https://abc.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
    ];

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(cfg.port, 8083);
        assert_eq!(cfg.site_url, "http://localhost:3000");
        assert_eq!(cfg.shipping, ShippingPolicy::default());
        assert!(cfg.nats_url.is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("PORT", "9000"), ("FREE_SHIPPING_THRESHOLD", "1000000"), ("FLAT_SHIPPING_FEE", "25000")]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.shipping.free_threshold, Vnd::new(1_000_000));
        assert_eq!(cfg.shipping.flat_fee, Vnd::new(25_000));

        pairs.push(("PORT", "abc"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
