//! Service configuration from environment variables

use std::str::FromStr;
use std::time::Duration;

use crate::sampler::DEFAULT_BAND_FRACTION;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Strip height fraction used when a request does not set one
    pub band_fraction: f64,
    pub max_upload_bytes: usize,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            band_fraction: DEFAULT_BAND_FRACTION,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl Config {
    /// Read `PORT`, `SCAN_BAND_FRACTION`, `MAX_UPLOAD_BYTES` and `SCAN_CACHE_TTL_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut band_fraction = parse_var(&lookup, "SCAN_BAND_FRACTION", defaults.band_fraction);
        if !(band_fraction > 0.0 && band_fraction <= 1.0) {
            tracing::warn!(
                "SCAN_BAND_FRACTION={} outside (0, 1], using {}",
                band_fraction,
                defaults.band_fraction
            );
            band_fraction = defaults.band_fraction;
        }

        Self {
            port: parse_var(&lookup, "PORT", defaults.port),
            band_fraction,
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            cache_ttl: Duration::from_secs(parse_var(
                &lookup,
                "SCAN_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("SCAN_BAND_FRACTION", "0.35"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("SCAN_CACHE_TTL_SECS", "5"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.band_fraction, 0.35);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("SCAN_BAND_FRACTION", "1.5")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.band_fraction, DEFAULT_BAND_FRACTION);
    }
}
