//! Resolver and cache settings read from the environment.

use std::{env, str::FromStr, time::Duration};

use tracing::warn;

const DEFAULT_CURRENCY_PREFIX: &str = "$";
const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Prepended to formatted product prices.
    pub currency_prefix: String,
    /// `None` disables the per-location content cache.
    pub cache_ttl: Option<Duration>,
    pub cache_capacity: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ResolverConfig {
    /// Reads `CURRENCY_PREFIX`, `CONTENT_CACHE_TTL_SECS` (0 disables the cache)
    /// and `CONTENT_CACHE_CAPACITY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let currency_prefix = lookup("CURRENCY_PREFIX").unwrap_or(defaults.currency_prefix);
        let ttl_secs = parse_or(&lookup, "CONTENT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS);
        let cache_capacity = parse_or(&lookup, "CONTENT_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY);

        Self {
            currency_prefix,
            cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            cache_capacity,
        }
    }
}

fn parse_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Ignoring malformed setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ResolverConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResolverConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), ResolverConfig::default());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let config = config_from(&[("CONTENT_CACHE_TTL_SECS", "0"), ("CURRENCY_PREFIX", "€")]);
        assert_eq!(config.cache_ttl, None);
        assert_eq!(config.currency_prefix, "€");
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = config_from(&[("CONTENT_CACHE_TTL_SECS", "soon"), ("CONTENT_CACHE_CAPACITY", "-4")]);
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }
}
