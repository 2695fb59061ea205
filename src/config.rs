//! Configuration Module
//!
//! Resolves per-cache configuration from environment-style settings and
//! loads the server configuration for the binary.
//!
//! Resolution for a cache named `name` layers, lowest precedence first:
//! hardcoded defaults, global `CACHE_*` keys, then `CACHE_<NAME>_*` keys.
//! An explicit [`crate::registry::CacheRegistry::set_config`] call bypasses
//! all of them.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

// == Defaults ==
/// Default TTL applied to entries stored without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
/// Default maximum number of entries per cache.
pub const DEFAULT_MAX_SIZE: usize = 1000;
/// Default interval between expiration sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Looks up one configuration key, returning `None` when it is unset.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Returns a lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key| env::var(key).ok())
}

// == Eviction Policy ==
/// Requested eviction policy. Only LRU has an implementation; the other
/// values are accepted and behave as LRU.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    #[default]
    Lru,
    Lfu,
    Ttl,
    Other(String),
}

impl EvictionPolicy {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lru" => EvictionPolicy::Lru,
            "lfu" => EvictionPolicy::Lfu,
            "ttl" => EvictionPolicy::Ttl,
            other => EvictionPolicy::Other(other.to_string()),
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, EvictionPolicy::Lru)
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lru => f.write_str("lru"),
            EvictionPolicy::Lfu => f.write_str("lfu"),
            EvictionPolicy::Ttl => f.write_str("ttl"),
            EvictionPolicy::Other(name) => f.write_str(name),
        }
    }
}

// == Cache Config ==
/// Configuration for one named cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL for entries stored without one; zero means entries never expire
    pub default_ttl: Duration,
    /// Maximum number of entries; zero means unbounded
    pub max_size: usize,
    /// Interval between background expiration sweeps; zero disables the sweeper
    pub cleanup_interval: Duration,
    /// Whether hit/miss/set/delete/eviction counters are recorded
    pub enable_metrics: bool,
    /// Requested eviction policy
    pub eviction_policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            enable_metrics: true,
            eviction_policy: EvictionPolicy::Lru,
        }
    }
}

impl CacheConfig {
    /// Resolves the configuration for `cache_name` from an arbitrary key lookup.
    ///
    /// # Keys
    /// - `CACHE_DEFAULT_TTL`, `CACHE_MAX_SIZE`, `CACHE_CLEANUP_INTERVAL`,
    ///   `CACHE_ENABLE_METRICS`, `CACHE_EVICTION_POLICY` - global settings
    /// - `CACHE_<NAME>_TTL`, `CACHE_<NAME>_MAX_SIZE`,
    ///   `CACHE_<NAME>_CLEANUP_INTERVAL`, `CACHE_<NAME>_ENABLE_METRICS` -
    ///   per-cache overrides, see [`env_prefix`]
    /// - `CACHE_<name>_TTL` etc. with the name exactly as given, e.g.
    ///   `CACHE_clipboard_TTL`; the upper-cased form wins when both are set
    ///
    /// Values that fail to parse are ignored and the lower layer wins.
    pub fn resolve(cache_name: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.apply_layer(
            lookup,
            "CACHE_DEFAULT_TTL",
            "CACHE_MAX_SIZE",
            "CACHE_CLEANUP_INTERVAL",
            "CACHE_ENABLE_METRICS",
        );

        if let Some(raw) = lookup("CACHE_EVICTION_POLICY") {
            config.eviction_policy = EvictionPolicy::parse(&raw);
        }

        let raw_prefix = format!("CACHE_{cache_name}_");
        let prefix = env_prefix(cache_name);
        let prefixes = if raw_prefix == prefix {
            vec![prefix]
        } else {
            vec![raw_prefix, prefix]
        };

        for prefix in prefixes {
            config.apply_layer(
                lookup,
                &format!("{prefix}TTL"),
                &format!("{prefix}MAX_SIZE"),
                &format!("{prefix}CLEANUP_INTERVAL"),
                &format!("{prefix}ENABLE_METRICS"),
            );
        }

        config
    }

    fn apply_layer(
        &mut self,
        lookup: &dyn Fn(&str) -> Option<String>,
        ttl_key: &str,
        max_size_key: &str,
        cleanup_key: &str,
        metrics_key: &str,
    ) {
        if let Some(ttl) = lookup(ttl_key).and_then(|raw| parse_logged(ttl_key, &raw, parse_duration)) {
            self.default_ttl = ttl;
        }
        if let Some(max_size) = lookup(max_size_key)
            .and_then(|raw| parse_logged(max_size_key, &raw, |v| v.trim().parse::<usize>().ok()))
        {
            self.max_size = max_size;
        }
        if let Some(interval) =
            lookup(cleanup_key).and_then(|raw| parse_logged(cleanup_key, &raw, parse_duration))
        {
            self.cleanup_interval = interval;
        }
        if let Some(raw) = lookup(metrics_key) {
            let raw = raw.trim();
            self.enable_metrics = raw.eq_ignore_ascii_case("true") || raw == "1";
        }
    }
}

fn parse_logged<T>(key: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Ignoring invalid value {:?} for {}", raw, key);
    }
    parsed
}

/// Returns the per-cache key prefix, e.g. `CACHE_USER_SESSIONS_` for `user-sessions`.
pub fn env_prefix(cache_name: &str) -> String {
    let name: String = cache_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("CACHE_{name}_")
}

// == Duration Parsing ==
/// Parses a duration such as `90`, `1h`, `30m`, `1h30m`, `1.5s` or `250ms`.
///
/// A bare integer is a number of seconds. Supported units: `ns`, `us`/`µs`,
/// `ms`, `s`, `m`, `h`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let number = &rest[..num_end];
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos: u64 = match &rest[..unit_end] {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return None,
        };
        rest = &rest[unit_end..];

        let nanos = match number.parse::<u64>() {
            Ok(whole) => whole.checked_mul(unit_nanos)?,
            Err(_) => {
                let fractional: f64 = number.parse().ok()?;
                let nanos = (fractional * unit_nanos as f64).round();
                if !nanos.is_finite() || nanos > u64::MAX as f64 {
                    return None;
                }
                nanos as u64
            }
        };
        total = total.checked_add(Duration::from_nanos(nanos))?;
    }
    Some(total)
}

// == Server Config ==
/// Server configuration for the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
}

impl ServerConfig {
    /// Loads the server configuration from the environment.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { server_port: 3000 }
    }
}
