//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `127.0.0.1:3000` |
//! | `BUS_API_BASE_URL` | `http://m.bus.go.kr/mBus/bus` |
//! | `BUS_API_TIMEOUT_SECS` | `30` |
//! | `BUS_API_MAX_CONCURRENT` | `5` |
//! | `CACHE_TTL_SECS` | `60` |
//! | `CACHE_MAX_CAPACITY` | `1000` |
//! | `NETWORK_SNAPSHOT` | unset (no snapshot) |
//! | `NETWORK_SNAPSHOT_MAX_AGE_SECS` | unset (any age) |
//! | `PRELOAD_ROUTES` | unset (comma-separated route ids) |
//! | `PLANNER_MAX_NODES` | `2000` |
//! | `TRAVEL_TIME_FALLBACK_SECS` | `150` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::bus_api::BusApiConfig;
use crate::cache::CacheConfig;
use crate::planner::PlannerConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// A variable that is set but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub bus_api: BusApiConfig,
    pub cache: CacheConfig,
    pub snapshot_path: Option<PathBuf>,
    /// Older snapshots are ignored at start-up.
    pub snapshot_max_age: Option<Duration>,
    /// Routes imported at start-up and refreshed daily.
    pub preload_routes: Vec<i64>,
    pub planner: PlannerConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => parse("BIND_ADDR", &v)?,
            None => parse("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let mut bus_api = BusApiConfig::default();
        if let Some(v) = get("BUS_API_BASE_URL") {
            bus_api = bus_api.with_base_url(v);
        }
        if let Some(v) = get("BUS_API_TIMEOUT_SECS") {
            bus_api = bus_api.with_timeout(parse("BUS_API_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("BUS_API_MAX_CONCURRENT") {
            let n: usize = parse("BUS_API_MAX_CONCURRENT", &v)?;
            if n == 0 {
                return Err(invalid("BUS_API_MAX_CONCURRENT", &v, "must be at least 1"));
            }
            bus_api = bus_api.with_max_concurrent(n);
        }

        let mut cache = CacheConfig::default();
        if let Some(v) = get("CACHE_TTL_SECS") {
            cache.ttl = Duration::from_secs(parse("CACHE_TTL_SECS", &v)?);
        }
        if let Some(v) = get("CACHE_MAX_CAPACITY") {
            cache.max_capacity = parse("CACHE_MAX_CAPACITY", &v)?;
        }

        let snapshot_path = get("NETWORK_SNAPSHOT").map(PathBuf::from);
        let snapshot_max_age = match get("NETWORK_SNAPSHOT_MAX_AGE_SECS") {
            Some(v) => Some(Duration::from_secs(parse("NETWORK_SNAPSHOT_MAX_AGE_SECS", &v)?)),
            None => None,
        };

        let preload_routes = match get("PRELOAD_ROUTES") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse("PRELOAD_ROUTES", s))
                .collect::<Result<Vec<i64>, _>>()?,
            None => Vec::new(),
        };

        let mut planner = PlannerConfig::default();
        if let Some(v) = get("PLANNER_MAX_NODES") {
            planner.max_nodes = parse("PLANNER_MAX_NODES", &v)?;
        }
        if let Some(v) = get("TRAVEL_TIME_FALLBACK_SECS") {
            planner.travel_time.negative_delta_fallback_secs =
                parse("TRAVEL_TIME_FALLBACK_SECS", &v)?;
        }

        Ok(Self {
            bind_addr,
            bus_api,
            cache,
            snapshot_path,
            snapshot_max_age,
            preload_routes,
            planner,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            bus_api: BusApiConfig::default(),
            cache: CacheConfig::default(),
            snapshot_path: None,
            snapshot_max_age: None,
            preload_routes: Vec::new(),
            planner: PlannerConfig::default(),
        }
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.bus_api.base_url, "http://m.bus.go.kr/mBus/bus");
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("BUS_API_BASE_URL", "http://localhost:9000"),
            ("BUS_API_TIMEOUT_SECS", "5"),
            ("BUS_API_MAX_CONCURRENT", "2"),
            ("CACHE_TTL_SECS", "120"),
            ("CACHE_MAX_CAPACITY", "50"),
            ("NETWORK_SNAPSHOT", "/var/lib/bus/network.json"),
            ("NETWORK_SNAPSHOT_MAX_AGE_SECS", "86400"),
            ("PRELOAD_ROUTES", "100100118, 4940100,"),
            ("PLANNER_MAX_NODES", "500"),
            ("TRAVEL_TIME_FALLBACK_SECS", "59"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.bus_api.base_url, "http://localhost:9000");
        assert_eq!(config.bus_api.timeout_secs, 5);
        assert_eq!(config.bus_api.max_concurrent, 2);
        assert_eq!(config.cache.ttl, Duration::from_secs(120));
        assert_eq!(config.cache.max_capacity, 50);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/var/lib/bus/network.json")));
        assert_eq!(config.snapshot_max_age, Some(Duration::from_secs(86400)));
        assert_eq!(config.preload_routes, vec![100100118, 4940100]);
        assert_eq!(config.planner.max_nodes, 500);
        assert_eq!(config.planner.travel_time.negative_delta_fallback_secs, 59);
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = config(&[("BIND_ADDR", "  "), ("PRELOAD_ROUTES", "")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.preload_routes.is_empty());
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = config(&[("CACHE_TTL_SECS", "soon")]).unwrap_err();
        assert_eq!(err.key, "CACHE_TTL_SECS");
        assert_eq!(err.value, "soon");

        let err = config(&[("PRELOAD_ROUTES", "100,abc")]).unwrap_err();
        assert_eq!(err.key, "PRELOAD_ROUTES");

        let err = config(&[("NETWORK_SNAPSHOT_MAX_AGE_SECS", "-1")]).unwrap_err();
        assert_eq!(err.key, "NETWORK_SNAPSHOT_MAX_AGE_SECS");

        let err = config(&[("BUS_API_MAX_CONCURRENT", "0")]).unwrap_err();
        assert_eq!(err.reason, "must be at least 1");
    }
}
