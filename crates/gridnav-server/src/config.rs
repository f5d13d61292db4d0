//! Server configuration from environment.

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Expansion budget applied to every search; `None` is unbounded.
    pub max_expansions: Option<usize>,
    /// Wall-clock budget per search in milliseconds; `None` is unbounded.
    pub time_limit_ms: Option<u64>,
    /// Largest grid a request may allocate.
    pub max_grid_cells: Option<usize>,
    pub default_altitude: f64,
    pub default_safety_distance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3100,
            max_expansions: None,
            time_limit_ms: Some(5_000),
            max_grid_cells: Some(4_000_000),
            default_altitude: 5.0,
            default_safety_distance: 5.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unparseable values fall back to the
    /// default; `0` or `none` disables an optional limit.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            server_port: parse_or(&lookup, "GRIDNAV_PORT", defaults.server_port),
            max_expansions: parse_limit(&lookup, "PLANNER_MAX_EXPANSIONS", defaults.max_expansions),
            time_limit_ms: parse_limit(&lookup, "PLANNER_TIME_LIMIT_MS", defaults.time_limit_ms),
            max_grid_cells: parse_limit(&lookup, "PLANNER_MAX_GRID_CELLS", defaults.max_grid_cells),
            default_altitude: parse_or(&lookup, "PLANNER_DEFAULT_ALTITUDE", defaults.default_altitude),
            default_safety_distance: parse_or(
                &lookup,
                "PLANNER_DEFAULT_SAFETY_DISTANCE",
                defaults.default_safety_distance,
            ),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_limit<F, T>(lookup: &F, key: &str, default: Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) if value == T::default() => None,
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "ignoring unparseable limit");
            default
        }
    }
}
