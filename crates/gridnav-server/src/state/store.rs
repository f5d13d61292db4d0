use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;

/// Server-wide state. Holds no planning data; every request builds its own grid.
pub struct AppState {
    config: Config,
    started_at: DateTime<Utc>,
    plans_served: AtomicU64,
    plans_without_route: AtomicU64,
    plans_rejected: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannerStats {
    pub plans_served: u64,
    pub plans_without_route: u64,
    pub plans_rejected: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_s: i64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            started_at: Utc::now(),
            plans_served: AtomicU64::new(0),
            plans_without_route: AtomicU64::new(0),
            plans_rejected: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn record_served(&self) {
        self.plans_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Request was valid but no route exists (or the search budget ran out).
    pub fn record_without_route(&self) {
        self.plans_without_route.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> PlannerStats {
        let now = Utc::now();
        PlannerStats {
            plans_served: self.plans_served.load(Ordering::Relaxed),
            plans_without_route: self.plans_without_route.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_s: (now - self.started_at).num_seconds(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
