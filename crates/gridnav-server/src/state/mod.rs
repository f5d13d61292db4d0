//! Shared server state.

mod store;

pub use store::{AppState, PlannerStats};
