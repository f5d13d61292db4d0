//! gridnav CLI - obstacle loading, ASCII rendering and the `gridnav-plan` binary.

pub mod loader;
pub mod render;

pub use loader::{load_obstacles, parse_colliders, parse_json, parse_position, GeoHome, ObstacleSet};
pub use render::{render_plan, AsciiSink};
