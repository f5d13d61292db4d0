//! Obstacle file loading.
//!
//! Two formats are accepted, picked by file extension:
//!
//! - `.csv`: colliders file. An optional first line `lat0 <deg>, lon0 <deg>`
//!   gives the geodetic home, then a header
//!   `posX,posY,posZ,halfSizeX,halfSizeY,halfSizeZ` and one box per row
//!   (`posX` north, `posY` east, `posZ` altitude).
//! - `.json`: an array of obstacle objects.

use anyhow::{anyhow, bail, Context, Result};
use gridnav_core::{LocalPosition, Obstacle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geodetic home position from a colliders header line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoHome {
    pub lat0: f64,
    pub lon0: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSet {
    pub home: Option<GeoHome>,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Deserialize)]
struct ColliderRow {
    #[serde(rename = "posX")]
    pos_x: f64,
    #[serde(rename = "posY")]
    pos_y: f64,
    #[serde(rename = "posZ")]
    pos_z: f64,
    #[serde(rename = "halfSizeX")]
    half_size_x: f64,
    #[serde(rename = "halfSizeY")]
    half_size_y: f64,
    #[serde(rename = "halfSizeZ")]
    half_size_z: f64,
}

impl From<ColliderRow> for Obstacle {
    fn from(row: ColliderRow) -> Self {
        Obstacle::new(
            row.pos_x,
            row.pos_y,
            row.pos_z,
            row.half_size_x,
            row.half_size_y,
            row.half_size_z,
        )
    }
}

pub fn load_obstacles(path: &Path) -> Result<ObstacleSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read obstacle file: {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let set = match extension.as_deref() {
        Some("csv") => parse_colliders(&text),
        Some("json") => parse_json(&text),
        _ => bail!(
            "Unsupported obstacle file {} (expected .csv or .json)",
            path.display()
        ),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        obstacles = set.obstacles.len(),
        home = ?set.home,
        "loaded obstacles"
    );
    Ok(set)
}

pub fn parse_colliders(text: &str) -> Result<ObstacleSet> {
    let (home, body) = match text.split_once('\n') {
        Some((first, rest)) if first.trim_start().starts_with("lat0") => {
            (Some(parse_home(first)?), rest)
        }
        _ => (None, text),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut obstacles = Vec::new();
    for (idx, result) in reader.deserialize::<ColliderRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to read collider row {}", idx + 1))?;
        obstacles.push(Obstacle::from(row));
    }

    Ok(ObstacleSet { home, obstacles })
}

pub fn parse_json(text: &str) -> Result<ObstacleSet> {
    let obstacles: Vec<Obstacle> =
        serde_json::from_str(text).context("Expected a JSON array of obstacles")?;
    Ok(ObstacleSet {
        home: None,
        obstacles,
    })
}

/// Parse `lat0 37.79, lon0 -122.39`.
fn parse_home(line: &str) -> Result<GeoHome> {
    let mut lat0 = None;
    let mut lon0 = None;
    for part in line.split(',') {
        let mut fields = part.split_whitespace();
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            bail!("Malformed home line: {:?}", line.trim());
        };
        let value: f64 = value
            .parse()
            .with_context(|| format!("Invalid {} value {:?}", key, value))?;
        match key {
            "lat0" => lat0 = Some(value),
            "lon0" => lon0 = Some(value),
            other => bail!("Unknown home field {:?}", other),
        }
    }
    match (lat0, lon0) {
        (Some(lat0), Some(lon0)) => Ok(GeoHome { lat0, lon0 }),
        _ => Err(anyhow!("Home line needs lat0 and lon0: {:?}", line.trim())),
    }
}

/// Parse a `north,east` pair in metres.
pub fn parse_position(raw: &str) -> Result<LocalPosition, String> {
    let (north, east) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected NORTH,EAST, got {:?}", raw))?;
    let north: f64 = north
        .trim()
        .parse()
        .map_err(|_| format!("invalid north coordinate {:?}", north.trim()))?;
    let east: f64 = east
        .trim()
        .parse()
        .map_err(|_| format!("invalid east coordinate {:?}", east.trim()))?;
    if !north.is_finite() || !east.is_finite() {
        return Err(format!("coordinates must be finite: {:?}", raw));
    }
    Ok(LocalPosition::new(north, east))
}
