//! Precondition failures surfaced by the terrain and erosion entry points.

use thiserror::Error;

/// Errors returned when a caller's heightmap or parameters cannot be simulated.
///
/// Numeric trouble inside the droplet loop (NaN speed, zero direction) is clamped
/// in place and never reported here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErosionError {
    #[error("Heightmap has {len} cells, expected {map_size}x{map_size}")]
    InvalidDimension { len: usize, map_size: usize },
    #[error("Erosion radius {radius} does not fit a {map_size}x{map_size} map (need 0 < 2*radius < map size)")]
    InvalidRadius { radius: usize, map_size: usize },
    #[error("A {map_size}x{map_size} map with erosion radius {radius} exceeds the brush table's 32-bit indexing")]
    MapTooLarge { map_size: usize, radius: usize },
    #[error("Map size {map_size} leaves no cell for droplets to spawn in (need at least 2)")]
    InvalidSpawnBounds { map_size: usize },
    #[error("Cell ({x}, {y}) lies outside the {map_size}x{map_size} map")]
    CoordinateOutOfBounds { x: usize, y: usize, map_size: usize },
    #[error("Vegetation config field `{field}` is out of range: {reason}")]
    InvalidVegetation {
        field: &'static str,
        reason: &'static str,
    },
}
