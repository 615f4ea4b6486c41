//! Procedural island generator with droplet-based hydraulic erosion.
//!
//! This crate shapes fractal noise into an island, then erodes it by tracing
//! simulated water droplets across the heightmap. Heightmaps are plain row-major
//! `f32` buffers owned by the caller; every entry point borrows them mutably for the
//! duration of the call and validates their dimensions first.

pub mod error;
pub mod erosion;
pub mod noise;
pub mod terrain;
pub mod vegetation;

pub use error::ErosionError;
pub use erosion::{BrushCache, Droplet, Eroder, ErosionConfig, ErosionStats};
pub use noise::FractalNoiseConfig;
pub use terrain::{FalloffShape, HeightGrid, Island, IslandConfig};
pub use vegetation::{TreePlacement, VegetationConfig};
