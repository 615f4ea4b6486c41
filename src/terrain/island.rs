//! Island session: a base heightmap shaped into an island and eroded in batches.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::height_range;
use super::shaping::FalloffShape;
use crate::erosion::{Eroder, ErosionConfig, ErosionStats};
use crate::error::ErosionError;
use crate::noise::{generate_base_heightmap, FractalNoiseConfig};

/// Everything needed to generate an island from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandConfig {
    /// Width and height of the heightmap in cells.
    pub map_size: usize,
    pub noise: FractalNoiseConfig,
    pub shape: FalloffShape,
    pub erosion: ErosionConfig,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            map_size: 512,
            noise: FractalNoiseConfig::default(),
            shape: FalloffShape::Square,
            erosion: ErosionConfig::default(),
        }
    }
}

/// A procedurally generated island.
///
/// Keeps the unshaped noise so the island can be reshaped without regenerating it,
/// and counts droplets simulated since the last reshape.
#[derive(Debug, Clone)]
pub struct Island {
    map_size: usize,
    base: Vec<f32>,
    heights: Vec<f32>,
    shape: FalloffShape,
    eroder: Eroder,
    droplets_simulated: u64,
    droplets_since_relocation: u64,
    totals: ErosionStats,
}

impl Island {
    /// Generates base noise, shapes it and warms the erosion brush.
    ///
    /// `seed` drives the droplet random stream; the noise seed lives in
    /// `config.noise`.
    pub fn generate(config: &IslandConfig, seed: u64) -> Result<Self, ErosionError> {
        let base = generate_base_heightmap(config.map_size, &config.noise);
        let mut island = Self {
            map_size: config.map_size,
            heights: base.clone(),
            base,
            shape: config.shape,
            eroder: Eroder::new(config.erosion.clone(), seed),
            droplets_simulated: 0,
            droplets_since_relocation: 0,
            totals: ErosionStats::default(),
        };
        island.reshape(config.shape)?;
        // zero droplets: only builds the brush cache
        island
            .eroder
            .erode(&mut island.heights, island.map_size, 0, false)?;
        Ok(island)
    }

    /// Restores the base noise and applies `shape` falloff plus beach remapping.
    ///
    /// Erosion history and droplet totals are discarded.
    pub fn reshape(&mut self, shape: FalloffShape) -> Result<(), ErosionError> {
        self.heights.copy_from_slice(&self.base);
        self.eroder.gradient(&mut self.heights, self.map_size, 0.5, shape)?;
        self.eroder.remap(&mut self.heights, self.map_size)?;
        self.shape = shape;
        self.droplets_simulated = 0;
        self.droplets_since_relocation = 0;
        self.totals = ErosionStats::default();
        log::debug!("island reshaped as {}", shape.name());
        Ok(())
    }

    /// Simulates a batch of `droplets` on the island.
    pub fn erode(&mut self, droplets: u32) -> Result<ErosionStats, ErosionError> {
        let stats = self
            .eroder
            .erode(&mut self.heights, self.map_size, droplets, false)?;
        self.droplets_simulated += droplets as u64;
        self.droplets_since_relocation += droplets as u64;
        self.totals.accumulate(&stats);
        Ok(stats)
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// The unshaped noise the island was generated from.
    pub fn base(&self) -> &[f32] {
        &self.base
    }

    pub fn shape(&self) -> FalloffShape {
        self.shape
    }

    pub fn eroder(&self) -> &Eroder {
        &self.eroder
    }

    pub fn eroder_mut(&mut self) -> &mut Eroder {
        &mut self.eroder
    }

    /// Droplets simulated since generation or the last reshape.
    pub fn droplets_simulated(&self) -> u64 {
        self.droplets_simulated
    }

    /// Droplets simulated since trees were last placed or relocated.
    pub fn droplets_since_relocation(&self) -> u64 {
        self.droplets_since_relocation
    }

    /// True once at least `interval` droplets have run since the last relocation.
    pub fn relocation_due(&self, interval: u64) -> bool {
        self.droplets_since_relocation >= interval
    }

    /// Records that trees now match the current terrain.
    pub fn mark_trees_relocated(&mut self) {
        self.droplets_since_relocation = 0;
    }

    /// Erosion totals since generation or the last reshape.
    pub fn totals(&self) -> &ErosionStats {
        &self.totals
    }

    /// Surface normal at cell `(x, y)`.
    pub fn normal(&self, x: usize, y: usize) -> Result<Vec3, ErosionError> {
        self.eroder.normal(&self.heights, self.map_size, x, y)
    }

    /// Computes the min and max height values.
    pub fn height_range(&self) -> (f32, f32) {
        height_range(&self.heights)
    }
}
