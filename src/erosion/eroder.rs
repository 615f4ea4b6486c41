//! Caller-owned erosion context: configuration, brush cache and random stream.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::brush::BrushCache;
use super::config::ErosionConfig;
use super::droplet::{simulate_droplet, DropletEnd};
use crate::error::ErosionError;
use crate::terrain::{apply_border_falloff, remap_beaches, surface_normal, FalloffShape, HeightGrid};

/// Totals for one [`Eroder::erode`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErosionStats {
    pub droplets: u32,
    /// Steps that eroded or deposited, summed over all droplets.
    pub steps: u64,
    /// Total height removed by erosion steps.
    pub eroded: f32,
    /// Total height added by deposition steps.
    pub deposited: f32,
    pub stuck: u32,
    pub left_map: u32,
    pub expired: u32,
}

impl ErosionStats {
    /// Adds another batch's totals into this one.
    pub fn accumulate(&mut self, other: &ErosionStats) {
        self.droplets += other.droplets;
        self.steps += other.steps;
        self.eroded += other.eroded;
        self.deposited += other.deposited;
        self.stuck += other.stuck;
        self.left_map += other.left_map;
        self.expired += other.expired;
    }
}

/// Simulates droplet erosion on caller-supplied heightmaps.
///
/// The brush cache is rebuilt lazily whenever the map size or erosion radius
/// changes, and the random stream persists across calls so consecutive batches keep
/// spawning droplets at fresh positions.
#[derive(Debug, Clone)]
pub struct Eroder {
    config: ErosionConfig,
    brush: Option<BrushCache>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Eroder {
    /// Creates an eroder whose random stream starts from `seed`.
    pub fn new(config: ErosionConfig, seed: u64) -> Self {
        warn_out_of_range(&config);
        Self {
            config,
            brush: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Replaces the configuration. A changed radius rebuilds the brush on the next erode.
    pub fn configure(&mut self, config: ErosionConfig) {
        warn_out_of_range(&config);
        self.config = config;
    }

    /// Seed the random stream was last reset with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        log::info!("erosion random stream reseeded with {}", seed);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = seed;
    }

    /// The brush cache from the last erode, if one has been built.
    pub fn brush(&self) -> Option<&BrushCache> {
        self.brush.as_ref()
    }

    /// Simulates `droplet_count` droplets on `heights`, mutating it in place.
    ///
    /// With `reset_seed` the random stream is first reseeded from the wall clock.
    pub fn erode(
        &mut self,
        heights: &mut [f32],
        map_size: usize,
        droplet_count: u32,
        reset_seed: bool,
    ) -> Result<ErosionStats, ErosionError> {
        let mut grid = HeightGrid::new(heights, map_size)?;
        if map_size < 2 {
            return Err(ErosionError::InvalidSpawnBounds { map_size });
        }

        let radius = self.config.erosion_radius;
        let brush = match self.brush.take() {
            Some(brush) if brush.matches(map_size, radius) => brush,
            previous => {
                log::debug!(
                    "building erosion brush for {}x{} map, radius {}",
                    map_size,
                    map_size,
                    radius
                );
                match BrushCache::build(map_size, radius) {
                    Ok(brush) => brush,
                    Err(err) => {
                        // a failed call leaves the context as it was
                        self.brush = previous;
                        return Err(err);
                    }
                }
            }
        };

        if reset_seed {
            self.reseed(clock_seed());
        }

        let mut stats = ErosionStats {
            droplets: droplet_count,
            ..Default::default()
        };
        let spawn_limit = (map_size - 1) as f32;
        for _ in 0..droplet_count {
            let position = Vec2::new(
                self.rng.random_range(0.0..spawn_limit),
                self.rng.random_range(0.0..spawn_limit),
            );
            let trace = simulate_droplet(position, &mut grid, &brush, &self.config);
            stats.steps += trace.steps as u64;
            stats.eroded += trace.eroded;
            stats.deposited += trace.deposited;
            match trace.end {
                DropletEnd::Stuck => stats.stuck += 1,
                DropletEnd::LeftMap => stats.left_map += 1,
                DropletEnd::Expired => stats.expired += 1,
            }
        }
        self.brush = Some(brush);

        if droplet_count > 0 {
            log::debug!(
                "eroded {} droplets: {} steps, eroded {:.4}, deposited {:.4}",
                droplet_count,
                stats.steps,
                stats.eroded,
                stats.deposited
            );
        }
        Ok(stats)
    }

    /// Sinks the map toward zero at its borders.
    ///
    /// `normalized_offset` is accepted for caller compatibility and has no effect on
    /// the falloff.
    pub fn gradient(
        &self,
        heights: &mut [f32],
        map_size: usize,
        normalized_offset: f32,
        shape: FalloffShape,
    ) -> Result<(), ErosionError> {
        let _ = normalized_offset;
        let mut grid = HeightGrid::new(heights, map_size)?;
        apply_border_falloff(&mut grid, shape);
        Ok(())
    }

    /// Flattens beach elevations.
    pub fn remap(&self, heights: &mut [f32], map_size: usize) -> Result<(), ErosionError> {
        let mut grid = HeightGrid::new(heights, map_size)?;
        remap_beaches(&mut grid);
        Ok(())
    }

    /// Surface normal at cell `(x, y)`.
    pub fn normal(
        &self,
        heights: &[f32],
        map_size: usize,
        x: usize,
        y: usize,
    ) -> Result<Vec3, ErosionError> {
        surface_normal(heights, map_size, x, y)
    }
}

fn warn_out_of_range(config: &ErosionConfig) {
    for warning in config.range_warnings() {
        log::warn!("erosion config: {}", warning);
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
