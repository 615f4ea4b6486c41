//! Tree placement configuration.

use serde::{Deserialize, Serialize};

use crate::error::ErosionError;

/// Where and how densely trees are scattered over an island.
///
/// Notes:
/// - World coordinates span `[-world_extent/2, world_extent/2]` on X and Z.
/// - World height is `height * height_scale + height_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationConfig {
    /// Number of trees to place.
    pub count: usize,
    /// Side length of the island in world units.
    pub world_extent: f32,
    pub height_scale: f32,
    pub height_offset: f32,

    /// Lowest world height a tree may stand at (above the beach).
    pub min_world_height: f32,
    /// Highest world height a tree may stand at (below the peaks).
    pub max_world_height: f32,

    // --- Grass rule (slope from the surface normal) ---
    /// Slope at which grass fully gives way to rock.
    pub grass_slope_threshold: f32,
    /// Width of the grass-to-rock blend, as a fraction of the threshold.
    pub grass_blend_amount: f32,
    /// Minimum grass weight a tree site needs.
    pub min_grass_weight: f32,

    /// Number of tree variants (textures) to choose from.
    pub variants: u32,
    pub base_scale: f32,
    /// Random scale multiplier range applied to `base_scale`.
    pub scale_jitter: (f32, f32),

    /// Rejected sites allowed per tree before placement gives up on it.
    pub max_attempts: u32,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            count: 8190,
            world_extent: 32.0,
            height_scale: 8.0,
            height_offset: -1.1,

            min_world_height: 0.32,
            max_world_height: 3.25,

            grass_slope_threshold: 0.2,
            grass_blend_amount: 0.55,
            min_grass_weight: 0.65,

            variants: 19,
            base_scale: 0.3,
            scale_jitter: (0.6, 1.4),

            max_attempts: 10_000,
        }
    }
}

impl VegetationConfig {
    /// Rejects values the site sampler cannot draw from.
    pub fn validate(&self) -> Result<(), ErosionError> {
        if !(self.world_extent.is_finite() && self.world_extent > 0.0) {
            return Err(ErosionError::InvalidVegetation {
                field: "world_extent",
                reason: "must be finite and positive",
            });
        }
        let (low, high) = self.scale_jitter;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(ErosionError::InvalidVegetation {
                field: "scale_jitter",
                reason: "must be a finite (low, high) pair with low <= high",
            });
        }
        Ok(())
    }
}
