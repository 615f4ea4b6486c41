//! Tree placement on eroded islands.
//!
//! Trees are rejection-sampled: a random world position is mapped to a heightmap
//! cell and kept only if the ground there is inside the allowed height band and flat
//! enough to grow grass. Each placement carries the surface normal, also encoded as
//! an RGB tint, so billboards can be lit to match the terrain.

mod config;

use glam::Vec3;
use rand::Rng;

use crate::error::ErosionError;
use crate::terrain::{check_dimensions, surface_normal};

pub use config::VegetationConfig;

/// One placed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreePlacement {
    /// World position (Y up).
    pub position: Vec3,
    /// Terrain normal under the tree.
    pub normal: Vec3,
    /// `normal` mapped from [-1, 1] to [0, 255].
    pub tint: [u8; 3],
    pub scale: f32,
    /// Which tree texture to use, in `0..config.variants`.
    pub variant: u32,
}

/// How much grass grows on ground with this normal, in [0, 1].
pub fn grass_weight(normal: Vec3, config: &VegetationConfig) -> f32 {
    let slope = 1.0 - normal.y;
    let blend_height = config.grass_slope_threshold * (1.0 - config.grass_blend_amount);
    let t = (slope - blend_height) / (config.grass_slope_threshold - blend_height);
    1.0 - t.clamp(0.0, 1.0)
}

/// Maps a unit normal to an 8-bit RGB tint.
pub fn encode_normal_tint(n: Vec3) -> [u8; 3] {
    let c = (n + Vec3::ONE) * 127.5;
    [
        c.x.clamp(0.0, 255.0) as u8,
        c.y.clamp(0.0, 255.0) as u8,
        c.z.clamp(0.0, 255.0) as u8,
    ]
}

/// A site that passed the height and grass rules.
struct Site {
    position: Vec3,
    normal: Vec3,
}

fn find_site<R: Rng + ?Sized>(
    heights: &[f32],
    map_size: usize,
    config: &VegetationConfig,
    rng: &mut R,
) -> Result<Option<Site>, ErosionError> {
    let half = config.world_extent / 2.0;
    let last = (map_size - 1) as f32;
    for _ in 0..config.max_attempts.max(1) {
        let x = rng.random_range(-half..half);
        let z = rng.random_range(-half..half);
        let px = (((x + half) / config.world_extent) * last) as usize;
        let py = (((z + half) / config.world_extent) * last) as usize;

        let normal = surface_normal(heights, map_size, px, py)?;
        let y = heights[py * map_size + px] * config.height_scale + config.height_offset;

        let in_band = y >= config.min_world_height && y <= config.max_world_height;
        if in_band && grass_weight(normal, config) >= config.min_grass_weight {
            return Ok(Some(Site {
                position: Vec3::new(x, y, z),
                normal,
            }));
        }
    }
    Ok(None)
}

/// Scatters up to `config.count` trees over the heightmap.
///
/// Trees whose site search exhausts `max_attempts` are skipped, so fewer trees are
/// returned on islands with little suitable ground.
pub fn place_trees<R: Rng + ?Sized>(
    heights: &[f32],
    map_size: usize,
    config: &VegetationConfig,
    rng: &mut R,
) -> Result<Vec<TreePlacement>, ErosionError> {
    check_dimensions(heights.len(), map_size)?;
    if map_size < 2 {
        return Err(ErosionError::InvalidSpawnBounds { map_size });
    }
    config.validate()?;

    let mut trees = Vec::with_capacity(config.count);
    let mut skipped = 0usize;
    for _ in 0..config.count {
        let Some(site) = find_site(heights, map_size, config, rng)? else {
            skipped += 1;
            continue;
        };
        let jitter = rng.random_range(config.scale_jitter.0..=config.scale_jitter.1);
        trees.push(TreePlacement {
            position: site.position,
            normal: site.normal,
            tint: encode_normal_tint(site.normal),
            scale: jitter * config.base_scale,
            variant: rng.random_range(0..config.variants.max(1)),
        });
    }

    if skipped > 0 {
        log::warn!(
            "placed {} of {} trees; {} found no site in {} attempts",
            trees.len(),
            config.count,
            skipped,
            config.max_attempts
        );
    }
    Ok(trees)
}

/// Moves existing trees to fresh sites after the terrain changed.
///
/// Variant and scale are kept. Trees that find no new site stay where they were
/// but pick up the current ground height and normal.
pub fn relocate_trees<R: Rng + ?Sized>(
    trees: &mut [TreePlacement],
    heights: &[f32],
    map_size: usize,
    config: &VegetationConfig,
    rng: &mut R,
) -> Result<(), ErosionError> {
    check_dimensions(heights.len(), map_size)?;
    if map_size < 2 {
        return Err(ErosionError::InvalidSpawnBounds { map_size });
    }
    config.validate()?;

    let half = config.world_extent / 2.0;
    let last = (map_size - 1) as f32;
    for tree in trees.iter_mut() {
        let site = match find_site(heights, map_size, config, rng)? {
            Some(site) => site,
            None => {
                let px = (((tree.position.x + half) / config.world_extent) * last)
                    .clamp(0.0, last) as usize;
                let py = (((tree.position.z + half) / config.world_extent) * last)
                    .clamp(0.0, last) as usize;
                let y = heights[py * map_size + px] * config.height_scale + config.height_offset;
                Site {
                    position: Vec3::new(tree.position.x, y, tree.position.z),
                    normal: surface_normal(heights, map_size, px, py)?,
                }
            }
        };
        tree.position = site.position;
        tree.normal = site.normal;
        tree.tint = encode_normal_tint(site.normal);
    }
    Ok(())
}
