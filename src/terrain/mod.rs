//! Terrain data and the per-cell passes that shape it.
//!
//! Provides the bounds-checked heightmap view, border falloff and beach remapping,
//! Sobel normals, and the [`Island`] session that ties them to erosion.

mod grid;
mod island;
mod normals;
mod shaping;

pub use grid::{check_dimensions, height_range, HeightGrid, HeightSample};
pub use island::{Island, IslandConfig};
pub use normals::{normal_map, surface_normal, NORMAL_STRENGTH};
pub use shaping::{
    apply_border_falloff, remap_beaches, remap_value, FalloffShape, BEACH_CURVE,
};
