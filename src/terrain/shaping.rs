//! One-shot height shaping applied when an island is (re)generated.
//!
//! Both passes are per-cell pure transforms, so they run row-parallel with rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::grid::HeightGrid;

/// Distance metric used by the border falloff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FalloffShape {
    /// Chebyshev distance: square island.
    #[default]
    Square,
    /// Squared Euclidean distance: round island.
    Circle,
    /// Manhattan distance: diamond island.
    Diamond,
    /// Manhattan and Chebyshev mixed 0.3 / 0.7.
    Star,
}

impl FalloffShape {
    /// Returns the name of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            FalloffShape::Square => "square",
            FalloffShape::Circle => "circle",
            FalloffShape::Diamond => "diamond",
            FalloffShape::Star => "star",
        }
    }

    /// Normalized distance in [0, 1] of `(x, y)` from a center at `(radius, radius)`.
    pub fn distance(&self, x: f32, y: f32, radius: f32) -> f32 {
        let dx = (x - radius).abs();
        let dy = (y - radius).abs();
        match self {
            FalloffShape::Square => chebyshev(dx, dy, radius),
            FalloffShape::Circle => ((dx * dx + dy * dy) / (radius * radius)).min(1.0),
            FalloffShape::Diamond => manhattan(dx, dy, radius),
            FalloffShape::Star => {
                let diamond = manhattan(dx, dy, radius);
                let square = chebyshev(dx, dy, radius);
                diamond + (square - diamond) * STAR_MIX
            }
        }
    }
}

const STAR_MIX: f32 = 0.7;

#[inline]
fn chebyshev(dx: f32, dy: f32, radius: f32) -> f32 {
    (dx.max(dy) / radius).min(1.0)
}

#[inline]
fn manhattan(dx: f32, dy: f32, radius: f32) -> f32 {
    ((dx + dy) / radius).min(1.0)
}

/// Multiplies every height by `1 - distance` so the map sinks to zero at its border.
pub fn apply_border_falloff(grid: &mut HeightGrid<'_>, shape: FalloffShape) {
    let size = grid.size();
    let radius = size as f32 / 2.0;
    grid.heights_mut()
        .par_chunks_mut(size)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, h) in row.iter_mut().enumerate() {
                *h *= 1.0 - shape.distance(x as f32, y as f32, radius);
            }
        });
}

/// Control points of the beach-flattening curve.
///
/// The 0.15..0.2 band collapses onto 0.16.
pub const BEACH_CURVE: [(f32, f32); 4] = [(0.0, 0.0), (0.15, 0.16), (0.2, 0.16), (1.0, 1.0)];

/// Remaps one height through [`BEACH_CURVE`].
///
/// Negative values and values at or above the last control point pass through.
pub fn remap_value(value: f32) -> f32 {
    if value < BEACH_CURVE[0].0 {
        return value;
    }
    for pair in BEACH_CURVE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if value < x1 {
            let t = (value - x0) / (x1 - x0);
            return y0 + (y1 - y0) * t;
        }
    }
    value
}

/// Applies [`remap_value`] to every cell.
pub fn remap_beaches(grid: &mut HeightGrid<'_>) {
    grid.heights_mut()
        .par_iter_mut()
        .for_each(|h| *h = remap_value(*h));
}
