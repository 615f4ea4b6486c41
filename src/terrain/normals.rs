//! Surface normals from heightmaps (Sobel).

use glam::Vec3;
use rayon::prelude::*;

use super::grid::check_dimensions;
use crate::error::ErosionError;

/// Vertical exaggeration of the Sobel gradients; matches the terrain shader.
pub const NORMAL_STRENGTH: f32 = 20.0;

fn height_at_clamped(heights: &[f32], size: i64, x: i64, y: i64, max_row: i64) -> f32 {
    let u = x.clamp(0, size - 1);
    let v = y.clamp(0, max_row);
    heights[(v * size + u) as usize]
}

/// Unit surface normal at cell `(x, y)` with Y pointing up.
///
/// Neighbors outside the grid are clamped to the border, never wrapped.
pub fn surface_normal(
    heights: &[f32],
    map_size: usize,
    x: usize,
    y: usize,
) -> Result<Vec3, ErosionError> {
    check_dimensions(heights.len(), map_size)?;
    if x >= map_size || y >= map_size {
        return Err(ErosionError::CoordinateOutOfBounds { x, y, map_size });
    }
    Ok(sobel_normal(heights, map_size, x, y))
}

fn sobel_normal(heights: &[f32], map_size: usize, x: usize, y: usize) -> Vec3 {
    // Gx =
    // [ -1  0  1 ]
    // [ -2  0  2 ]
    // [ -1  0  1 ]
    //
    // Gy =
    // [ -1 -2 -1 ]
    // [  0  0  0 ]
    // [  1  2  1 ]
    let size = map_size as i64;
    let (x, y) = (x as i64, y as i64);
    let last = size - 1;

    let tl = height_at_clamped(heights, size, x - 1, y - 1, last);
    let t = height_at_clamped(heights, size, x, y - 1, last);
    let tr = height_at_clamped(heights, size, x + 1, y - 1, last);
    let l = height_at_clamped(heights, size, x - 1, y, last);
    // The right neighbor's row bound is the inclusive map size rather than the last
    // row; it only differs for rows outside the grid, which `surface_normal` rejects.
    let r = height_at_clamped(heights, size, x + 1, y, size);
    let bl = height_at_clamped(heights, size, x - 1, y + 1, last);
    let b = height_at_clamped(heights, size, x, y + 1, last);
    let br = height_at_clamped(heights, size, x + 1, y + 1, last);

    let dx = tr + 2.0 * r + br - tl - 2.0 * l - bl;
    let dy = bl + 2.0 * b + br - tl - 2.0 * t - tr;

    Vec3::new(-dx, 1.0 / NORMAL_STRENGTH, -dy).normalize_or_zero()
}

/// Normals for every cell, row-major.
pub fn normal_map(heights: &[f32], map_size: usize) -> Result<Vec<Vec3>, ErosionError> {
    check_dimensions(heights.len(), map_size)?;
    Ok((0..heights.len())
        .into_par_iter()
        .map(|i| sobel_normal(heights, map_size, i % map_size, i / map_size))
        .collect())
}
