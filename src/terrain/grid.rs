//! Bounds-checked mutable view over a caller-owned square heightmap.

use glam::Vec2;

use crate::error::ErosionError;

/// Height and downhill-facing gradient sampled at a continuous position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSample {
    pub height: f32,
    pub gradient: Vec2,
}

/// Checks that a buffer of `len` cells is a `map_size`x`map_size` grid.
pub fn check_dimensions(len: usize, map_size: usize) -> Result<(), ErosionError> {
    if map_size.checked_mul(map_size) != Some(len) {
        return Err(ErosionError::InvalidDimension { len, map_size });
    }
    Ok(())
}

/// Row-major square heightmap borrowed mutably for the duration of one operation.
///
/// The grid never copies or resizes the buffer; construction only validates that
/// its length matches `map_size²`.
#[derive(Debug)]
pub struct HeightGrid<'a> {
    heights: &'a mut [f32],
    size: usize,
}

impl<'a> HeightGrid<'a> {
    /// Wraps `heights` as a `map_size`x`map_size` grid.
    pub fn new(heights: &'a mut [f32], map_size: usize) -> Result<Self, ErosionError> {
        check_dimensions(heights.len(), map_size)?;
        Ok(Self {
            heights,
            size: map_size,
        })
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heights(&self) -> &[f32] {
        &*self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut *self.heights
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.heights[self.index(x, y)]
    }

    /// Bilinearly samples height and gradient at `pos`.
    ///
    /// `pos` must lie in `[0, size - 1)` on both axes so that all four nodes of the
    /// enclosing cell exist.
    pub fn sample(&self, pos: Vec2) -> HeightSample {
        let cell_x = pos.x as usize;
        let cell_y = pos.y as usize;
        // (0,0) = at NW node, (1,1) = at SE node
        let x = pos.x - cell_x as f32;
        let y = pos.y - cell_y as f32;

        let nw = self.index(cell_x, cell_y);
        let h_nw = self.heights[nw];
        let h_ne = self.heights[nw + 1];
        let h_sw = self.heights[nw + self.size];
        let h_se = self.heights[nw + self.size + 1];

        let gradient = Vec2::new(
            (h_ne - h_nw) * (1.0 - y) + (h_se - h_sw) * y,
            (h_sw - h_nw) * (1.0 - x) + (h_se - h_ne) * x,
        );
        let height = h_nw * (1.0 - x) * (1.0 - y)
            + h_ne * x * (1.0 - y)
            + h_sw * (1.0 - x) * y
            + h_se * x * y;

        HeightSample { height, gradient }
    }

    /// Spreads `amount` over the four nodes of the cell containing `pos`, weighted
    /// with the same bilinear factors used by [`HeightGrid::sample`].
    pub fn deposit(&mut self, pos: Vec2, amount: f32) {
        let cell_x = pos.x as usize;
        let cell_y = pos.y as usize;
        let x = pos.x - cell_x as f32;
        let y = pos.y - cell_y as f32;

        let nw = self.index(cell_x, cell_y);
        let size = self.size;
        self.heights[nw] += amount * (1.0 - x) * (1.0 - y);
        self.heights[nw + 1] += amount * x * (1.0 - y);
        self.heights[nw + size] += amount * (1.0 - x) * y;
        self.heights[nw + size + 1] += amount * x * y;
    }

    /// Removes up to `amount` from cell `index`, never taking more than the cell holds.
    ///
    /// Returns the height actually removed.
    #[inline]
    pub fn remove_clamped(&mut self, index: usize, amount: f32) -> f32 {
        let cell = &mut self.heights[index];
        let taken = if *cell < amount { *cell } else { amount };
        *cell -= taken;
        taken
    }

    /// Minimum and maximum height in the grid.
    pub fn height_range(&self) -> (f32, f32) {
        height_range(&*self.heights)
    }
}

/// Minimum and maximum of a height buffer; `(f32::MAX, f32::MIN)` when empty.
pub fn height_range(heights: &[f32]) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &h in heights {
        min = min.min(h);
        max = max.max(h);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: usize) -> Vec<f32> {
        (0..size * size)
            .map(|i| (i % size) as f32 / (size - 1) as f32)
            .collect()
    }

    #[test]
    fn rejects_mismatched_length() {
        let mut heights = vec![0.0f32; 15];
        let err = HeightGrid::new(&mut heights, 4).unwrap_err();
        assert_eq!(err, ErosionError::InvalidDimension { len: 15, map_size: 4 });
    }

    #[test]
    fn sample_at_node_returns_node_height() {
        let mut heights = ramp(8);
        let grid = HeightGrid::new(&mut heights, 8).unwrap();
        let s = grid.sample(Vec2::new(3.0, 2.0));
        assert!((s.height - 3.0 / 7.0).abs() < 1e-6);
        assert!((s.gradient.x - 1.0 / 7.0).abs() < 1e-6);
        assert!(s.gradient.y.abs() < 1e-6);
    }

    #[test]
    fn sample_interpolates_between_nodes() {
        let mut heights = ramp(8);
        let grid = HeightGrid::new(&mut heights, 8).unwrap();
        let s = grid.sample(Vec2::new(2.5, 4.25));
        assert!((s.height - 2.5 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn deposit_weights_sum_to_amount() {
        let mut heights = vec![0.0f32; 16];
        let mut grid = HeightGrid::new(&mut heights, 4).unwrap();
        grid.deposit(Vec2::new(1.3, 1.8), 0.5);
        let total: f32 = grid.heights().iter().sum();
        assert!((total - 0.5).abs() < 1e-6);
        // only the four nodes of cell (1,1) receive material
        assert_eq!(grid.get(0, 0), 0.0);
        assert!(grid.get(1, 2) > grid.get(1, 1));
    }

    #[test]
    fn remove_clamped_never_goes_negative() {
        let mut heights = vec![0.1f32; 4];
        let mut grid = HeightGrid::new(&mut heights, 2).unwrap();
        let taken = grid.remove_clamped(3, 0.25);
        assert!((taken - 0.1).abs() < 1e-7);
        assert_eq!(grid.get(1, 1), 0.0);
    }

    #[test]
    fn range_of_ramp() {
        let heights = ramp(5);
        assert_eq!(height_range(&heights), (0.0, 1.0));
    }
}
