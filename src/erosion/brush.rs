//! Precomputed erosion brush: for every cell, the neighbors inside the erosion radius
//! and how much of an erosion event each of them takes.

use crate::error::ErosionError;

/// One brush entry: a neighbor cell index and its normalized weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPoint {
    pub index: usize,
    pub weight: f32,
}

/// Flattened brush table for one `(map_size, radius)` pair.
///
/// Neighbor indices and weights of all cells live in two contiguous arrays; `spans`
/// holds each cell's `(start, len)` into them.
#[derive(Debug, Clone)]
pub struct BrushCache {
    map_size: usize,
    radius: usize,
    indices: Vec<u32>,
    weights: Vec<f32>,
    spans: Vec<(u32, u32)>,
}

/// Unclipped disc shared by every cell whose brush fits inside the grid.
struct DiscPattern {
    offsets: Vec<(i32, i32)>,
    weights: Vec<f32>,
}

impl DiscPattern {
    fn new(radius: usize) -> Self {
        let mut offsets = Vec::new();
        let mut raw = Vec::new();
        scan_disc(radius, |dx, dy, w| {
            offsets.push((dx, dy));
            raw.push(w);
        });
        let sum: f32 = raw.iter().sum();
        let weights = raw.into_iter().map(|w| w / sum).collect();
        Self { offsets, weights }
    }
}

/// Visits every offset strictly inside `radius` with its unnormalized weight.
fn scan_disc(radius: usize, mut visit: impl FnMut(i32, i32, f32)) {
    let r = radius as i32;
    let r_sq = r * r;
    for dy in -r..=r {
        for dx in -r..=r {
            let sqr_dst = dx * dx + dy * dy;
            if sqr_dst < r_sq {
                let weight = 1.0 - (sqr_dst as f32).sqrt() / radius as f32;
                visit(dx, dy, weight);
            }
        }
    }
}

impl BrushCache {
    /// Builds the brush table for a `map_size`x`map_size` grid.
    ///
    /// Cells within `radius` of a border rescan their neighborhood with clipping;
    /// all other cells translate one shared disc pattern.
    pub fn build(map_size: usize, radius: usize) -> Result<Self, ErosionError> {
        if radius == 0 || radius.saturating_mul(2) >= map_size {
            return Err(ErosionError::InvalidRadius { radius, map_size });
        }

        let disc = DiscPattern::new(radius);
        // indices and span offsets are stored as u32
        let too_large = || ErosionError::MapTooLarge { map_size, radius };
        let cells = map_size.checked_mul(map_size).ok_or_else(too_large)?;
        let capacity = cells
            .checked_mul(disc.offsets.len())
            .filter(|&n| n <= u32::MAX as usize)
            .ok_or_else(too_large)?;
        let mut indices = Vec::with_capacity(capacity);
        let mut weights = Vec::with_capacity(capacity);
        let mut spans = Vec::with_capacity(cells);

        let size = map_size as i64;
        let r = radius as i64;
        let mut clipped_weights: Vec<f32> = Vec::with_capacity(disc.offsets.len());

        for i in 0..cells {
            let cx = (i % map_size) as i64;
            let cy = (i / map_size) as i64;
            let start = indices.len();

            let near_border = cy <= r || cy >= size - r || cx <= r || cx >= size - r;
            if near_border {
                clipped_weights.clear();
                let mut sum = 0.0f32;
                scan_disc(radius, |dx, dy, w| {
                    let x = cx + dx as i64;
                    let y = cy + dy as i64;
                    if x >= 0 && x < size && y >= 0 && y < size {
                        indices.push((y * size + x) as u32);
                        clipped_weights.push(w);
                        sum += w;
                    }
                });
                weights.extend(clipped_weights.iter().map(|w| w / sum));
            } else {
                let center = cy * size + cx;
                indices.extend(
                    disc.offsets
                        .iter()
                        .map(|&(dx, dy)| (center + dy as i64 * size + dx as i64) as u32),
                );
                weights.extend_from_slice(&disc.weights);
            }

            spans.push((start as u32, (indices.len() - start) as u32));
        }

        Ok(Self {
            map_size,
            radius,
            indices,
            weights,
            spans,
        })
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// True when this table was built for `map_size` and `radius`.
    pub fn matches(&self, map_size: usize, radius: usize) -> bool {
        self.map_size == map_size && self.radius == radius
    }

    /// Number of brush points stored for cell `cell`.
    pub fn len_at(&self, cell: usize) -> usize {
        self.spans[cell].1 as usize
    }

    /// Brush points of cell `cell`.
    pub fn points(&self, cell: usize) -> impl Iterator<Item = BrushPoint> + '_ {
        let (start, len) = self.spans[cell];
        let range = start as usize..(start + len) as usize;
        self.indices[range.clone()]
            .iter()
            .zip(&self.weights[range])
            .map(|(&index, &weight)| BrushPoint {
                index: index as usize,
                weight,
            })
    }

    /// Total brush points across all cells.
    pub fn total_points(&self) -> usize {
        self.indices.len()
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.indices.len() * std::mem::size_of::<u32>()
            + self.weights.len() * std::mem::size_of::<f32>()
            + self.spans.len() * std::mem::size_of::<(u32, u32)>()
    }
}

/// Number of points in an unclipped brush of `radius`.
pub fn disc_point_count(radius: usize) -> usize {
    let mut count = 0;
    scan_disc(radius, |_, _, _| count += 1);
    count
}
