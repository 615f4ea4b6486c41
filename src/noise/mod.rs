//! Noise generation module for island base heightmaps.
//!
//! Uses simdnoise for high-performance SIMD-accelerated noise generation.

mod fractal;

pub use fractal::{generate_base_heightmap, FractalNoiseConfig};
