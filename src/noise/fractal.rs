//! Multi-octave fractal Brownian motion (fBm) base heightmaps.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

/// Configuration for the fractal noise an island starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (4-8 typical).
    pub octaves: u8,
    /// Noise periods across the whole map.
    pub scale: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
    /// Round heights to 256 levels, like a grayscale source image.
    pub quantize: bool,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            scale: 4.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
            quantize: true,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Fewer, broader octaves: gentle rolling hills.
    pub fn rolling_hills(seed: i32) -> Self {
        Self {
            octaves: 4,
            scale: 2.5,
            persistence: 0.4,
            seed,
            ..Default::default()
        }
    }
}

/// Generates a `map_size`x`map_size` row-major heightmap normalized to [0, 1].
///
/// A constant noise field (including `map_size == 1`) maps to 0.
pub fn generate_base_heightmap(map_size: usize, config: &FractalNoiseConfig) -> Vec<f32> {
    if map_size == 0 {
        return Vec::new();
    }

    let frequency = config.scale / map_size as f32;
    let (mut heights, _, _) = NoiseBuilder::fbm_2d(map_size, map_size)
        .with_seed(config.seed)
        .with_freq(frequency)
        .with_octaves(config.octaves.max(1))
        .with_lacunarity(config.lacunarity)
        .with_gain(config.persistence)
        .generate();

    let (min, max) = crate::terrain::height_range(&heights);
    let range = max - min;
    let quantize = config.quantize;
    heights.par_iter_mut().for_each(|h| {
        let normalized = if range > f32::EPSILON {
            ((*h - min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        *h = if quantize {
            (normalized * 255.0).round() / 255.0
        } else {
            normalized
        };
    });
    heights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FractalNoiseConfig::default();
        assert_eq!(config.octaves, 6);
        assert_eq!(config.lacunarity, 2.0);
        assert_eq!(config.persistence, 0.5);
    }

    #[test]
    fn test_heightmap_range_and_size() {
        let heights = generate_base_heightmap(64, &FractalNoiseConfig::default());
        assert_eq!(heights.len(), 64 * 64);
        assert!(heights.iter().all(|&h| (0.0..=1.0).contains(&h)));
        let (min, max) = crate::terrain::height_range(&heights);
        assert!(min < 0.01 && max > 0.99, "range was [{}, {}]", min, max);
    }

    #[test]
    fn test_heightmap_reproducibility() {
        let config = FractalNoiseConfig::with_seed(999);
        let a = generate_base_heightmap(32, &config);
        let b = generate_base_heightmap(32, &config);
        assert_eq!(a, b, "Same configuration should produce identical heights");
    }

    #[test]
    fn test_different_seeds_produce_different_results() {
        let a = generate_base_heightmap(32, &FractalNoiseConfig::with_seed(1));
        let b = generate_base_heightmap(32, &FractalNoiseConfig::with_seed(2));
        assert_ne!(a, b, "Different seeds should produce different results");
    }

    #[test]
    fn test_quantized_levels() {
        let heights = generate_base_heightmap(32, &FractalNoiseConfig::with_seed(5));
        for h in heights {
            let level = h * 255.0;
            assert!((level - level.round()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_empty_map() {
        assert!(generate_base_heightmap(0, &FractalNoiseConfig::default()).is_empty());
    }
}
