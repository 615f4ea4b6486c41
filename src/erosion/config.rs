//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// Parameters for droplet erosion.
///
/// Read-only while a batch runs; replace it between batches with
/// [`Eroder::configure`](super::Eroder::configure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErosionConfig {
    /// Radius of the erosion brush in cells. Range (2, 8).
    pub erosion_radius: usize,
    /// Range (0, 1). At zero, water instantly turns downhill; at one it never turns.
    pub inertia: f32,
    /// Multiplier for how much sediment a droplet can carry.
    pub sediment_capacity_factor: f32,
    /// Keeps carry capacity away from zero on flat terrain.
    pub min_sediment_capacity: f32,
    /// Range (0, 1). How easily a droplet removes sediment.
    pub erode_speed: f32,
    /// Range (0, 1). How easily a droplet deposits sediment.
    pub deposit_speed: f32,
    /// Range (0, 1). Fraction of water lost every step.
    pub evaporate_speed: f32,
    /// Speed gained (or lost) per unit of height change.
    pub gravity: f32,
    /// Maximum number of steps a droplet lives.
    pub max_droplet_lifetime: u32,

    pub initial_water_volume: f32,
    pub initial_speed: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            erosion_radius: 6,
            inertia: 0.05,
            sediment_capacity_factor: 6.0,
            min_sediment_capacity: 0.01,
            erode_speed: 0.3,
            deposit_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            max_droplet_lifetime: 60,

            initial_water_volume: 1.0,
            initial_speed: 1.0,
        }
    }
}

impl ErosionConfig {
    /// Small brush and a longer lifetime: carves narrow gullies.
    pub fn fine_detail() -> Self {
        Self {
            erosion_radius: 3,
            inertia: 0.1,
            max_droplet_lifetime: 80,
            ..Default::default()
        }
    }

    /// Describes every parameter that falls outside its documented range.
    ///
    /// Out-of-range values are still simulated; this only feeds diagnostics.
    pub fn range_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(2..=8).contains(&self.erosion_radius) {
            warnings.push(format!(
                "erosion_radius {} outside recommended range [2, 8]",
                self.erosion_radius
            ));
        }
        let rates = [
            ("inertia", self.inertia),
            ("erode_speed", self.erode_speed),
            ("deposit_speed", self.deposit_speed),
            ("evaporate_speed", self.evaporate_speed),
        ];
        for (name, value) in rates {
            if !(value > 0.0 && value < 1.0) {
                warnings.push(format!("{} {} outside range (0, 1)", name, value));
            }
        }
        warnings
    }
}
