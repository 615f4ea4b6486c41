//! Droplet-based hydraulic erosion.
//!
//! Each droplet is spawned at a random point, rolls downhill one cell per step and
//! trades material with the terrain: it picks sediment up across a disc-shaped brush
//! while it has spare capacity and drops it on the four nodes of its cell when it
//! slows down or climbs. Droplets run one after another on the shared heightmap.

mod config;
pub mod brush;
pub mod droplet;
mod eroder;

pub use brush::{BrushCache, BrushPoint};
pub use config::ErosionConfig;
pub use droplet::{simulate_droplet, Droplet, DropletEnd, DropletTrace, StepOutcome};
pub use eroder::{Eroder, ErosionStats};
