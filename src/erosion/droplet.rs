//! Single water droplet: samples the terrain, rolls downhill one cell per step and
//! erodes or deposits along the way.

use glam::Vec2;

use super::brush::BrushCache;
use super::config::ErosionConfig;
use crate::terrain::HeightGrid;

/// Direction lengths at or below this are left unnormalized.
const MIN_DIRECTION_LENGTH: f32 = 1e-4;

/// State of one droplet in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Droplet {
    /// Continuous position, not bound to a cell.
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub water: f32,
    /// Sediment currently carried.
    pub sediment: f32,
}

/// What happened to the terrain during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Material was removed across the brush; the value is the total height removed.
    Eroded(f32),
    /// Material was dropped on the four corners of the previous cell.
    Deposited(f32),
    /// Direction collapsed to zero; the droplet ends without touching the terrain.
    Stuck,
    /// The droplet rolled off the map; it ends without touching the terrain.
    LeftMap,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Stuck | StepOutcome::LeftMap)
    }
}

/// Why a droplet stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropletEnd {
    Stuck,
    LeftMap,
    /// Ran for `max_droplet_lifetime` steps.
    Expired,
}

/// Cumulative effect of one droplet's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropletTrace {
    pub steps: u32,
    pub eroded: f32,
    pub deposited: f32,
    pub end: DropletEnd,
}

impl Droplet {
    /// Creates a droplet at rest at `position`.
    pub fn spawn(position: Vec2, config: &ErosionConfig) -> Self {
        Self {
            position,
            direction: Vec2::ZERO,
            speed: config.initial_speed,
            water: config.initial_water_volume,
            sediment: 0.0,
        }
    }

    /// Advances the droplet by one step.
    ///
    /// The position must lie in `[0, size - 1)` on both axes; every non-terminal step
    /// leaves it there.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside that range or `brush` was built for a
    /// different map size than `grid`.
    pub fn step(
        &mut self,
        grid: &mut HeightGrid<'_>,
        brush: &BrushCache,
        config: &ErosionConfig,
    ) -> StepOutcome {
        let old_position = self.position;
        let cell = grid.index(old_position.x as usize, old_position.y as usize);
        let sample = grid.sample(old_position);

        // lerp with the old direction, inertia as mix value
        self.direction =
            self.direction * config.inertia - sample.gradient * (1.0 - config.inertia);
        let len = self.direction.length();
        if len > MIN_DIRECTION_LENGTH {
            self.direction /= len;
        }
        self.position += self.direction;

        if self.direction == Vec2::ZERO {
            return StepOutcome::Stuck;
        }
        let limit = (grid.size() - 1) as f32;
        if self.position.x < 0.0
            || self.position.x >= limit
            || self.position.y < 0.0
            || self.position.y >= limit
        {
            return StepOutcome::LeftMap;
        }

        let new_height = grid.sample(self.position).height;
        let delta_height = new_height - sample.height;

        // higher when moving fast down a slope with lots of water
        let capacity = (-delta_height * self.speed * self.water * config.sediment_capacity_factor)
            .max(config.min_sediment_capacity);

        let outcome = if self.sediment > capacity || delta_height > 0.0 {
            // uphill: try to fill up to the current height; otherwise drop part of the excess
            let amount = if delta_height > 0.0 {
                delta_height.min(self.sediment)
            } else {
                (self.sediment - capacity) * config.deposit_speed
            };
            self.sediment -= amount;
            // no brush here so deposits can fill small pits
            grid.deposit(old_position, amount);
            StepOutcome::Deposited(amount)
        } else {
            // never dig below the slope the droplet is riding
            let amount = ((capacity - self.sediment) * config.erode_speed).min(-delta_height);
            let mut removed = 0.0;
            for point in brush.points(cell) {
                removed += grid.remove_clamped(point.index, amount * point.weight);
            }
            self.sediment += removed;
            StepOutcome::Eroded(removed)
        };

        self.speed = (self.speed * self.speed + delta_height * config.gravity).sqrt();
        if self.speed.is_nan() {
            self.speed = 0.0;
        }
        self.water *= 1.0 - config.evaporate_speed;

        outcome
    }
}

/// Runs a droplet spawned at `position` until it stops or its lifetime runs out.
///
/// # Panics
///
/// Panics under the same conditions as [`Droplet::step`].
pub fn simulate_droplet(
    position: Vec2,
    grid: &mut HeightGrid<'_>,
    brush: &BrushCache,
    config: &ErosionConfig,
) -> DropletTrace {
    let mut droplet = Droplet::spawn(position, config);
    let mut trace = DropletTrace {
        steps: 0,
        eroded: 0.0,
        deposited: 0.0,
        end: DropletEnd::Expired,
    };

    for _ in 0..config.max_droplet_lifetime {
        match droplet.step(grid, brush, config) {
            StepOutcome::Eroded(amount) => trace.eroded += amount,
            StepOutcome::Deposited(amount) => trace.deposited += amount,
            StepOutcome::Stuck => {
                trace.end = DropletEnd::Stuck;
                break;
            }
            StepOutcome::LeftMap => {
                trace.end = DropletEnd::LeftMap;
                break;
            }
        }
        trace.steps += 1;
    }

    trace
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 16;

    fn ramp_down_x() -> Vec<f32> {
        (0..SIZE * SIZE)
            .map(|i| 1.0 - (i % SIZE) as f32 / (SIZE - 1) as f32)
            .collect()
    }

    fn small_brush_config() -> ErosionConfig {
        ErosionConfig {
            erosion_radius: 2,
            ..Default::default()
        }
    }

    #[test]
    fn flat_map_droplet_is_stuck_immediately() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = vec![0.5f32; SIZE * SIZE];
        let before = heights.clone();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        let mut droplet = Droplet::spawn(Vec2::new(6.3, 7.7), &config);
        assert_eq!(droplet.step(&mut grid, &brush, &config), StepOutcome::Stuck);
        assert_eq!(droplet.direction, Vec2::ZERO);

        let trace = simulate_droplet(Vec2::new(3.0, 9.5), &mut grid, &brush, &config);
        assert_eq!(trace.end, DropletEnd::Stuck);
        assert_eq!(trace.steps, 0);
        assert_eq!(grid.heights(), &before[..]);
    }

    #[test]
    fn ramp_droplet_rolls_downhill_and_erodes() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = ramp_down_x();
        let before = heights.clone();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        let start = Vec2::new(4.5, 7.5);
        let mut droplet = Droplet::spawn(start, &config);
        let outcome = droplet.step(&mut grid, &brush, &config);

        assert!((droplet.direction - Vec2::X).length() < 1e-5, "{:?}", droplet.direction);
        assert!((droplet.position - Vec2::new(5.5, 7.5)).length() < 1e-5);
        let removed = match outcome {
            StepOutcome::Eroded(amount) => amount,
            other => panic!("expected erosion, got {:?}", other),
        };
        // capped by the height drop of one cell
        assert!(removed > 0.0 && removed <= 1.0 / 15.0 + 1e-6);

        let spawn_cell = 7 * SIZE + 4;
        assert!(grid.heights()[spawn_cell] < before[spawn_cell]);

        // moving down a slope spends speed: sqrt(1 + delta * gravity)
        let expected_speed = (1.0f32 + (-1.0 / 15.0) * config.gravity).sqrt();
        assert!((droplet.speed - expected_speed).abs() < 1e-4);
        assert!(droplet.speed.is_finite() && droplet.speed >= 0.0);
        assert!((droplet.water - 0.99).abs() < 1e-6);
    }

    #[test]
    fn ramp_droplet_keeps_heading_downhill() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = ramp_down_x();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        let mut droplet = Droplet::spawn(Vec2::new(2.25, 8.5), &config);
        let mut last_x = droplet.position.x;
        for _ in 0..config.max_droplet_lifetime {
            let outcome = droplet.step(&mut grid, &brush, &config);
            if outcome.is_terminal() {
                assert_eq!(outcome, StepOutcome::LeftMap);
                break;
            }
            assert!(droplet.direction.x > 0.9, "{:?}", droplet.direction);
            assert!(droplet.position.x > last_x);
            assert!(droplet.speed.is_finite() && droplet.speed >= 0.0);
            last_x = droplet.position.x;
        }
    }

    #[test]
    fn each_step_conserves_terrain_plus_sediment() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        // bumpy bowl so droplets both erode and deposit
        let mut heights: Vec<f32> = (0..SIZE * SIZE)
            .map(|i| {
                let x = (i % SIZE) as f32 - 7.5;
                let y = (i / SIZE) as f32 - 7.5;
                0.002 * (x * x + y * y) + 0.05 * ((x * 1.3).sin() * (y * 0.7).cos())
            })
            .map(|h| h + 0.2)
            .collect();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        let mut saw_erosion = false;
        let mut saw_deposit = false;
        for start in [Vec2::new(2.2, 3.1), Vec2::new(12.6, 4.4), Vec2::new(9.9, 13.2)] {
            let mut droplet = Droplet::spawn(start, &config);
            for _ in 0..config.max_droplet_lifetime {
                let before: f64 = grid.heights().iter().map(|&h| h as f64).sum::<f64>()
                    + droplet.sediment as f64;
                let outcome = droplet.step(&mut grid, &brush, &config);
                if outcome.is_terminal() {
                    break;
                }
                saw_erosion |= matches!(outcome, StepOutcome::Eroded(a) if a > 0.0);
                saw_deposit |= matches!(outcome, StepOutcome::Deposited(a) if a > 0.0);
                let after: f64 = grid.heights().iter().map(|&h| h as f64).sum::<f64>()
                    + droplet.sediment as f64;
                assert!((after - before).abs() < 1e-4, "mass drifted by {}", after - before);
            }
        }
        assert!(saw_erosion);
        assert!(saw_deposit);
    }

    #[test]
    fn erosion_never_digs_below_zero() {
        let config = ErosionConfig {
            erosion_radius: 2,
            erode_speed: 0.9,
            sediment_capacity_factor: 50.0,
            ..Default::default()
        };
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        // thin layer over a steep ramp
        let mut heights: Vec<f32> = (0..SIZE * SIZE)
            .map(|i| if i % SIZE < 4 { 0.02 * (4 - i % SIZE) as f32 } else { 0.0 })
            .collect();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();
        for y in 1..SIZE - 2 {
            simulate_droplet(Vec2::new(0.5, y as f32 + 0.5), &mut grid, &brush, &config);
        }
        assert!(grid.heights().iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn droplet_expires_after_lifetime() {
        let config = ErosionConfig {
            erosion_radius: 2,
            max_droplet_lifetime: 3,
            ..Default::default()
        };
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = ramp_down_x();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();
        let trace = simulate_droplet(Vec2::new(1.5, 5.5), &mut grid, &brush, &config);
        assert_eq!(trace.end, DropletEnd::Expired);
        assert_eq!(trace.steps, 3);
        assert!(trace.eroded > 0.0);
    }

    #[test]
    fn uphill_step_deposits_carried_sediment() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = ramp_down_x();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        // heading uphill against the slope with full inertia
        let mut droplet = Droplet::spawn(Vec2::new(8.5, 8.5), &config);
        droplet.direction = Vec2::new(-1.0, 0.0);
        droplet.sediment = 0.01;
        let uphill = ErosionConfig {
            inertia: 1.0,
            ..config
        };
        let total_before: f32 = grid.heights().iter().sum();
        let outcome = droplet.step(&mut grid, &brush, &uphill);
        assert_eq!(outcome, StepOutcome::Deposited(0.01));
        assert_eq!(droplet.sediment, 0.0);
        let total_after: f32 = grid.heights().iter().sum();
        assert!((total_after - total_before - 0.01).abs() < 1e-4);
    }

    #[test]
    fn nan_speed_is_clamped_to_zero() {
        let config = ErosionConfig {
            erosion_radius: 2,
            gravity: 100.0,
            ..Default::default()
        };
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights = ramp_down_x();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        // 1 - 100/15 is negative, so the square root is NaN
        let mut droplet = Droplet::spawn(Vec2::new(4.5, 7.5), &config);
        let outcome = droplet.step(&mut grid, &brush, &config);
        assert!(matches!(outcome, StepOutcome::Eroded(a) if a > 0.0), "{:?}", outcome);
        assert_eq!(droplet.speed, 0.0);

        let outcome = droplet.step(&mut grid, &brush, &config);
        assert!(!outcome.is_terminal(), "{:?}", outcome);
        assert!(droplet.speed.is_finite() && droplet.speed >= 0.0);
    }

    #[test]
    fn tiny_direction_is_not_normalized() {
        let config = small_brush_config();
        let brush = BrushCache::build(SIZE, config.erosion_radius).unwrap();
        let mut heights: Vec<f32> = (0..SIZE * SIZE)
            .map(|i| 0.5 - 1e-5 * (i % SIZE) as f32)
            .collect();
        let mut grid = HeightGrid::new(&mut heights, SIZE).unwrap();

        let start = Vec2::new(4.5, 7.5);
        let mut droplet = Droplet::spawn(start, &config);
        let outcome = droplet.step(&mut grid, &brush, &config);

        let len = droplet.direction.length();
        assert!(len > 0.0 && len <= 1e-4, "{:?}", droplet.direction);
        assert!(droplet.direction.x > 0.0);
        assert_eq!(droplet.position, start + droplet.direction);
        assert!(!outcome.is_terminal(), "{:?}", outcome);
    }
}
