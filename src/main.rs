//! Islandgen CLI - procedural island generator.
//!
//! Shapes fractal noise into an island, scatters trees, then erodes it with simulated
//! water droplets while the trees follow the changing ground. Prints a summary of the
//! result.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use islandgen::erosion::{brush::disc_point_count, ErosionConfig, ErosionStats};
use islandgen::noise::FractalNoiseConfig;
use islandgen::terrain::{FalloffShape, Island, IslandConfig};
use islandgen::vegetation::{place_trees, relocate_trees, VegetationConfig};

/// Procedural island generator with droplet erosion.
#[derive(Parser)]
#[command(name = "islandgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and erode an island heightmap.
    Generate(GenerateArgs),

    /// Display memory and brush information for a map size.
    Info {
        /// Width and height of the heightmap in cells.
        #[arg(short, long, default_value = "512")]
        size: usize,

        /// Erosion brush radius in cells.
        #[arg(short, long, default_value = "6")]
        radius: usize,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Width and height of the heightmap in cells.
    #[arg(short, long, default_value = "512")]
    size: usize,

    /// Random seed for reproducible generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Island outline produced by the border falloff.
    #[arg(long, default_value = "square")]
    shape: ShapeArg,

    /// Number of noise octaves (1-16).
    #[arg(long, default_value = "6")]
    octaves: u8,

    /// Noise periods across the map.
    #[arg(long, default_value = "4.0")]
    scale: f32,

    /// Total droplets to simulate.
    #[arg(short, long, default_value = "100000")]
    droplets: u32,

    /// Droplets per erosion batch.
    #[arg(long, default_value = "350")]
    batch: u32,

    // Erosion options
    /// Erosion brush radius in cells (2-8).
    #[arg(long, default_value = "6")]
    radius: usize,

    /// Direction inertia (0-1).
    #[arg(long, default_value = "0.05")]
    inertia: f32,

    /// Sediment capacity multiplier.
    #[arg(long, default_value = "6.0")]
    capacity: f32,

    /// Erode speed (0-1).
    #[arg(long, default_value = "0.3")]
    erode_speed: f32,

    /// Deposit speed (0-1).
    #[arg(long, default_value = "0.3")]
    deposit_speed: f32,

    /// Evaporate speed (0-1).
    #[arg(long, default_value = "0.01")]
    evaporate_speed: f32,

    /// Maximum steps per droplet.
    #[arg(long, default_value = "60")]
    lifetime: u32,

    // Vegetation options
    /// Number of trees to place.
    #[arg(long, default_value = "8190")]
    trees: usize,

    /// Skip tree placement.
    #[arg(long)]
    skip_trees: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    /// Chebyshev falloff.
    Square,
    /// Euclidean falloff.
    Circle,
    /// Manhattan falloff.
    Diamond,
    /// Manhattan/Chebyshev mix.
    Star,
}

impl From<ShapeArg> for FalloffShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Square => FalloffShape::Square,
            ShapeArg::Circle => FalloffShape::Circle,
            ShapeArg::Diamond => FalloffShape::Diamond,
            ShapeArg::Star => FalloffShape::Star,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { size, radius } => run_info(size, radius),
    }
}

fn run_generate(args: GenerateArgs) {
    // Validate parameters
    if args.size < 16 || args.size > 4096 {
        eprintln!("Error: Size must be between 16 and 4096");
        std::process::exit(1);
    }

    if args.octaves < 1 || args.octaves > 16 {
        eprintln!("Error: Octaves must be between 1 and 16");
        std::process::exit(1);
    }

    if args.radius == 0 || args.radius * 2 >= args.size {
        eprintln!("Error: Radius must be at least 1 and less than half the map size");
        std::process::exit(1);
    }

    if args.batch == 0 {
        eprintln!("Error: Batch size must be at least 1");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = args.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });

    let shape = FalloffShape::from(args.shape);

    println!("Islandgen - Procedural Island Generator");
    println!("=======================================");
    println!("Size: {}x{}", args.size, args.size);
    println!("Seed: {}", seed);
    println!("Shape: {}", shape.name());

    let config = IslandConfig {
        map_size: args.size,
        noise: FractalNoiseConfig {
            octaves: args.octaves,
            scale: args.scale,
            seed: seed as i32,
            ..Default::default()
        },
        shape,
        erosion: ErosionConfig {
            erosion_radius: args.radius,
            inertia: args.inertia,
            sediment_capacity_factor: args.capacity,
            erode_speed: args.erode_speed,
            deposit_speed: args.deposit_speed,
            evaporate_speed: args.evaporate_speed,
            max_droplet_lifetime: args.lifetime,
            ..Default::default()
        },
    };

    println!("\nGenerating island...");
    let start = Instant::now();
    let mut island = Island::generate(&config, seed).unwrap_or_else(|e| {
        eprintln!("Error during generation: {}", e);
        std::process::exit(1);
    });
    println!("Generation completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = island.height_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    let vegetation = VegetationConfig {
        count: args.trees,
        ..Default::default()
    };
    let mut tree_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut trees = if args.skip_trees {
        Vec::new()
    } else {
        let trees = place_trees(island.heights(), island.map_size(), &vegetation, &mut tree_rng)
            .unwrap_or_else(|e| {
                eprintln!("Error placing trees: {}", e);
                std::process::exit(1);
            });
        island.mark_trees_relocated();
        println!("\nPlaced {} of {} trees", trees.len(), vegetation.count);
        trees
    };

    if args.droplets > 0 {
        println!("\nEroding {} droplets in batches of {}...", args.droplets, args.batch);
        let erode_start = Instant::now();
        // trees follow the terrain every ten batches
        let relocation_interval = args.batch as u64 * 10;
        let mut relocations = 0u32;
        let mut remaining = args.droplets;
        while remaining > 0 {
            let batch = remaining.min(args.batch);
            island.erode(batch).unwrap_or_else(|e| {
                eprintln!("Error during erosion: {}", e);
                std::process::exit(1);
            });
            remaining -= batch;

            let due = island.relocation_due(relocation_interval) || remaining == 0;
            if !trees.is_empty() && due {
                relocate_trees(
                    &mut trees,
                    island.heights(),
                    island.map_size(),
                    &vegetation,
                    &mut tree_rng,
                )
                .unwrap_or_else(|e| {
                    eprintln!("Error relocating trees: {}", e);
                    std::process::exit(1);
                });
                island.mark_trees_relocated();
                relocations += 1;
            }
        }
        let elapsed = erode_start.elapsed();
        println!(
            "Eroded {} droplets in {:.2?} ({:.0} droplets/s)",
            island.droplets_simulated(),
            elapsed,
            island.droplets_simulated() as f64 / elapsed.as_secs_f64().max(1e-9)
        );
        print_stats(island.totals());

        let (min_h, max_h) = island.height_range();
        println!("Height range: [{:.4}, {:.4}]", min_h, max_h);
        if !trees.is_empty() {
            println!("Relocated trees {} times", relocations);
        }
    } else {
        println!("\nErosion: SKIPPED");
    }

    if args.skip_trees {
        println!("\nTree placement: SKIPPED");
    }
}

fn print_stats(stats: &ErosionStats) {
    println!("  Steps:      {:>12}", stats.steps);
    println!("  Eroded:     {:>12.4}", stats.eroded);
    println!("  Deposited:  {:>12.4}", stats.deposited);
    println!("  Stuck:      {:>12}", stats.stuck);
    println!("  Left map:   {:>12}", stats.left_map);
    println!("  Expired:    {:>12}", stats.expired);
}

fn run_info(size: usize, radius: usize) {
    let cells = (size as u64) * (size as u64);
    let bytes_heights = cells * 4; // f32
    let points_per_cell = disc_point_count(radius) as u64;
    // upper bound: border cells are clipped and hold fewer points
    let bytes_brush = cells * points_per_cell * 8 + cells * 8;

    println!("Islandgen - Map Configuration Info");
    println!("==================================");
    println!();
    println!("Size: {}x{}", size, size);
    println!("Cells: {}", cells);
    println!("Brush radius: {} ({} points per interior cell)", radius, points_per_cell);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:      {:>12} bytes ({:.2} MB)", bytes_heights, bytes_heights as f64 / 1024.0 / 1024.0);
    println!("  Brush cache: <{:>12} bytes ({:.2} MB)", bytes_brush, bytes_brush as f64 / 1024.0 / 1024.0);
    println!();

    if radius == 0 || radius * 2 >= size {
        println!("Radius {} does not fit this map: erosion would be rejected", radius);
    } else if !(2..=8).contains(&radius) {
        println!("Radius {} is outside the recommended range [2, 8]", radius);
    } else {
        println!("Radius OK");
    }
}
