use anyhow::Result;
use clap::Parser;
use rand::{SeedableRng, rngs::SmallRng};
use std::path::PathBuf;
use tracing::info;
use wildgrid_app::{Scenario, generate_terrain, run, seed_population};
use wildgrid_core::WorldState;

#[derive(Parser, Debug)]
#[command(
    name = "wildgrid",
    version,
    about = "Headless grid-ecosystem simulator"
)]
struct Args {
    /// Grid rows.
    #[arg(long, default_value_t = 48)]
    rows: i32,

    /// Grid columns.
    #[arg(long, default_value_t = 64)]
    cols: i32,

    /// Ticks to simulate.
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Seed for terrain, placement, and the world RNG. Overrides the
    /// scenario file.
    #[arg(long)]
    seed: Option<u64>,

    /// Scenario file (JSON) overriding world configuration and spawn
    /// counts.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Log a census line every N ticks (0 disables).
    #[arg(long, default_value_t = 200)]
    log_every: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = args.seed {
        scenario.world.rng_seed = Some(seed);
    }

    let bootstrap_seed = scenario.world.rng_seed.unwrap_or(0x0B10_D1CE);
    let mut rng = SmallRng::seed_from_u64(bootstrap_seed);
    let terrain = generate_terrain(args.rows, args.cols, &mut rng)?;
    let mut world = WorldState::new(scenario.world.clone(), terrain)?;
    let placed = seed_population(&mut world, &scenario.spawn, &mut rng);
    info!(
        rows = args.rows,
        cols = args.cols,
        placed,
        seed = ?scenario.world.rng_seed,
        "world ready"
    );

    let report = run(&mut world, args.ticks, args.log_every);
    info!(
        ticks = report.ticks,
        moves = report.moves,
        infections = report.infections,
        rain_spells = report.rain_spells,
        "run complete"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
