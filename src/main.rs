use stellar_core::{bench_gravity, bench_step};
use stellar_core::{CollisionEvent, Scenario, ScenarioConfig, Selection};

use anyhow::{Context, Result};
use clap::Parser;
use instant::Instant;
use log::info;

use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "solar_system.yaml")]
    file_name: String,

    /// Frames to run headless
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Warp ladder rung to start on
    #[arg(short, long)]
    warp: Option<usize>,

    /// Run the direct vs Barnes-Hut timing tables instead
    #[arg(long)]
    bench: bool,

    /// Write the final world to this YAML snapshot
    #[arg(long)]
    save: Option<PathBuf>,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml(&text)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    let mut engine = scenario.into_engine();

    if let Some(level) = args.warp {
        engine.set_warp_level(level);
    }

    let report_every = (args.ticks / 10).max(1);
    let mut merges = 0;
    let mut impacts = 0;

    for frame in 1..=args.ticks {
        let report = engine.tick(Instant::now());

        for event in &report.events {
            match event {
                CollisionEvent::PlanetsMerged { .. } => merges += 1,
                CollisionEvent::CometImpact { .. } => impacts += 1,
                _ => {}
            }
        }

        if frame % report_every == 0 {
            let world = engine.world();
            let p = world.total_momentum();
            info!(
                "frame {:5} t = {:9.1}  stars {}  planets {}  comets {}  momentum ({:.3e}, {:.3e})",
                frame,
                world.t,
                world.stars.len(),
                world.planets.len(),
                world.comets.len(),
                p.x,
                p.y
            );
        }
    }

    let forecast = engine.forecast();
    info!(
        "done: {} merges, {} comet impacts, {} predicted collisions",
        merges,
        impacts,
        forecast.collisions.len()
    );

    if let Some(path) = args.save {
        engine
            .snapshot(Selection::default())
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        info!("saved snapshot to {}", path.display());
    }

    Ok(())
}
