use atomsim::configuration::config::ArenaConfig;
use atomsim::{bench_collisions, bench_update, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

mod logging;

/// 2D particle playground
///
/// Default behaviour: click to spawn, white particles, rectangular arena.
#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up under scenarios/ when not an existing path
    #[arg(short = 'f', default_value = "default.yaml")]
    file_name: String,

    /// Cycle through colours when spawning
    #[arg(short = 'c')]
    cycle_colours: bool,

    /// Automatically spawn N objects at the centre; manual spawning is off
    #[arg(short = 'a', value_name = "N")]
    auto: Option<usize>,

    /// Default object radius
    #[arg(short = 'r', value_name = "N", value_parser = non_negative)]
    radius: Option<f64>,

    /// Maximum random spawn speed per axis
    #[arg(short = 'v', value_name = "N", value_parser = non_negative)]
    vmax: Option<f64>,

    /// Fixed spawn velocity, e.g. `-s 0 100` to send objects straight down
    #[arg(short = 's', num_args = 2, value_names = ["X", "Y"], value_parser = non_negative)]
    spawn_velocity: Option<Vec<f64>>,

    /// Random radii within 10% of the default radius
    #[arg(short = 'R')]
    random_radius: bool,

    /// Circular arena instead of a rectangle
    #[arg(short = 'C')]
    circular: bool,

    /// Run headless for this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Run the timing benchmarks and exit
    #[arg(long)]
    bench: bool,
}

fn non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("invalid value '{s}'"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid value '{s}': expected a non-negative number"));
    }
    Ok(value)
}

// load here to keep main clean
fn load_scenario_config(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.is_file() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    let cfg = ScenarioConfig::load(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;
    log::info!("loaded scenario {}", config_path.display());
    Ok(cfg)
}

/// Map the command-line flags onto the loaded configuration
fn apply_flags(cfg: &mut ScenarioConfig, args: &Args) {
    if args.cycle_colours {
        cfg.parameters.cycle_colours = true;
    }
    if let Some(limit) = args.auto {
        cfg.engine.auto_spawn = true;
        cfg.engine.object_limit = Some(limit);
    }
    if let Some(r) = args.radius {
        cfg.parameters.default_radius = r;
    }
    if let Some(v) = args.vmax {
        cfg.parameters.vmax = v;
    }
    if let Some(v) = &args.spawn_velocity {
        cfg.parameters.spawn_velocity = Some([v[0], v[1]]);
    }
    if args.random_radius {
        cfg.parameters.random_radius = true;
    }
    if args.circular {
        cfg.engine.arena = ArenaConfig::Circle;
    }
}

/// Drive the engine without a window, logging once per simulated second
fn run_headless(mut scenario: Scenario, frames: u64) -> Result<()> {
    let fps = u64::from(scenario.engine.settings().fps);
    log::info!("running headless for {frames} frames");

    for frame in 1..=frames {
        scenario.engine.tick()?;
        if frame % fps == 0 {
            let env = scenario.engine.environment();
            log::info!(
                "t = {:6.2} s, objects = {:4}, kinetic energy = {:.4}",
                env.time(),
                env.len(),
                env.total_kinetic_energy()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _logger = logging::setup()?;
    let args = Args::parse();

    if args.bench {
        bench_collisions()?;
        bench_update()?;
        return Ok(());
    }

    let mut cfg = load_scenario_config(&args.file_name)?;
    apply_flags(&mut cfg, &args);
    let scenario = Scenario::build_scenario(cfg)?;

    match args.frames {
        #[cfg(feature = "viewer")]
        None => {
            atomsim::run_viewer(scenario);
            Ok(())
        }
        frames => run_headless(scenario, frames.unwrap_or(600)),
    }
}
