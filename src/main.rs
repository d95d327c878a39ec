use atomlife::{BoundaryPolicy, Scenario, ScenarioConfig};
use atomlife::{bench_forces, run_2d};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, long, default_value = "two_populations.yaml")]
    file_name: String,

    /// Run without a window for `--ticks` fixed steps and log a summary
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Override the seed from the scenario file
    #[arg(long)]
    seed: Option<u64>,

    /// Override the initial boundary policy, e.g. `wrap_around`
    #[arg(long)]
    boundary: Option<BoundaryPolicy>,

    /// Time the force model over growing N and exit
    #[arg(long)]
    bench: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        bench_forces();
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    if args.seed.is_some() {
        scenario_cfg.engine.seed = args.seed;
    }
    if let Some(policy) = args.boundary {
        scenario_cfg.engine.boundary_policy = policy;
    }

    let mut scenario = Scenario::build_scenario(&scenario_cfg)?;

    if args.headless {
        info!(ticks = args.ticks, "running headless");
        for _ in 0..args.ticks {
            scenario.step();
        }
        scenario.log_summary();
    } else {
        run_2d(scenario);
    }

    Ok(())
}
