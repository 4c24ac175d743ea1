//! Tendril Simulator CLI
//!
//! Run the chain and facing behaviors through scripted scenarios.

use clap::Parser;
use std::path::PathBuf;
use tendril_core::RigConfig;
use tendril_env::WallClock;
use tendril_sim::{ScenarioId, ScenarioResult, ScenarioRunner, SimError};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Tendril frame-stepping simulator
#[derive(Parser, Debug)]
#[command(name = "tendril-sim")]
#[command(about = "Run deterministic frame-stepping scenarios for tendril", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (teleport, stationary, orbit, random_walk, facing, fast_turn, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Simulated duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Frames per second
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Rig configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export sampled frames to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export every n-th frame
    #[arg(long, default_value = "1")]
    export_every: u64,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Pace frames with the wall clock instead of the virtual clock
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Drives one scenario from a tokio wall clock.
fn run_realtime(
    runner: &ScenarioRunner,
    scenario: ScenarioId,
    tick_rate: u32,
) -> Result<ScenarioResult, SimError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        let mut clock = WallClock::new(tick_rate)?;
        let mut session = runner.session(scenario)?;
        info!(
            "Running {} in real time ({} ticks at {} Hz)",
            scenario.name(),
            session.target_ticks(),
            tick_rate
        );
        while !session.is_finished() {
            let time = clock.next_frame().await;
            session.step(&time)?;
        }
        Ok::<_, SimError>(session.finish().0)
    })
}

fn run_one(args: &Args, runner: &ScenarioRunner, scenario: ScenarioId) -> ScenarioResult {
    if args.realtime {
        return run_realtime(runner, scenario, args.tick_rate).unwrap_or_else(|e| {
            error!("{} aborted: {}", scenario.name(), e);
            ScenarioResult::errored(scenario, runner.seed(), &e)
        });
    }

    let Some(path) = &args.export else {
        return runner.run(scenario);
    };

    match runner.run_with_export(scenario, args.export_every) {
        Ok((result, export)) => {
            match export.write_to_file(path) {
                Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path.display()),
                Err(e) => error!("Failed to write export: {}", e),
            }
            result
        }
        Err(e) => {
            error!("{} aborted: {}", scenario.name(), e);
            ScenarioResult::errored(scenario, runner.seed(), &e)
        }
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Tendril Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(id) => vec![id],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Available scenarios: teleport, stationary, orbit, random_walk, facing, fast_turn, all");
                std::process::exit(1);
            }
        }
    };

    if (args.export.is_some() || args.realtime) && scenarios.len() > 1 {
        eprintln!("Error: --export and --realtime only support a single scenario, not 'all'");
        std::process::exit(1);
    }

    let rig = match &args.config {
        Some(path) => match RigConfig::load(path) {
            Ok(rig) => {
                info!("Loaded rig configuration from {}", path.display());
                rig
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => RigConfig::default(),
    };

    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner = ScenarioRunner::new(seed)
        .with_tick_rate(args.tick_rate)
        .with_duration(args.duration)
        .with_rig(rig);

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let result = run_one(&args, &runner, *scenario);

        if !args.json {
            if result.passed {
                info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
        results.push(result);
    }

    let total = results.len();
    let failed_count = results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "max_residual": r.max_residual,
                    "failure_reason": r.failure_reason,
                    "metrics": r.metrics,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
