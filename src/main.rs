//! patient-paths entry point: CLI wiring, logging and config-driven runs.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use patient_paths::config::ScenarioConfig;
use patient_paths::io::export::{export_csv, export_json_lines};
use patient_paths::sim::engine::Engine;
use patient_paths::sim::kpi::RunSummary;

#[derive(Parser, Debug)]
#[command(name = "patient-paths")]
#[command(about = "Day-stepped patient flow simulation over capacity-limited care settings", long_about = None)]
struct Args {
    /// Scenario file (TOML, or JSON when the extension is .json)
    #[arg(long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Built-in preset (demo, patient_pathway)
    #[arg(long)]
    preset: Option<String>,

    /// Override the number of simulated days
    #[arg(long)]
    days: Option<usize>,

    /// Write daily snapshots as long-format CSV
    #[arg(long)]
    snapshots_out: Option<PathBuf>,

    /// Write daily snapshots as JSON lines
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Only print the run summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install log subscriber: {e}");
    }
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig, patient_paths::ConfigError> {
    match (&args.scenario, &args.preset) {
        (Some(path), _) => ScenarioConfig::from_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => ScenarioConfig::from_preset("demo"),
    }
}

fn exit_with(message: &str, err: &dyn std::fmt::Display) -> ! {
    error!(%err, "{message}");
    process::exit(1);
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // --scenario takes priority, then --preset, then the demo preset
    let mut scenario = load_scenario(&args).unwrap_or_else(|e| exit_with("cannot load scenario", &e));
    if let Some(days) = args.days {
        scenario.simulation.num_days = days;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let mut engine =
        Engine::from_scenario(&scenario).unwrap_or_else(|e| exit_with("cannot build engine", &e));
    info!(order = %engine.execution_order().join(" -> "), "execution order");

    let snapshots = engine.run().unwrap_or_else(|e| exit_with("run aborted", &e));

    if !args.quiet {
        for snap in &snapshots {
            println!("{snap}");
        }
        println!();
    }
    println!("{}", RunSummary::from_snapshots(&snapshots));

    if let Some(path) = &args.snapshots_out {
        export_csv(&snapshots, path).unwrap_or_else(|e| exit_with("failed to write CSV", &e));
        info!(path = %path.display(), "snapshots written");
    }
    if let Some(path) = &args.json_out {
        export_json_lines(&snapshots, path)
            .unwrap_or_else(|e| exit_with("failed to write JSON lines", &e));
        info!(path = %path.display(), "snapshots written");
    }
}
