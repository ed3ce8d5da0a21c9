//! Headless Autoresolve Runner
//!
//! Resolves one campaign scenario and prints the conclusion event.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use autoresolve::battle::{resolve_scenario, AutoResolveConcluded};
use autoresolve::campaign::{CampaignSnapshot, Scenario};
use autoresolve::core::{AutoResolveConfig, AutoResolveError, Diagnostic, Diagnostics, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Headless Autoresolve Runner - resolve a scenario without playing it
#[derive(Parser, Debug)]
#[command(name = "autoresolve")]
#[command(about = "Resolve a campaign scenario and print the outcome")]
struct Args {
    /// Campaign snapshot (JSON)
    #[arg(long)]
    campaign: PathBuf,

    /// Scenario definition (JSON)
    #[arg(long)]
    scenario: PathBuf,

    /// Autoresolve options (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log setup and phase details to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunnerOutput<'a> {
    seed: u64,
    conclusion: &'a AutoResolveConcluded,
    diagnostics: &'a [Diagnostic],
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn run(args: &Args) -> Result<()> {
    let campaign: CampaignSnapshot = read_json(&args.campaign)?;
    let scenario: Scenario = read_json(&args.scenario)?;
    let mut config = match &args.config {
        Some(path) => AutoResolveConfig::load(path)?,
        None => AutoResolveConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut diagnostics = Diagnostics::new();
    let conclusion = resolve_scenario(&campaign, &scenario, &config, &mut diagnostics)?;

    match args.format.as_str() {
        "json" => {
            let output = RunnerOutput {
                seed: config.effective_seed(),
                conclusion: &conclusion,
                diagnostics: diagnostics.entries(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "text" => {
            print!("{}", conclusion);
            for diagnostic in diagnostics.warnings() {
                println!("warning: {}", diagnostic.message);
            }
        }
        other => {
            return Err(AutoResolveError::InvalidConfig(format!(
                "unknown output format '{}'",
                other
            )))
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{}", err);
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
