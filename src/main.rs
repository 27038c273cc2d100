//! Mission Engine - command-line runner
//!
//! Resolves one or more missions from a JSON scenario file against a world
//! configuration and prints the results as JSON.

use std::path::PathBuf;

use clap::Parser;
use mission_engine::campaign::{resolve_batch, MissionRequest};
use mission_engine::core::{Result, WorldConfig};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "mission-engine")]
#[command(about = "Resolve attacks and raids from a scenario file")]
struct Args {
    /// World configuration (.toml or .json); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario file holding one mission request or an array of them
    #[arg(long)]
    scenario: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scenario {
    Batch(Vec<MissionRequest>),
    Single(Box<MissionRequest>),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mission_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    let content = std::fs::read_to_string(&args.scenario)?;
    let requests = match serde_json::from_str::<Scenario>(&content)? {
        Scenario::Batch(requests) => requests,
        Scenario::Single(request) => vec![*request],
    };
    tracing::info!(missions = requests.len(), "resolving scenario");

    let mut results = Vec::with_capacity(requests.len());
    for (request, result) in requests.iter().zip(resolve_batch(&requests, &config)) {
        match result {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!(id = ?request.id, error = %e, "mission rejected");
                return Err(e);
            }
        }
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", output);
    Ok(())
}
