//! critter-dash: run a headless race and print the standings
//!
//! Usage:
//!   critter-dash [--config race.json] [--seed N] [--json] <NAME>...
//! Example:
//!   RUST_LOG=debug critter-dash --seed 7 Ann Bo Cy

use anyhow::{bail, Context, Result};
use clap::Parser;
use critter_dash::{GameServer, RaceConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "critter-dash", version, about = "Headless driver for the critter race engine")]
struct Args {
    /// Racer names, 2 to 10 of them
    #[arg(required = true)]
    names: Vec<String>,

    /// JSON file with race tuning (missing keys fall back to defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible race
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the per-tick skill trigger chance
    #[arg(long)]
    skill_chance: Option<f64>,

    /// Simulated time between frames in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<RaceConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read race config '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse race config '{}'", path.display()))?
        }
        None => RaceConfig::default(),
    };
    if let Some(chance) = args.skill_chance {
        config.skill_chance = chance;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut server = match args.seed {
        Some(seed) => GameServer::seeded(config, seed),
        None => GameServer::new(config),
    };
    server.submit_roster(args.names.as_slice())?;

    let mut now = 0u64;
    let mut finished = false;
    for _ in 0..args.max_ticks {
        let Some(frame) = server.tick(now) else {
            bail!("race disappeared mid-run");
        };
        if frame.completion.is_some() {
            finished = true;
            break;
        }
        now += args.frame_ms;
    }
    if !finished {
        bail!("race did not finish within {} ticks", args.max_ticks);
    }

    let results = server.get_results().unwrap_or_default();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}. {} (tick {})", result.place, result.name, result.finish_tick);
        }
    }

    let stats = server.get_stats();
    log::info!(
        "{} ticks, avg tick {:.3} ms",
        stats.tick_count,
        stats.avg_tick_time_ms
    );
    Ok(())
}
