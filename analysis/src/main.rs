//! Push history analysis: timeline layout, duration distributions and comparisons.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pushviz::config::ChartConfig;

mod commands;
mod report;

#[derive(Parser, Debug)]
#[command(name = "analysis")]
#[command(about = "Lay out and compare push lifecycles from decoded push records")]
struct Args {
    /// JSON chart configuration; defaults are used for missing fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the chart payload as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack every push onto non-overlapping timeline rows
    Timeline {
        /// JSON file of push records
        file: PathBuf,
    },
    /// Duration CDF, percentile markers and dot plot for one push def
    Distribution {
        file: PathBuf,
        #[arg(short, long)]
        push_def: String,
        /// Also write the chart payload to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Compare one push against the history of its push def
    Compare {
        file: PathBuf,
        #[arg(short = 'i', long)]
        push_id: String,
    },
    /// Compute duration tables for every push def and cache them in SQLite
    Cache {
        file: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ChartConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ChartConfig::default(),
    };

    match args.command {
        Command::Timeline { file } => commands::timeline(&file, &config, args.json),
        Command::Distribution { file, push_def, out } => {
            commands::distribution(&file, &push_def, out.as_deref(), &config, args.json)
        }
        Command::Compare { file, push_id } => commands::compare(&file, &push_id, &config, args.json),
        Command::Cache { file, db } => commands::cache(&file, &db, &config),
    }
}
