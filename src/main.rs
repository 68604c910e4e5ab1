//! Regenerate the CSV inputs of the paper figures

use anyhow::{Context, Result};
use clap::Parser;
use netgrowth::{run_all, Config, Figure};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "make-plot-data")]
#[command(about = "Synthesize graphs, fit attachment models and write figure data")]
#[command(version)]
struct Cli {
    /// JSON configuration; missing fields use the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for synthesized edge lists and choice sets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the figure CSVs are written to
    #[arg(long)]
    results_dir: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Figure to generate (1-5); repeat for several, all when omitted
    #[arg(short, long = "figure", value_parser = clap::value_parser!(u8).range(1..=5))]
    figures: Vec<u8>,

    /// Show progress bars for long sweeps
    #[arg(long)]
    progress: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(dir) = cli.results_dir {
        config = config.with_results_dir(dir);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.progress {
        config = config.with_progress();
    }

    let figures: Vec<Figure> = if cli.figures.is_empty() {
        Figure::ALL.to_vec()
    } else {
        cli.figures
            .iter()
            .filter_map(|&n| Figure::from_number(n))
            .collect()
    };
    run_all(&figures, &config).context("generating figure data")?;
    Ok(())
}
