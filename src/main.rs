use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use parkstat::{analyze_file, Config, Strategy};

/// Totals per-vehicle parking time from a fixed-width record file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Input file of 50-byte parking records.
    path: PathBuf,

    /// How the file is read.
    #[arg(long, value_enum, default_value = "mapped")]
    strategy: StrategyArg,

    /// Worker threads for the mapped strategy. Defaults to the available
    /// parallelism.
    #[arg(long)]
    workers: Option<usize>,

    /// Read size for the buffered strategy, in bytes.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Always run the full calendar arithmetic, even for same-day records.
    #[arg(long)]
    no_fast_path: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Buffered,
    Mapped,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let defaults = Config::default();
    let config = Config {
        strategy: match args.strategy {
            StrategyArg::Buffered => Strategy::Buffered,
            StrategyArg::Mapped => Strategy::Mapped,
        },
        workers: args.workers.unwrap_or(defaults.workers),
        chunk_size: args.chunk_size.unwrap_or(defaults.chunk_size),
        same_day_fast_path: !args.no_fast_path,
    };

    let started = Instant::now();
    let totals = analyze_file(&args.path, &config)
        .with_context(|| format!("analyzing {}", args.path.display()))?;
    info!(
        "{} vehicles in {:.3}s",
        totals.len(),
        started.elapsed().as_secs_f64()
    );

    let mut out = io::BufWriter::with_capacity(1 << 20, io::stdout().lock());
    for (id, ticks) in totals.into_sorted_vec() {
        writeln!(out, "{id:08} {ticks}")?;
    }
    out.flush()?;

    Ok(())
}
