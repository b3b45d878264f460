//! `jobs` command: the best legs departing a single airport.

use std::io;

use anyhow::{Context, Result};
use clap::Args;

use fseroute_cli::output::{write_jobs, OutputFormat};
use fseroute_cli::terminal::ColorPalette;
use fseroute_lib::{JobSource, JobsSummary, DEFAULT_BRANCHING};

use super::SourceOptions;

#[derive(Args, Debug, Clone)]
pub struct JobsArgs {
    /// ICAO code of the departure airport.
    pub airport: String,

    /// Number of legs to list; 0 lists every destination.
    #[arg(long, default_value_t = DEFAULT_BRANCHING)]
    pub limit: usize,
}

pub fn handle_jobs(options: &SourceOptions, args: &JobsArgs, format: OutputFormat) -> Result<()> {
    let source = options.open()?;
    let airport = source.directory().require(args.airport.trim())?.icao.clone();

    let legs = source
        .fetch(&airport, args.limit)
        .with_context(|| format!("failed to fetch jobs departing {airport}"))?;

    let summary = JobsSummary::new(&airport, &legs, Some(source.directory()));
    write_jobs(&mut io::stdout().lock(), &summary, format, ColorPalette::detect())
        .context("failed to write output")
}
