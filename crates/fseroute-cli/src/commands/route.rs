//! `route` command: beam search for the most profitable multi-leg route.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use fseroute_cli::output::{write_failures, write_search, OutputFormat};
use fseroute_cli::prompt::Prompter;
use fseroute_cli::terminal::ColorPalette;
use fseroute_lib::{
    find_routes, SearchParams, SearchSummary, DEFAULT_BEAM_WIDTH, DEFAULT_BRANCHING,
};

use super::SourceOptions;

#[derive(Args, Debug, Clone, Default)]
pub struct RouteArgs {
    /// ICAO code of the starting airport; prompted for when omitted.
    pub start: Option<String>,

    /// Number of legs in each route; prompted for when omitted.
    #[arg(short, long)]
    pub legs: Option<usize>,

    /// Candidate legs fetched per airport.
    #[arg(long)]
    pub branching: Option<usize>,

    /// Routes kept after each leg.
    #[arg(long)]
    pub beam: Option<usize>,

    /// Allow flying a leg back the way it came (out-and-back trips).
    #[arg(long)]
    pub allow_reverse: bool,
}

/// A fully resolved search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub start: String,
    pub params: SearchParams,
}

impl RouteArgs {
    /// Resolve the request from arguments alone, using defaults for the
    /// tunables. `None` when the start airport or leg count is missing.
    pub fn to_request(&self) -> Option<RouteRequest> {
        Some(RouteRequest {
            start: self.start.as_deref()?.trim().to_ascii_uppercase(),
            params: SearchParams {
                branching: self.branching.unwrap_or(DEFAULT_BRANCHING),
                beam_width: self.beam.unwrap_or(DEFAULT_BEAM_WIDTH),
                steps: self.legs?,
                allow_reverse: self.allow_reverse,
            },
        })
    }

    /// Fill in everything missing by asking on `prompter`.
    pub fn prompt_missing<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<RouteRequest> {
        let start = match &self.start {
            Some(start) => start.trim().to_ascii_uppercase(),
            None => prompter.ask_airport()?,
        };
        let steps = match self.legs {
            Some(legs) => legs,
            None => prompter.ask_count("Number of Legs", None)?,
        };
        let allow_reverse =
            self.allow_reverse || prompter.ask_yes_no("Allow reverse legs (out-and-back trips)?")?;
        let branching = match self.branching {
            Some(branching) => branching,
            None => prompter.ask_count("Jobs to consider per airport", Some(DEFAULT_BRANCHING))?,
        };
        let beam_width = match self.beam {
            Some(beam) => beam,
            None => prompter.ask_count("Routes to keep per leg", Some(DEFAULT_BEAM_WIDTH))?,
        };

        Ok(RouteRequest {
            start,
            params: SearchParams {
                branching,
                beam_width,
                steps,
                allow_reverse,
            },
        })
    }
}

pub fn handle_route(options: &SourceOptions, args: RouteArgs, format: OutputFormat) -> Result<()> {
    let request = match args.to_request() {
        Some(request) => request,
        None => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stderr());
            args.prompt_missing(&mut prompter)?
        }
    };

    let source = options.open()?;
    source.directory().require(&request.start)?;

    info!(
        start = %request.start,
        legs = request.params.steps,
        branching = request.params.branching,
        beam = request.params.beam_width,
        allow_reverse = request.params.allow_reverse,
        "searching routes"
    );
    let report = find_routes(&source, &request.start, request.params)
        .with_context(|| format!("route search from {} failed", request.start))?;

    let summary = SearchSummary::from_report(
        &request.start,
        request.params,
        &report,
        Some(source.directory()),
    );
    let palette = ColorPalette::detect();
    write_failures(&mut io::stderr().lock(), &summary, palette)
        .context("failed to write warnings")?;
    write_search(&mut io::stdout().lock(), &summary, format, palette)
        .context("failed to write output")
}
