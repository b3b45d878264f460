mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fseroute_cli::output::OutputFormat;
use fseroute_lib::DEFAULT_FEED_TTL;

use crate::commands::jobs::{handle_jobs, JobsArgs};
use crate::commands::route::{handle_route, RouteArgs};
use crate::commands::SourceOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find the most profitable FSEconomy job routes")]
struct Cli {
    /// Airport database CSV (defaults to FSEROUTE_AIRPORTS, ./icaodata.csv,
    /// then the platform data directory).
    #[arg(long, global = true)]
    airports: Option<PathBuf>,

    /// File holding the FSEconomy access key (defaults to FSE_ACCESS_KEY,
    /// ./key.txt, then the platform config directory).
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Directory for cached job feeds.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Seconds before a cached job feed is downloaded again.
    #[arg(long, global = true, default_value_t = DEFAULT_FEED_TTL.as_secs())]
    cache_ttl: u64,

    /// Always download job feeds; neither read nor write the cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Read job feeds from saved `<ICAO>.csv` files in this directory
    /// instead of the network.
    #[arg(long, global = true, value_name = "DIR")]
    offline: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Show debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the best legs departing one airport.
    Jobs(JobsArgs),
    /// Search for the most profitable multi-leg route from an airport.
    Route(RouteArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = SourceOptions {
        airports: cli.airports,
        key_file: cli.key_file,
        cache_dir: cli.cache_dir,
        cache_ttl: cli.cache_ttl,
        no_cache: cli.no_cache,
        offline: cli.offline,
    };

    match cli.command {
        Command::Jobs(args) => handle_jobs(&options, &args, cli.format),
        Command::Route(args) => handle_route(&options, args, cli.format),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
