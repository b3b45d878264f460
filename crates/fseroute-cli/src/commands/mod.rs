//! Subcommand handlers and the job source setup they share.

pub mod jobs;
pub mod route;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use fseroute_lib::config::{
    resolve_access_key, resolve_airports_path, resolve_cache_dir, resolve_feed_dir,
};
use fseroute_lib::{AirportDirectory, FeedCache, FeedJobSource, FeedOrigin, FseClient};

/// Global options that decide where airports and job feeds come from.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub airports: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: u64,
    pub no_cache: bool,
    pub offline: Option<PathBuf>,
}

impl SourceOptions {
    /// Load the airport database and build the matching job source.
    ///
    /// Offline mode never resolves an access key, so it works without one.
    pub fn open(&self) -> Result<FeedJobSource> {
        let airports_path = resolve_airports_path(self.airports.as_deref())
            .context("failed to locate the airport database")?;
        let directory = AirportDirectory::from_path(&airports_path).with_context(|| {
            format!(
                "failed to load the airport database from {}",
                airports_path.display()
            )
        })?;

        let origin = match resolve_feed_dir(self.offline.as_deref()) {
            Some(dir) => {
                debug!(dir = %dir.display(), "reading job feeds offline");
                FeedOrigin::Offline { dir }
            }
            None => {
                let key = resolve_access_key(self.key_file.as_deref())
                    .context("an FSEconomy access key is required to download job feeds")?;
                let client = FseClient::new(key).context("failed to build the HTTP client")?;
                let cache = if self.no_cache {
                    None
                } else {
                    let dir = resolve_cache_dir(self.cache_dir.as_deref())
                        .context("failed to locate the feed cache directory")?;
                    Some(FeedCache::new(dir, Duration::from_secs(self.cache_ttl)))
                };
                FeedOrigin::Live { client, cache }
            }
        };

        Ok(FeedJobSource::new(Arc::new(directory), origin))
    }
}
