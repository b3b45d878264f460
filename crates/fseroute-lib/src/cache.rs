//! On-disk cache of raw job feed responses.
//!
//! Each airport's feed is stored as `<ICAO>.csv` inside the cache
//! directory. Freshness is judged from the file's modification time so a
//! cache survives restarts without any extra metadata.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;

/// Feeds older than this are downloaded again.
pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(60 * 60);

/// A cached feed body with its age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub body: String,
    pub age: Duration,
    pub fresh: bool,
}

/// Directory-backed feed cache.
#[derive(Debug, Clone)]
pub struct FeedCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Location of the cached feed for `icao`.
    pub fn path_for(&self, icao: &str) -> PathBuf {
        feed_file(&self.dir, icao)
    }

    /// Read the cached feed for `icao`, fresh or not.
    pub fn load(&self, icao: &str) -> Result<Option<CachedFeed>> {
        let path = self.path_for(icao);
        if !path.exists() {
            return Ok(None);
        }

        let age = file_age(&path)?;
        let body = fs::read_to_string(&path)?;
        let fresh = age <= self.ttl;
        debug!(
            airport = %icao,
            path = %path.display(),
            age_secs = age.as_secs(),
            fresh,
            "found cached feed"
        );
        Ok(Some(CachedFeed { body, age, fresh }))
    }

    /// Read the cached feed for `icao` only if it is still fresh.
    pub fn load_fresh(&self, icao: &str) -> Result<Option<String>> {
        Ok(self
            .load(icao)?
            .filter(|cached| cached.fresh)
            .map(|cached| cached.body))
    }

    /// Atomically replace the cached feed for `icao`.
    pub fn store(&self, icao: &str, body: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(icao);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.flush()?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        tmp.persist(&path).map_err(|err| err.error)?;
        info!(airport = %icao, path = %path.display(), "cached job feed");
        Ok(())
    }
}

/// File name used for an airport's feed, shared by the cache and offline
/// feed directories.
pub fn feed_file(dir: &Path, icao: &str) -> PathBuf {
    dir.join(format!("{}.csv", icao.to_ascii_uppercase()))
}

fn file_age(path: &Path) -> Result<Duration> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO))
}
