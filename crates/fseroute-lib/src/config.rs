//! Resolution of the access key, airport database and cache locations.
//!
//! Every setting follows the same order: an explicit path from the caller,
//! then an environment variable, then a file in the working directory, then
//! the platform-specific project directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fse::AccessKey;

/// Environment variable holding the access key itself.
pub const ACCESS_KEY_ENV: &str = "FSE_ACCESS_KEY";
/// Environment variable pointing at the airport CSV.
pub const AIRPORTS_ENV: &str = "FSEROUTE_AIRPORTS";
/// Environment variable overriding the feed cache directory.
pub const CACHE_DIR_ENV: &str = "FSEROUTE_CACHE_DIR";
/// Environment variable selecting a directory of saved feeds (offline mode).
pub const FEED_DIR_ENV: &str = "FSEROUTE_FEED_DIR";

/// File holding the access key.
pub const KEY_FILENAME: &str = "key.txt";
/// FSEconomy airport export.
pub const AIRPORTS_FILENAME: &str = "icaodata.csv";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("net", "fseconomy", "fseroute").ok_or(Error::ProjectDirsUnavailable)
}

/// Resolve the access key.
///
/// Order: `key_file` argument, `FSE_ACCESS_KEY`, `./key.txt`, then
/// `key.txt` in the platform config directory.
pub fn resolve_access_key(key_file: Option<&Path>) -> Result<AccessKey> {
    if let Some(path) = key_file {
        return read_key_file(path)?.ok_or(Error::MissingAccessKey);
    }

    if let Some(key) = env::var(ACCESS_KEY_ENV).ok().and_then(AccessKey::new) {
        debug!("using access key from {ACCESS_KEY_ENV}");
        return Ok(key);
    }

    let local = PathBuf::from(KEY_FILENAME);
    if local.exists() {
        if let Some(key) = read_key_file(&local)? {
            return Ok(key);
        }
    }

    if let Ok(dirs) = project_dirs() {
        let path = dirs.config_dir().join(KEY_FILENAME);
        if path.exists() {
            if let Some(key) = read_key_file(&path)? {
                return Ok(key);
            }
        }
    }

    Err(Error::MissingAccessKey)
}

fn read_key_file(path: &Path) -> Result<Option<AccessKey>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), "reading access key");
    Ok(AccessKey::new(fs::read_to_string(path)?))
}

/// Resolve the airport database path.
///
/// Order: explicit path, `FSEROUTE_AIRPORTS`, `./icaodata.csv`, then the
/// platform data directory. The returned path is not checked for existence
/// when it comes from the caller or the environment.
pub fn resolve_airports_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(AIRPORTS_ENV) {
        return Ok(PathBuf::from(path));
    }

    let local = PathBuf::from(AIRPORTS_FILENAME);
    if local.exists() {
        return Ok(local);
    }

    Ok(project_dirs()?.data_dir().join(AIRPORTS_FILENAME))
}

/// Resolve the feed cache directory.
pub fn resolve_cache_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }

    Ok(project_dirs()?.cache_dir().join("feeds"))
}

/// Resolve a directory of saved feeds, if offline mode was requested.
pub fn resolve_feed_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(FEED_DIR_ENV).map(PathBuf::from))
}
