//! Job sources: where the route search gets candidate legs from.
//!
//! [`JobSource`] is the seam between the search and the outside world.
//! [`FeedJobSource`] is the production implementation that reads the
//! FSEconomy assignment feed (live with an on-disk cache, or from a local
//! directory of saved feeds) and aggregates it into [`CityPair`]s.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::airport::AirportDirectory;
use crate::cache::{feed_file, FeedCache};
use crate::city_pair::CityPair;
use crate::error::Result;
use crate::fse::FseClient;
use crate::jobs::{aggregate_assignments, parse_feed, ParsedFeed};

/// Provider of candidate legs departing an airport.
pub trait JobSource {
    /// Up to `limit` legs departing `airport`, best value-density first and
    /// aggregated per destination. `limit == 0` means no limit.
    ///
    /// `Ok(vec![])` means nothing is available (unknown airport or no open
    /// jobs); `Err(_)` means the source could not be asked.
    fn fetch(&self, airport: &str, limit: usize) -> Result<Vec<CityPair>>;
}

impl<S: JobSource + ?Sized> JobSource for &S {
    fn fetch(&self, airport: &str, limit: usize) -> Result<Vec<CityPair>> {
        (**self).fetch(airport, limit)
    }
}

/// Where raw feed bodies come from.
#[derive(Debug, Clone)]
pub enum FeedOrigin {
    /// Download from the FSEconomy server, optionally through a cache.
    Live {
        client: FseClient,
        cache: Option<FeedCache>,
    },
    /// Read previously saved `<ICAO>.csv` files; never touches the network.
    Offline { dir: PathBuf },
}

/// [`JobSource`] backed by the FSEconomy assignment feed.
#[derive(Debug, Clone)]
pub struct FeedJobSource {
    directory: Arc<AirportDirectory>,
    origin: FeedOrigin,
}

impl FeedJobSource {
    pub fn new(directory: Arc<AirportDirectory>, origin: FeedOrigin) -> Self {
        Self { directory, origin }
    }

    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    pub fn origin(&self) -> &FeedOrigin {
        &self.origin
    }

    /// Parsed feed for `icao`.
    ///
    /// Live downloads are only cached once they parse as an assignment
    /// table; service errors and failed downloads fall back to any cached
    /// copy, however old.
    fn load_feed(&self, icao: &str) -> Result<ParsedFeed> {
        match &self.origin {
            FeedOrigin::Offline { dir } => {
                let path = feed_file(dir, icao);
                if !path.exists() {
                    debug!(airport = %icao, path = %path.display(), "no saved feed; treating as no jobs");
                    return Ok(ParsedFeed::default());
                }
                parse_feed(icao, &fs::read_to_string(path)?)
            }
            FeedOrigin::Live { client, cache } => {
                let Some(cache) = cache else {
                    return parse_feed(icao, &client.jobs_from(icao)?);
                };

                if let Some(body) = cache.load_fresh(icao)? {
                    match parse_feed(icao, &body) {
                        Ok(parsed) => return Ok(parsed),
                        Err(error) => {
                            debug!(airport = %icao, %error, "ignoring unusable cached feed");
                        }
                    }
                }

                let downloaded = client.jobs_from(icao).and_then(|body| {
                    let parsed = parse_feed(icao, &body)?;
                    Ok((body, parsed))
                });
                match downloaded {
                    Ok((body, parsed)) => {
                        if let Err(error) = cache.store(icao, &body) {
                            warn!(airport = %icao, %error, "failed to cache job feed");
                        }
                        Ok(parsed)
                    }
                    Err(error) => {
                        let Some(stale) = cache.load(icao)? else {
                            return Err(error);
                        };
                        match parse_feed(icao, &stale.body) {
                            Ok(parsed) => {
                                warn!(
                                    airport = %icao,
                                    %error,
                                    age_secs = stale.age.as_secs(),
                                    "job feed download failed; using stale cached copy"
                                );
                                Ok(parsed)
                            }
                            Err(_) => Err(error),
                        }
                    }
                }
            }
        }
    }
}

impl JobSource for FeedJobSource {
    fn fetch(&self, airport: &str, limit: usize) -> Result<Vec<CityPair>> {
        let icao = airport.trim().to_ascii_uppercase();
        if !self.directory.contains(&icao) {
            warn!(airport = %icao, "airport not found in the airport database");
            return Ok(Vec::new());
        }

        let parsed = self.load_feed(&icao)?;
        Ok(aggregate_assignments(
            &parsed.assignments,
            self.directory.as_ref(),
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::Airport;
    use crate::fse::AccessKey;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    const FEED: &str =
        "Location,ToIcao,Amount,UnitType,Pay,Type\nKVNY,KLAX,2,passengers,300,Trip-Only\n";
    const NEWER_FEED: &str =
        "Location,ToIcao,Amount,UnitType,Pay,Type\nKVNY,KLAX,2,passengers,500,Trip-Only\n";
    const RATE_LIMITED: &str = "<Error>Too many requests</Error>";

    /// Local HTTP server answering one scripted response per connection.
    struct FeedServer {
        url: String,
        requests: Arc<AtomicUsize>,
    }

    impl FeedServer {
        fn start(responses: Vec<(u16, &'static str)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            let url = format!("http://{}/data", listener.local_addr().expect("addr"));
            let requests = Arc::new(AtomicUsize::new(0));
            let served = Arc::clone(&requests);
            thread::spawn(move || {
                for (status, body) in responses {
                    let Ok((mut stream, _)) = listener.accept() else {
                        return;
                    };
                    read_request(&mut stream);
                    served.fetch_add(1, Ordering::SeqCst);
                    let reply = format!(
                        "HTTP/1.1 {status} Scripted\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(reply.as_bytes());
                }
            });
            Self { url, requests }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn source(&self, cache: Option<FeedCache>) -> FeedJobSource {
            let key = AccessKey::new("test-key").expect("key");
            let client = FseClient::with_base_url(key, &self.url).expect("client");
            FeedJobSource::new(directory(), FeedOrigin::Live { client, cache })
        }
    }

    fn read_request(stream: &mut TcpStream) {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }
    }

    fn pay(pairs: &[CityPair]) -> i64 {
        assert_eq!(pairs.len(), 1);
        pairs[0].total_value()
    }

    fn directory() -> Arc<AirportDirectory> {
        Arc::new(AirportDirectory::from_airports([
            Airport {
                icao: "KVNY".to_string(),
                name: "Van Nuys".to_string(),
                latitude: 34.2098,
                longitude: -118.4898,
            },
            Airport {
                icao: "KLAX".to_string(),
                name: "Los Angeles Intl".to_string(),
                latitude: 33.9425,
                longitude: -118.4081,
            },
        ]))
    }

    #[test]
    fn offline_source_reads_saved_feed() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("KVNY.csv"), FEED).expect("write feed");

        let source = FeedJobSource::new(
            directory(),
            FeedOrigin::Offline {
                dir: dir.path().to_path_buf(),
            },
        );
        let pairs = source.fetch("kvny", 10).expect("fetch");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].leg(), ("KVNY", "KLAX"));
        assert!(pairs[0].distance_nm() > 0);
        assert_eq!(pairs[0].total_value(), 300);
    }

    #[test]
    fn unknown_airport_yields_no_legs() {
        let dir = TempDir::new().expect("temp dir");
        let source = FeedJobSource::new(
            directory(),
            FeedOrigin::Offline {
                dir: dir.path().to_path_buf(),
            },
        );
        assert!(source.fetch("ZZZZ", 10).expect("fetch").is_empty());
    }

    #[test]
    fn missing_offline_feed_yields_no_legs() {
        let dir = TempDir::new().expect("temp dir");
        let source = FeedJobSource::new(
            directory(),
            FeedOrigin::Offline {
                dir: dir.path().to_path_buf(),
            },
        );
        assert!(source.fetch("KLAX", 10).expect("fetch").is_empty());
    }

    #[test]
    fn error_feed_is_reported_as_failure() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("KVNY.csv"), RATE_LIMITED).expect("write feed");
        let source = FeedJobSource::new(
            directory(),
            FeedOrigin::Offline {
                dir: dir.path().to_path_buf(),
            },
        );
        let err = source.fetch("KVNY", 10).expect_err("service error");
        assert!(err.is_transport());
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn fresh_cache_is_used_without_downloading() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FeedCache::new(dir.path(), Duration::from_secs(3600));
        cache.store("KVNY", FEED).expect("store");
        let server = FeedServer::start(vec![(200, NEWER_FEED)]);

        let pairs = server.source(Some(cache)).fetch("KVNY", 10).expect("fetch");
        assert_eq!(pay(&pairs), 300);
        assert_eq!(server.requests(), 0);
    }

    #[test]
    fn download_is_cached_for_the_next_fetch() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FeedCache::new(dir.path(), Duration::from_secs(3600));
        let server = FeedServer::start(vec![(200, FEED)]);
        let source = server.source(Some(cache.clone()));

        assert_eq!(pay(&source.fetch("KVNY", 10).expect("first fetch")), 300);
        assert_eq!(pay(&source.fetch("KVNY", 10).expect("second fetch")), 300);
        assert_eq!(server.requests(), 1);
        assert_eq!(cache.load_fresh("KVNY").expect("load").as_deref(), Some(FEED));
    }

    #[test]
    fn service_error_is_never_cached() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FeedCache::new(dir.path(), Duration::from_secs(3600));
        let server = FeedServer::start(vec![(200, RATE_LIMITED), (200, FEED)]);
        let source = server.source(Some(cache.clone()));

        let err = source.fetch("KVNY", 10).expect_err("rate limited");
        assert!(err.is_transport());
        assert!(err.to_string().contains("Too many requests"));
        assert!(cache.load("KVNY").expect("load").is_none());

        assert_eq!(pay(&source.fetch("KVNY", 10).expect("recovered")), 300);
        assert_eq!(server.requests(), 2);
    }

    #[test]
    fn failed_download_falls_back_to_stale_copy() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FeedCache::new(dir.path(), Duration::ZERO);
        cache.store("KVNY", FEED).expect("store");
        thread::sleep(Duration::from_millis(20));
        let server = FeedServer::start(vec![(503, "busy"), (200, RATE_LIMITED)]);
        let source = server.source(Some(cache.clone()));

        assert_eq!(pay(&source.fetch("KVNY", 10).expect("http 503")), 300);
        assert_eq!(pay(&source.fetch("KVNY", 10).expect("error body")), 300);
        assert_eq!(server.requests(), 2);
        let cached = cache.load("KVNY").expect("load").expect("present");
        assert_eq!(cached.body, FEED);
    }

    #[test]
    fn uncached_source_downloads_every_time() {
        let server = FeedServer::start(vec![(200, FEED), (200, NEWER_FEED)]);
        let source = server.source(None);

        assert_eq!(pay(&source.fetch("KVNY", 10).expect("first fetch")), 300);
        assert_eq!(pay(&source.fetch("KVNY", 10).expect("second fetch")), 500);
        assert_eq!(server.requests(), 2);
    }

    #[test]
    fn failed_download_without_cached_copy_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FeedCache::new(dir.path(), Duration::from_secs(3600));
        let server = FeedServer::start(vec![(503, "busy")]);

        let err = server
            .source(Some(cache))
            .fetch("KVNY", 10)
            .expect_err("no fallback");
        assert!(err.is_transport());
        assert!(err.to_string().contains("503"));
    }
}
