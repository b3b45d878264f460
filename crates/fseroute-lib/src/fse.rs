//! Blocking HTTP client for the FSEconomy data feeds.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Public FSEconomy data feed endpoint.
pub const DEFAULT_FEED_URL: &str = "https://server.fseconomy.net/data";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Personal or group access key used to authenticate feed requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey(String);

impl AccessKey {
    /// Wrap a key, trimming surrounding whitespace. Returns `None` when blank.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(***)")
    }
}

/// Client for the `jobsfrom` assignment feed.
#[derive(Debug, Clone)]
pub struct FseClient {
    http: Client,
    base_url: String,
    key: AccessKey,
}

impl FseClient {
    pub fn new(key: AccessKey) -> Result<Self> {
        Self::with_base_url(key, DEFAULT_FEED_URL)
    }

    pub fn with_base_url(key: AccessKey, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            base_url: base_url.into(),
            key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Download the raw CSV assignment feed for jobs departing `icao`.
    ///
    /// Non-success HTTP statuses become [`Error::FeedUnavailable`]; the body
    /// of a successful response is returned untouched so it can be cached.
    pub fn jobs_from(&self, icao: &str) -> Result<String> {
        info!(airport = %icao, url = %self.base_url, "requesting job feed");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("userkey", self.key.expose()),
                ("format", "csv"),
                ("query", "icao"),
                ("search", "jobsfrom"),
                ("icaos", icao),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedUnavailable {
                airport: icao.to_string(),
                message: describe_status(status),
            });
        }

        let body = response.text()?;
        debug!(airport = %icao, bytes = body.len(), "received job feed");
        Ok(body)
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("fseroute-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}

fn describe_status(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
