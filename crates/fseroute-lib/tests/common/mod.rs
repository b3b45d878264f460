//! Common test utilities and fixture helpers.
//!
//! Provides an in-memory [`JobSource`] whose responses are scripted per
//! airport, plus paths to the checked-in fixture airport database and feeds.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use fseroute_lib::{rank_city_pairs, CityPair, Error, JobSource, Result};

/// Path to fixtures directory shared by the library and CLI tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Path to the fixture airport database.
#[allow(dead_code)]
pub fn fixture_airports_path() -> PathBuf {
    fixtures_dir().join("icaodata.csv")
}

/// Directory of saved `<ICAO>.csv` job feeds.
#[allow(dead_code)]
pub fn fixture_feeds_dir() -> PathBuf {
    fixtures_dir().join("feeds")
}

/// Build a leg carrying a single passenger job worth `value`.
#[allow(dead_code)]
pub fn leg(from: &str, to: &str, value: i64, distance_nm: u32) -> CityPair {
    let mut cp = CityPair::new(from, to, distance_nm);
    cp.record_pax(1, value);
    cp
}

/// Scripted job source for driving the search with fixture data.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedSource {
    legs: HashMap<String, Vec<CityPair>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register legs departing their origin airport.
    pub fn with_legs(mut self, legs: impl IntoIterator<Item = CityPair>) -> Self {
        for leg in legs {
            self.legs
                .entry(leg.origin().to_string())
                .or_default()
                .push(leg);
        }
        self
    }

    /// Make every query for `airport` fail as if the service were down.
    pub fn failing_at(mut self, airport: &str) -> Self {
        self.failing.insert(airport.to_string());
        self
    }

    /// Airports queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl JobSource for ScriptedSource {
    fn fetch(&self, airport: &str, limit: usize) -> Result<Vec<CityPair>> {
        self.calls.borrow_mut().push(airport.to_string());
        if self.failing.contains(airport) {
            return Err(Error::FeedUnavailable {
                airport: airport.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        let legs = self.legs.get(airport).cloned().unwrap_or_default();
        Ok(rank_city_pairs(legs, limit))
    }
}

/// A small deterministic network where every airport offers legs to
/// several others, with values derived from the airport indices.
#[allow(dead_code)]
pub fn grid_source(airports: usize) -> ScriptedSource {
    let name = |i: usize| format!("AP{i:02}");
    let mut legs = Vec::new();
    for from in 0..airports {
        for offset in 1..airports {
            let to = (from + offset) % airports;
            let value = ((from * 37 + to * 11) % 97 + 10) as i64 * 10;
            let distance = ((from + to) % 13 + 5) as u32 * 10;
            legs.push(leg(&name(from), &name(to), value, distance));
        }
    }
    ScriptedSource::new().with_legs(legs)
}
