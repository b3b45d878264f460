//! Aggregated job offers between an ordered pair of airports.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::airport::{DistanceLookup, FALLBACK_DISTANCE_NM};

/// Category of a single FSEconomy assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Freight measured in kilograms.
    Cargo,
    /// Regular passengers.
    Passenger,
    /// VIP passengers.
    Vip,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            JobKind::Cargo => "cargo",
            JobKind::Passenger => "pax",
            JobKind::Vip => "vip",
        };
        f.write_str(value)
    }
}

/// Subtotal for one job category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobTally {
    /// Kilograms for cargo, head count for passengers and VIPs.
    pub amount: u64,
    pub jobs: u32,
    pub value: i64,
}

impl JobTally {
    fn record(&mut self, amount: u64, value: i64) {
        self.amount += amount;
        self.jobs += 1;
        self.value += value;
    }
}

/// All job offers between an ordered pair of airports.
///
/// Totals and value-density are recomputed after every `record_*` call, so
/// they always equal the sum of the three category subtotals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityPair {
    origin: String,
    destination: String,
    distance_nm: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    distance_estimated: bool,
    cargo: JobTally,
    pax: JobTally,
    vip: JobTally,
    total_jobs: u32,
    total_value: i64,
    value_density: f64,
}

impl CityPair {
    /// Create an empty city pair with a known distance.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, distance_nm: u32) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            distance_nm,
            distance_estimated: false,
            cargo: JobTally::default(),
            pax: JobTally::default(),
            vip: JobTally::default(),
            total_jobs: 0,
            total_value: 0,
            value_density: 0.0,
        }
    }

    /// Create an empty city pair whose real distance is unknown. It counts
    /// [`FALLBACK_DISTANCE_NM`] towards route length and has zero
    /// value-density.
    pub fn with_unknown_distance(
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            distance_estimated: true,
            ..Self::new(origin, destination, FALLBACK_DISTANCE_NM)
        }
    }

    /// Create an empty city pair, looking the distance up once.
    pub fn between(
        origin: impl Into<String>,
        destination: impl Into<String>,
        directory: &impl DistanceLookup,
    ) -> Self {
        let origin = origin.into();
        let destination = destination.into();
        match directory.known_distance(&origin, &destination) {
            Some(distance_nm) => Self::new(origin, destination, distance_nm),
            None => Self::with_unknown_distance(origin, destination),
        }
    }

    /// Add a cargo job of `weight` kilograms.
    pub fn record_cargo(&mut self, weight: u64, value: i64) {
        self.cargo.record(weight, value);
        self.update_totals();
    }

    /// Add a passenger job carrying `count` passengers.
    pub fn record_pax(&mut self, count: u64, value: i64) {
        self.pax.record(count, value);
        self.update_totals();
    }

    /// Add a VIP job carrying `count` passengers.
    pub fn record_vip(&mut self, count: u64, value: i64) {
        self.vip.record(count, value);
        self.update_totals();
    }

    /// Add a job of the given kind.
    pub fn record(&mut self, kind: JobKind, amount: u64, value: i64) {
        match kind {
            JobKind::Cargo => self.record_cargo(amount, value),
            JobKind::Passenger => self.record_pax(amount, value),
            JobKind::Vip => self.record_vip(amount, value),
        }
    }

    fn update_totals(&mut self) {
        self.total_jobs = self.cargo.jobs + self.pax.jobs + self.vip.jobs;
        self.total_value = self.cargo.value + self.pax.value + self.vip.value;
        self.value_density = if self.distance_estimated {
            0.0
        } else {
            value_density(self.total_value, u64::from(self.distance_nm))
        };
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// The directed leg `(origin, destination)`.
    pub fn leg(&self) -> (&str, &str) {
        (&self.origin, &self.destination)
    }

    pub fn distance_nm(&self) -> u32 {
        self.distance_nm
    }

    /// Whether [`distance_nm`](Self::distance_nm) is the fallback for an
    /// airport missing from the directory.
    pub fn distance_estimated(&self) -> bool {
        self.distance_estimated
    }

    pub fn cargo(&self) -> JobTally {
        self.cargo
    }

    pub fn pax(&self) -> JobTally {
        self.pax
    }

    pub fn vip(&self) -> JobTally {
        self.vip
    }

    pub fn total_jobs(&self) -> u32 {
        self.total_jobs
    }

    pub fn total_value(&self) -> i64 {
        self.total_value
    }

    /// Total value per nautical mile; zero when the distance is zero or
    /// unknown.
    pub fn value_density(&self) -> f64 {
        self.value_density
    }
}

/// Value per nautical mile, defined as zero for non-positive distances.
pub(crate) fn value_density(value: i64, distance_nm: u64) -> f64 {
    if distance_nm == 0 {
        0.0
    } else {
        value as f64 / distance_nm as f64
    }
}

/// Ordering used wherever legs or routes are ranked: value-density
/// descending, then total value descending. Equal keys compare equal so a
/// stable sort keeps insertion order.
pub(crate) fn rank_by_density(a: (f64, i64), b: (f64, i64)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1))
}

/// Sort legs best-first and keep at most `limit` of them (`0` keeps all).
pub fn rank_city_pairs(mut pairs: Vec<CityPair>, limit: usize) -> Vec<CityPair> {
    pairs.sort_by(|a, b| {
        rank_by_density(
            (a.value_density, a.total_value),
            (b.value_density, b.total_value),
        )
    });
    if limit > 0 {
        pairs.truncate(limit);
    }
    pairs
}
