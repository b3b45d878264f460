//! Parsing of the FSEconomy `jobsfrom` feed and aggregation into city pairs.
//!
//! The feed is requested in CSV form. Each row is one assignment; the
//! columns this module relies on are `Location`, `ToIcao`, `Amount`,
//! `UnitType`, `Pay` and `Type`. Any other columns are ignored.

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::airport::DistanceLookup;
use crate::city_pair::{rank_city_pairs, CityPair, JobKind};
use crate::error::{Error, Result};

/// Header column that marks a well-formed assignment feed.
const FEED_MARKER_COLUMN: &str = "Location";

/// Assignment type that can only be flown with the job's own aircraft.
const ALL_IN_TYPE: &str = "All-In";

/// One assignment row from the job feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Assignment {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "ToIcao")]
    pub to_icao: String,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "UnitType")]
    pub unit_type: String,
    #[serde(rename = "Pay")]
    pub pay: f64,
    #[serde(rename = "Type", default)]
    pub job_type: String,
}

impl Assignment {
    /// Classify the assignment: kilogram units are cargo, `VIP` jobs are
    /// VIPs, everything else is regular passengers.
    pub fn kind(&self) -> JobKind {
        if self.unit_type.eq_ignore_ascii_case("kg") {
            JobKind::Cargo
        } else if self.job_type.eq_ignore_ascii_case("VIP") {
            JobKind::Vip
        } else {
            JobKind::Passenger
        }
    }

    pub fn is_all_in(&self) -> bool {
        self.job_type.eq_ignore_ascii_case(ALL_IN_TYPE)
    }

    /// Pay truncated to whole currency units.
    pub fn value(&self) -> i64 {
        self.pay.trunc() as i64
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.location.trim().is_empty() || self.to_icao.trim().is_empty() {
            return Err("missing origin or destination");
        }
        if !self.pay.is_finite() || self.pay < 0.0 {
            return Err("pay is not a non-negative number");
        }
        Ok(())
    }
}

/// Result of parsing one feed body.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub assignments: Vec<Assignment>,
    /// Rows dropped because they could not be decoded or failed validation.
    pub skipped: usize,
    /// `All-In` rows left out of aggregation.
    pub all_in: usize,
}

/// Parse a raw feed body for `airport`.
///
/// A body that is not an assignment table is reported as
/// [`Error::FeedUnavailable`] carrying the service's message. Individual
/// malformed rows are skipped and counted; they never abort the parse.
pub fn parse_feed(airport: &str, body: &str) -> Result<ParsedFeed> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(ParsedFeed::default());
    }

    let header_line = trimmed.lines().next().unwrap_or_default();
    let is_table = header_line
        .split(',')
        .any(|col| col.trim().trim_matches('"') == FEED_MARKER_COLUMN);
    if !is_table {
        return Err(Error::FeedUnavailable {
            airport: airport.to_string(),
            message: service_message(trimmed),
        });
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(trimmed.as_bytes());

    let mut parsed = ParsedFeed::default();
    for (index, row) in reader.deserialize::<Assignment>().enumerate() {
        let line = index + 2;
        let assignment = match row {
            Ok(assignment) => assignment,
            Err(err) => {
                warn!(%airport, line, error = %err, "skipping malformed assignment");
                parsed.skipped += 1;
                continue;
            }
        };
        if let Err(reason) = assignment.validate() {
            warn!(%airport, line, reason, "skipping malformed assignment");
            parsed.skipped += 1;
            continue;
        }
        if assignment.is_all_in() {
            parsed.all_in += 1;
            continue;
        }
        parsed.assignments.push(assignment);
    }

    debug!(
        %airport,
        assignments = parsed.assignments.len(),
        skipped = parsed.skipped,
        all_in = parsed.all_in,
        "parsed job feed"
    );
    Ok(parsed)
}

/// Group assignments into city pairs keyed by `(origin, destination)`,
/// best value-density first, keeping at most `limit` (`0` keeps all).
///
/// Distances are looked up once per pair when it is first seen.
pub fn aggregate_assignments(
    assignments: &[Assignment],
    directory: &impl DistanceLookup,
    limit: usize,
) -> Vec<CityPair> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut pairs: Vec<CityPair> = Vec::new();

    for job in assignments {
        let origin = job.location.to_ascii_uppercase();
        let destination = job.to_icao.to_ascii_uppercase();
        let slot = *index
            .entry((origin.clone(), destination.clone()))
            .or_insert_with(|| {
                pairs.push(CityPair::between(origin, destination, directory));
                pairs.len() - 1
            });
        pairs[slot].record(job.kind(), job.amount, job.value());
    }

    rank_city_pairs(pairs, limit)
}

/// Pull a readable message out of a non-table response such as
/// `<Error>Key is invalid</Error>`.
fn service_message(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut in_tag = false;
    for ch in body.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let message = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if message.is_empty() {
        "unrecognised response from job feed".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatDistance(u32);

    impl DistanceLookup for FlatDistance {
        fn known_distance(&self, _from: &str, _to: &str) -> Option<u32> {
            Some(self.0)
        }
    }

    const FEED: &str = "\
Id,Location,ToIcao,FromIcao,Amount,UnitType,Commodity,Pay,Expires,ExpireDateTime,Type,Express,PtAssignment,AircraftId
1,KVNY,KLAX,KVNY,3,passengers,Tourists,450.75,3 days,2026-10-20 12:00:00,Trip-Only,False,false,0
2,KVNY,KLAX,KVNY,800,kg,Mail,1200.00,3 days,2026-10-20 12:00:00,Trip-Only,False,false,0
3,KVNY,KSBA,KVNY,1,passengers,Executive,2000.00,1 day,2026-10-19 12:00:00,VIP,False,false,0
4,KVNY,KSBA,KVNY,oops,passengers,Broken,100.00,1 day,2026-10-19 12:00:00,Trip-Only,False,false,0
5,KVNY,KSAN,KVNY,4,passengers,Charter,9000.00,1 day,2026-10-19 12:00:00,All-In,False,false,123
";

    #[test]
    fn parses_rows_and_skips_bad_ones() {
        let parsed = parse_feed("KVNY", FEED).expect("feed parses");
        assert_eq!(parsed.assignments.len(), 3);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.all_in, 1);
        assert_eq!(parsed.assignments[0].value(), 450);
        assert_eq!(parsed.assignments[1].kind(), JobKind::Cargo);
        assert_eq!(parsed.assignments[2].kind(), JobKind::Vip);
    }

    #[test]
    fn aggregates_per_destination() {
        let parsed = parse_feed("KVNY", FEED).expect("feed parses");
        let pairs = aggregate_assignments(&parsed.assignments, &FlatDistance(50), 0);
        assert_eq!(pairs.len(), 2);

        // KSBA: 2000 / 50 = 40 per nm; KLAX: 1650 / 50 = 33 per nm.
        assert_eq!(pairs[0].leg(), ("KVNY", "KSBA"));
        assert_eq!(pairs[0].total_value(), 2000);
        assert_eq!(pairs[0].vip().jobs, 1);
        assert_eq!(pairs[1].leg(), ("KVNY", "KLAX"));
        assert_eq!(pairs[1].total_jobs(), 2);
        assert_eq!(pairs[1].total_value(), 1650);
        assert_eq!(pairs[1].cargo().amount, 800);
        assert_eq!(pairs[1].pax().amount, 3);
    }

    #[test]
    fn bad_row_does_not_touch_sibling_totals() {
        let parsed = parse_feed("KVNY", FEED).expect("feed parses");
        let pairs = aggregate_assignments(&parsed.assignments, &FlatDistance(50), 0);
        let ksba = pairs
            .iter()
            .find(|cp| cp.destination() == "KSBA")
            .expect("KSBA pair");
        assert_eq!(ksba.total_jobs(), 1);
        assert_eq!(ksba.pax().jobs, 0);
    }

    #[test]
    fn aggregation_respects_limit() {
        let parsed = parse_feed("KVNY", FEED).expect("feed parses");
        let pairs = aggregate_assignments(&parsed.assignments, &FlatDistance(50), 1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].destination(), "KSBA");
    }

    #[test]
    fn error_response_is_feed_unavailable() {
        let err = parse_feed("KVNY", "<Error>Invalid access key</Error>").expect_err("error body");
        match err {
            Error::FeedUnavailable { airport, message } => {
                assert_eq!(airport, "KVNY");
                assert_eq!(message, "Invalid access key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_body_has_no_jobs() {
        let parsed = parse_feed("KVNY", "  \n").expect("empty feed");
        assert!(parsed.assignments.is_empty());
    }

    #[test]
    fn header_only_feed_has_no_jobs() {
        let parsed = parse_feed(
            "KVNY",
            "Id,Location,ToIcao,FromIcao,Amount,UnitType,Commodity,Pay,Expires,ExpireDateTime,Type,Express,PtAssignment,AircraftId\n",
        )
        .expect("header only");
        assert!(parsed.assignments.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn negative_pay_is_rejected() {
        let body = "Location,ToIcao,Amount,UnitType,Pay,Type\nKVNY,KLAX,1,passengers,-5,Trip-Only\n";
        let parsed = parse_feed("KVNY", body).expect("feed parses");
        assert!(parsed.assignments.is_empty());
        assert_eq!(parsed.skipped, 1);
    }
}
