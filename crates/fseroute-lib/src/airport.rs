//! Airport coordinate database and great-circle distances.
//!
//! The FSEconomy airport export (`icaodata.csv`) lists one airport per row
//! with its ICAO code, latitude and longitude in decimal degrees, and a
//! display name. [`AirportDirectory`] loads that file and answers distance
//! queries in whole nautical miles.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Distance reported when either endpoint is missing from the directory.
///
/// Only used for route length; legs with an unknown endpoint score zero
/// value-density.
pub const FALLBACK_DISTANCE_NM: u32 = 100;

/// Approximate radius of the earth in kilometres.
const EARTH_RADIUS_KM: f64 = 6373.0;

/// Nautical miles per kilometre.
const NM_PER_KM: f64 = 0.54;

/// Minimum Jaro-Winkler similarity for an airport code suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Anything that can report the distance between two airports.
pub trait DistanceLookup {
    /// Distance between two airports in whole nautical miles, or `None`
    /// when either code is unknown.
    fn known_distance(&self, from: &str, to: &str) -> Option<u32>;

    /// Distance between two airports, falling back to
    /// [`FALLBACK_DISTANCE_NM`] for unknown codes.
    fn distance(&self, from: &str, to: &str) -> u32 {
        self.known_distance(from, to).unwrap_or(FALLBACK_DISTANCE_NM)
    }
}

/// A single airport with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub icao: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    /// Great-circle distance to another airport in nautical miles, truncated.
    pub fn distance_to(&self, other: &Airport) -> u32 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        (EARTH_RADIUS_KM * c * NM_PER_KM) as u32
    }
}

/// In-memory airport database keyed by upper-case ICAO code.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: HashMap<String, Airport>,
    source: Option<PathBuf>,
}

impl AirportDirectory {
    /// Build a directory from already-constructed airports.
    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let airports = airports
            .into_iter()
            .map(|airport| (airport.icao.to_ascii_uppercase(), airport))
            .collect();
        Self {
            airports,
            source: None,
        }
    }

    /// Load the airport database from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = fs::File::open(path)?;
        let mut directory = Self::from_reader(file)?;
        directory.source = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            airports = directory.len(),
            "loaded airport directory"
        );
        Ok(directory)
    }

    /// Load the airport database from any reader.
    ///
    /// Expects a header row followed by `icao,lat,lon,type,size,name,...`
    /// records. Rows whose coordinates cannot be parsed are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::Fields)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = AirportColumns::resolve(&headers)?;

        let mut airports = HashMap::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(row = index + 2, error = %err, "skipping unreadable airport row");
                    continue;
                }
            };
            match columns.parse(&record) {
                Some(airport) => {
                    airports.insert(airport.icao.clone(), airport);
                }
                None => warn!(row = index + 2, "skipping malformed airport row"),
            }
        }

        if airports.is_empty() {
            return Err(Error::AirportData {
                message: "airport database contained no usable rows".to_string(),
            });
        }

        Ok(Self {
            airports,
            source: None,
        })
    }

    /// File the directory was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Lookup an airport by ICAO code (case-insensitive).
    pub fn get(&self, icao: &str) -> Option<&Airport> {
        self.airports.get(&icao.to_ascii_uppercase())
    }

    pub fn contains(&self, icao: &str) -> bool {
        self.get(icao).is_some()
    }

    /// Suggest up to `limit` known codes that resemble `icao`, best first.
    pub fn fuzzy_matches(&self, icao: &str, limit: usize) -> Vec<String> {
        let needle = icao.to_ascii_uppercase();
        let mut scored: Vec<(f64, &str)> = self
            .airports
            .keys()
            .map(|code| (strsim::jaro_winkler(&needle, code), code.as_str()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, code)| code.to_string())
            .collect()
    }

    /// Validate that `icao` is a known airport, with suggestions on failure.
    pub fn require(&self, icao: &str) -> Result<&Airport> {
        self.get(icao).ok_or_else(|| Error::UnknownAirport {
            code: icao.to_string(),
            suggestions: self.fuzzy_matches(icao, 3),
        })
    }
}

impl DistanceLookup for AirportDirectory {
    fn known_distance(&self, from: &str, to: &str) -> Option<u32> {
        Some(self.get(from)?.distance_to(self.get(to)?))
    }
}

/// Column positions within the airport CSV.
struct AirportColumns {
    icao: usize,
    latitude: usize,
    longitude: usize,
    name: Option<usize>,
}

impl AirportColumns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        let icao = find(&["icao", "ident", "code"]);
        let latitude = find(&["lat", "latitude"]);
        let longitude = find(&["lon", "long", "longitude"]);
        let name = find(&["name"]);

        match (icao, latitude, longitude) {
            (Some(icao), Some(latitude), Some(longitude)) => Ok(Self {
                icao,
                latitude,
                longitude,
                name,
            }),
            _ => Err(Error::AirportData {
                message: format!(
                    "airport CSV must provide icao, lat and lon columns. Available: {}",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            }),
        }
    }

    fn parse(&self, record: &StringRecord) -> Option<Airport> {
        let icao = record.get(self.icao)?.trim();
        if icao.is_empty() {
            return None;
        }
        let latitude: f64 = record.get(self.latitude)?.parse().ok()?;
        let longitude: f64 = record.get(self.longitude)?.parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        let name = self
            .name
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string();

        Some(Airport {
            icao: icao.to_ascii_uppercase(),
            name,
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
icao,lat,lon,type,size,name,city,state,country
KSFO,37.6188,-122.3756,civil,11870,San Francisco Intl,San Francisco,California,United States
KJFK,40.6398,-73.7789,civil,14511,John F Kennedy Intl,New York,New York,United States
KSFF,47.6828,-117.3226,civil,4500,Felts Field,Spokane,Washington,United States
BAD1,not-a-number,0,civil,0,Broken,,,
";

    fn directory() -> AirportDirectory {
        AirportDirectory::from_reader(SAMPLE.as_bytes()).expect("sample loads")
    }

    #[test]
    fn loads_rows_and_skips_malformed() {
        let dir = directory();
        assert_eq!(dir.len(), 3);
        assert!(dir.contains("KSFO"));
        assert!(dir.contains("ksfo"));
        assert!(!dir.contains("BAD1"));
        assert_eq!(dir.get("KJFK").unwrap().name, "John F Kennedy Intl");
    }

    #[test]
    fn great_circle_distance_matches_known_value() {
        let dir = directory();
        let d = dir.distance("KSFO", "KJFK");
        // SFO-JFK is roughly 2,240 nm on a 6373 km sphere scaled by 0.54.
        assert!((2200..2300).contains(&d), "unexpected distance {d}");
        assert_eq!(d, dir.distance("KJFK", "KSFO"));
    }

    #[test]
    fn unknown_airport_uses_fallback_distance() {
        let dir = directory();
        assert_eq!(dir.distance("KSFO", "ZZZZ"), FALLBACK_DISTANCE_NM);
        assert_eq!(dir.distance("ZZZZ", "YYYY"), FALLBACK_DISTANCE_NM);
        assert_eq!(dir.known_distance("KSFO", "ZZZZ"), None);
        assert!(dir.known_distance("KSFO", "KJFK").is_some());
    }

    #[test]
    fn same_airport_is_zero_distance() {
        let dir = directory();
        assert_eq!(dir.distance("KSFO", "KSFO"), 0);
    }

    #[test]
    fn require_suggests_similar_codes() {
        let dir = directory();
        let err = dir.require("KSFP").expect_err("unknown code");
        let message = err.to_string();
        assert!(message.contains("Did you mean"), "{message}");
        assert!(message.contains("KSFO"), "{message}");
    }

    #[test]
    fn missing_columns_are_rejected() {
        let err = AirportDirectory::from_reader("code,name\nKSFO,San Francisco\n".as_bytes())
            .expect_err("no coordinates");
        assert!(err.to_string().contains("lat"));
    }
}
