use std::fmt::Write;

use serde::Serialize;

use crate::airport::AirportDirectory;
use crate::city_pair::{CityPair, JobTally};
use crate::route::Route;
use crate::search::{FetchFailure, SearchParams, SearchReport};

/// Presentation style for turning summaries into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Tab-separated lines, one per leg.
    PlainText,
    /// Markdown suitable for pasting into a forum post or note.
    Markdown,
}

/// One leg with its job breakdown, ready for display or serialisation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LegSummary {
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_name: Option<String>,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    pub value: i64,
    pub distance_nm: u32,
    pub value_density: f64,
    pub jobs: u32,
    pub cargo: JobTally,
    pub pax: JobTally,
    pub vip: JobTally,
}

impl LegSummary {
    pub fn from_city_pair(cp: &CityPair, directory: Option<&AirportDirectory>) -> Self {
        let name = |icao: &str| {
            directory
                .and_then(|dir| dir.get(icao))
                .map(|airport| airport.name.clone())
                .filter(|name| !name.is_empty())
        };
        Self {
            origin: cp.origin().to_string(),
            origin_name: name(cp.origin()),
            destination: cp.destination().to_string(),
            destination_name: name(cp.destination()),
            value: cp.total_value(),
            distance_nm: cp.distance_nm(),
            value_density: cp.value_density(),
            jobs: cp.total_jobs(),
            cargo: cp.cargo(),
            pax: cp.pax(),
            vip: cp.vip(),
        }
    }

    /// `ORIG-DEST  $value  N nm  $X/nm  J jobs  P pax  K kg  V VIPs`
    pub fn line(&self) -> String {
        format!(
            "{}-{}\t${}\t{} nm\t${}/nm\t{} jobs\t{} pax\t{} kg\t{} VIPs",
            self.origin,
            self.destination,
            self.value,
            self.distance_nm,
            self.value_density.trunc() as i64,
            self.jobs,
            self.pax.amount,
            self.cargo.amount,
            self.vip.amount
        )
    }
}

/// A complete route with per-leg details and aggregate totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub rank: usize,
    pub airports: Vec<String>,
    pub legs: Vec<LegSummary>,
    pub value: i64,
    pub length_nm: u64,
    pub value_density: f64,
}

impl RouteSummary {
    pub fn from_route(rank: usize, route: &Route, directory: Option<&AirportDirectory>) -> Self {
        Self {
            rank,
            airports: route.airports().into_iter().map(str::to_string).collect(),
            legs: route
                .legs()
                .iter()
                .map(|leg| LegSummary::from_city_pair(leg, directory))
                .collect(),
            value: route.value(),
            length_nm: route.length_nm(),
            value_density: route.value_density(),
        }
    }

    /// `N LEG TOTAL:  $value  N nm  $X/nm`
    pub fn total_line(&self) -> String {
        format!(
            "{} LEG TOTAL:\t${}\t{} nm\t${}/nm",
            self.legs.len(),
            self.value,
            self.length_nm,
            self.value_density.trunc() as i64
        )
    }
}

/// Serializable result of a route search.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchSummary {
    pub start: String,
    pub params: SearchParams,
    pub steps_completed: usize,
    pub queries: usize,
    pub routes: Vec<RouteSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FetchFailure>,
}

impl SearchSummary {
    pub fn from_report(
        start: &str,
        params: SearchParams,
        report: &SearchReport,
        directory: Option<&AirportDirectory>,
    ) -> Self {
        Self {
            start: start.to_ascii_uppercase(),
            params,
            steps_completed: report.steps_completed,
            queries: report.queries,
            routes: report
                .routes
                .iter()
                .enumerate()
                .map(|(index, route)| RouteSummary::from_route(index + 1, route, directory))
                .collect(),
            failures: report.failures.clone(),
        }
    }

    /// Render all routes using the requested textual mode.
    pub fn render(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::PlainText => self.render_plain(),
            RenderMode::Markdown => self.render_markdown(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        for route in &self.routes {
            for leg in &route.legs {
                let _ = writeln!(buffer, "{}", leg.line());
            }
            let _ = writeln!(buffer, "{}", "-".repeat(80));
            let _ = writeln!(buffer, "{}\n", route.total_line());
        }
        buffer
    }

    fn render_markdown(&self) -> String {
        let mut buffer = String::new();
        for route in &self.routes {
            let _ = writeln!(
                buffer,
                "**Route {}**: {} (${}, {} nm, ${:.2}/nm)",
                route.rank,
                route.airports.join(" → "),
                route.value,
                route.length_nm,
                route.value_density
            );
            for leg in &route.legs {
                let _ = writeln!(
                    buffer,
                    "* `{}` → `{}`: ${} over {} nm, {} jobs",
                    leg.origin, leg.destination, leg.value, leg.distance_nm, leg.jobs
                );
            }
            buffer.push('\n');
        }
        buffer
    }
}

/// Serializable list of the best legs departing one airport.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobsSummary {
    pub airport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport_name: Option<String>,
    pub legs: Vec<LegSummary>,
}

impl JobsSummary {
    pub fn new(airport: &str, pairs: &[CityPair], directory: Option<&AirportDirectory>) -> Self {
        let airport = airport.to_ascii_uppercase();
        Self {
            airport_name: directory
                .and_then(|dir| dir.get(&airport))
                .map(|a| a.name.clone()),
            legs: pairs
                .iter()
                .map(|cp| LegSummary::from_city_pair(cp, directory))
                .collect(),
            airport,
        }
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        for leg in &self.legs {
            let _ = writeln!(buffer, "{}", leg.line());
        }
        buffer
    }
}
