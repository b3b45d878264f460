//! Beam search over job legs.
//!
//! Starting from one airport, the search seeds single-leg routes from the
//! best legs departing it, keeps the top `beam_width` by value-density, and
//! then repeatedly extends every surviving route from its endpoint, merges
//! the extensions of all routes into one generation, and prunes that
//! generation back to `beam_width`.
//!
//! The search is greedy: a route that would only pay off after a currently
//! unattractive leg can be pruned early. The number of job source queries is
//! bounded by `steps * beam_width` (plus the seed query) regardless of route
//! length.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::city_pair::{rank_by_density, CityPair};
use crate::error::{Error, Result};
use crate::route::Route;
use crate::source::JobSource;

/// Default number of candidate legs fetched per airport.
pub const DEFAULT_BRANCHING: usize = 10;

/// Default number of routes kept after each step.
pub const DEFAULT_BEAM_WIDTH: usize = 5;

/// Tunables for a route search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    /// Maximum candidate legs fetched per airport.
    pub branching: usize,
    /// Maximum routes retained after each step.
    pub beam_width: usize,
    /// Route length in legs.
    pub steps: usize,
    /// Whether a route may fly a leg it already flew in the opposite
    /// direction (out-and-back trips).
    pub allow_reverse: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            branching: DEFAULT_BRANCHING,
            beam_width: DEFAULT_BEAM_WIDTH,
            steps: 1,
            allow_reverse: false,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        let problem = if self.steps == 0 {
            Some("route must have at least one leg")
        } else if self.beam_width == 0 {
            Some("beam width must be at least 1")
        } else if self.branching == 0 {
            Some("branching factor must be at least 1")
        } else {
            None
        };

        match problem {
            Some(message) => Err(Error::InvalidSearch {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A branch whose endpoint could not be queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    /// Leg number the failed query was meant to produce.
    pub step: usize,
    pub airport: String,
    pub message: String,
}

/// Outcome of a completed search.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Final routes, best value-density first. Empty if any generation
    /// produced no routes.
    pub routes: Vec<Route>,
    /// Number of generations that produced at least one route.
    pub steps_completed: usize,
    /// Job source queries issued, including the seed query.
    pub queries: usize,
    /// Endpoints whose query failed; those branches were dropped.
    pub failures: Vec<FetchFailure>,
}

impl SearchReport {
    /// Whether the search stopped before reaching the requested length.
    pub fn terminated_early(&self, params: &SearchParams) -> bool {
        self.steps_completed < params.steps
    }
}

/// Keep the best `max` routes by value-density, descending.
///
/// Ties are broken by aggregate value, then by position in `routes`, so the
/// result is fully determined by the input order.
pub fn prune(mut routes: Vec<Route>, max: usize) -> Vec<Route> {
    routes.sort_by(|a, b| {
        rank_by_density(
            (a.value_density(), a.value()),
            (b.value_density(), b.value()),
        )
    });
    routes.truncate(max);
    routes
}

/// Beam search driver bound to a job source.
#[derive(Debug, Clone)]
pub struct RouteSearch<S> {
    source: S,
    params: SearchParams,
}

impl<S: JobSource> RouteSearch<S> {
    pub fn new(source: S, params: SearchParams) -> Self {
        Self { source, params }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Run the search from `start`.
    ///
    /// Fails only if the parameters are invalid or the start airport itself
    /// cannot be queried. A failed query at any later endpoint drops that
    /// branch and is recorded in [`SearchReport::failures`].
    pub fn run(&self, start: &str) -> Result<SearchReport> {
        self.params.validate()?;
        let start = start.trim().to_ascii_uppercase();

        let seeds = self.source.fetch(&start, self.params.branching)?;
        debug!(airport = %start, candidates = seeds.len(), "seeded search");

        let mut report = SearchReport {
            routes: Vec::new(),
            steps_completed: 0,
            queries: 1,
            failures: Vec::new(),
        };

        let seeded: Vec<Route> = seeds.into_iter().map(Route::new).collect();
        let mut beam = prune(seeded, self.params.beam_width);
        if beam.is_empty() {
            return Ok(report);
        }
        report.steps_completed = 1;

        for step in 2..=self.params.steps {
            let generation = self.advance(&beam, step, &mut report);
            beam = prune(generation, self.params.beam_width);
            debug!(step, routes = beam.len(), "pruned generation");

            if beam.is_empty() {
                debug!(step, "no route could be extended; stopping search");
                return Ok(report);
            }
            report.steps_completed = step;
        }

        report.routes = beam;
        Ok(report)
    }

    /// Extend every route in `beam` by one leg.
    ///
    /// Each distinct endpoint is queried once per generation; routes ending
    /// at the same airport share the (read-only) result.
    fn advance(&self, beam: &[Route], step: usize, report: &mut SearchReport) -> Vec<Route> {
        let mut candidates: HashMap<String, Option<Arc<[Arc<CityPair>]>>> = HashMap::new();
        let mut generation = Vec::new();

        for route in beam {
            let endpoint = route.endpoint();
            let legs = candidates
                .entry(endpoint.to_string())
                .or_insert_with(|| {
                    report.queries += 1;
                    match self.source.fetch(endpoint, self.params.branching) {
                        Ok(legs) => Some(legs.into_iter().map(Arc::new).collect()),
                        Err(error) => {
                            warn!(
                                airport = %endpoint,
                                step,
                                %error,
                                "failed to fetch jobs; dropping branch"
                            );
                            report.failures.push(FetchFailure {
                                step,
                                airport: endpoint.to_string(),
                                message: error.to_string(),
                            });
                            None
                        }
                    }
                })
                .clone();

            let Some(legs) = legs else {
                continue;
            };

            let before = generation.len();
            generation.extend(
                legs.iter()
                    .filter(|leg| route.admits(leg, self.params.allow_reverse))
                    .map(|leg| route.extended(Arc::clone(leg))),
            );
            if generation.len() == before {
                debug!(airport = %endpoint, step, "route has no eligible extension");
            }
        }

        generation
    }
}

/// Convenience wrapper: run a search from `start` against `source`.
pub fn find_routes<S: JobSource>(
    source: S,
    start: &str,
    params: SearchParams,
) -> Result<SearchReport> {
    RouteSearch::new(source, params).run(start)
}
