//! FSEconomy route finder library entry points.
//!
//! This crate aggregates FSEconomy job offers into scored city-pair legs and
//! runs a beam search that chains those legs into profitable multi-leg
//! routes. Airport coordinates and the job feed are reached through
//! [`AirportDirectory`] and the [`JobSource`] trait so the search can be
//! driven by fixture data as easily as by the live service.

#![deny(warnings)]

pub mod airport;
pub mod cache;
pub mod city_pair;
pub mod config;
pub mod error;
pub mod fse;
pub mod jobs;
pub mod output;
pub mod route;
pub mod search;
pub mod source;

pub use airport::{Airport, AirportDirectory, DistanceLookup, FALLBACK_DISTANCE_NM};
pub use cache::{FeedCache, DEFAULT_FEED_TTL};
pub use city_pair::{rank_city_pairs, CityPair, JobKind, JobTally};
pub use error::{Error, Result};
pub use fse::{AccessKey, FseClient};
pub use jobs::{aggregate_assignments, parse_feed, Assignment, ParsedFeed};
pub use output::{JobsSummary, LegSummary, RenderMode, RouteSummary, SearchSummary};
pub use route::Route;
pub use search::{
    find_routes, prune, FetchFailure, RouteSearch, SearchParams, SearchReport,
    DEFAULT_BEAM_WIDTH, DEFAULT_BRANCHING,
};
pub use source::{FeedJobSource, FeedOrigin, JobSource};
