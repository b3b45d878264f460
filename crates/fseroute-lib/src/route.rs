//! Multi-leg routes assembled from [`CityPair`] legs.

use std::collections::HashSet;
use std::sync::Arc;

use crate::city_pair::{value_density, CityPair};

/// An ordered path of legs where each leg departs from the previous
/// leg's destination.
///
/// Routes are immutable: [`Route::extended`] returns a new route and leaves
/// the original untouched, so sibling branches of a search never share
/// mutable state. Legs themselves are shared behind [`Arc`].
///
/// Routes are a handful of legs long, so leg lookups scan `legs` directly.
#[derive(Debug, Clone)]
pub struct Route {
    legs: Vec<Arc<CityPair>>,
    value: i64,
    length_nm: u64,
    value_density: f64,
}

impl Route {
    /// Start a one-leg route.
    pub fn new(seed: impl Into<Arc<CityPair>>) -> Self {
        let seed = seed.into();
        let value = seed.total_value();
        let length_nm = u64::from(seed.distance_nm());

        Self {
            legs: vec![seed],
            value,
            length_nm,
            value_density: value_density(value, length_nm),
        }
    }

    /// Whether the exact directed leg `from -> to` is already on this route.
    pub fn contains_leg(&self, from: &str, to: &str) -> bool {
        self.legs.iter().any(|leg| leg.leg() == (from, to))
    }

    /// Whether `leg` may be appended without repeating a leg, or retracing
    /// one in the opposite direction unless `allow_reverse` is set.
    pub fn admits(&self, leg: &CityPair, allow_reverse: bool) -> bool {
        let (from, to) = leg.leg();
        if self.contains_leg(from, to) {
            return false;
        }
        allow_reverse || !self.contains_leg(to, from)
    }

    /// A new route with `leg` appended. Aggregates are updated by summation.
    pub fn extended(&self, leg: Arc<CityPair>) -> Route {
        let value = self.value + leg.total_value();
        let length_nm = self.length_nm + u64::from(leg.distance_nm());

        let mut legs = Vec::with_capacity(self.legs.len() + 1);
        legs.extend(self.legs.iter().cloned());
        legs.push(leg);

        Route {
            legs,
            value,
            length_nm,
            value_density: value_density(value, length_nm),
        }
    }

    pub fn legs(&self) -> &[Arc<CityPair>] {
        &self.legs
    }

    /// Number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Always false: a route has at least its seed leg.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Number of distinct directed legs.
    pub fn distinct_legs(&self) -> usize {
        self.legs
            .iter()
            .map(|leg| leg.leg())
            .collect::<HashSet<_>>()
            .len()
    }

    /// First airport of the route.
    pub fn start(&self) -> &str {
        self.legs[0].origin()
    }

    /// Airport the route currently ends at.
    pub fn endpoint(&self) -> &str {
        self.legs[self.legs.len() - 1].destination()
    }

    /// Airports visited in order, starting with the origin.
    pub fn airports(&self) -> Vec<&str> {
        std::iter::once(self.start())
            .chain(self.legs.iter().map(|leg| leg.destination()))
            .collect()
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn length_nm(&self) -> u64 {
        self.length_nm
    }

    /// Aggregate value per nautical mile; zero for a zero-length route.
    pub fn value_density(&self) -> f64 {
        self.value_density
    }
}
