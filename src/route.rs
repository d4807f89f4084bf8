//! Route chromosome for the genetic search.
//!
//! A [`Route`] is a permutation of its city set. The depot is never stored in
//! the sequence; it is implicitly visited first and last when the route is
//! measured. Routes are validated on construction and treated as immutable
//! afterwards, except for the mutation probability which is dimmed in place
//! once per generation.

use crate::error::ValidationError;
use crate::instance::{CitySet, CityTable, DEPOT};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Mutation probability of a route built without an explicit one.
pub const DEFAULT_MUTATION_PROBA: f64 = 0.01;

/// Candidate tour: an ordered permutation of a shared city set
#[derive(Debug, Clone)]
pub struct Route {
    instance: Arc<CityTable>,
    cities: Arc<CitySet>,
    sequence: Vec<usize>,
    mutation_proba: f64,
}

impl Route {
    /// Build a route from an explicit visiting order.
    pub fn from_sequence(
        instance: Arc<CityTable>,
        cities: Arc<CitySet>,
        sequence: Vec<usize>,
        mutation_proba: f64,
    ) -> Result<Self, ValidationError> {
        validate_mutation_proba(mutation_proba)?;
        instance.validate_city_set(&cities)?;
        validate_sequence(&cities, &sequence)?;

        Ok(Route {
            instance,
            cities,
            sequence,
            mutation_proba,
        })
    }

    /// Build a uniformly random permutation of `cities`.
    pub fn random<R: Rng + ?Sized>(
        instance: Arc<CityTable>,
        cities: Arc<CitySet>,
        mutation_proba: f64,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        let mut sequence: Vec<usize> = cities.iter().copied().collect();
        sequence.shuffle(rng);
        Self::from_sequence(instance, cities, sequence, mutation_proba)
    }

    /// Random route over every city of the table except the depot.
    pub fn with_all_cities<R: Rng + ?Sized>(
        instance: Arc<CityTable>,
        mutation_proba: f64,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        let cities = Arc::new(instance.all_cities());
        Self::random(instance, cities, mutation_proba, rng)
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn cities(&self) -> &Arc<CitySet> {
        &self.cities
    }

    pub fn instance(&self) -> &Arc<CityTable> {
        &self.instance
    }

    pub fn mutation_proba(&self) -> f64 {
        self.mutation_proba
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The sequence with the depot prepended and appended
    pub fn tour(&self) -> Vec<usize> {
        let mut tour = Vec::with_capacity(self.sequence.len() + 2);
        tour.push(DEPOT);
        tour.extend_from_slice(&self.sequence);
        tour.push(DEPOT);
        tour
    }

    /// Total length of the depot-bounded tour, penalties included
    pub fn length(&self) -> f64 {
        self.instance.tour_length(&self.sequence)
    }

    /// Scale the mutation probability by `factor`.
    pub fn dim_mutation(&mut self, factor: f64) {
        self.mutation_proba *= factor;
    }

    /// Same cities visited in the opposite order.
    ///
    /// The mutation probability is not carried over; the reversed route gets
    /// [`DEFAULT_MUTATION_PROBA`].
    pub fn reversed(&self) -> Route {
        Route {
            instance: Arc::clone(&self.instance),
            cities: Arc::clone(&self.cities),
            sequence: self.sequence.iter().rev().copied().collect(),
            mutation_proba: DEFAULT_MUTATION_PROBA,
        }
    }

    /// Crossover with `other`, mutate both children, and return the shortest
    /// of the two children and their reversals.
    pub fn combine<R: Rng + ?Sized>(
        &self,
        other: &Route,
        rng: &mut R,
    ) -> Result<Route, ValidationError> {
        if !Arc::ptr_eq(&self.cities, &other.cities) && self.cities != other.cities {
            return Err(ValidationError::IncompatibleParents);
        }
        self.breed(&other.sequence, rng)
    }

    /// Like [`Route::combine`], with a raw visiting order as the partner. The
    /// partner must have the same length and the same cities.
    pub fn combine_with_sequence<R: Rng + ?Sized>(
        &self,
        other: &[usize],
        rng: &mut R,
    ) -> Result<Route, ValidationError> {
        let same_cities = other.len() == self.sequence.len()
            && other.iter().collect::<HashSet<_>>() == self.cities.iter().collect::<HashSet<_>>();
        if !same_cities {
            return Err(ValidationError::IncompatibleParents);
        }
        self.breed(other, rng)
    }

    fn breed<R: Rng + ?Sized>(
        &self,
        partner: &[usize],
        rng: &mut R,
    ) -> Result<Route, ValidationError> {
        if self.sequence.is_empty() {
            return self.offspring(Vec::new());
        }

        let mut candidates: Vec<Vec<usize>> = self
            .crossover(partner, rng)
            .into_iter()
            .map(|child| self.mutate(child, rng))
            .collect();
        let reversals: Vec<Vec<usize>> = candidates
            .iter()
            .map(|child| child.iter().rev().copied().collect())
            .collect();
        candidates.extend(reversals);

        // min_by_key keeps the first of equally short candidates
        let best = candidates
            .into_iter()
            .min_by_key(|candidate| OrderedFloat(self.instance.tour_length(candidate)))
            .unwrap_or_default();

        self.offspring(best)
    }

    fn offspring(&self, sequence: Vec<usize>) -> Result<Route, ValidationError> {
        Route::from_sequence(
            Arc::clone(&self.instance),
            Arc::clone(&self.cities),
            sequence,
            self.mutation_proba,
        )
    }

    /// Draw a cut interval and build both children.
    pub(crate) fn crossover<R: Rng + ?Sized>(
        &self,
        partner: &[usize],
        rng: &mut R,
    ) -> [Vec<usize>; 2] {
        let len = self.sequence.len();
        let start = rng.gen_range(0..len);
        let stop = rng.gen_range(start + 1..=len);
        cut_and_splice([&self.sequence, partner], start, stop)
    }

    /// Swap each position with a random one with probability `mutation_proba`.
    pub(crate) fn mutate<R: Rng + ?Sized>(&self, mut route: Vec<usize>, rng: &mut R) -> Vec<usize> {
        let len = route.len();
        for idx in 0..len {
            if rng.gen::<f64>() >= self.mutation_proba {
                continue;
            }
            let swap_idx = rng.gen_range(0..len);
            route.swap(idx, swap_idx);
        }
        route
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Route {:?} (length {:.2})", self.sequence, self.length())
    }
}

/// Children of a cut `[start, stop)`: each parent keeps its own order for the
/// cities outside its partner's cut, and receives the partner's cut at `start`.
pub fn cut_and_splice(parents: [&[usize]; 2], start: usize, stop: usize) -> [Vec<usize>; 2] {
    let child = |own: &[usize], donor: &[usize]| -> Vec<usize> {
        let segment = &donor[start..stop];
        let cut: HashSet<usize> = segment.iter().copied().collect();
        let mut child: Vec<usize> = own.iter().copied().filter(|c| !cut.contains(c)).collect();
        child.splice(start..start, segment.iter().copied());
        child
    };

    [child(parents[0], parents[1]), child(parents[1], parents[0])]
}

fn validate_mutation_proba(p: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ValidationError::Parameter {
            name: "mutation probability",
            range: "[0, 1]",
            value: p,
        });
    }
    Ok(())
}

fn validate_sequence(cities: &CitySet, sequence: &[usize]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(sequence.len());
    for &city in sequence {
        if !seen.insert(city) {
            return Err(ValidationError::DuplicateCity(city));
        }
    }

    let unexpected = seen.iter().filter(|c| !cities.contains(c)).count();
    let missing = cities.iter().filter(|c| !seen.contains(c)).count();
    if missing > 0 || unexpected > 0 {
        return Err(ValidationError::CitySetMismatch {
            missing,
            unexpected,
        });
    }

    Ok(())
}
