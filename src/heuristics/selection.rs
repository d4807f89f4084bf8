//! Population operators: fitness scoring, mating pool selection and
//! all-pairs offspring generation.
//!
//! Fitness is `reference_length / length`, so shorter routes score higher and
//! a route exactly as long as the reference scores 1. Mating pools are drawn
//! by roulette wheel without replacement.

use crate::error::ValidationError;
use crate::route::Route;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Size of the mating pool drawn each generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionSize {
    /// Absolute number of routes
    Count(usize),
    /// Fraction of the population, in [0, 1]
    Fraction(f64),
}

impl SelectionSize {
    /// Number of routes to draw from a population of `population` routes.
    /// Fractions are truncated; counts are clamped to the population.
    pub fn resolve(&self, population: usize) -> Result<usize, ValidationError> {
        match *self {
            SelectionSize::Count(count) => Ok(count.min(population)),
            SelectionSize::Fraction(fraction) => {
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(ValidationError::SelectionFraction(fraction));
                }
                Ok((population as f64 * fraction) as usize)
            }
        }
    }
}

impl Default for SelectionSize {
    fn default() -> Self {
        SelectionSize::Count(20)
    }
}

impl FromStr for SelectionSize {
    type Err = String;

    /// `"20"` is a count, `"0.2"` a fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('.') {
            s.parse::<f64>()
                .map(SelectionSize::Fraction)
                .map_err(|_| format!("Invalid selection fraction: {}", s))
        } else {
            s.parse::<usize>()
                .map(SelectionSize::Count)
                .map_err(|_| format!("Invalid selection count: {}", s))
        }
    }
}

impl std::fmt::Display for SelectionSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionSize::Count(count) => write!(f, "{}", count),
            SelectionSize::Fraction(fraction) => write!(f, "{:.2}%", fraction * 100.0),
        }
    }
}

/// Score every route against `reference_length` and return the scores
/// together with the highest scoring route (the first one on ties).
pub fn pick_best(
    population: &[Route],
    reference_length: f64,
) -> Result<(Vec<f64>, &Route), ValidationError> {
    if population.is_empty() {
        return Err(ValidationError::EmptyPopulation);
    }

    let scores: Vec<f64> = population
        .par_iter()
        .map(|route| reference_length / route.length())
        .collect();

    let mut best_idx = 0;
    for (idx, &score) in scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(ValidationError::NonFiniteFitness { index: idx });
        }
        if score > scores[best_idx] {
            best_idx = idx;
        }
    }

    Ok((scores, &population[best_idx]))
}

/// Draw a mating pool of distinct routes, each draw weighted by fitness.
///
/// Drawn routes leave the wheel, so later draws are renormalised over the
/// routes still in it. Returns the pool and a copy of the best route of
/// `population`.
pub fn select_mating_pool<R: Rng + ?Sized>(
    population: &[Route],
    reference_length: f64,
    selection_size: SelectionSize,
    rng: &mut R,
) -> Result<(Vec<Route>, Route), ValidationError> {
    let (scores, best) = pick_best(population, reference_length)?;
    let pool_size = selection_size.resolve(population.len())?;

    let indices: Vec<usize> = (0..population.len()).collect();
    let pool = indices
        .choose_multiple_weighted(rng, pool_size, |&idx| scores[idx])?
        .map(|&idx| population[idx].clone())
        .collect();

    Ok((pool, best.clone()))
}

/// One child per unordered pair of the mating pool, `C(k, 2)` in total.
pub fn generate_offspring<R: Rng + ?Sized>(
    parents: &[Route],
    rng: &mut R,
) -> Result<Vec<Route>, ValidationError> {
    let pairs = parents.len() * parents.len().saturating_sub(1) / 2;
    let mut population = Vec::with_capacity(pairs);

    for (idx, parent) in parents.iter().enumerate() {
        for other in &parents[idx + 1..] {
            population.push(parent.combine(other, rng)?);
        }
    }

    Ok(population)
}
