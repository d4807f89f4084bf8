//! Error types for the route optimizer.
//!
//! Validation failures are raised at the boundary that detects them and are
//! never corrected silently. Dataset failures only come from the coordinate
//! table layer.

use thiserror::Error;

/// Raised when a route, a parent pair, or a run parameter breaks an invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The sequence visits the same city twice.
    #[error("the route must contain every city exactly once (city {0} is repeated)")]
    DuplicateCity(usize),

    /// The sequence does not cover exactly the route's city set.
    #[error("the route must contain all of its cities and nothing else ({missing} missing, {unexpected} unexpected)")]
    CitySetMismatch { missing: usize, unexpected: usize },

    /// The depot is never part of a permutable city set.
    #[error("the city set must not contain the depot (id 0)")]
    DepotInCitySet,

    /// A city id has no coordinates in the table.
    #[error("city {0} has no coordinates in the city table")]
    UnknownCity(usize),

    /// Crossover across routes that do not share their cities.
    #[error("routes can only be combined when defined on the same cities and of the same length")]
    IncompatibleParents,

    /// Mating pool fraction outside [0, 1].
    #[error("fraction of the chosen subpopulation must lie in [0, 1], got {0}")]
    SelectionFraction(f64),

    /// Best-of-population asked for an empty population.
    #[error("cannot pick the best route of an empty population")]
    EmptyPopulation,

    /// A route of zero length makes its fitness score infinite.
    #[error("fitness score of route {index} is not finite")]
    NonFiniteFitness { index: usize },

    /// The roulette wheel was given weights it cannot sample from.
    #[error("invalid roulette weights: {0}")]
    Roulette(#[from] rand::distributions::WeightedError),

    /// A numeric run parameter is out of its admissible range.
    #[error("{name} must lie in {range}, got {value}")]
    Parameter {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
}

/// Raised while reading, writing or synthesising a coordinate table.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("the city table is empty (it needs at least the depot)")]
    Empty,

    #[error("invalid coordinate bounds: low {low} must be below high {high}")]
    InvalidBounds { low: f64, high: f64 },

    /// Ids must run 0, 1, 2, ... in file order.
    #[error("city ids must be contiguous from 0: expected {expected}, found {found}")]
    NonContiguousIds { expected: usize, found: usize },
}
