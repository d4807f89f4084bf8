//! Santa Route GA Library
//! 
//! A genetic-search solver for closed Euclidean tours that start and end at a
//! depot (city 0) and visit every other city exactly once. Every 10th leg of a
//! tour costs 10% more unless it leaves a city with a prime id.
//! 
//! # Features
//! 
//! - City tables loaded from CSV, or synthesised at random when missing
//! - Route chromosome with cut-and-splice crossover, swap mutation and reversal
//! - Roulette-wheel mating pool selection without replacement
//! - Generational search with mutation dimming and best-route tracking
//! - Multi-seed benchmarking with CSV export
//! 
//! # Example
//! 
//! ```no_run
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use santa_route_ga::instance::CityTable;
//! use santa_route_ga::heuristics::genetic::{GeneticAlgorithm, GAConfig};
//! 
//! // Load the cities, or generate 10 random ones
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let table = CityTable::load_or_synthesize("cities.csv", 10, &mut rng).unwrap();
//! 
//! // Evolve
//! let mut ga = GeneticAlgorithm::new(Arc::new(table), GAConfig::default()).unwrap();
//! let best = ga.run().unwrap();
//! 
//! println!("Route length: {:.2}", best.length());
//! ```

pub mod error;
pub mod distance;
pub mod instance;
pub mod route;
pub mod solution;
pub mod heuristics;
pub mod benchmark;

pub use error::{DatasetError, ValidationError};
pub use instance::CityTable;
pub use route::Route;
pub use solution::Solution;
