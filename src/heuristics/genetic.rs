//! Genetic Algorithm driving the route search.
//!
//! Each generation the current population is scored against the best length
//! found so far, a mating pool is drawn by roulette wheel, every pair of the
//! pool produces one child, and the children's mutation probability is dimmed.
//! The best route ever seen is kept across generations and only replaced by a
//! strictly shorter one.

use crate::error::ValidationError;
use crate::heuristics::selection::{generate_offspring, pick_best, select_mating_pool, SelectionSize};
use crate::instance::{CitySet, CityTable};
use crate::route::Route;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Genetic Algorithm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GAConfig {
    /// Size of the initial random population
    pub precursors: usize,
    /// Mating pool size, absolute or as a fraction of the population
    pub selection_size: SelectionSize,
    /// Number of generations
    pub generations: usize,
    /// Initial per-position swap probability
    pub mutation_proba: f64,
    /// Factor applied to the children's mutation probability every generation
    pub mutation_dimming: f64,
    /// Random seed
    pub seed: u64,
    /// Report progress at info level instead of debug
    pub verbose: bool,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            precursors: 200,
            selection_size: SelectionSize::Count(20),
            generations: 500,
            mutation_proba: 0.1,
            mutation_dimming: 0.9,
            seed: 42,
            verbose: false,
        }
    }
}

impl GAConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.mutation_proba) {
            return Err(ValidationError::Parameter {
                name: "mutation probability",
                range: "[0, 1]",
                value: self.mutation_proba,
            });
        }
        if !(self.mutation_dimming > 0.0 && self.mutation_dimming <= 1.0) {
            return Err(ValidationError::Parameter {
                name: "mutation dimming factor",
                range: "(0, 1]",
                value: self.mutation_dimming,
            });
        }
        if let SelectionSize::Fraction(fraction) = self.selection_size {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ValidationError::SelectionFraction(fraction));
            }
        }
        Ok(())
    }
}

/// Snapshot of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub population_size: usize,
    /// Length of this generation's best route
    pub generation_best: f64,
    /// Length of the best route found so far
    pub best_length: f64,
    /// Mutation probability of the best route found so far
    pub mutation_proba: f64,
    pub improved: bool,
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm {
    config: GAConfig,
    instance: Arc<CityTable>,
    cities: Arc<CitySet>,
    rng: ChaCha8Rng,
    history: Vec<GenerationRecord>,
}

impl GeneticAlgorithm {
    pub fn new(instance: Arc<CityTable>, config: GAConfig) -> Result<Self, ValidationError> {
        config.validate()?;

        let cities = Arc::new(instance.all_cities());
        instance.validate_city_set(&cities)?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(GeneticAlgorithm {
            config,
            instance,
            cities,
            rng,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &GAConfig {
        &self.config
    }

    /// Per-generation records of the last evolution
    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Build `precursors` random routes over every city of the table
    pub fn initialize_population(&mut self) -> Result<Vec<Route>, ValidationError> {
        let mut population = Vec::with_capacity(self.config.precursors);
        for _ in 0..self.config.precursors {
            population.push(Route::random(
                Arc::clone(&self.instance),
                Arc::clone(&self.cities),
                self.config.mutation_proba,
                &mut self.rng,
            )?);
        }

        log::debug!(
            "[GA] Initialized population of {} routes over {} cities",
            population.len(),
            self.cities.len()
        );
        Ok(population)
    }

    /// Evolve `population` for the configured number of generations and
    /// return the shortest route seen.
    pub fn evolve(&mut self, population: Vec<Route>) -> Result<Route, ValidationError> {
        self.history.clear();

        // Neutral reference until the first generation has been measured.
        let mut reference_length = 1.0;
        let mut alpha: Option<Route> = None;
        let mut population = population;

        for generation in 0..self.config.generations {
            let (chosen, best) = select_mating_pool(
                &population,
                reference_length,
                self.config.selection_size,
                &mut self.rng,
            )?;
            let best_length = best.length();

            let improved = match alpha {
                None => true,
                Some(_) => best_length < reference_length,
            };
            if improved {
                reference_length = best_length;
                self.report(generation, &best);
                alpha = Some(best);
            }

            self.history.push(GenerationRecord {
                generation,
                population_size: population.len(),
                generation_best: best_length,
                best_length: reference_length,
                mutation_proba: alpha.as_ref().map_or(0.0, Route::mutation_proba),
                improved,
            });

            population = generate_offspring(&chosen, &mut self.rng)?;
            for child in population.iter_mut() {
                child.dim_mutation(self.config.mutation_dimming);
            }

            if population.is_empty() {
                log::warn!(
                    "[GA] Gen {}: mating pool of {} routes produced no offspring",
                    generation,
                    chosen.len()
                );
            }
        }

        let (_, final_leader) = pick_best(&population, reference_length)?;
        let alpha = match alpha {
            Some(current) if final_leader.length() >= current.length() => current,
            _ => {
                log::debug!(
                    "[GA] Final population improved the best length to {:.2}",
                    final_leader.length()
                );
                final_leader.clone()
            }
        };

        Ok(alpha)
    }

    /// Run the genetic algorithm from a fresh random population.
    ///
    /// The mating pool is resolved against each generation's population, so a
    /// fractional pool shrinks the population geometrically. Once a pool holds
    /// fewer than two routes the next population is empty, and the run ends
    /// with [`ValidationError::EmptyPopulation`] instead of a route.
    pub fn run(&mut self) -> Result<Route, ValidationError> {
        let start = std::time::Instant::now();

        let population = self.initialize_population()?;
        let best = self.evolve(population)?;

        log::debug!(
            "[GA] Finished {} generations in {:.2}s, best length {:.2}",
            self.config.generations,
            start.elapsed().as_secs_f64(),
            best.length()
        );
        Ok(best)
    }

    fn report(&self, generation: usize, best: &Route) {
        let level = if self.config.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "After {} generations the best route's length is: {:.2} and it passes through the following cities: {:?}. Mutation probability: {:.2}%",
            generation,
            best.length(),
            best.sequence(),
            best.mutation_proba() * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_instance() -> Arc<CityTable> {
        let points = vec![
            (50.0, 50.0),
            (12.0, 88.0),
            (91.0, 17.0),
            (33.0, 4.0),
            (72.0, 96.0),
            (8.0, 41.0),
        ];
        Arc::new(CityTable::from_coordinates("five", &points).unwrap())
    }

    fn grid_instance() -> Arc<CityTable> {
        let mut points = vec![(0.0, 0.0)];
        for i in 0..12 {
            points.push(((i % 4) as f64 * 10.0 + 3.0, (i / 4) as f64 * 10.0 + 7.0));
        }
        Arc::new(CityTable::from_coordinates("grid", &points).unwrap())
    }

    fn small_config(generations: usize) -> GAConfig {
        GAConfig {
            precursors: 20,
            selection_size: SelectionSize::Count(5),
            generations,
            mutation_proba: 0.1,
            mutation_dimming: 0.9,
            seed: 42,
            verbose: false,
        }
    }

    fn assert_covers(route: &Route, instance: &CityTable) {
        let mut sorted = route.sequence().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, instance.all_cities().into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_genetic_algorithm() {
        let instance = create_test_instance();
        let mut ga = GeneticAlgorithm::new(Arc::clone(&instance), small_config(10)).unwrap();

        let population = ga.initialize_population().unwrap();
        assert_eq!(population.len(), 20);
        let mean = population.iter().map(Route::length).sum::<f64>() / population.len() as f64;

        let best = ga.evolve(population).unwrap();
        assert_covers(&best, &instance);
        assert!(best.length() < mean, "{} !< {}", best.length(), mean);
        assert_eq!(ga.history().len(), 10);
    }

    #[test]
    fn test_run_is_reproducible() {
        let instance = grid_instance();
        let a = GeneticAlgorithm::new(Arc::clone(&instance), small_config(8))
            .unwrap()
            .run()
            .unwrap();
        let b = GeneticAlgorithm::new(Arc::clone(&instance), small_config(8))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(a.sequence(), b.sequence());
        assert_eq!(a.length(), b.length());
    }

    #[test]
    fn test_more_generations_never_hurt() {
        let instance = grid_instance();
        let mut previous = f64::INFINITY;

        for generations in 0..8 {
            let mut ga =
                GeneticAlgorithm::new(Arc::clone(&instance), small_config(generations)).unwrap();
            let length = ga.run().unwrap().length();
            assert!(
                length <= previous,
                "{} generations gave {}, fewer gave {}",
                generations,
                length,
                previous
            );
            previous = length;
        }
    }

    #[test]
    fn test_zero_generations_returns_best_precursor() {
        let instance = grid_instance();
        let mut ga = GeneticAlgorithm::new(Arc::clone(&instance), small_config(0)).unwrap();

        let population = ga.initialize_population().unwrap();
        let shortest = population
            .iter()
            .map(Route::length)
            .fold(f64::INFINITY, f64::min);

        let best = ga.evolve(population).unwrap();
        assert_eq!(best.length(), shortest);
        assert!(ga.history().is_empty());
    }

    #[test]
    fn test_history_tracks_running_best() {
        let instance = grid_instance();
        let mut ga = GeneticAlgorithm::new(Arc::clone(&instance), small_config(10)).unwrap();
        let best = ga.run().unwrap();

        let history = ga.history();
        assert!(history[0].improved);
        assert_eq!(history[0].population_size, 20);
        assert_eq!(history[1].population_size, 10);
        for pair in history.windows(2) {
            assert!(pair[1].best_length <= pair[0].best_length);
            assert!(pair[1].best_length <= pair[1].generation_best);
        }
        assert!(best.length() <= history[history.len() - 1].best_length);
    }

    #[test]
    fn test_mutation_is_dimmed_each_generation() {
        let instance = grid_instance();
        let mut ga = GeneticAlgorithm::new(Arc::clone(&instance), small_config(3)).unwrap();
        let population = ga.initialize_population().unwrap();

        let best = ga.evolve(population).unwrap();
        let p = best.mutation_proba();
        let allowed = [0.1, 0.1 * 0.9, 0.1 * 0.81, 0.1 * 0.729];
        assert!(allowed.iter().any(|a| (a - p).abs() < 1e-12), "unexpected {}", p);
    }

    #[test]
    fn test_undersized_mating_pool_empties_population() {
        let instance = grid_instance();
        let config = GAConfig {
            selection_size: SelectionSize::Count(1),
            generations: 1,
            ..small_config(1)
        };
        let mut ga = GeneticAlgorithm::new(instance, config).unwrap();

        assert_eq!(ga.run().unwrap_err(), ValidationError::EmptyPopulation);
        assert_eq!(ga.history().len(), 1);
    }

    #[test]
    fn test_fractional_selection() {
        let instance = create_test_instance();
        let config = GAConfig {
            selection_size: SelectionSize::Fraction(0.25),
            generations: 2,
            ..small_config(4)
        };
        let mut ga = GeneticAlgorithm::new(Arc::clone(&instance), config).unwrap();
        let best = ga.run().unwrap();

        assert_covers(&best, &instance);
        // 25% of 20 is 5 parents, so C(5, 2) = 10 children.
        let sizes: Vec<usize> = ga.history().iter().map(|r| r.population_size).collect();
        assert_eq!(sizes, vec![20, 10]);
    }

    #[test]
    fn test_fractional_selection_shrinks_to_empty() {
        let instance = create_test_instance();
        let config = GAConfig {
            selection_size: SelectionSize::Fraction(0.25),
            generations: 4,
            ..small_config(4)
        };
        let mut ga = GeneticAlgorithm::new(instance, config).unwrap();

        // 20 -> C(5, 2) = 10 -> C(2, 2) = 1 -> 25% of 1 is 0 parents.
        assert_eq!(ga.run().unwrap_err(), ValidationError::EmptyPopulation);
        let sizes: Vec<usize> = ga.history().iter().map(|r| r.population_size).collect();
        assert_eq!(sizes, vec![20, 10, 1]);
    }

    #[test]
    fn test_config_validation() {
        let instance = create_test_instance();
        let bad_dimming = GAConfig {
            mutation_dimming: 1.2,
            ..GAConfig::default()
        };
        assert!(matches!(
            GeneticAlgorithm::new(Arc::clone(&instance), bad_dimming),
            Err(ValidationError::Parameter { .. })
        ));

        let bad_fraction = GAConfig {
            selection_size: SelectionSize::Fraction(1.5),
            ..GAConfig::default()
        };
        assert!(matches!(
            GeneticAlgorithm::new(Arc::clone(&instance), bad_fraction),
            Err(ValidationError::SelectionFraction(_))
        ));

        assert!(GAConfig::default().validate().is_ok());
    }
}
