//! Solution reporting for finished runs.
//!
//! A [`Solution`] is a plain, serialisable snapshot of the best route a run
//! produced, detached from the shared city table.

use crate::heuristics::genetic::GenerationRecord;
use crate::route::Route;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Best tour found by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of city ids (starting and ending at depot 0)
    pub tour: Vec<usize>,
    /// Total tour length, penalties included
    pub length: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Seed of the run
    pub seed: u64,
    /// Number of generations evolved
    pub generations: usize,
    /// Mutation probability carried by the best route
    pub mutation_proba: f64,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Solution {
    /// Create a solution from a route
    pub fn from_route(route: &Route, algorithm: &str, seed: u64, generations: usize) -> Self {
        Solution {
            tour: route.tour(),
            length: route.length(),
            algorithm: algorithm.to_string(),
            seed,
            generations,
            mutation_proba: route.mutation_proba(),
            computation_time: 0.0,
        }
    }

    /// Cities in visiting order, without the depot
    pub fn cities(&self) -> &[usize] {
        match self.tour.len() {
            0 | 1 => &[],
            n => &self.tour[1..n - 1],
        }
    }

    /// Save as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {:.2}", self.length)?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f, "  Generations: {}", self.generations)?;
        writeln!(f, "  Mutation probability: {:.2}%", self.mutation_proba * 100.0)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

/// Write per-generation records as CSV
pub fn export_history_csv<P: AsRef<Path>>(
    history: &[GenerationRecord],
    path: P,
) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for record in history {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::CityTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn create_route() -> Route {
        let points = vec![(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)];
        let instance = Arc::new(CityTable::from_coordinates("tri", &points).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Route::with_all_cities(instance, 0.05, &mut rng).unwrap()
    }

    #[test]
    fn test_solution_from_route() {
        let route = create_route();
        let sol = Solution::from_route(&route, "GeneticAlgorithm", 42, 10);

        assert_eq!(sol.tour.first(), Some(&0));
        assert_eq!(sol.tour.last(), Some(&0));
        assert_eq!(sol.cities(), route.sequence());
        assert!((sol.length - 12.0).abs() < 1e-10);
        assert!(sol.to_string().contains("Length: 12.00"));
    }

    #[test]
    fn test_solution_json_round_trip() {
        let sol = Solution::from_route(&create_route(), "GeneticAlgorithm", 7, 3);
        let json = serde_json::to_string(&sol).unwrap();
        let back: Solution = serde_json::from_str(&json).unwrap();

        assert_eq!(back.tour, sol.tour);
        assert_eq!(back.seed, 7);
    }

    #[test]
    fn test_export_history_csv() {
        let history = vec![GenerationRecord {
            generation: 0,
            population_size: 20,
            generation_best: 12.5,
            best_length: 12.5,
            mutation_proba: 0.1,
            improved: true,
        }];
        let path = std::env::temp_dir().join(format!(
            "santa-route-ga-history-{}.csv",
            std::process::id()
        ));

        export_history_csv(&history, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("generation,population_size,generation_best"));
        assert_eq!(content.lines().count(), 2);

        std::fs::remove_file(&path).unwrap();
    }
}
