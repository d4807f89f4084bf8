//! Benchmarking module.
//!
//! Runs the genetic search over several seeds on one city table, collects
//! per-run results and aggregates them into summary statistics.

use crate::error::ValidationError;
use crate::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use crate::instance::CityTable;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Result of a single seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Table name
    pub table: String,
    /// Number of cities (excluding the depot)
    pub num_cities: usize,
    /// Seed of the run
    pub seed: u64,
    /// Best tour length
    pub length: f64,
    /// Number of generations that improved the best length
    pub improvements: usize,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics over all runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub table: String,
    pub num_runs: usize,
    pub best_length: f64,
    pub worst_length: f64,
    pub mean_length: f64,
    /// Sample standard deviation; 0 for a single run
    pub std_length: f64,
    pub mean_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs, seeded `base_seed`, `base_seed + 1`, ...
    pub num_runs: usize,
    pub base_seed: u64,
    /// Configuration shared by every run (its seed is overridden)
    pub ga: GAConfig,
    /// Show a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 0,
            ga: GAConfig::default(),
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run every seed on `instance` in parallel and record the results
    pub fn run(&mut self, instance: &Arc<CityTable>) -> Result<(), ValidationError> {
        log::info!(
            "Running {} seeds on table: {}",
            self.config.num_runs,
            instance.name
        );

        let bar = if self.config.show_progress {
            let bar = ProgressBar::new(self.config.num_runs as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} runs ({elapsed})") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let shared = &self.config;
        let results = (0..shared.num_runs)
            .into_par_iter()
            .map(|offset| -> Result<RunResult, ValidationError> {
                let seed = shared.base_seed + offset as u64;
                let config = GAConfig {
                    seed,
                    verbose: false,
                    ..shared.ga.clone()
                };

                let start = Instant::now();
                let mut ga = GeneticAlgorithm::new(Arc::clone(instance), config)?;
                let best = ga.run()?;
                let time = start.elapsed().as_secs_f64();
                bar.inc(1);

                Ok(RunResult {
                    table: instance.name.clone(),
                    num_cities: instance.num_cities(),
                    seed,
                    length: best.length(),
                    improvements: ga.history().iter().filter(|r| r.improved).count(),
                    time,
                })
            })
            .collect::<Result<Vec<_>, _>>();

        bar.finish_and_clear();
        self.results.extend(results?);
        Ok(())
    }

    /// Compute statistics over the recorded runs
    pub fn compute_statistics(&self) -> Option<RunStatistics> {
        if self.results.is_empty() {
            return None;
        }

        let lengths: Vec<f64> = self.results.iter().map(|r| r.length).collect();
        let times: Vec<f64> = self.results.iter().map(|r| r.time).collect();

        let std_length = if lengths.len() > 1 {
            lengths.iter().std_dev()
        } else {
            0.0
        };

        Some(RunStatistics {
            table: self.results[0].table.clone(),
            num_runs: self.results.len(),
            best_length: lengths.iter().cloned().fold(f64::INFINITY, f64::min),
            worst_length: lengths.iter().cloned().fold(0.0, f64::max),
            mean_length: lengths.iter().mean(),
            std_length,
            mean_time: times.iter().mean(),
            total_time: times.iter().sum(),
        })
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        if let Some(stats) = self.compute_statistics() {
            writer.serialize(stats)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     Route Search Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str(&format!(
            "{:<8} {:>12} {:>14} {:>10}\n",
            "Seed", "Length", "Improvements", "Time"
        ));
        report.push_str("-".repeat(48).as_str());
        report.push('\n');

        for result in &self.results {
            report.push_str(&format!(
                "{:<8} {:>12.2} {:>14} {:>10.4}\n",
                result.seed, result.length, result.improvements, result.time
            ));
        }

        report.push_str("-".repeat(48).as_str());
        report.push('\n');

        if let Some(stats) = self.compute_statistics() {
            report.push_str(&format!("\nTable: {} ({} runs)\n", stats.table, stats.num_runs));
            report.push_str(&format!("  Best length:  {:.2}\n", stats.best_length));
            report.push_str(&format!("  Worst length: {:.2}\n", stats.worst_length));
            report.push_str(&format!(
                "  Mean length:  {:.2} (std {:.2})\n",
                stats.mean_length, stats.std_length
            ));
            report.push_str(&format!("  Mean time:    {:.4}s\n", stats.mean_time));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::selection::SelectionSize;

    fn create_test_instance() -> Arc<CityTable> {
        let points = vec![
            (0.0, 0.0),
            (10.0, 3.0),
            (4.0, 9.0),
            (7.0, 7.0),
            (2.0, 1.0),
            (9.0, 9.0),
            (5.0, 2.0),
        ];
        Arc::new(CityTable::from_coordinates("bench", &points).unwrap())
    }

    fn quick_config(num_runs: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs,
            base_seed: 3,
            ga: GAConfig {
                precursors: 20,
                selection_size: SelectionSize::Count(5),
                generations: 5,
                ..GAConfig::default()
            },
            show_progress: false,
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
    }

    #[test]
    fn test_benchmark_runs_every_seed() {
        let instance = create_test_instance();
        let mut benchmark = Benchmark::new(quick_config(4));
        benchmark.run(&instance).unwrap();

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![3, 4, 5, 6]);

        let stats = benchmark.compute_statistics().unwrap();
        assert_eq!(stats.num_runs, 4);
        assert!(stats.best_length <= stats.mean_length);
        assert!(stats.mean_length <= stats.worst_length);
        assert!(stats.std_length >= 0.0);
        assert!(benchmark.generate_report().contains("Table: bench (4 runs)"));
    }

    #[test]
    fn test_benchmark_matches_single_run() {
        let instance = create_test_instance();
        let mut benchmark = Benchmark::new(quick_config(1));
        benchmark.run(&instance).unwrap();

        let config = GAConfig {
            seed: 3,
            ..quick_config(1).ga
        };
        let best = GeneticAlgorithm::new(Arc::clone(&instance), config)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(benchmark.results()[0].length, best.length());
        assert_eq!(benchmark.compute_statistics().unwrap().std_length, 0.0);
    }

    #[test]
    fn test_benchmark_propagates_validation_errors() {
        let instance = create_test_instance();
        let mut config = quick_config(2);
        config.ga.selection_size = SelectionSize::Count(1);

        let mut benchmark = Benchmark::new(config);
        assert_eq!(
            benchmark.run(&instance).unwrap_err(),
            ValidationError::EmptyPopulation
        );
        assert!(benchmark.compute_statistics().is_none());
    }
}
