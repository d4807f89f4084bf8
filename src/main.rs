//! Santa Route GA - Command Line Interface
//!
//! Genetic search for a short depot-anchored tour through a table of cities.

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use santa_route_ga::benchmark::{Benchmark, BenchmarkConfig};
use santa_route_ga::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use santa_route_ga::heuristics::selection::SelectionSize;
use santa_route_ga::instance::CityTable;
use santa_route_ga::solution::{export_history_csv, Solution};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "santa-route-ga")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Genetic search for short depot-anchored tours")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a route through the cities
    Solve {
        /// City table (CityId,X,Y); generated when missing
        #[arg(short, long, default_value = "cities.csv")]
        cities: PathBuf,

        /// Number of random points generated when the table is missing
        #[arg(long, default_value = "10")]
        fallback_cities: usize,

        #[command(flatten)]
        ga: GaArgs,

        /// Output solution to file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output per-generation history to file (CSV)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Report every improvement
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a random city table
    Generate {
        /// Output CSV file
        #[arg(short, long, default_value = "cities.csv")]
        output: PathBuf,

        /// Number of points, depot included
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Lower coordinate bound
        #[arg(long, default_value = "0")]
        low: f64,

        /// Upper coordinate bound
        #[arg(long, default_value = "100")]
        high: f64,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Analyze a city table
    Analyze {
        /// City table (CityId,X,Y)
        #[arg(short, long)]
        cities: PathBuf,
    },

    /// Run several seeds and compare them
    Benchmark {
        /// City table (CityId,X,Y); generated when missing
        #[arg(short, long, default_value = "cities.csv")]
        cities: PathBuf,

        /// Number of random points generated when the table is missing
        #[arg(long, default_value = "10")]
        fallback_cities: usize,

        /// Number of seeded runs
        #[arg(short, long, default_value = "5")]
        runs: usize,

        #[command(flatten)]
        ga: GaArgs,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

#[derive(Args, Clone, Debug)]
struct GaArgs {
    /// Size of the initial random population
    #[arg(short, long, default_value = "200")]
    precursors: usize,

    /// Mating pool size: a count ("20") or a fraction of the population ("0.1")
    #[arg(long, default_value = "20")]
    chosen_size: SelectionSize,

    /// Number of generations
    #[arg(short, long, default_value = "500")]
    generations: usize,

    /// Initial per-position swap probability
    #[arg(long, default_value = "0.1")]
    mutation_proba: f64,

    /// Factor applied to the mutation probability every generation
    #[arg(long, default_value = "0.9")]
    mutation_dimming: f64,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

impl GaArgs {
    fn to_config(&self, verbose: bool) -> GAConfig {
        GAConfig {
            precursors: self.precursors,
            selection_size: self.chosen_size,
            generations: self.generations,
            mutation_proba: self.mutation_proba,
            mutation_dimming: self.mutation_dimming,
            seed: self.seed,
            verbose,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { cities, fallback_cities, ga, output, history, verbose } => {
            solve(&cities, fallback_cities, &ga, output, history, verbose);
        }

        Commands::Generate { output, count, low, high, seed } => {
            generate(&output, count, low, high, seed);
        }

        Commands::Analyze { cities } => {
            analyze(&cities);
        }

        Commands::Benchmark { cities, fallback_cities, runs, ga, output } => {
            run_benchmark(&cities, fallback_cities, runs, &ga, &output);
        }
    }
}

/// Load the table, generating it with the run's seed when it does not exist
fn load_table(path: &Path, fallback_cities: usize, seed: u64) -> Arc<CityTable> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    match CityTable::load_or_synthesize(path, fallback_cities, &mut rng) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            eprintln!("Error loading cities: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve(
    path: &Path,
    fallback_cities: usize,
    ga: &GaArgs,
    output: Option<PathBuf>,
    history: Option<PathBuf>,
    verbose: bool,
) {
    let instance = load_table(path, fallback_cities, ga.seed);

    if verbose {
        println!("{}", instance.statistics());
    }

    let config = ga.to_config(verbose);
    println!(
        "Evolving {} precursors for {} generations (mating pool: {})...",
        config.precursors, config.generations, config.selection_size
    );
    let start = Instant::now();

    let mut algorithm = match GeneticAlgorithm::new(Arc::clone(&instance), config.clone()) {
        Ok(algorithm) => algorithm,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let best = match algorithm.run() {
        Ok(best) => best,
        Err(e) => {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut solution =
        Solution::from_route(&best, "GeneticAlgorithm", config.seed, config.generations);
    solution.computation_time = start.elapsed().as_secs_f64();

    println!("\n========== Results ==========");
    print!("{}", solution);

    if let Some(out_path) = output {
        match solution.save_json(&out_path) {
            Ok(()) => println!("\nSolution saved to {:?}", out_path),
            Err(e) => {
                eprintln!("Failed to write solution: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Some(history_path) = history {
        match export_history_csv(algorithm.history(), &history_path) {
            Ok(()) => println!("History saved to {:?}", history_path),
            Err(e) => {
                eprintln!("Failed to write history: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn generate(output: &Path, count: usize, low: f64, high: f64, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let name = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "cities".to_string());

    let result = CityTable::synthesize(&name, count, low, high, &mut rng)
        .and_then(|table| table.write_csv(output));

    match result {
        Ok(()) => println!("Generated {} points in {:?}", count, output),
        Err(e) => {
            eprintln!("Error generating cities: {}", e);
            std::process::exit(1);
        }
    }
}

fn analyze(path: &Path) {
    let instance = match CityTable::from_csv(path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error loading cities: {}", e);
            std::process::exit(1);
        }
    };

    println!("========== Table Analysis ==========\n");
    println!("{}", instance.statistics());

    let identity: Vec<usize> = (1..instance.len()).collect();
    let reversed: Vec<usize> = identity.iter().rev().copied().collect();

    println!("Reference tours:");
    println!("  Ascending ids:  {:.2}", instance.tour_length(&identity));
    println!("  Descending ids: {:.2}", instance.tour_length(&reversed));
}

fn run_benchmark(path: &Path, fallback_cities: usize, runs: usize, ga: &GaArgs, output: &Path) {
    let instance = load_table(path, fallback_cities, ga.seed);

    if let Err(e) = std::fs::create_dir_all(output) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    let config = BenchmarkConfig {
        num_runs: runs,
        base_seed: ga.seed,
        ga: ga.to_config(false),
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);
    if let Err(e) = benchmark.run(&instance) {
        eprintln!("Benchmark failed: {}", e);
        std::process::exit(1);
    }

    let results_path = output.join("results.csv");
    let stats_path = output.join("statistics.csv");
    let exported = benchmark
        .export_to_csv(&results_path)
        .and_then(|()| benchmark.export_statistics_csv(&stats_path));
    if let Err(e) = exported {
        eprintln!("Failed to export results: {}", e);
        std::process::exit(1);
    }
    println!("Results exported to {:?}", results_path);
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    match std::fs::write(&report_path, &report) {
        Ok(()) => println!("Report saved to {:?}", report_path),
        Err(e) => eprintln!("Failed to save report: {}", e),
    }
}
