//! AILS-CVRP Solver - Command Line Interface
//!
//! Adaptive Iterated Local Search for the Capacitated Vehicle Routing Problem.

use ails_cvrp::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use ails_cvrp::config::StoppingCriterion;
use ails_cvrp::visualization::Visualizer;
use ails_cvrp::{Ails, Config, Instance, RunLimits};
use clap::{Parser, Subcommand};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ails-cvrp")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Adaptive Iterated Local Search for the Capacitated Vehicle Routing Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single CVRPLIB instance
    Solve {
        #[arg(short, long)]
        instance: PathBuf,

        /// JSON file with solver parameters (defaults otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Iterations, or seconds with --time
        #[arg(short, long, default_value = "10000")]
        limit: f64,

        /// Interpret the limit as wall-clock seconds
        #[arg(long)]
        time: bool,

        /// Stop once this cost is reached; read from the instance COMMENT when absent
        #[arg(long)]
        optimal: Option<f64>,

        /// Use unrounded Euclidean distances
        #[arg(long)]
        exact_distances: bool,

        /// Write the search result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the best solution in `Route #k:` text form
        #[arg(long)]
        text: Option<PathBuf>,

        /// Write an SVG plot of the best routes
        #[arg(long)]
        svg: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print instance statistics
    Analyze {
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Run several seeds on every instance of a directory
    Benchmark {
        #[arg(short, long)]
        dir: PathBuf,

        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Iterations, or seconds with --time
        #[arg(short, long, default_value = "10000")]
        limit: f64,

        #[arg(long)]
        time: bool,

        /// JSON file with solver parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            config,
            seed,
            limit,
            time,
            optimal,
            exact_distances,
            output,
            text,
            svg,
            verbose,
        } => {
            let outputs = Outputs { json: output, text, svg };
            solve_instance(
                &instance,
                config.as_deref(),
                seed,
                limit,
                time,
                optimal,
                exact_distances,
                outputs,
                verbose,
            );
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }

        Commands::Benchmark { dir, output, runs, limit, time, config } => {
            run_benchmark(&dir, &output, runs, limit, time, config.as_deref());
        }
    }
}

struct Outputs {
    json: Option<PathBuf>,
    text: Option<PathBuf>,
    svg: Option<PathBuf>,
}

fn load_config(path: Option<&Path>, time: bool) -> Config {
    let config = match path {
        Some(p) => match Config::from_json_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if time {
        config.with_stopping_criterion(StoppingCriterion::Time)
    } else {
        config
    }
}

fn load_instance(path: &Path, rounded: bool) -> Instance {
    match Instance::from_file_with(path, rounded) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: &Path,
    config_path: Option<&Path>,
    seed: u64,
    limit: f64,
    time: bool,
    optimal: Option<f64>,
    exact_distances: bool,
    outputs: Outputs,
    verbose: bool,
) {
    println!("Loading instance from {:?}...", path);

    let config = load_config(config_path, time);
    let instance = load_instance(path, !exact_distances).with_knn_limit(config.knn_limit);

    if verbose {
        println!("{}", instance.statistics());
        println!("Configuration: {:?}", config);
    }

    let mut limits = RunLimits::new(limit);
    if let Some(bound) = optimal.or_else(|| instance.best_known()) {
        limits = limits.with_optimal(bound);
    }

    println!(
        "Solving with AILS (seed {}, limit {} {})...",
        seed,
        limit,
        if time { "s" } else { "iterations" }
    );

    let mut ails = match Ails::new(&instance, config, limits, seed) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let result = match ails.search() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            std::process::exit(1);
        }
    };

    let best = ails.best_solution();
    if let Err(msg) = best.audit(&instance, 1e-6 * result.best_cost.max(1.0), true, true) {
        log::warn!("best solution failed the final audit: {}", msg);
    }

    println!("\n========== Results ==========");
    println!("Instance: {}", result.instance);
    println!("Cost: {:.2}", result.best_cost);
    println!("Routes: {}", result.num_routes);
    println!("Feasible: {}", result.feasible);
    if let Some(gap) = result.gap {
        println!("Gap: {:.4}%", gap);
    }
    println!("Iterations: {}", result.iterations);
    println!(
        "Best found at iteration {} ({:.3}s)",
        result.iteration_best, result.time_best
    );
    println!("Time: {:.4}s", result.total_time);
    println!(
        "Convergence: {:.3} (iterations) / {:.3} (time)",
        result.convergence_iteration, result.convergence_time
    );

    if verbose {
        println!("\n{}", best);
    }

    if let Some(out_path) = outputs.json {
        let written = serde_json::to_string_pretty(&result)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&out_path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("\nResult saved to {:?}", out_path),
            Err(e) => eprintln!("Failed to write {:?}: {}", out_path, e),
        }
    }

    if let Some(text_path) = outputs.text {
        match std::fs::write(&text_path, best.to_string()) {
            Ok(()) => println!("Solution saved to {:?}", text_path),
            Err(e) => eprintln!("Failed to write {:?}: {}", text_path, e),
        }
    }

    if let Some(svg_path) = outputs.svg {
        if !instance.has_coordinates {
            eprintln!("Instance has no coordinates, skipping SVG output");
        } else {
            let viz = Visualizer::new();
            let svg = viz.generate_svg(&instance, best);
            match viz.save_svg(&svg, &svg_path) {
                Ok(()) => println!("Plot saved to {:?}", svg_path),
                Err(e) => eprintln!("Failed to write {:?}: {}", svg_path, e),
            }
        }
    }
}

fn analyze_instance(path: &Path) {
    let instance = load_instance(path, true);

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let capacity = instance.capacity as f64;
    let total = instance.total_demand() as f64;
    println!("\nFleet:");
    println!("  Minimum routes: {}", instance.min_routes());
    println!(
        "  Fill ratio at minimum fleet: {:.2}%",
        total / (instance.min_routes().max(1) as f64 * capacity) * 100.0
    );
    if let Some(best) = instance.best_known() {
        println!("  Best known cost: {:.2}", best);
    }
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    runs: usize,
    limit: f64,
    time: bool,
    config_path: Option<&Path>,
) {
    let instances = load_instances_from_dir(dir);
    if instances.is_empty() {
        eprintln!("No .vrp instances found in {:?}", dir);
        std::process::exit(1);
    }
    println!("Found {} instances in {:?}", instances.len(), dir);

    let config = BenchmarkConfig {
        num_runs: runs,
        execution_limit: limit,
        solver: load_config(config_path, time),
        output_dir: output.to_string_lossy().into_owned(),
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);
    benchmark.run_on_instances(&instances);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    match benchmark.save_all() {
        Ok(report_path) => println!("Report saved to {:?}", report_path),
        Err(e) => {
            eprintln!("Failed to save benchmark results: {}", e);
            std::process::exit(1);
        }
    }
}
