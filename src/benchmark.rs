//! Benchmarking and experimentation module for AILS.
//!
//! Runs several seeds per instance, collects per-run results and
//! aggregates them into per-instance statistics.

use crate::ails::Ails;
use crate::config::{Config, RunLimits};
use crate::instance::Instance;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of a single AILS run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Vehicle capacity
    pub capacity: i32,
    /// Seed of the run
    pub seed: u64,
    /// Best cost found
    pub cost: f64,
    /// Routes of the best solution
    pub num_routes: usize,
    /// Whether the best solution is feasible
    pub feasible: bool,
    /// Perturbation iterations performed
    pub iterations: usize,
    /// Iteration of the last improvement
    pub iteration_best: usize,
    /// Seconds until the last improvement
    pub time_best: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to best known (if available)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics over the runs of one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    pub instance: String,
    pub num_runs: usize,
    pub num_feasible: usize,
    pub avg_cost: f64,
    pub best_cost: f64,
    pub worst_cost: f64,
    /// Sample standard deviation, zero for a single run
    pub std_cost: f64,
    pub avg_time: f64,
    pub avg_time_best: f64,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Independent runs per instance
    pub num_runs: usize,
    /// Seed of the first run, the others follow consecutively
    pub first_seed: u64,
    /// Iterations or seconds per run, depending on the stopping criterion
    pub execution_limit: f64,
    /// Solver parameters shared by every run
    pub solver: Config,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
    /// Output directory
    pub output_dir: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            first_seed: 0,
            execution_limit: 10_000.0,
            solver: Config::default(),
            show_progress: true,
            output_dir: "results".to_string(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Set best known solution for an instance
    pub fn set_best_known(&mut self, instance_name: &str, cost: f64) {
        self.best_known.insert(instance_name.to_string(), cost);
    }

    fn optimal_for(&self, instance: &Instance) -> Option<f64> {
        self.best_known
            .get(&instance.name)
            .copied()
            .or_else(|| instance.best_known())
    }

    /// Run every seed on one instance. Seeds run in parallel, each with its
    /// own search state.
    pub fn run_instance(&mut self, instance: &Instance) {
        log::info!(
            "Running {} seeds on instance: {}",
            self.config.num_runs,
            instance.name
        );

        let progress = self.progress_bar(self.config.num_runs as u64);
        progress.set_message(instance.name.clone());
        let mut runs = self.run_seeds(instance, &progress);
        progress.finish_and_clear();

        runs.sort_by_key(|r| r.seed);
        self.results.extend(runs);
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[Instance]) {
        for instance in instances {
            self.run_instance(instance);
        }
    }

    fn run_seeds(&self, instance: &Instance, progress: &ProgressBar) -> Vec<RunResult> {
        let mut limits = RunLimits::new(self.config.execution_limit);
        if let Some(optimal) = self.optimal_for(instance) {
            limits = limits.with_optimal(optimal);
        }
        let instance = instance.clone().with_knn_limit(self.config.solver.knn_limit);
        let first = self.config.first_seed;

        (first..first + self.config.num_runs as u64)
            .into_par_iter()
            .filter_map(|seed| {
                let run = Ails::new(&instance, self.config.solver.clone(), limits, seed)
                    .and_then(|mut ails| ails.search());
                progress.inc(1);
                match run {
                    Ok(result) => Some(RunResult {
                        instance: instance.name.clone(),
                        dimension: instance.dimension,
                        capacity: instance.capacity,
                        seed,
                        cost: result.best_cost,
                        num_routes: result.num_routes,
                        feasible: result.feasible,
                        iterations: result.iterations,
                        iteration_best: result.iteration_best,
                        time_best: result.time_best,
                        time: result.total_time,
                        gap_to_best: result.gap,
                    }),
                    Err(e) => {
                        log::warn!("{} seed {} failed: {}", instance.name, seed, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::with_template("{msg:>12} [{elapsed_precise}] {bar:40} {pos}/{len} runs")
        {
            bar.set_style(style);
        }
        bar
    }

    /// Compute statistics for each instance
    pub fn compute_statistics(&self) -> Vec<BenchmarkStatistics> {
        let mut by_instance: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for result in &self.results {
            by_instance.entry(result.instance.as_str()).or_default().push(result);
        }

        let mut statistics = Vec::new();

        for (name, runs) in by_instance {
            let feasible: Vec<&RunResult> = runs.iter().copied().filter(|r| r.feasible).collect();
            if feasible.is_empty() {
                continue;
            }

            let costs: Vec<f64> = feasible.iter().map(|r| r.cost).collect();
            let times: Vec<f64> = feasible.iter().map(|r| r.time).collect();
            let times_best: Vec<f64> = feasible.iter().map(|r| r.time_best).collect();
            let gaps: Vec<f64> = feasible.iter().filter_map(|r| r.gap_to_best).collect();

            let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };
            let avg_gap = if gaps.is_empty() { None } else { Some(gaps.iter().mean()) };

            statistics.push(BenchmarkStatistics {
                instance: name.to_string(),
                num_runs: runs.len(),
                num_feasible: feasible.len(),
                avg_cost: costs.iter().mean(),
                best_cost: Statistics::min(costs.iter()),
                worst_cost: Statistics::max(costs.iter()),
                std_cost,
                avg_time: times.iter().mean(),
                avg_time_best: times_best.iter().mean(),
                avg_gap,
            });
        }

        statistics
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

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write `runs.csv`, `statistics.csv` and `report.txt` to the output
    /// directory, returning the report path.
    pub fn save_all(&self) -> std::io::Result<PathBuf> {
        let dir = Path::new(&self.config.output_dir);
        std::fs::create_dir_all(dir)?;
        self.export_to_csv(dir.join("runs.csv"))?;
        self.export_statistics_csv(dir.join("statistics.csv"))?;
        let report_path = dir.join("report.txt");
        std::fs::write(&report_path, self.generate_report())?;
        Ok(report_path)
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        AILS CVRP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Runs per instance: {}, limit: {} ({:?})\n\n",
            self.config.num_runs, self.config.execution_limit, self.config.solver.stopping_criterion
        ));

        report.push_str("-".repeat(96).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>9} {:>12} {:>12} {:>12} {:>10} {:>8} {:>9}\n",
            "Instance", "Feasible", "Best", "Avg Cost", "Worst", "Std", "Avg Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(96).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<20} {:>9} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>8} {:>9.2}\n",
                stat.instance,
                format!("{}/{}", stat.num_feasible, stat.num_runs),
                stat.best_cost,
                stat.avg_cost,
                stat.worst_cost,
                stat.std_cost,
                gap_str,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(96).as_str());
        report.push('\n');
        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

/// Load every `*.vrp` instance of a directory, smallest first.
/// Unreadable files are skipped with a warning.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<Instance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "vrp").unwrap_or(false) {
                match Instance::from_file(&path) {
                    Ok(instance) => instances.push(instance),
                    Err(e) => log::warn!("Skipping {:?}: {}", path, e),
                }
            }
        }
    }

    instances.sort_by(|a, b| a.dimension.cmp(&b.dimension).then_with(|| a.name.cmp(&b.name)));
    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_instances;

    fn quick_config(runs: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: runs,
            execution_limit: 20.0,
            show_progress: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
        assert!(config.solver.validate().is_ok());
    }

    #[test]
    fn test_runs_every_seed() {
        let instance = test_instances::scattered(15, 30);
        let mut benchmark = Benchmark::new(quick_config(3));
        benchmark.run_instance(&instance);

        let seeds: Vec<u64> = benchmark.results().iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![0, 1, 2]);
        assert!(benchmark.results().iter().all(|r| r.feasible && r.iterations == 20));
    }

    #[test]
    fn test_statistics_aggregate_runs() {
        let instance = test_instances::scattered(15, 30);
        let mut benchmark = Benchmark::new(quick_config(4));
        benchmark.set_best_known(&instance.name, 1.0);
        benchmark.run_instance(&instance);

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 1);
        let stat = &stats[0];
        assert_eq!(stat.num_runs, 4);
        assert!(stat.best_cost <= stat.avg_cost + 1e-9);
        assert!(stat.avg_cost <= stat.worst_cost + 1e-9);
        assert!(stat.std_cost >= 0.0);
        assert!(stat.avg_gap.is_some());
    }

    #[test]
    fn test_single_run_has_zero_deviation() {
        let instance = test_instances::six_customers();
        let mut benchmark = Benchmark::new(quick_config(1));
        benchmark.run_instance(&instance);
        let stats = benchmark.compute_statistics();
        assert_eq!(stats[0].std_cost, 0.0);
        assert!(stats[0].avg_gap.is_none());
    }

    #[test]
    fn test_report_lists_instances() {
        let instance = test_instances::six_customers();
        let mut benchmark = Benchmark::new(quick_config(2));
        benchmark.run_instance(&instance);
        let report = benchmark.generate_report();
        assert!(report.contains("Benchmark Report"));
        assert!(report.contains(&instance.name));
        assert!(report.contains("2/2"));
    }

    #[test]
    fn test_missing_directory_yields_no_instances() {
        assert!(load_instances_from_dir("/nonexistent/benchmark/dir").is_empty());
    }
}
