use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Turn benchmark result tables into throughput and speedup charts.
///
/// Missing per-dataset tables are produced by running the generator as
/// `<generator> <directory> <trials> <dataset>`; the generator is waited for
/// without a timeout.
#[derive(Debug, Parser)]
#[command(name = "benchplot", version, about)]
pub struct Cli {
    /// Benchmark root; per-experiment tables live under `<root>/data`.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Trials per configuration, passed to the generator.
    #[arg(long, default_value_t = 3)]
    pub trials: u32,

    /// Program that builds a missing results table.
    #[arg(long, default_value = "./make_csv.sh")]
    pub generator: PathBuf,

    /// JSON plot configuration (algorithms, colours, sweeps).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where `--save-plots` writes SVG files.
    #[arg(long, default_value = "./figures")]
    pub figures_dir: PathBuf,

    /// Write every figure to `--figures-dir` instead of opening the viewer.
    #[arg(long)]
    pub save_plots: bool,

    /// Experiments to plot (repeatable).
    #[arg(long = "experiment", value_enum, default_values_t = [Experiment::Workload, Experiment::Macrobench])]
    pub experiments: Vec<Experiment>,

    /// Data structures to plot (repeatable).
    #[arg(long = "dataset", default_values_t = [String::from("skiplistlock")])]
    pub datasets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Experiment {
    /// Throughput vs. threads for each update rate.
    Workload,
    /// Speedup over the baseline by range-query size.
    RqSizes,
    /// Speedup over the baseline by update rate.
    UpdateRates,
    /// Range-query latency vs. threads.
    Latency,
    /// Read-only and update-only throughput.
    Extremes,
    /// Read-only and update-only throughput at one thread count, as bars.
    ExtremesBars,
    /// Application-level benchmark.
    Macrobench,
    /// Relaxation settings against each other.
    Relaxation,
    /// Cost of memory reclamation delays.
    Reclamation,
    /// Unsafe bundles against linearizable bundles.
    Ubundle,
}
