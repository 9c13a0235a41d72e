//! Chart builders: one function per experiment, each turning results tables
//! into a [`Figure`] through [`query`](crate::data::query) and
//! [`ratio`](crate::data::ratio).
//!
//! Builders only read from the [`ChartContext`]; a failing builder affects its
//! own figure and nothing else.

pub mod figure;
pub mod speedup;
pub mod throughput;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Experiment;
use crate::config::PlotConfig;
use crate::data::{ResultsTable, TableStore};

pub use figure::{ChartKind, Figure, Marker, Trace};

/// Shared, read-only inputs of every builder.
pub struct ChartContext<'a> {
    pub store: &'a TableStore,
    /// Benchmark root; per-experiment tables live under `<root>/data`.
    pub root: &'a Path,
    pub trials: u32,
    pub config: &'a PlotConfig,
}

impl ChartContext<'_> {
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Resolve and load `directory/<dataset>.csv`, generating it if needed.
    pub fn open(&self, directory: &Path, dataset: &str) -> Result<ResultsTable> {
        self.store
            .open(directory, dataset, self.trials)
            .with_context(|| format!("loading results for {dataset} from {}", directory.display()))
    }
}

/// Value of the `list` column identifying one algorithm on one data structure.
pub fn list_value(dataset: &str, algorithm: &str) -> String {
    format!("{dataset}-{algorithm}")
}

/// Build every figure of `experiment`. Each entry carries a short description
/// so a failure can be reported without aborting the others.
pub fn build(experiment: Experiment, ctx: &ChartContext<'_>, datasets: &[String]) -> Vec<(String, Result<Figure>)> {
    let config = ctx.config;
    match experiment {
        Experiment::Workload => datasets
            .iter()
            .flat_map(|ds| {
                config.workload.update_rates.iter().map(move |&u| {
                    (
                        format!("workload {ds} u={u}"),
                        throughput::workload(ctx, ds, u, config.workload.rq_rate),
                    )
                })
            })
            .collect(),
        Experiment::RqSizes => datasets
            .iter()
            .map(|ds| (format!("rq-sizes {ds}"), speedup::rq_sizes(ctx, ds)))
            .collect(),
        Experiment::UpdateRates => datasets
            .iter()
            .map(|ds| (format!("update-rates {ds}"), speedup::update_rates(ctx, ds)))
            .collect(),
        Experiment::Latency => datasets
            .iter()
            .map(|ds| (format!("latency {ds}"), throughput::latency(ctx, ds)))
            .collect(),
        Experiment::Extremes => datasets
            .iter()
            .map(|ds| (format!("extremes {ds}"), throughput::extremes(ctx, ds)))
            .collect(),
        Experiment::ExtremesBars => datasets
            .iter()
            .map(|ds| (format!("extremes-bars {ds}"), throughput::extremes_bars(ctx, ds)))
            .collect(),
        Experiment::Macrobench => config
            .macrobench
            .datasets
            .iter()
            .map(|ds| (format!("macrobench {ds}"), throughput::macrobench(ctx, ds)))
            .collect(),
        Experiment::Relaxation => datasets
            .iter()
            .map(|ds| (format!("relaxation {ds}"), speedup::relaxation(ctx, ds)))
            .collect(),
        Experiment::Reclamation => datasets
            .iter()
            .map(|ds| (format!("reclamation {ds}"), speedup::reclamation(ctx, ds)))
            .collect(),
        Experiment::Ubundle => datasets
            .iter()
            .map(|ds| (format!("ubundle {ds}"), speedup::ubundle(ctx, ds)))
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture tables shared by the builder tests.

    use tempfile::TempDir;

    use crate::config::PlotConfig;
    use crate::data::{CommandGenerator, TableStore};

    /// A benchmark root with a store whose generator can never run, so every
    /// table must already be on disk.
    pub struct Fixture {
        pub root: TempDir,
        pub store: TableStore,
        pub config: PlotConfig,
    }

    impl Fixture {
        pub fn new() -> Self {
            let root = TempDir::new().unwrap();
            let store = TableStore::new(CommandGenerator::new(root.path().join("missing-generator")));
            Fixture {
                root,
                store,
                config: PlotConfig::default(),
            }
        }

        /// Write `<root>/<relative>` with `header` and `rows`, creating parents.
        pub fn write(&self, relative: &str, header: &str, rows: &[String]) {
            let path = self.root.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            let mut body = format!("{header}\n");
            for row in rows {
                body.push_str(row);
                body.push('\n');
            }
            std::fs::write(path, body).unwrap();
        }

        pub fn ctx(&self) -> super::ChartContext<'_> {
            super::ChartContext {
                store: &self.store,
                root: self.root.path(),
                trials: 1,
                config: &self.config,
            }
        }
    }
}
