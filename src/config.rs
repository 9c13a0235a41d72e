use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::charts::figure::Marker;
use crate::color;

// ---------------------------------------------------------------------------
// Plot configuration
// ---------------------------------------------------------------------------

/// Everything the chart builders need besides the data: which algorithms
/// exist and how they are drawn, which one each experiment compares against,
/// and the parameter sweeps to plot. Read once and passed by reference; no
/// builder mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub algorithms: Vec<AlgorithmStyle>,
    /// Algorithms left out of most charts.
    pub ignore: Vec<String>,
    /// Algorithm whose speedup over the others is reported by `workload`.
    pub test_algorithm: String,
    pub baselines: Baselines,
    pub max_keys: BTreeMap<String, i64>,
    pub workload: Workload,
    /// Thread counts swept by the speedup charts.
    pub thread_counts: Vec<i64>,
    /// Update rates swept by the latency chart.
    pub latency_update_rates: Vec<i64>,
    pub extremes: Vec<ExtremeCase>,
    /// Thread count the extreme-workload bar chart is read at.
    pub extremes_threads: i64,
    pub macrobench: Macrobench,
    pub relaxation: Relaxation,
    pub reclamation: Reclamation,
    pub ubundle: UbundleComparison,
    /// Output size in pixels.
    pub figure_size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStyle {
    /// Suffix in the `list` column (`<dataset>-<key>`).
    pub key: String,
    pub label: String,
    /// `#rrggbb`.
    pub color: String,
    #[serde(default)]
    pub marker: Marker,
    /// Value of the `rqalg` column in macrobenchmark tables.
    #[serde(default)]
    pub macrobench: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baselines {
    pub rq_sizes: String,
    pub update_rates: String,
    pub macrobench: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workload {
    pub update_rates: Vec<i64>,
    pub rq_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeCase {
    pub update_rate: f64,
    pub algorithms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macrobench {
    /// Directory under the benchmark root holding `data.csv`.
    pub dir: String,
    /// Values of the `datastructure` column to plot.
    pub datasets: Vec<String>,
}

/// A named run directory compared against the others, e.g. one relaxation
/// setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub key: String,
    pub label: String,
    /// Algorithm suffix its rows are recorded under.
    #[serde(default = "default_variant_algorithm")]
    pub algorithm: String,
}

fn default_variant_algorithm() -> String {
    "lbundle".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relaxation {
    /// The first variant is the baseline.
    pub variants: Vec<Variant>,
    pub thread_counts: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reclamation {
    /// Run directory without memory reclamation, relative to `data/`.
    pub nofree_dir: String,
    /// Directory holding one run directory per delay, relative to `data/`.
    pub free_dir: String,
    pub delays: Vec<String>,
    pub update_rates: Vec<f64>,
}

/// Unsafe bundles against their linearizable counterpart, read from the
/// same update-rate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UbundleComparison {
    pub algorithm: String,
    pub baseline: String,
    pub thread_counts: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn algorithm(key: &str, label: &str, color: &str, marker: Marker, macrobench: &str) -> AlgorithmStyle {
    AlgorithmStyle {
        key: key.to_string(),
        label: label.to_string(),
        color: color.to_string(),
        marker,
        macrobench: macrobench.to_string(),
    }
}

fn variant(key: &str, label: &str, algorithm: &str) -> Variant {
    Variant {
        key: key.to_string(),
        label: label.to_string(),
        algorithm: algorithm.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![
                algorithm("unsafe", "Unsafe", "#7f7f7f", Marker::Circle, "RQ_UNSAFE"),
                algorithm("rlu", "RLU", "#1f77b4", Marker::Square, "RQ_RLU"),
                algorithm("lockfree", "EBR-RQ", "#2ca02c", Marker::TriangleUp, "RQ_LOCKFREE"),
                algorithm("lbundle", "Bundle", "#d62728", Marker::Cross, "RQ_BUNDLE"),
                algorithm("ubundle", "Bundle (unsafe)", "#ff7f0e", Marker::Circle, "RQ_UBUNDLE"),
            ],
            ignore: strings(&["ubundle"]),
            test_algorithm: "rlu".to_string(),
            baselines: Baselines::default(),
            max_keys: [("lazylist", 10_000), ("skiplistlock", 100_000), ("citrus", 100_000)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            workload: Workload::default(),
            thread_counts: vec![24, 48, 96, 144, 192],
            latency_update_rates: vec![0, 5, 25, 45, 50],
            extremes: vec![
                ExtremeCase {
                    update_rate: 0.0,
                    algorithms: strings(&["unsafe", "rlu", "lbundle"]),
                },
                ExtremeCase {
                    update_rate: 100.0,
                    algorithms: strings(&["unsafe", "lockfree", "lbundle"]),
                },
            ],
            extremes_threads: 96,
            macrobench: Macrobench::default(),
            relaxation: Relaxation::default(),
            reclamation: Reclamation::default(),
            ubundle: UbundleComparison::default(),
            figure_size: (1400, 800),
        }
    }
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            rq_sizes: "unsafe".to_string(),
            update_rates: "lbundle".to_string(),
            macrobench: "unsafe".to_string(),
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            update_rates: vec![0, 2, 10, 50, 90, 100],
            rq_rate: 50,
        }
    }
}

impl Default for Macrobench {
    fn default() -> Self {
        Self {
            dir: "macrobench/rq100".to_string(),
            datasets: strings(&["SKIPLISTLOCK", "CITRUS"]),
        }
    }
}

impl Default for Relaxation {
    fn default() -> Self {
        Self {
            variants: vec![
                variant("relax1", "Relax 1", "lbundle"),
                variant("relax10", "Relax 10", "lbundle"),
                variant("relax100", "Relax 100", "lbundle"),
                variant("ubundle", "Unsafe bundle", "ubundle"),
            ],
            thread_counts: vec![96],
        }
    }
}

impl Default for Reclamation {
    fn default() -> Self {
        Self {
            nofree_dir: "nofree".to_string(),
            free_dir: "free".to_string(),
            delays: strings(&["0", "100", "1000"]),
            update_rates: vec![0.0, 10.0, 50.0, 90.0, 100.0],
        }
    }
}

impl Default for UbundleComparison {
    fn default() -> Self {
        Self {
            algorithm: "ubundle".to_string(),
            baseline: "lbundle".to_string(),
            thread_counts: vec![1, 48, 96, 144, 192],
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and lookups
// ---------------------------------------------------------------------------

impl PlotConfig {
    /// Read a JSON configuration; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading plot config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing plot config {}", path.display()))
    }

    /// Algorithms not in the `ignore` list, in configuration order.
    pub fn plotted(&self) -> impl Iterator<Item = &AlgorithmStyle> {
        self.algorithms.iter().filter(|a| !self.ignore.contains(&a.key))
    }

    pub fn algorithm(&self, key: &str) -> Result<&AlgorithmStyle> {
        self.algorithms
            .iter()
            .find(|a| a.key == key)
            .with_context(|| format!("algorithm '{key}' is not configured"))
    }

    pub fn max_key(&self, dataset: &str) -> Result<i64> {
        self.max_keys
            .get(dataset)
            .copied()
            .with_context(|| format!("no max_key configured for dataset '{dataset}'"))
    }
}

impl AlgorithmStyle {
    /// Parsed [`color`](Self::color); grey when it is not a valid hex code.
    pub fn color32(&self) -> Color32 {
        color::parse_hex(&self.color).unwrap_or_else(|| {
            log::warn!("invalid color '{}' for {}", self.color, self.key);
            Color32::GRAY
        })
    }
}
