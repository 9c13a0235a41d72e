//! Write a deterministic synthetic results table in the layout the chart
//! builders read, following the generator contract
//! `generate_sample <directory> <trials> <dataset>` → `<directory>/<dataset>.csv`.
//!
//! Point `benchplot --generator` at this binary to try the tool without a
//! real benchmark run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "generate_sample", about = "Write a synthetic benchmark results table")]
struct Args {
    /// Output directory; `<directory>/<dataset>.csv` is written.
    directory: PathBuf,
    /// Noisy runs averaged into each row.
    trials: u32,
    /// Data structure name, e.g. `lazylist`.
    dataset: String,
}

const ALGORITHMS: [(&str, f64); 5] = [
    ("unsafe", 1.00),
    ("rlu", 0.55),
    ("lockfree", 0.70),
    ("lbundle", 0.85),
    ("ubundle", 0.80),
];
const UPDATE_RATES: [i64; 9] = [0, 2, 5, 10, 25, 45, 50, 90, 100];
const THREADS: [i64; 5] = [24, 48, 96, 144, 192];
const RQ_SIZES: [i64; 6] = [8, 16, 32, 64, 128, 256];
const RQ_RATE: i64 = 50;
const DEFAULT_RQ_SIZE: i64 = 50;

#[derive(Debug, Serialize)]
struct Row {
    list: String,
    max_key: i64,
    u_rate: i64,
    rq_rate: i64,
    rq_size: i64,
    wrk_threads: i64,
    tot_thruput: f64,
    rq_latency: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn max_key(dataset: &str) -> i64 {
    if dataset == "lazylist" {
        10_000
    } else {
        100_000
    }
}

/// Idealised throughput in ops/s: scales sublinearly with threads, drops
/// with the update rate and with the range-query size.
fn model_throughput(factor: f64, threads: i64, u_rate: i64, rq_size: i64) -> f64 {
    let scaling = (threads as f64).powf(0.85);
    let update_cost = 1.0 - 0.4 * u_rate as f64 / 100.0;
    let rq_cost = (DEFAULT_RQ_SIZE as f64 / rq_size as f64).sqrt();
    1.0e5 * factor * scaling * update_cost * rq_cost
}

/// Mean over `trials` runs with 5% multiplicative noise.
fn measure(rng: &mut SimpleRng, expected: f64, trials: u32) -> f64 {
    let trials = trials.max(1);
    let total: f64 = (0..trials).map(|_| expected * rng.gauss(1.0, 0.05).max(0.0)).sum();
    total / f64::from(trials)
}

fn rows(args: &Args) -> Vec<Row> {
    let mut rng = SimpleRng::new(42);
    // Only the range-query size sweep varies rq_size.
    let rq_sizes: &[i64] = if args.directory.ends_with("exp0") {
        &RQ_SIZES
    } else {
        &[DEFAULT_RQ_SIZE]
    };
    let max_key = max_key(&args.dataset);

    let mut out = Vec::new();
    for (algo, factor) in ALGORITHMS {
        for &u_rate in &UPDATE_RATES {
            for &rq_size in rq_sizes {
                for &threads in &THREADS {
                    let thruput = measure(&mut rng, model_throughput(factor, threads, u_rate, rq_size), args.trials);
                    out.push(Row {
                        list: format!("{}-{algo}", args.dataset),
                        max_key,
                        u_rate,
                        rq_rate: RQ_RATE,
                        rq_size,
                        wrk_threads: threads,
                        tot_thruput: thruput.round(),
                        rq_latency: (threads as f64 * 1.0e9 / thruput).round(),
                    });
                }
            }
        }
    }
    out
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("generate_sample=info")).init();
    let args = Args::parse();

    std::fs::create_dir_all(&args.directory)
        .with_context(|| format!("creating {}", args.directory.display()))?;
    let path = args.directory.join(format!("{}.csv", args.dataset));
    let mut writer = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;

    let rows = rows(&args);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().with_context(|| format!("writing {}", path.display()))?;

    log::info!("wrote {} rows ({} trials each) to {}", rows.len(), args.trials, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(directory: &str) -> Args {
        Args {
            directory: PathBuf::from(directory),
            trials: 2,
            dataset: "lazylist".to_string(),
        }
    }

    #[test]
    fn rq_size_only_varies_for_exp0() {
        let swept = rows(&args("data/exp0"));
        let fixed = rows(&args("data/exp1"));
        assert_eq!(swept.len(), fixed.len() * RQ_SIZES.len());
        assert!(fixed.iter().all(|r| r.rq_size == DEFAULT_RQ_SIZE));
        assert!(swept.iter().any(|r| r.rq_size == 256));
    }

    #[test]
    fn output_is_deterministic() {
        let a = rows(&args("data/workloads"));
        let b = rows(&args("data/workloads"));
        assert_eq!(a[7].tot_thruput, b[7].tot_thruput);
        assert_eq!(a[0].list, "lazylist-unsafe");
        assert_eq!(a[0].max_key, 10_000);
    }

    #[test]
    fn more_threads_means_more_throughput() {
        assert!(model_throughput(1.0, 48, 0, 50) > model_throughput(1.0, 24, 0, 50));
        assert!(model_throughput(1.0, 24, 100, 50) < model_throughput(1.0, 24, 0, 50));
    }
}
