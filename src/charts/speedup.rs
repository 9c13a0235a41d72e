//! Relative-throughput charts: every series divided by a baseline measured
//! under the same filter.

use anyhow::{Context, Result};
use eframe::egui::Color32;

use super::{list_value, ChartContext, ChartKind, Figure, Trace};
use crate::color::fade;
use crate::data::{average, query, ratio, Cell, Filter, Ratio, RatioOutcome, ResultsTable, Series, SpeedupSummary};

/// Raw series of one compared variant, one per swept parameter value.
struct Sweep {
    key: String,
    label: String,
    color: Color32,
    runs: Vec<(i64, Series)>,
}

/// A sweep divided by the baseline sweep, parameter by parameter.
struct Speedups<'a> {
    sweep: &'a Sweep,
    ratios: Vec<(i64, Ratio)>,
}

/// Query `x`/`y` once per thread count with `list`, `max_key` and
/// `wrk_threads` fixed.
fn thread_sweep(
    table: &ResultsTable,
    (x, y): (&str, &str),
    list: &str,
    max_key: i64,
    threads: &[i64],
) -> Result<Vec<(i64, Series)>> {
    threads
        .iter()
        .map(|&t| {
            let filter = Filter::new()
                .eq("list", list)
                .eq("max_key", max_key)
                .eq("wrk_threads", t);
            Ok((t, query(table, x, y, &filter)?))
        })
        .collect()
}

/// Divide every non-baseline sweep by the baseline sweep.
fn speedups<'a>(figure: &str, sweeps: &'a [Sweep], baseline: &str) -> Result<Vec<Speedups<'a>>> {
    let base = sweeps
        .iter()
        .find(|s| s.key == baseline)
        .with_context(|| format!("baseline '{baseline}' is not among the compared variants"))?;

    Ok(sweeps
        .iter()
        .filter(|s| s.key != baseline)
        .map(|sweep| {
            let ratios = sweep
                .runs
                .iter()
                .zip(&base.runs)
                .map(|((param, candidate), (_, reference))| {
                    let r = ratio(candidate, reference);
                    if r.is_fallback() {
                        log::warn!(
                            "{figure}: {} at {param} does not line up with {baseline}; plotted as zeros",
                            sweep.key
                        );
                    }
                    (*param, r)
                })
                .collect();
            Speedups { sweep, ratios }
        })
        .collect())
}

/// One bar trace per (variant, parameter); later parameters fade out.
fn push_fading_bars(fig: &mut Figure, speedups: &[Speedups<'_>], label: impl Fn(&Sweep, i64) -> String) {
    for s in speedups {
        let n = s.ratios.len();
        for (i, (param, r)) in s.ratios.iter().enumerate() {
            fig.push(
                Trace::new(label(s.sweep, *param), r.series.clone())
                    .color(s.sweep.color)
                    .opacity(fade(i, n)),
            );
        }
    }
}

/// Sweeps of every plotted algorithm over the configured thread counts.
fn algorithm_sweeps(ctx: &ChartContext<'_>, table: &ResultsTable, x: &str, dataset: &str) -> Result<Vec<Sweep>> {
    let max_key = ctx.config.max_key(dataset)?;
    ctx.config
        .plotted()
        .map(|algo| {
            Ok(Sweep {
                key: algo.key.clone(),
                label: algo.label.clone(),
                color: algo.color32(),
                runs: thread_sweep(
                    table,
                    (x, "tot_thruput"),
                    &list_value(dataset, &algo.key),
                    max_key,
                    &ctx.config.thread_counts,
                )?,
            })
        })
        .collect()
}

/// Throughput relative to the baseline as the range-query size grows.
pub fn rq_sizes(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("exp0"), dataset)?;
    let sweeps = algorithm_sweeps(ctx, &table, "rq_size", dataset)?;

    let name = format!("rqsize_{dataset}");
    let ratios = speedups(&name, &sweeps, &ctx.config.baselines.rq_sizes)?;

    let mut fig = Figure::new(name, ChartKind::GroupedBars)
        .title(format!("{dataset}: throughput relative to {}", ctx.config.baselines.rq_sizes))
        .axes("Range Query Size", "Rel. Throughput")
        .reference_line(1.0)
        .size(ctx.config.figure_size);
    push_fading_bars(&mut fig, &ratios, |s, t| format!("{} (n={t})", s.label));
    Ok(fig)
}

/// Throughput relative to the baseline as the update rate grows, with a
/// per-algorithm average/maximum summary over thread counts in the log.
pub fn update_rates(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("exp1"), dataset)?;
    let sweeps = algorithm_sweeps(ctx, &table, "u_rate", dataset)?;

    let name = format!("{dataset}_updates");
    let baseline = &ctx.config.baselines.update_rates;
    let ratios = speedups(&name, &sweeps, baseline)?;

    let domain: Vec<Cell> = sweeps
        .iter()
        .find(|s| &s.key == baseline)
        .and_then(|s| s.runs.first())
        .map(|(_, series)| series.x.clone())
        .unwrap_or_default();
    for s in &ratios {
        let mut summary = SpeedupSummary::new(&domain);
        for (_, r) in &s.ratios {
            if r.outcome != RatioOutcome::EmptyCandidate {
                summary.add(&r.series);
            }
        }
        let over = ctx.config.thread_counts.len();
        log::info!("avgs ({}): {:?}", s.sweep.key, summary.averages(over));
        log::info!("maxes ({}): {:?}", s.sweep.key, summary.maxima());
    }

    let mut fig = Figure::new(name, ChartKind::GroupedBars)
        .title(format!("{dataset}: throughput relative to {baseline}"))
        .axes("% Updates", "Relative Throughput")
        .reference_line(1.0)
        .size(ctx.config.figure_size);
    push_fading_bars(&mut fig, &ratios, |s, t| format!("{} (n={t})", s.label));
    Ok(fig)
}

/// Throughput of each relaxation setting relative to the first one. Every
/// setting is a separate run directory under `data/`.
pub fn relaxation(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let settings = &ctx.config.relaxation;
    let first = settings
        .variants
        .first()
        .context("no relaxation variants configured")?;
    let color = ctx.config.algorithm(&first.algorithm)?.color32();
    let max_key = ctx.config.max_key(dataset)?;

    let mut sweeps = Vec::with_capacity(settings.variants.len());
    for variant in &settings.variants {
        let table = ctx.open(&ctx.data_dir().join(&variant.key).join("exp1"), dataset)?;
        sweeps.push(Sweep {
            key: variant.key.clone(),
            label: variant.label.clone(),
            color,
            runs: thread_sweep(
                &table,
                ("u_rate", "tot_thruput"),
                &list_value(dataset, &variant.algorithm),
                max_key,
                &settings.thread_counts,
            )?,
        });
    }

    let name = format!("{dataset}relax");
    let ratios = speedups(&name, &sweeps, &first.key)?;

    let mut fig = Figure::new(name, ChartKind::GroupedBars)
        .title(format!("{dataset}: relaxation relative to {}", first.label))
        .axes("% Updates", "Rel. Throughput")
        .reference_line(1.0)
        .size(ctx.config.figure_size);
    let single = settings.thread_counts.len() == 1;
    for (i, s) in ratios.iter().enumerate() {
        for (t, r) in &s.ratios {
            let label = if single {
                s.sweep.label.clone()
            } else {
                format!("{}({t})", s.sweep.label)
            };
            // The first update rate is the read-only run and is left out.
            fig.push(
                Trace::new(label, r.series.skip(1))
                    .color(s.sweep.color)
                    .opacity(fade(i, ratios.len())),
            );
        }
    }
    Ok(fig)
}

/// Unsafe bundles relative to linearizable ones as the update rate grows,
/// one fading bar group per thread count.
pub fn ubundle(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let settings = &ctx.config.ubundle;
    let table = ctx.open(&ctx.data_dir().join("exp1"), dataset)?;
    let max_key = ctx.config.max_key(dataset)?;

    let sweeps = [&settings.baseline, &settings.algorithm]
        .into_iter()
        .map(|key| {
            let algo = ctx.config.algorithm(key)?;
            Ok(Sweep {
                key: algo.key.clone(),
                label: algo.label.clone(),
                color: algo.color32(),
                runs: thread_sweep(
                    &table,
                    ("u_rate", "tot_thruput"),
                    &list_value(dataset, key),
                    max_key,
                    &settings.thread_counts,
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let name = format!("{dataset}_ubundle");
    let ratios = speedups(&name, &sweeps, &settings.baseline)?;

    let mut fig = Figure::new(name, ChartKind::GroupedBars)
        .title(format!("{dataset}: {} relative to {}", sweeps[1].label, sweeps[0].label))
        .axes("% Updates", "Rel. Throughput")
        .reference_line(1.0)
        .size(ctx.config.figure_size);
    push_fading_bars(&mut fig, &ratios, |_, t| format!("T={t}"));
    Ok(fig)
}

/// Cost of memory reclamation: throughput without reclamation divided by
/// throughput with each configured reclamation delay, averaged over thread
/// counts for each update rate.
pub fn reclamation(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let settings = &ctx.config.reclamation;
    let max_key = ctx.config.max_key(dataset)?;
    let list = list_value(dataset, "lbundle");
    let data_dir = ctx.data_dir();

    let by_rate = |table: &ResultsTable| -> Result<Vec<Series>> {
        settings
            .update_rates
            .iter()
            .map(|&u| {
                let filter = Filter::new()
                    .eq("list", list.as_str())
                    .eq("max_key", max_key)
                    .eq("u_rate", u);
                Ok(query(table, "wrk_threads", "tot_thruput", &filter)?)
            })
            .collect()
    };

    let nofree = by_rate(&ctx.open(&data_dir.join(&settings.nofree_dir).join("exp1"), dataset)?)?;

    let mut fig = Figure::new(format!("{dataset}_reclamation"), ChartKind::GroupedBars)
        .title(format!("{dataset}: throughput without reclamation relative to each delay"))
        .axes("% Updates", "Rel. Throughput")
        .reference_line(1.0)
        .size(ctx.config.figure_size);
    let palette = crate::color::generate_palette(settings.delays.len());
    for (delay, color) in settings.delays.iter().zip(palette) {
        let dir = data_dir.join(&settings.free_dir).join(delay).join("exp1");
        let with_delay = by_rate(&ctx.open(&dir, dataset)?)?;

        let mut averages = Series::with_capacity(settings.update_rates.len());
        for ((&u, baseline), candidate) in settings.update_rates.iter().zip(&with_delay).zip(&nofree) {
            let r = ratio(candidate, baseline);
            let avg = average(&r.series.y);
            log::info!("{dataset} delay {delay} @ {u}% updates: {avg} ({:?})", r.outcome);
            averages.push(Cell::Float(u), avg);
        }
        fig.push(Trace::new(format!("delay {delay}"), averages).color(color));
    }
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use crate::data::DataError;

    const HEADER: &str = "list,max_key,u_rate,rq_size,wrk_threads,tot_thruput";

    fn row(list: &str, u: i64, rq_size: i64, threads: i64, thr: f64) -> String {
        format!("{list},100000,{u},{rq_size},{threads},{thr}")
    }

    fn small_sweeps(fx: &mut Fixture) {
        fx.config.thread_counts = vec![24, 48];
    }

    #[test]
    fn rq_sizes_divides_by_baseline_per_thread_count() {
        let mut fx = Fixture::new();
        small_sweeps(&mut fx);
        let mut rows = Vec::new();
        for (algo, scale) in [("unsafe", 2.0), ("rlu", 1.0), ("lockfree", 4.0), ("lbundle", 3.0)] {
            for t in [24, 48] {
                for size in [8, 64] {
                    rows.push(row(&format!("citrus-{algo}"), 50, size, t, scale * size as f64));
                }
            }
        }
        fx.write("data/exp0/citrus.csv", HEADER, &rows);

        let fig = rq_sizes(&fx.ctx(), "citrus").unwrap();
        assert_eq!(fig.kind, ChartKind::GroupedBars);
        // three non-baseline algorithms × two thread counts
        assert_eq!(fig.traces.len(), 6);
        assert_eq!(fig.traces[0].label, "RLU (n=24)");
        assert_eq!(fig.traces[0].series.y, vec![0.5, 0.5]);
        assert_eq!(fig.traces[2].series.y, vec![2.0, 2.0]);
        assert!(fig.traces[1].opacity < fig.traces[0].opacity);
        assert_eq!(fig.categories(), vec!["8", "64"]);
    }

    #[test]
    fn update_rates_absorbs_missing_trials() {
        let mut fx = Fixture::new();
        small_sweeps(&mut fx);
        let mut rows = Vec::new();
        for u in [0, 50, 100] {
            for t in [24, 48] {
                rows.push(row("citrus-lbundle", u, 50, t, 10.0));
                rows.push(row("citrus-rlu", u, 50, t, 5.0));
                // one lockfree trial missing at 48 threads
                if !(u == 100 && t == 48) {
                    rows.push(row("citrus-lockfree", u, 50, t, 20.0));
                }
            }
        }
        fx.write("data/exp1/citrus.csv", HEADER, &rows);

        let fig = update_rates(&fx.ctx(), "citrus").unwrap();
        let lockfree_48 = fig.traces.iter().find(|t| t.label == "EBR-RQ (n=48)").unwrap();
        assert_eq!(lockfree_48.series.y, vec![0.0, 0.0, 0.0]);
        let rlu_24 = fig.traces.iter().find(|t| t.label == "RLU (n=24)").unwrap();
        assert_eq!(rlu_24.series.y, vec![0.5, 0.5, 0.5]);
        // unsafe has no rows at all: empty bars, not an error
        let unsafe_24 = fig.traces.iter().find(|t| t.label == "Unsafe (n=24)").unwrap();
        assert!(unsafe_24.series.is_empty());
    }

    #[test]
    fn unknown_baseline_fails_the_figure() {
        let mut fx = Fixture::new();
        small_sweeps(&mut fx);
        fx.config.baselines.rq_sizes = "nosuchalgo".to_string();
        fx.write("data/exp0/citrus.csv", HEADER, &[row("citrus-rlu", 50, 8, 24, 1.0)]);
        let err = rq_sizes(&fx.ctx(), "citrus").unwrap_err();
        assert!(err.to_string().contains("nosuchalgo"));
    }

    #[test]
    fn non_numeric_throughput_fails_with_context() {
        let mut fx = Fixture::new();
        small_sweeps(&mut fx);
        fx.write(
            "data/exp0/citrus.csv",
            HEADER,
            &["citrus-rlu,100000,50,8,24,n/a".to_string()],
        );
        let err = rq_sizes(&fx.ctx(), "citrus").unwrap_err();
        match err.downcast_ref::<DataError>() {
            Some(DataError::NonNumeric { column, value, .. }) => {
                assert_eq!(column, "tot_thruput");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn relaxation_compares_against_first_variant_and_drops_read_only_point() {
        let mut fx = Fixture::new();
        fx.config.relaxation.variants.truncate(2);
        for (dir, thr) in [("relax1", 10.0), ("relax10", 15.0)] {
            let rows: Vec<String> = [0, 50, 100]
                .iter()
                .map(|&u| row("citrus-lbundle", u, 50, 96, thr))
                .collect();
            fx.write(&format!("data/{dir}/exp1/citrus.csv"), HEADER, &rows);
        }
        let fig = relaxation(&fx.ctx(), "citrus").unwrap();
        assert_eq!(fig.traces.len(), 1);
        assert_eq!(fig.traces[0].label, "Relax 10");
        assert_eq!(fig.traces[0].series.y, vec![1.5, 1.5]);
        assert_eq!(fig.traces[0].series.x, vec![Cell::Integer(50), Cell::Integer(100)]);
    }

    #[test]
    fn ubundle_compares_against_lbundle_per_thread_count() {
        let mut fx = Fixture::new();
        fx.config.ubundle.thread_counts = vec![1, 48];
        let mut rows = Vec::new();
        for u in [0, 100] {
            rows.push(row("citrus-lbundle", u, 50, 1, 10.0));
            rows.push(row("citrus-lbundle", u, 50, 48, 40.0));
            rows.push(row("citrus-ubundle", u, 50, 1, 12.0));
            rows.push(row("citrus-ubundle", u, 50, 48, 60.0));
        }
        // other algorithms in the same table are ignored
        rows.push(row("citrus-rlu", 0, 50, 1, 1.0));
        fx.write("data/exp1/citrus.csv", HEADER, &rows);

        let fig = ubundle(&fx.ctx(), "citrus").unwrap();
        assert_eq!(fig.name, "citrus_ubundle");
        assert_eq!(fig.reference_line, Some(1.0));
        let labels: Vec<&str> = fig.traces.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["T=1", "T=48"]);
        assert_eq!(fig.traces[0].series.y, vec![1.2, 1.2]);
        assert_eq!(fig.traces[1].series.y, vec![1.5, 1.5]);
        assert!(fig.traces[1].opacity < fig.traces[0].opacity);
        assert_eq!(fig.categories(), vec!["0", "100"]);
    }

    #[test]
    fn reclamation_averages_over_thread_counts() {
        let mut fx = Fixture::new();
        fx.config.reclamation.delays = vec!["0".to_string()];
        fx.config.reclamation.update_rates = vec![0.0, 100.0];
        let rows = |thr: [f64; 2]| -> Vec<String> {
            [0, 100]
                .iter()
                .flat_map(|&u| [(24, thr[0]), (48, thr[1])].map(|(t, v)| row("citrus-lbundle", u, 50, t, v)))
                .collect()
        };
        fx.write("data/nofree/exp1/citrus.csv", HEADER, &rows([12.0, 30.0]));
        fx.write("data/free/0/exp1/citrus.csv", HEADER, &rows([6.0, 10.0]));

        let fig = reclamation(&fx.ctx(), "citrus").unwrap();
        assert_eq!(fig.traces.len(), 1);
        // (12/6 + 30/10) / 2
        assert_eq!(fig.traces[0].series.y, vec![2.5, 2.5]);
        assert_eq!(fig.categories(), vec!["0", "100"]);
        assert!(fx.root.path().join("data/free/0/exp1/citrus.csv").exists());
    }
}
