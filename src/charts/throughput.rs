//! Raw throughput and latency charts.

use anyhow::{Context, Result};

use super::{list_value, ChartContext, ChartKind, Figure, Trace};
use crate::color::{fade, generate_palette};
use crate::config::AlgorithmStyle;
use crate::data::loader::load_file;
use crate::data::{query, ratio, Cell, Filter, Series};

/// Throughput in Mops/s against thread count for every plotted algorithm at
/// one update / range-query mix. Also logs the speedup of the configured test
/// algorithm over each of the others.
pub fn workload(ctx: &ChartContext<'_>, dataset: &str, u_rate: i64, rq_rate: i64) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("workloads"), dataset)?;
    let max_key = ctx.config.max_key(dataset)?;

    let mut data: Vec<(&AlgorithmStyle, Series)> = Vec::new();
    for algo in ctx.config.plotted() {
        let filter = Filter::new()
            .eq("list", list_value(dataset, &algo.key))
            .eq("max_key", max_key)
            .eq("u_rate", u_rate)
            .eq("rq_rate", rq_rate);
        let series = query(&table, "wrk_threads", "tot_thruput", &filter)?.scaled(1e6);
        data.push((algo, series));
    }

    let mut fig = Figure::new(format!("{dataset}_u{u_rate}_rq{rq_rate}"), ChartKind::Lines)
        .title(format!("{dataset}: {u_rate}% updates, {rq_rate}% range queries"))
        .axes("# Threads", "Mops/s")
        .size(ctx.config.figure_size);
    for (algo, series) in &data {
        fig.push(
            Trace::new(&algo.label, series.clone())
                .color(algo.color32())
                .marker(algo.marker),
        );
    }

    log_speedups(
        &format!("{dataset} @ {u_rate}% updates"),
        &ctx.config.test_algorithm,
        &data,
    );
    Ok(fig)
}

/// Log `test / other` on every other point for each other algorithm.
fn log_speedups(what: &str, test: &str, data: &[(&AlgorithmStyle, Series)]) {
    let Some((_, tested)) = data.iter().find(|(a, _)| a.key == test) else {
        log::warn!("no speedup report for {what}: '{test}' is not plotted");
        return;
    };
    log::info!("speedup for {what}");
    for (algo, series) in data.iter().filter(|(a, _)| a.key != test) {
        let r = ratio(&tested.every_nth(2), &series.every_nth(2));
        if r.is_fallback() {
            log::info!("  {test} / {}: []", algo.key);
        } else {
            log::info!("  {test} / {}: {:?}", algo.key, r.series.y);
        }
    }
}

/// Range-query latency against thread count, one line per algorithm and
/// update rate. Higher update rates are drawn fainter.
pub fn latency(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("exp2"), dataset)?;
    let max_key = ctx.config.max_key(dataset)?;
    let rates = &ctx.config.latency_update_rates;

    let mut fig = Figure::new(format!("{dataset}_latency"), ChartKind::Lines)
        .title(format!("{dataset}: range query latency"))
        .axes("# Threads", "Range query latency")
        .size(ctx.config.figure_size);
    for algo in ctx.config.plotted() {
        for (i, &u) in rates.iter().enumerate() {
            let filter = Filter::new()
                .eq("list", list_value(dataset, &algo.key))
                .eq("max_key", max_key)
                .eq("u_rate", u);
            let series = query(&table, "wrk_threads", "rq_latency", &filter)?;
            fig.push(
                Trace::new(format!("{} ({u}% updates)", algo.label), series)
                    .color(algo.color32())
                    .opacity(fade(i, rates.len()))
                    .marker(algo.marker),
            );
        }
    }
    Ok(fig)
}

/// Throughput of selected algorithms at the configured extreme update rates
/// (read-mostly vs. update-only), one colour per case.
pub fn extremes(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("exp1"), dataset)?;
    let max_key = ctx.config.max_key(dataset)?;
    let palette = generate_palette(ctx.config.extremes.len());

    let mut fig = Figure::new(format!("{dataset}_extremes"), ChartKind::Lines)
        .title(format!("{dataset}: extreme workloads"))
        .axes("# Threads", "Throughput (ops/s)")
        .size(ctx.config.figure_size);
    for (case, color) in ctx.config.extremes.iter().zip(palette) {
        for key in &case.algorithms {
            let algo = ctx.config.algorithm(key)?;
            let filter = Filter::new()
                .eq("list", list_value(dataset, key))
                .eq("max_key", max_key)
                .eq("u_rate", case.update_rate);
            let series = query(&table, "wrk_threads", "tot_thruput", &filter)?;
            fig.push(
                Trace::new(format!("{} ({}% updates)", algo.label, case.update_rate), series)
                    .color(color)
                    .marker(algo.marker),
            );
        }
    }
    Ok(fig)
}

/// Throughput at a single thread count, one bar per selected algorithm and
/// one colour per extreme update rate.
pub fn extremes_bars(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let table = ctx.open(&ctx.data_dir().join("exp1"), dataset)?;
    let max_key = ctx.config.max_key(dataset)?;
    let threads = ctx.config.extremes_threads;
    let palette = generate_palette(ctx.config.extremes.len());

    let mut fig = Figure::new(format!("{dataset}_extremes_bars"), ChartKind::GroupedBars)
        .title(format!("{dataset}: extreme workloads at {threads} threads"))
        .axes("Algorithm", "Throughput (ops/s)")
        .size(ctx.config.figure_size);
    for (case, color) in ctx.config.extremes.iter().zip(palette) {
        let mut bars = Series::with_capacity(case.algorithms.len());
        for key in &case.algorithms {
            let algo = ctx.config.algorithm(key)?;
            let filter = Filter::new()
                .eq("list", list_value(dataset, key))
                .eq("max_key", max_key)
                .eq("u_rate", case.update_rate)
                .eq("wrk_threads", threads);
            let series = query(&table, "wrk_threads", "tot_thruput", &filter)?;
            for &y in &series.y {
                bars.push(Cell::String(algo.label.clone()), y);
            }
        }
        fig.push(Trace::new(format!("{}% updates", case.update_rate), bars).color(color));
    }
    Ok(fig)
}

/// Application-level benchmark: index throughput in Mops/s against thread
/// count, every other point. The table is read as is; it is never generated.
pub fn macrobench(ctx: &ChartContext<'_>, dataset: &str) -> Result<Figure> {
    let path = ctx.root.join(&ctx.config.macrobench.dir).join("data.csv");
    let table = load_file(&path).with_context(|| format!("loading macrobenchmark results for {dataset}"))?;

    let mut data: Vec<(&AlgorithmStyle, Series)> = Vec::new();
    for algo in &ctx.config.algorithms {
        let filter = Filter::new()
            .eq("rqalg", algo.macrobench.as_str())
            .eq("datastructure", dataset);
        let series = query(&table, "nthreads", "ixThroughput", &filter)?.scaled(1e6);
        data.push((algo, series));
    }

    let baseline = &ctx.config.baselines.macrobench;
    if let Some((_, base)) = data.iter().find(|(a, _)| &a.key == baseline) {
        for (algo, series) in data.iter().filter(|(a, _)| &a.key != baseline) {
            let r = ratio(&series.every_nth(2), &base.every_nth(2));
            log::info!("{dataset} macrobench {} / {baseline}: {:?} ({:?})", algo.key, r.series.y, r.outcome);
        }
    }

    let mut fig = Figure::new(format!("{dataset}-macrobench"), ChartKind::Lines)
        .title(format!("{dataset}: macrobenchmark"))
        .axes("# Threads", "Mops/s")
        .size(ctx.config.figure_size);
    for (algo, series) in &data {
        fig.push(
            Trace::new(&algo.label, series.every_nth(2))
                .color(algo.color32())
                .marker(algo.marker),
        );
    }
    Ok(fig)
}
