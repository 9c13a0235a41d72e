use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::charts::{ChartKind, Figure, Marker};

// Font sizes
const TITLE_FONT_SIZE: u32 = 40;
const AXIS_LABEL_FONT_SIZE: u32 = 28;
const TICK_LABEL_FONT_SIZE: u32 = 22;
const LEGEND_FONT_SIZE: u32 = 20;

const MARKER_SIZE: i32 = 7;
const LINE_WIDTH: u32 = 3;

/// Write `figure` to `<dir>/<name>.svg`.
pub fn save_figure(figure: &Figure, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{}.svg", figure.name));

    let root = SVGBackend::new(&path, figure.size).into_drawing_area();
    root.fill(&WHITE)?;
    match figure.kind {
        ChartKind::Lines => draw_lines(&root, figure)?,
        ChartKind::GroupedBars => draw_bars(&root, figure)?,
    }
    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    // The backend borrows `path` until it is dropped.
    drop(root);
    Ok(path)
}

fn rgba(color: Color32, opacity: f32) -> RGBAColor {
    RGBColor(color.r(), color.g(), color.b()).mix(f64::from(opacity))
}

/// Pad `(lo, hi)` so flat or single-point data still gets a visible range.
/// Bars and speedups read from zero, so zero is always included.
fn padded_y(bounds: Option<(f64, f64)>) -> (f64, f64) {
    let (lo, hi) = bounds.unwrap_or((0.0, 1.0));
    let (lo, hi) = (lo.min(0.0), hi.max(0.0));
    let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };
    (lo, hi + span * 0.1)
}

fn draw_lines<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (x_lo, x_hi) = match figure.x_bounds() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, _)) => (lo - 1.0, lo + 1.0),
        None => (0.0, 1.0),
    };
    let (y_lo, y_hi) = padded_y(figure.y_bounds());

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| anyhow::anyhow!("building chart for {}: {e}", figure.name))?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()
        .map_err(|e| anyhow::anyhow!("drawing axes for {}: {e}", figure.name))?;

    if let Some(y) = figure.reference_line {
        chart
            .draw_series(LineSeries::new(vec![(x_lo, y), (x_hi, y)], BLACK.stroke_width(2)))
            .map_err(|e| anyhow::anyhow!("drawing reference line: {e}"))?;
    }

    for trace in &figure.traces {
        let color = rgba(trace.color, trace.opacity);
        let points = trace.drawable_points();
        let line_style = color.stroke_width(LINE_WIDTH);
        let series = chart
            .draw_series(LineSeries::new(points.clone(), line_style))
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", trace.label))?;
        if trace.show_legend {
            series
                .label(trace.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
        }

        let style = color.filled();
        let s = MARKER_SIZE;
        let drawn = match trace.marker {
            Marker::Circle => chart.draw_series(points.iter().map(|&p| Circle::new(p, s, style))),
            Marker::Square => chart.draw_series(
                points
                    .iter()
                    .map(|&p| EmptyElement::at(p) + Rectangle::new([(-s, -s), (s, s)], style)),
            ),
            Marker::TriangleUp => chart.draw_series(points.iter().map(|&p| TriangleMarker::new(p, s, style))),
            Marker::Cross => chart.draw_series(points.iter().map(|&p| Cross::new(p, s, color.stroke_width(LINE_WIDTH)))),
        };
        drawn.map_err(|e| anyhow::anyhow!("drawing markers of {}: {e}", trace.label))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()
        .map_err(|e| anyhow::anyhow!("drawing legend for {}: {e}", figure.name))?;
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let categories = figure.categories();
    let num_categories = categories.len().max(1);
    let (y_lo, y_hi) = padded_y(figure.y_bounds());
    let x_range = -0.5..(num_categories as f64 - 0.5);

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range.clone(), y_lo..y_hi)
        .map_err(|e| anyhow::anyhow!("building chart for {}: {e}", figure.name))?;

    let formatter = |x: &f64| {
        let idx = x.round();
        if idx >= 0.0 && (x - idx).abs() < 0.3 {
            categories.get(idx as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_categories)
        .x_label_formatter(&formatter)
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()
        .map_err(|e| anyhow::anyhow!("drawing axes for {}: {e}", figure.name))?;

    if let Some(y) = figure.reference_line {
        chart
            .draw_series(LineSeries::new(
                vec![(x_range.start, y), (x_range.end, y)],
                BLACK.stroke_width(4),
            ))
            .map_err(|e| anyhow::anyhow!("drawing reference line: {e}"))?;
    }

    // Draw grouped bars
    let group_width = 0.9;
    let num_traces = figure.traces.len().max(1);
    let bar_width = group_width / num_traces as f64;

    for (trace_idx, trace) in figure.traces.iter().enumerate() {
        let fill = rgba(trace.color, trace.opacity);
        let x_offset = (trace_idx as f64 - (num_traces as f64 - 1.0) / 2.0) * bar_width;

        let bars: Vec<Rectangle<(f64, f64)>> = trace
            .series
            .x
            .iter()
            .zip(&trace.series.y)
            .filter(|(_, y)| y.is_finite())
            .filter_map(|(x, &y)| {
                let idx = categories.iter().position(|c| *c == x.token())?;
                let center = idx as f64 + x_offset;
                Some(Rectangle::new(
                    [(center - bar_width / 2.0, 0.0), (center + bar_width / 2.0, y)],
                    fill.filled(),
                ))
            })
            .collect();

        let series = chart
            .draw_series(bars)
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", trace.label))?;
        if trace.show_legend {
            series
                .label(trace.label.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill.filled()));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()
        .map_err(|e| anyhow::anyhow!("drawing legend for {}: {e}", figure.name))?;
    Ok(())
}
