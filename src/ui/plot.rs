use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, HLine, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::charts::{ChartKind, Figure, Marker, Trace};

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

const BAR_GROUP_WIDTH: f64 = 0.9;

fn marker_shape(marker: Marker) -> MarkerShape {
    match marker {
        Marker::Circle => MarkerShape::Circle,
        Marker::Square => MarkerShape::Square,
        Marker::TriangleUp => MarkerShape::Up,
        Marker::Cross => MarkerShape::Cross,
    }
}

fn trace_color(trace: &Trace) -> Color32 {
    trace.color.gamma_multiply(trace.opacity)
}

/// Render `figure` in the central panel.
pub fn figure_plot(ui: &mut Ui, figure: Option<&Figure>) {
    let Some(figure) = figure else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No figures were built. See the failures on the left.");
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(figure.title.as_str());
    });

    match figure.kind {
        ChartKind::Lines => line_plot(ui, figure),
        ChartKind::GroupedBars => bar_plot(ui, figure),
    }
}

fn line_plot(ui: &mut Ui, figure: &Figure) {
    Plot::new(("figure_plot", &figure.name))
        .legend(Legend::default())
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(y) = figure.reference_line {
                plot_ui.hline(HLine::new(y).color(Color32::BLACK));
            }
            for trace in &figure.traces {
                let color = trace_color(trace);
                let points: Vec<[f64; 2]> = trace.drawable_points().into_iter().map(|(x, y)| [x, y]).collect();

                let mut line = Line::new(PlotPoints::from(points.clone())).color(color).width(2.0);
                let mut markers = Points::new(PlotPoints::from(points))
                    .shape(marker_shape(trace.marker))
                    .radius(4.0)
                    .color(color);
                // Traces sharing a name share one legend entry.
                if trace.show_legend {
                    line = line.name(&trace.label);
                    markers = markers.name(&trace.label);
                }
                plot_ui.line(line);
                plot_ui.points(markers);
            }
        });
}

fn bar_plot(ui: &mut Ui, figure: &Figure) {
    let categories = figure.categories();
    let num_traces = figure.traces.len().max(1);
    let bar_width = BAR_GROUP_WIDTH / num_traces as f64;

    let labels = categories.clone();
    Plot::new(("figure_plot", &figure.name))
        .legend(Legend::default())
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if idx >= 0.0 && (mark.value - idx).abs() < f64::EPSILON {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            if let Some(y) = figure.reference_line {
                plot_ui.hline(HLine::new(y).color(Color32::BLACK).width(2.0));
            }
            for (trace_idx, trace) in figure.traces.iter().enumerate() {
                let x_offset = (trace_idx as f64 - (num_traces as f64 - 1.0) / 2.0) * bar_width;
                let bars: Vec<Bar> = trace
                    .series
                    .x
                    .iter()
                    .zip(&trace.series.y)
                    .filter(|(_, y)| y.is_finite())
                    .filter_map(|(x, &y)| {
                        let idx = categories.iter().position(|c| *c == x.token())?;
                        Some(Bar::new(idx as f64 + x_offset, y).width(bar_width))
                    })
                    .collect();
                let mut chart = BarChart::new(bars).color(trace_color(trace));
                if trace.show_legend {
                    chart = chart.name(&trace.label);
                }
                plot_ui.bar_chart(chart);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_marker_has_a_shape() {
        assert_eq!(marker_shape(Marker::Circle), MarkerShape::Circle);
        assert_eq!(marker_shape(Marker::TriangleUp), MarkerShape::Up);
    }

    #[test]
    fn faded_traces_are_lighter() {
        let trace = Trace::new("a", Default::default()).color(Color32::RED).opacity(0.5);
        assert!(trace_color(&trace).a() < Color32::RED.a());
    }
}
