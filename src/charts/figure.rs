use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::data::Series;

/// Point marker drawn on line charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    #[default]
    Circle,
    Square,
    TriangleUp,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Numeric x axis, one polyline with markers per trace.
    Lines,
    /// Categorical x axis, traces side by side within each category.
    GroupedBars,
}

/// One named series with its drawing style.
#[derive(Debug, Clone)]
pub struct Trace {
    pub label: String,
    pub series: Series,
    pub color: Color32,
    /// 0.0 – 1.0, applied on top of `color`.
    pub opacity: f32,
    pub marker: Marker,
    pub show_legend: bool,
}

impl Trace {
    pub fn new(label: impl Into<String>, series: Series) -> Self {
        Trace {
            label: label.into(),
            series,
            color: Color32::GRAY,
            opacity: 1.0,
            marker: Marker::Circle,
            show_legend: true,
        }
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    /// Points the renderers can place: numeric x, finite x and y.
    pub fn drawable_points(&self) -> Vec<(f64, f64)> {
        self.series
            .numeric_points()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }
}

/// A complete chart, independent of how it is rendered.
///
/// Each builder creates its own `Figure`; styling is never shared between
/// figures through mutable state.
#[derive(Debug, Clone)]
pub struct Figure {
    /// File stem used when the figure is saved.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub traces: Vec<Trace>,
    /// Horizontal line drawn behind the data, e.g. at speedup 1.0.
    pub reference_line: Option<f64>,
    pub size: (u32, u32),
}

impl Figure {
    pub fn new(name: impl Into<String>, kind: ChartKind) -> Self {
        let name = name.into();
        Figure {
            title: name.clone(),
            name,
            x_label: String::new(),
            y_label: String::new(),
            kind,
            traces: Vec::new(),
            reference_line: None,
            size: (1400, 800),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn reference_line(mut self, y: f64) -> Self {
        self.reference_line = Some(y);
        self
    }

    pub fn size(mut self, size: (u32, u32)) -> Self {
        self.size = size;
        self
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    /// Distinct x tokens over all traces, in first-seen order. These are the
    /// bar groups of a [`ChartKind::GroupedBars`] figure.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for token in self.traces.iter().flat_map(|t| t.series.x.iter().map(|x| x.token())) {
            if !seen.contains(&token) {
                seen.push(token);
            }
        }
        seen
    }

    /// Smallest and largest finite y value, with the reference line included.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.traces
            .iter()
            .flat_map(|t| t.series.y.iter().copied())
            .chain(self.reference_line)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Smallest and largest drawable x value.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        self.traces
            .iter()
            .flat_map(|t| t.drawable_points())
            .map(|(x, _)| x)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// True when no trace has a single point.
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.series.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn series(points: &[(Cell, f64)]) -> Series {
        let mut s = Series::new();
        for (x, y) in points {
            s.push(x.clone(), *y);
        }
        s
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let mut fig = Figure::new("f", ChartKind::GroupedBars);
        fig.push(Trace::new("a", series(&[(Cell::Integer(50), 1.0), (Cell::Integer(0), 1.0)])));
        fig.push(Trace::new("b", series(&[(Cell::Float(0.0), 1.0), (Cell::Integer(90), 1.0)])));
        assert_eq!(fig.categories(), vec!["50", "0", "90"]);
    }

    #[test]
    fn bounds_skip_non_finite_values() {
        let mut fig = Figure::new("f", ChartKind::Lines).reference_line(1.0);
        fig.push(Trace::new(
            "a",
            series(&[
                (Cell::Integer(1), 2.0),
                (Cell::Integer(2), f64::INFINITY),
                (Cell::Integer(3), f64::NAN),
            ]),
        ));
        assert_eq!(fig.y_bounds(), Some((1.0, 2.0)));
        assert_eq!(fig.x_bounds(), Some((1.0, 1.0)));
        assert_eq!(fig.traces[0].drawable_points(), vec![(1.0, 2.0)]);
    }

    #[test]
    fn empty_figure_has_no_bounds() {
        let mut fig = Figure::new("f", ChartKind::Lines);
        fig.push(Trace::new("a", Series::new()));
        assert!(fig.is_empty());
        assert_eq!(fig.y_bounds(), None);
    }
}
