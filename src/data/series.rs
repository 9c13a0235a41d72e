use super::error::{DataError, Result};
use super::model::Cell;

// ---------------------------------------------------------------------------
// Series – parallel x / y sequences
// ---------------------------------------------------------------------------

/// Two parallel sequences taken from a table: `x` may be numeric or
/// categorical, `y` is always numeric. Both always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<Cell>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Series {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, x: Cell, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Divide every y value, e.g. by `1e6` to plot Mops/s.
    pub fn scaled(mut self, divisor: f64) -> Self {
        self.y.iter_mut().for_each(|v| *v /= divisor);
        self
    }

    /// Keep every `n`-th point starting from the first.
    pub fn every_nth(&self, n: usize) -> Self {
        let n = n.max(1);
        Series {
            x: self.x.iter().step_by(n).cloned().collect(),
            y: self.y.iter().step_by(n).copied().collect(),
        }
    }

    /// Drop the first `n` points.
    pub fn skip(&self, n: usize) -> Self {
        Series {
            x: self.x.iter().skip(n).cloned().collect(),
            y: self.y.iter().skip(n).copied().collect(),
        }
    }

    /// `(x, y)` pairs with a numeric x reading; categorical points are skipped.
    pub fn numeric_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(x, &y)| x.as_f64().map(|x| (x, y)))
    }
}

// ---------------------------------------------------------------------------
// Ratio series
// ---------------------------------------------------------------------------

/// How a [`Ratio`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioOutcome {
    /// Element-wise division of two equal-length series.
    Computed,
    /// The candidate had no points; the result is empty.
    EmptyCandidate,
    /// The series could not be paired; the result is zero-filled to the
    /// baseline's length and does not reflect measured data.
    ShapeMismatch { candidate: usize, baseline: usize },
}

/// A candidate series expressed relative to a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    pub series: Series,
    pub outcome: RatioOutcome,
}

impl Ratio {
    /// True when the values are the zero-filled fallback rather than data.
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, RatioOutcome::ShapeMismatch { .. })
    }
}

/// Divide `candidate.y` by `baseline.y` position by position.
///
/// The two series are assumed to have been filtered over the same x domain;
/// no join on x is performed and the result takes `baseline.x`. Division by
/// zero yields `inf`/`NaN` like any other float division. If the lengths
/// differ the result is all zeros with the baseline's shape and the outcome
/// says so; this never fails, so one bad pairing cannot abort a whole chart.
pub fn ratio(candidate: &Series, baseline: &Series) -> Ratio {
    if candidate.is_empty() {
        return Ratio {
            series: Series::new(),
            outcome: RatioOutcome::EmptyCandidate,
        };
    }

    if candidate.len() != baseline.len() {
        log::warn!(
            "cannot divide series of length {} by baseline of length {}; substituting zeros",
            candidate.len(),
            baseline.len()
        );
        return Ratio {
            series: Series {
                x: baseline.x.clone(),
                y: vec![0.0; baseline.len()],
            },
            outcome: RatioOutcome::ShapeMismatch {
                candidate: candidate.len(),
                baseline: baseline.len(),
            },
        };
    }

    let y = candidate
        .y
        .iter()
        .zip(&baseline.y)
        .map(|(c, b)| c / b)
        .collect();
    Ratio {
        series: Series {
            x: baseline.x.clone(),
            y,
        },
        outcome: RatioOutcome::Computed,
    }
}

/// Arithmetic mean over all values, non-finite ones included. `NaN` when
/// `values` is empty.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Larger of `a` and `b` at each position, keeping `a`'s x values. A `NaN` on
/// either side yields `NaN` at that position.
pub fn elementwise_max(a: &Series, b: &Series) -> Result<Series> {
    if a.len() != b.len() {
        return Err(DataError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let y = a
        .y
        .iter()
        .zip(&b.y)
        .map(|(&l, &r)| if l.is_nan() || r.is_nan() { f64::NAN } else { l.max(r) })
        .collect();
    Ok(Series { x: a.x.clone(), y })
}

// ---------------------------------------------------------------------------
// Summary across repeated parameters
// ---------------------------------------------------------------------------

/// Running per-position sum and maximum of ratio series that share an x
/// domain, e.g. one speedup series per thread count.
#[derive(Debug, Clone)]
pub struct SpeedupSummary {
    sum: Series,
    max: Series,
    count: usize,
}

impl SpeedupSummary {
    /// Start a summary over `x`, with sums and maxima at zero.
    pub fn new(x: &[Cell]) -> Self {
        let zeros = Series {
            x: x.to_vec(),
            y: vec![0.0; x.len()],
        };
        SpeedupSummary {
            sum: zeros.clone(),
            max: zeros,
            count: 0,
        }
    }

    /// Fold one series in. Series of the wrong length are skipped.
    pub fn add(&mut self, series: &Series) {
        let max = match elementwise_max(series, &self.max) {
            Ok(max) => max,
            Err(e) => {
                log::warn!("leaving series out of summary: {e}");
                return;
            }
        };
        self.max.y = max.y;
        self.sum.y.iter_mut().zip(&series.y).for_each(|(s, v)| *s += v);
        self.count += 1;
    }

    /// Number of series folded in.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-position mean over the `over` repetitions. Positions are divided
    /// by `over` even if fewer series were added.
    pub fn averages(&self, over: usize) -> Vec<f64> {
        self.sum.y.iter().map(|s| s / over as f64).collect()
    }

    pub fn maxima(&self) -> &[f64] {
        &self.max.y
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn series(xs: &[i64], ys: &[f64]) -> Series {
        Series {
            x: xs.iter().map(|&x| Cell::Integer(x)).collect(),
            y: ys.to_vec(),
        }
    }

    #[test]
    fn ratio_divides_and_copies_baseline_x() {
        let candidate = series(&[1, 2], &[10.0, 6.0]);
        let baseline = series(&[10, 20], &[5.0, 3.0]);
        let r = ratio(&candidate, &baseline);
        assert_eq!(r.outcome, RatioOutcome::Computed);
        assert_eq!(r.series.y, vec![2.0, 2.0]);
        assert_eq!(r.series.x, baseline.x);
        assert!(!r.is_fallback());
    }

    #[test]
    fn ratio_of_empty_candidate_is_empty() {
        let r = ratio(&Series::new(), &series(&[1, 2], &[1.0, 2.0]));
        assert!(r.series.is_empty());
        assert_eq!(r.outcome, RatioOutcome::EmptyCandidate);
    }

    #[test]
    fn ratio_over_empty_baseline_is_empty_and_flagged() {
        let r = ratio(&series(&[1], &[4.0]), &Series::new());
        assert!(r.series.is_empty());
        assert!(r.is_fallback());
    }

    #[test]
    fn mismatched_lengths_fall_back_to_zeros() {
        let baseline = series(&[0, 5, 25], &[1.0, 1.0, 1.0]);
        let r = ratio(&series(&[0, 5], &[3.0, 3.0]), &baseline);
        assert_eq!(r.series.y, vec![0.0, 0.0, 0.0]);
        assert_eq!(r.series.x, baseline.x);
        assert_eq!(
            r.outcome,
            RatioOutcome::ShapeMismatch {
                candidate: 2,
                baseline: 3
            }
        );
    }

    #[test]
    fn genuine_zero_ratio_is_not_a_fallback() {
        let r = ratio(&series(&[1], &[0.0]), &series(&[1], &[7.0]));
        assert_eq!(r.series.y, vec![0.0]);
        assert!(!r.is_fallback());
    }

    #[test]
    fn division_by_zero_is_not_trapped() {
        let r = ratio(&series(&[1, 2], &[1.0, 0.0]), &series(&[1, 2], &[0.0, 0.0]));
        assert_eq!(r.series.y[0], f64::INFINITY);
        assert!(r.series.y[1].is_nan());
        assert_eq!(r.outcome, RatioOutcome::Computed);
    }

    #[test]
    fn average_includes_every_value() {
        assert_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
        assert!(average(&[]).is_nan());
        assert_eq!(average(&[1.0, f64::INFINITY]), f64::INFINITY);
    }

    #[test]
    fn elementwise_max_requires_equal_lengths() {
        let m = elementwise_max(&series(&[1, 2], &[1.0, 5.0]), &series(&[1, 2], &[3.0, 2.0])).unwrap();
        assert_eq!(m.y, vec![3.0, 5.0]);
        let err = elementwise_max(&series(&[1], &[1.0]), &Series::new()).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { left: 1, right: 0 }));
    }

    #[test]
    fn slicing_helpers() {
        let s = series(&[1, 2, 3, 4, 5], &[1e6, 2e6, 3e6, 4e6, 5e6]);
        assert_eq!(s.every_nth(2).y, vec![1e6, 3e6, 5e6]);
        assert_eq!(s.skip(3).x, vec![Cell::Integer(4), Cell::Integer(5)]);
        assert_eq!(s.scaled(1e6).y, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn summary_tracks_sum_and_max() {
        let x = [Cell::Integer(0), Cell::Integer(50)];
        let mut summary = SpeedupSummary::new(&x);
        summary.add(&series(&[0, 50], &[1.0, 4.0]));
        summary.add(&series(&[0, 50], &[3.0, 2.0]));
        summary.add(&series(&[0], &[100.0]));
        assert_eq!(summary.count(), 2);
        assert_eq!(summary.averages(2), vec![2.0, 3.0]);
        assert_eq!(summary.maxima(), &[3.0, 4.0]);
    }

    proptest! {
        #[test]
        fn equal_length_ratio_is_elementwise(
            pairs in prop::collection::vec((1.0f64..1e9, 1.0f64..1e9), 1..30)
        ) {
            let xs: Vec<i64> = (0..pairs.len() as i64).collect();
            let c: Vec<f64> = pairs.iter().map(|p| p.0).collect();
            let b: Vec<f64> = pairs.iter().map(|p| p.1).collect();
            let r = ratio(&series(&xs, &c), &series(&xs, &b));
            prop_assert_eq!(r.outcome, RatioOutcome::Computed);
            for (i, v) in r.series.y.iter().enumerate() {
                prop_assert_eq!(*v, c[i] / b[i]);
            }
        }

        #[test]
        fn mismatched_ratio_has_baseline_shape(n in 1usize..20, m in 0usize..20) {
            prop_assume!(n != m);
            let c = series(&vec![0; n], &vec![1.0; n]);
            let b = series(&vec![0; m], &vec![2.0; m]);
            let r = ratio(&c, &b);
            prop_assert_eq!(r.series.len(), m);
            prop_assert!(r.series.y.iter().all(|&v| v == 0.0));
            prop_assert!(r.is_fallback());
        }
    }
}
