//! Geometry helpers: value extents + terminal size plumbing.

use terminal_size::{Width, terminal_size};

use crate::core::data::ColumnView;

/// Inclusive numeric range of one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub lo: f64,
    pub hi: f64,
}

impl Extent {
    /// Inclusive bounds over the included rows of every given column.
    ///
    /// * If there are no included finite values the fallback is `(0.0, 1.0)`.
    /// * If *all* values are identical we expand by +-0.5 so the plot still
    ///   has non-zero height/width.
    #[must_use]
    pub fn of_columns(views: &[ColumnView<'_>], included: &[bool]) -> Self {
        let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);
        for view in views {
            for (row, _) in included.iter().enumerate().filter(|(_, keep)| **keep) {
                if let Some(v) = view.value_f64(row).filter(|v| v.is_finite()) {
                    low = low.min(v);
                    high = high.max(v);
                }
            }
        }
        Self::finish(low, high)
    }

    /// Bounds over plain values.
    #[must_use]
    pub fn of_values(values: impl IntoIterator<Item = f64>) -> Self {
        let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in values.into_iter().filter(|v| v.is_finite()) {
            low = low.min(v);
            high = high.max(v);
        }
        Self::finish(low, high)
    }

    fn finish(low: f64, high: f64) -> Self {
        // All points were non-finite or there were none at all.
        if !low.is_finite() || !high.is_finite() {
            return Self { lo: 0.0, hi: 1.0 };
        }
        // Degenerate (flat-line) series - give it some breathing room.
        if (high - low).abs() < f64::EPSILON {
            return Self {
                lo: low - 0.5,
                hi: high + 0.5,
            };
        }
        Self { lo: low, hi: high }
    }

    /// Stretch the range so that it contains zero (bar baselines).
    #[must_use]
    pub fn with_zero(self) -> Self {
        Self {
            lo: self.lo.min(0.0),
            hi: self.hi.max(0.0),
        }
    }

    #[inline]
    #[must_use]
    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Position of `v` inside the range, clamped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn fraction(&self, v: f64) -> f64 {
        ((v - self.lo) / self.span()).clamp(0.0, 1.0)
    }

    /// Value at tick `i` of `steps` evenly spaced intervals.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tick_value(&self, i: usize, steps: usize) -> f64 {
        if steps == 0 {
            return self.lo;
        }
        self.lo + self.span() * i as f64 / steps as f64
    }
}

/// Integer range for overflow-safe bar scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntExtent {
    pub lo: i64,
    pub hi: i64,
}

impl IntExtent {
    /// Bounds over the included rows, stretched to contain zero.
    #[must_use]
    pub fn with_zero(values: &[i64], included: &[bool]) -> Self {
        let (lo, hi) = values
            .iter()
            .zip(included)
            .filter(|(_, keep)| **keep)
            .fold((0i64, 0i64), |(lo, hi), (&v, _)| (lo.min(v), hi.max(v)));
        Self { lo, hi }
    }

    /// `(v - lo) * len / (hi - lo)`, computed in `i128` so the full `i64`
    /// range cannot overflow.  Empty spans scale to `0`.
    #[must_use]
    pub fn scale(&self, v: i64, len: usize) -> usize {
        let span = i128::from(self.hi) - i128::from(self.lo);
        if span <= 0 {
            return 0;
        }
        let off = (i128::from(v) - i128::from(self.lo)).clamp(0, span);
        let len = i128::try_from(len).unwrap_or(i128::MAX);
        // rounded to nearest
        let scaled = (off * len * 2 + span) / (span * 2);
        usize::try_from(scaled).unwrap_or(usize::MAX)
    }
}

/// Columns of the attached terminal, if stdout is one.
#[inline]
#[must_use]
pub fn terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| usize::from(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_and_empty_ranges_get_breathing_room() {
        assert_eq!(Extent::of_values(std::iter::empty()), Extent { lo: 0.0, hi: 1.0 });
        assert_eq!(Extent::of_values([2.0, 2.0]), Extent { lo: 1.5, hi: 2.5 });
        assert_eq!(Extent::of_values([f64::NAN, 1.0, 3.0]), Extent { lo: 1.0, hi: 3.0 });
    }

    #[test]
    fn column_extent_respects_mask() {
        let v = [1i64, 100, 3];
        let e = Extent::of_columns(&[ColumnView::Int(&v)], &[true, false, true]);
        assert_eq!(e, Extent { lo: 1.0, hi: 3.0 });
        assert!((e.fraction(2.0) - 0.5).abs() < 1e-12);
        assert!((e.tick_value(1, 2) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn int_scaling_survives_full_range() {
        let e = IntExtent {
            lo: i64::MIN,
            hi: i64::MAX,
        };
        assert_eq!(e.scale(i64::MAX, 80), 80);
        assert_eq!(e.scale(i64::MIN, 80), 0);
        assert_eq!(e.scale(0, 80), 40);
    }

    #[test]
    fn int_extent_includes_zero() {
        let e = IntExtent::with_zero(&[5, 9, -2], &[true, true, false]);
        assert_eq!(e, IntExtent { lo: 0, hi: 9 });
        assert_eq!(e.scale(9, 8), 8);
    }
}
