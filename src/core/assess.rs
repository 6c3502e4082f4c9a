//! Structural / statistical classification of one column.
//!
//! Everything here is a pure function of the column's valid (non-null)
//! cells plus the thresholds in [`Config`]; nothing is cached.
//!
//! * **category-like**: sorted runs of equal values form `g` groups with
//!   `1 < g <= n / 2`, every group has at least two members and `g` stays
//!   within the palette's category ceiling.
//! * **repeating subsequences**: the distance `p` from the first element to
//!   its first repetition is a period, i.e. `v[i] == v[i - p]` for every
//!   `i >= p`.
//! * **time-series-like** (numeric only, ≥ 3 values): every successive
//!   difference lies within `mean ± |mean| · tolerance`.

use std::cmp::Ordering;

use crate::core::{
    config::Config,
    data::{Column, ColumnView, DataStore},
};

/// Result of assessing one column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assessment {
    /// Number of distinct sorted-run groups.
    pub category_count: usize,
    pub is_category_like: bool,
    /// Every group has the same size.
    pub has_uniform_runs: bool,
    /// Period found by the repeating-subsequence scan.
    pub period: Option<usize>,
    pub is_same_repeating_subsequences: bool,
    /// The column is made of whole repetitions of the period.
    pub is_full_periods: bool,
    pub is_time_series_like: bool,
}

/// Assess every column of `ds`, in column order.
#[must_use]
pub fn assess_store(ds: &DataStore, cfg: &Config) -> Vec<Assessment> {
    ds.columns().iter().map(|c| assess_column(c, cfg)).collect()
}

#[must_use]
pub fn assess_column(col: &Column, cfg: &Config) -> Assessment {
    let valid = |i: &usize| !col.is_null(*i);
    match col.view() {
        ColumnView::Str(v) => {
            let vals: Vec<&str> = (0..v.len())
                .filter(valid)
                .map(|i| v[i].as_str())
                .collect();
            assess_values(&vals, Ord::cmp, None, cfg)
        }
        ColumnView::Int(v) => {
            let vals: Vec<i64> = (0..v.len()).filter(valid).map(|i| v[i]).collect();
            #[allow(clippy::cast_precision_loss)]
            let nums: Vec<f64> = vals.iter().map(|&x| x as f64).collect();
            assess_values(&vals, Ord::cmp, Some(nums.as_slice()), cfg)
        }
        ColumnView::Double(v) => {
            let vals: Vec<f64> = (0..v.len()).filter(valid).map(|i| v[i]).collect();
            assess_values(&vals, f64::total_cmp, Some(vals.as_slice()), cfg)
        }
    }
}

fn assess_values<T: Clone + PartialEq>(
    vals: &[T],
    cmp: impl Fn(&T, &T) -> Ordering,
    numeric: Option<&[f64]>,
    cfg: &Config,
) -> Assessment {
    let runs = sorted_runs(vals, cmp);
    let groups = runs.len();
    let n = vals.len();
    let is_category_like = groups > 1
        && groups <= n / 2
        && groups <= cfg.max_categories
        && runs.iter().all(|&r| r >= 2);
    let has_uniform_runs = runs.windows(2).all(|w| w[0] == w[1]);

    let period = find_period(vals);
    let is_full_periods = period.is_some_and(|p| n % p == 0);

    let is_time_series_like = numeric.is_some_and(|nums| {
        time_series_like(nums, cfg.ts_tolerance_lower, cfg.ts_tolerance_upper)
    });

    Assessment {
        category_count: groups,
        is_category_like,
        has_uniform_runs,
        period,
        is_same_repeating_subsequences: period.is_some(),
        is_full_periods,
        is_time_series_like,
    }
}

/// Sizes of the maximal runs of equal values after sorting a copy.
fn sorted_runs<T: Clone>(vals: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Vec<usize> {
    let mut sorted = vals.to_vec();
    sorted.sort_by(&cmp);
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=sorted.len() {
        if i == sorted.len() || cmp(&sorted[i - 1], &sorted[i]) != Ordering::Equal {
            runs.push(i - start);
            start = i;
        }
    }
    runs
}

/// Distance to the first repetition of `vals[0]`, if every later value
/// repeats the one exactly that far before it.
fn find_period<T: PartialEq>(vals: &[T]) -> Option<usize> {
    let first = vals.first()?;
    let p = vals.iter().skip(1).position(|v| v == first)? + 1;
    (p..vals.len()).all(|i| vals[i] == vals[i - p]).then_some(p)
}

#[allow(clippy::cast_precision_loss)]
fn time_series_like(nums: &[f64], lower: f64, upper: f64) -> bool {
    if nums.len() < 3 {
        return false;
    }
    let diffs: Vec<f64> = nums.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
    if !mean.is_finite() || mean == 0.0 {
        return false;
    }
    let (lo, hi) = (mean - mean.abs() * lower, mean + mean.abs() * upper);
    diffs.iter().all(|d| (lo..=hi).contains(d))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::core::data::{ColumnData, FLAG_NULL};

    fn ints(v: &[i64]) -> Column {
        Column::new("c", ColumnData::Int(v.to_vec()))
    }
    fn strs(v: &[&str]) -> Column {
        Column::new(
            "c",
            ColumnData::Str(v.iter().map(ToString::to_string).collect()),
        )
    }

    #[rstest]
    #[case::single_value(&["a", "a", "a", "a"], false)]
    #[case::all_unique(&["a", "b", "c", "d"], false)]
    #[case::balanced(&["a", "b", "a", "b", "c", "c"], true)]
    #[case::lonely_member(&["a", "a", "a", "b", "b", "c"], false)]
    #[case::two_rows(&["a", "a"], false)]
    #[case::empty(&[], false)]
    fn category_boundaries(#[case] vals: &[&str], #[case] expect: bool) {
        let a = assess_column(&strs(vals), &Config::default());
        assert_eq!(a.is_category_like, expect, "{vals:?}");
    }

    #[test]
    fn category_count_and_uniformity() {
        let a = assess_column(&strs(&["x", "y", "x", "y"]), &Config::default());
        assert_eq!(a.category_count, 2);
        assert!(a.has_uniform_runs);
        let b = assess_column(&strs(&["x", "y", "x", "y", "y"]), &Config::default());
        assert!(!b.has_uniform_runs);
    }

    #[test]
    fn too_many_groups_for_the_palette() {
        let vals: Vec<i64> = (0..8).chain(0..8).collect();
        let a = assess_column(&ints(&vals), &Config::default());
        assert_eq!(a.category_count, 8);
        assert!(!a.is_category_like);
    }

    #[test]
    fn periodicity() {
        let a = assess_column(&strs(&["a", "b", "c", "a", "b", "c", "a"]), &Config::default());
        assert_eq!(a.period, Some(3));
        assert!(a.is_same_repeating_subsequences);
        assert!(!a.is_full_periods);

        let b = assess_column(&strs(&["a", "b", "a", "b"]), &Config::default());
        assert!(b.is_full_periods);

        let broken = assess_column(&strs(&["a", "b", "a", "c"]), &Config::default());
        assert!(!broken.is_same_repeating_subsequences);
        assert_eq!(broken.period, None);
    }

    #[test]
    fn index_column_is_time_series() {
        let vals: Vec<i64> = (0..50).collect();
        assert!(assess_column(&ints(&vals), &Config::default()).is_time_series_like);

        let desc: Vec<f64> = (0..20).map(|i| 5.0 - f64::from(i) * 0.25).collect();
        let col = Column::new("d", ColumnData::Double(desc));
        assert!(assess_column(&col, &Config::default()).is_time_series_like);
    }

    #[test]
    fn one_large_jump_breaks_time_series() {
        let mut vals: Vec<i64> = (0..20).collect();
        vals[10] += 5;
        assert!(!assess_column(&ints(&vals), &Config::default()).is_time_series_like);
    }

    #[test]
    fn constant_and_string_columns_are_not_time_series() {
        assert!(!assess_column(&ints(&[4, 4, 4, 4]), &Config::default()).is_time_series_like);
        assert!(!assess_column(&strs(&["1", "2", "3"]), &Config::default()).is_time_series_like);
    }

    #[test]
    fn nulls_are_skipped() {
        let col = Column::with_flags(
            "t",
            ColumnData::Int(vec![0, 999, 1, 2, 3]),
            vec![0, FLAG_NULL, 0, 0, 0],
        )
        .unwrap();
        assert!(assess_column(&col, &Config::default()).is_time_series_like);
    }

    #[test]
    fn assessment_is_idempotent() {
        let col = strs(&["a", "b", "a", "b", "c", "c"]);
        let cfg = Config::default();
        assert_eq!(assess_column(&col, &cfg), assess_column(&col, &cfg));
    }
}
