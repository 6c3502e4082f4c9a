//! Bar bodies drawn with eighth-block sub-cell precision.
//!
//! Bars grow from the start of a value axis that always contains zero.
//! Integer-only selections are scaled in integer space so full-range `i64`
//! data cannot overflow or lose precision.

use crate::core::{
    bounds::{Extent, IntExtent},
    color::{AnsiCode, Rgb},
    config::Config,
    data::ColumnView,
};

const EIGHTHS: usize = 8;

/// Value-to-length mapping shared by every bar of one plot.
#[derive(Debug, Clone, Copy)]
pub struct BarScale {
    extent: Extent,
    int_extent: Option<IntExtent>,
}

impl BarScale {
    #[must_use]
    pub fn new(views: &[ColumnView<'_>], included: &[bool]) -> Self {
        let extent = Extent::of_columns(views, included).with_zero();
        let int_extent = views
            .iter()
            .map(|v| match v {
                ColumnView::Int(vals) => Some(IntExtent::with_zero(vals, included)),
                _ => None,
            })
            .try_fold(IntExtent { lo: 0, hi: 0 }, |acc, e| {
                e.map(|e| IntExtent {
                    lo: acc.lo.min(e.lo),
                    hi: acc.hi.max(e.hi),
                })
            });
        Self { extent, int_extent }
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Bar length of `row` in eighths of a cell, at most `cells * 8`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn eighths(&self, view: &ColumnView<'_>, row: usize, cells: usize) -> usize {
        let len = cells * EIGHTHS;
        match (view, self.int_extent) {
            (ColumnView::Int(vals), Some(ie)) => vals.get(row).map_or(0, |&v| ie.scale(v, len)),
            _ => view
                .value_f64(row)
                .filter(|v| v.is_finite())
                .map_or(0, |v| (self.extent.fraction(v) * len as f64).round() as usize),
        }
    }
}

// --- Glyph runs ---

/// Builds a line of cells, opening one escape per run of equal colour.
#[derive(Debug)]
pub(crate) struct Runs {
    out: String,
    open: Option<Rgb>,
    enabled: bool,
}

impl Runs {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            out: String::new(),
            open: None,
            enabled,
        }
    }

    pub(crate) fn push(&mut self, ch: char, color: Option<Rgb>) {
        let color = color.filter(|_| self.enabled);
        if color != self.open {
            if self.open.is_some() {
                self.out.push_str(AnsiCode::reset().as_str());
            }
            if let Some(c) = color {
                self.out.push_str(AnsiCode::from(c).as_str());
            }
            self.open = color;
        }
        self.out.push(ch);
    }

    pub(crate) fn finish(mut self) -> String {
        if self.open.is_some() {
            self.out.push_str(AnsiCode::reset().as_str());
        }
        self.out
    }
}

/// `cells` glyphs: full blocks, one partial block, then blanks.
#[must_use]
pub fn horizontal_bar(eighths: usize, cells: usize, color: Rgb, cfg: &Config) -> String {
    let eighths = eighths.min(cells * EIGHTHS);
    let (full, part) = (eighths / EIGHTHS, eighths % EIGHTHS);
    let mut runs = Runs::new(cfg.color);
    for _ in 0..full {
        runs.push(cfg.glyphs.eighths_horizontal[EIGHTHS - 1], Some(color));
    }
    if part > 0 {
        runs.push(cfg.glyphs.eighths_horizontal[part - 1], Some(color));
    }
    for _ in full + usize::from(part > 0)..cells {
        runs.push(' ', None);
    }
    runs.finish()
}

/// Glyph of an upward bar `eighths` long in the cell `level` rows above the
/// baseline; `None` when the bar stops below it.
#[must_use]
pub fn vertical_bar_cell(eighths: usize, level: usize, cfg: &Config) -> Option<char> {
    let floor = level * EIGHTHS;
    match eighths.saturating_sub(floor) {
        0 => None,
        n if n >= EIGHTHS => Some(cfg.glyphs.eighths_vertical[EIGHTHS - 1]),
        n => Some(cfg.glyphs.eighths_vertical[n - 1]),
    }
}

/// One body row per (data row, series); series vary fastest.
#[must_use]
pub fn vertical_rows(
    scale: &BarScale,
    series: &[(ColumnView<'_>, Rgb)],
    rows: &[usize],
    width: usize,
    cfg: &Config,
) -> Vec<String> {
    rows.iter()
        .flat_map(|&row| {
            series.iter().map(move |(view, color)| {
                horizontal_bar(scale.eighths(view, row, width), width, *color, cfg)
            })
        })
        .collect()
}

/// Column placement of upward bars: one group per data row, one bar per
/// series inside each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    pub groups: usize,
    pub group_width: usize,
    pub bar_width: usize,
    pub series: usize,
}

impl GroupLayout {
    /// `None` if `area_width` cannot give every bar at least one column.
    #[must_use]
    pub fn new(area_width: usize, groups: usize, series: usize) -> Option<Self> {
        let series = series.max(1);
        if groups == 0 {
            return None;
        }
        let group_width = area_width / groups;
        if group_width < series {
            return None;
        }
        // one blank column between groups once there is room for it
        let usable = if group_width > series {
            group_width - 1
        } else {
            group_width
        };
        Some(Self {
            groups,
            group_width,
            bar_width: usable / series,
            series,
        })
    }

    /// Smallest area that fits `groups` groups of `series` bars.
    #[inline]
    #[must_use]
    pub fn min_width(groups: usize, series: usize) -> usize {
        groups * series.max(1)
    }

    /// First column of bar `s` in group `g`.
    #[inline]
    #[must_use]
    pub fn bar_start(&self, g: usize, s: usize) -> usize {
        g * self.group_width + s * self.bar_width
    }

    /// Column a group's tick sits on.
    #[inline]
    #[must_use]
    pub fn center(&self, g: usize) -> usize {
        let span = self.bar_width * self.series;
        g * self.group_width + span.saturating_sub(1) / 2
    }
}

/// `height` body rows, top first, of upward bars laid out by `layout`.
#[must_use]
pub fn horizontal_rows(
    scale: &BarScale,
    series: &[(ColumnView<'_>, Rgb)],
    rows: &[usize],
    layout: &GroupLayout,
    width: usize,
    height: usize,
    cfg: &Config,
) -> Vec<String> {
    // per column: (bar length in eighths, colour)
    let mut columns: Vec<Option<(usize, Rgb)>> = vec![None; width];
    for (g, &row) in rows.iter().enumerate() {
        for (s, (view, color)) in series.iter().enumerate() {
            let len = scale.eighths(view, row, height);
            let start = layout.bar_start(g, s);
            for col in columns.iter_mut().skip(start).take(layout.bar_width) {
                *col = Some((len, *color));
            }
        }
    }
    (0..height)
        .rev()
        .map(|level| {
            let mut runs = Runs::new(cfg.color);
            for col in &columns {
                match col.and_then(|(len, c)| vertical_bar_cell(len, level, cfg).map(|ch| (ch, c))) {
                    Some((ch, c)) => runs.push(ch, Some(c)),
                    None => runs.push(' ', None),
                }
            }
            runs.finish()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::char_len;

    fn plain() -> Config {
        Config::builder().color(false).build().unwrap()
    }

    #[test]
    fn scale_spans_zero_to_max() {
        let v = [2.0, 4.0];
        let s = BarScale::new(&[ColumnView::Double(&v)], &[true, true]);
        assert_eq!(s.extent(), Extent { lo: 0.0, hi: 4.0 });
        assert_eq!(s.eighths(&ColumnView::Double(&v), 0, 10), 40);
        assert_eq!(s.eighths(&ColumnView::Double(&v), 1, 10), 80);
    }

    #[test]
    fn integer_scale_handles_extremes() {
        let v = [i64::MAX, 0];
        let view = ColumnView::Int(&v);
        let s = BarScale::new(&[view], &[true, true]);
        assert_eq!(s.eighths(&view, 0, 4), 32);
        assert_eq!(s.eighths(&view, 1, 4), 0);
    }

    #[test]
    fn mixed_types_fall_back_to_float_scale() {
        let a = [1i64, 2];
        let b = [4.0, 0.5];
        let views = [ColumnView::Int(&a), ColumnView::Double(&b)];
        let s = BarScale::new(&views, &[true, true]);
        assert_eq!(s.eighths(&views[0], 1, 2), 8);
    }

    #[test]
    fn horizontal_bar_uses_partial_blocks() {
        let cfg = plain();
        assert_eq!(horizontal_bar(11, 4, Rgb::fake_zero(), &cfg), "█▍  ");
        assert_eq!(horizontal_bar(0, 3, Rgb::fake_zero(), &cfg), "   ");
        assert_eq!(horizontal_bar(99, 2, Rgb::fake_zero(), &cfg), "██");
    }

    #[test]
    fn coloured_bar_is_reset_once() {
        let cfg = Config::default();
        let bar = horizontal_bar(16, 3, Rgb::new(1, 2, 3), &cfg);
        assert_eq!(bar, "\x1b[38;2;1;2;3m██\x1b[0m ");
    }

    #[test]
    fn vertical_cells_stack() {
        let cfg = plain();
        assert_eq!(vertical_bar_cell(12, 0, &cfg), Some('█'));
        assert_eq!(vertical_bar_cell(12, 1, &cfg), Some('▄'));
        assert_eq!(vertical_bar_cell(12, 2, &cfg), None);
    }

    #[test]
    fn group_layout_leaves_gaps() {
        let l = GroupLayout::new(10, 3, 1).unwrap();
        assert_eq!((l.group_width, l.bar_width), (3, 2));
        assert_eq!(l.bar_start(2, 0), 6);
        let m = GroupLayout::new(12, 2, 2).unwrap();
        assert_eq!((m.group_width, m.bar_width), (6, 2));
        assert_eq!(m.bar_start(1, 1), 8);
        assert!(GroupLayout::new(3, 2, 2).is_none());
        assert_eq!(GroupLayout::min_width(2, 2), 4);
    }

    #[test]
    fn upward_rows_have_fixed_width() {
        let cfg = plain();
        let v = [1.0, 3.0];
        let view = ColumnView::Double(&v);
        let scale = BarScale::new(&[view], &[true, true]);
        let layout = GroupLayout::new(6, 2, 1).unwrap();
        let rows = horizontal_rows(&scale, &[(view, Rgb::fake_zero())], &[0, 1], &layout, 6, 3, &cfg);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| char_len(r) == 6));
        assert_eq!(rows[2], "██ ██ ");
        assert_eq!(rows[0], "   ██ ");
    }
}
