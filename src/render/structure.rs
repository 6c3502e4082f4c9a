//! Plot structure: numeric geometry plus every string fragment of the frame.
//!
//! All plot kinds run the same ordered build sequence:
//!
//! `descriptors → axis names → left labels → right labels → left axis →
//! right axis → corners → top → bottom → body`
//!
//! A kind's `Steps` table names the function used for each step.  Kinds
//! override only what differs and inherit the rest from `DEFAULT`, or from
//! the kind they refine (multi-line refines scatter).

use tracing::{debug, trace, warn};

use crate::{
    core::{
        bounds::Extent,
        color::{Rgb, paint},
        config::Config,
        data::DataStore,
        error::BuildError,
        format::{center, char_len, elide_middle, format_number, pad_right},
    },
    render::{
        axis::{axis_with_ticks, guess_steps, place_labels, tick_positions, vertical_labels, vertical_text},
        bars::{BarScale, GroupLayout, horizontal_rows, vertical_rows},
        braille::Canvas,
        mixer::ColorMixer,
    },
    resolve::{HeightPolicy, PlotKind, ResolvedPlot},
};

/// Tick count used to size numeric label columns before the real step
/// count is known.
const LABEL_PROBE_STEPS: usize = 24;
/// Left axis + right axis
const AXIS_COLUMNS: usize = 2;
/// Vertical name glyph + one space
const NAME_GUTTER: usize = 2;
/// Space, legend mark, space
const LEGEND_PREFIX: usize = 3;

/// Sizes of every region of the frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Total columns of every output line
    pub width: usize,
    pub area_width: usize,
    pub area_height: usize,
    pub name_gutter: usize,
    pub left_label_width: usize,
    pub right_label_width: usize,
    pub show_vertical_name: bool,
    pub show_bottom_labels: bool,
    pub show_bottom_name: bool,
    pub horizontal_steps: usize,
    pub vertical_steps: usize,
    /// Tick columns inside the area
    pub horizontal_ticks: Vec<usize>,
    /// Tick rows inside the area, 0 = top body row
    pub vertical_ticks: Vec<usize>,
}

impl Geometry {
    #[inline]
    #[must_use]
    pub fn header_rows(&self) -> usize {
        1
    }

    #[inline]
    #[must_use]
    pub fn footer_rows(&self) -> usize {
        1 + usize::from(self.show_bottom_labels) + usize::from(self.show_bottom_name)
    }

    #[inline]
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.header_rows() + self.area_height + self.footer_rows()
    }

    /// Columns left of the left axis.
    #[inline]
    #[must_use]
    pub fn left_pad(&self) -> usize {
        self.name_gutter + self.left_label_width
    }
}

/// One coloured entity of the plot: a value column or a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
}

/// Materialised layout of one render; borrows the data and the request.
#[derive(Debug)]
pub struct PlotStructure<'a> {
    ds: &'a DataStore,
    plot: &'a ResolvedPlot,
    cfg: &'a Config,
    geometry: Geometry,

    rows: Vec<usize>,
    series: Vec<Series>,
    /// Category index of each entry of `rows` when a category column is set
    row_series: Vec<usize>,
    x_extent: Extent,
    y_extent: Extent,
    bar_scale: Option<BarScale>,
    layout: Option<GroupLayout>,

    pub(crate) left_name: Vec<char>,
    pub(crate) left_labels: Vec<String>,
    pub(crate) right_labels: Vec<String>,
    pub(crate) left_axis: Vec<char>,
    pub(crate) right_axis: Vec<char>,
    pub(crate) corners: [char; 4],
    pub(crate) top_line: String,
    pub(crate) bottom_line: String,
    pub(crate) bottom_labels: Option<String>,
    pub(crate) bottom_name: Option<String>,
    pub(crate) body: Vec<String>,
}

impl<'a> PlotStructure<'a> {
    fn new(ds: &'a DataStore, plot: &'a ResolvedPlot, cfg: &'a Config) -> Self {
        let g = &cfg.glyphs;
        Self {
            ds,
            plot,
            cfg,
            geometry: Geometry {
                width: plot.width,
                ..Geometry::default()
            },
            rows: Vec::new(),
            series: Vec::new(),
            row_series: Vec::new(),
            x_extent: Extent { lo: 0.0, hi: 1.0 },
            y_extent: Extent { lo: 0.0, hi: 1.0 },
            bar_scale: None,
            layout: None,
            left_name: Vec::new(),
            left_labels: Vec::new(),
            right_labels: Vec::new(),
            left_axis: Vec::new(),
            right_axis: Vec::new(),
            corners: [g.corner_tl, g.corner_tr, g.corner_bl, g.corner_br],
            top_line: String::new(),
            bottom_line: String::new(),
            bottom_labels: None,
            bottom_name: None,
            body: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &[String] {
        &self.body
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PlotKind {
        self.plot.kind
    }

    fn label_text(&self, row: usize) -> String {
        self.ds.view(self.plot.label).label(row)
    }

    fn elide(&self, s: &str, width: usize) -> String {
        let g = &self.cfg.glyphs;
        elide_middle(s, width, self.cfg.elision_floor, g.ellipsis, g.dot_fill)
    }

    fn value_series(&self) -> Vec<Series> {
        self.plot
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| Series {
                name: self.ds.name(v).to_owned(),
                color: self.plot.palette[i % self.plot.palette.len()],
            })
            .collect()
    }

    fn value_extent(&self) -> Extent {
        let views: Vec<_> = self.plot.values.iter().map(|&v| self.ds.view(v)).collect();
        Extent::of_columns(&views, &self.plot.included)
    }

    fn label_width_for(&self, extent: Extent) -> usize {
        (0..=LABEL_PROBE_STEPS)
            .map(|i| char_len(&format_number(extent.tick_value(i, LABEL_PROBE_STEPS), self.plot.auto_format)))
            .max()
            .unwrap_or(1)
            .min(self.cfg.max_label_width)
    }

    fn legend_width(&self) -> usize {
        let wanted = self.series.len() > 1 || self.plot.category.is_some();
        if !self.plot.legend || !wanted {
            return 0;
        }
        let longest = self
            .series
            .iter()
            .map(|s| char_len(&s.name))
            .max()
            .unwrap_or(0)
            .min(self.cfg.max_legend_width);
        LEGEND_PREFIX + longest
    }
}

// --- Step tables ---

type Step = fn(&mut PlotStructure<'_>) -> Result<(), BuildError>;

/// Function used for each build step of one plot kind.
#[derive(Clone, Copy)]
struct Steps {
    descriptors: Step,
    axis_names: Step,
    left_labels: Step,
    right_labels: Step,
    left_axis: Step,
    right_axis: Step,
    corners: Step,
    top: Step,
    bottom: Step,
    body: Step,
}

impl Steps {
    fn sequence(&self) -> [(&'static str, Step); 10] {
        [
            ("descriptors", self.descriptors),
            ("axis names", self.axis_names),
            ("left labels", self.left_labels),
            ("right labels", self.right_labels),
            ("left axis", self.left_axis),
            ("right axis", self.right_axis),
            ("corners", self.corners),
            ("top", self.top),
            ("bottom", self.bottom),
            ("body", self.body),
        ]
    }

    fn for_kind(kind: PlotKind) -> &'static Steps {
        match kind {
            PlotKind::BarVertical | PlotKind::BarMultiVertical => &BAR_VERTICAL,
            PlotKind::BarHorizontalSingle | PlotKind::BarHorizontalMulti => &BAR_HORIZONTAL,
            PlotKind::Scatter => &SCATTER,
            PlotKind::MultiLine => &MULTI_LINE,
        }
    }
}

const DEFAULT: Steps = Steps {
    descriptors: descriptors_xy,
    axis_names: label_axis_names,
    left_labels: numeric_left_labels,
    right_labels: legend,
    left_axis: ticked_left_axis,
    right_axis: plain_right_axis,
    corners,
    top: plain_top,
    bottom: numeric_bottom,
    body: no_op,
};

const BAR_VERTICAL: Steps = Steps {
    descriptors: descriptors_bar_vertical,
    axis_names: value_axis_names,
    left_labels: row_labels,
    body: body_bar_vertical,
    ..DEFAULT
};

const BAR_HORIZONTAL: Steps = Steps {
    descriptors: descriptors_bar_horizontal,
    bottom: group_bottom,
    body: body_bar_horizontal,
    ..DEFAULT
};

const SCATTER: Steps = Steps {
    body: body_scatter,
    ..DEFAULT
};

const MULTI_LINE: Steps = Steps {
    body: body_line,
    ..SCATTER
};

/// Lay out `plot` over `ds`.
pub fn build<'a>(
    ds: &'a DataStore,
    plot: &'a ResolvedPlot,
    cfg: &'a Config,
) -> Result<PlotStructure<'a>, BuildError> {
    let mut s = PlotStructure::new(ds, plot, cfg);
    for (name, step) in Steps::for_kind(plot.kind).sequence() {
        step(&mut s)?;
        trace!(step = name, "build step done");
    }
    let g = &s.geometry;
    debug_assert_eq!(s.body.len(), g.area_height);
    debug!(
        kind = %plot.kind,
        width = g.width,
        area_width = g.area_width,
        area_height = g.area_height,
        rows = g.total_rows(),
        "plot structure built"
    );
    Ok(s)
}

#[allow(clippy::unnecessary_wraps)]
fn no_op(_: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    Ok(())
}

// --- Descriptors ---

/// Fit the area into the target width; fails below the configured minimum.
fn fit_area_width(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &mut s.geometry;
    let fixed = g.left_pad() + AXIS_COLUMNS + g.right_label_width;
    let got = g.width.saturating_sub(fixed);
    if got < s.cfg.min_area_width {
        return Err(BuildError::AreaTooNarrow {
            min: s.cfg.min_area_width,
            got,
        });
    }
    g.area_width = got;
    Ok(())
}

/// Area height from the explicit total height, or from the area width.
/// A derived height grows to fit one legend entry per series.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn fit_area_height(s: &mut PlotStructure<'_>, aspect: f64) -> Result<(), BuildError> {
    let g = &mut s.geometry;
    let legend_rows = if g.right_label_width > 0 { s.series.len() } else { 0 };
    let got = match s.plot.height {
        HeightPolicy::Exact(h) => h.saturating_sub(g.header_rows() + g.footer_rows()),
        HeightPolicy::Derived => ((g.area_width as f64 * aspect).round() as usize).max(legend_rows),
    };
    if got < s.cfg.min_area_height {
        return Err(BuildError::AreaTooShort {
            min: s.cfg.min_area_height,
            got,
        });
    }
    g.area_height = got;
    Ok(())
}

fn numeric_ticks(s: &mut PlotStructure<'_>) {
    let cfg = s.cfg;
    let g = &mut s.geometry;
    g.horizontal_steps = guess_steps(g.area_width, cfg.horizontal_label_pitch);
    g.horizontal_ticks = tick_positions(g.area_width, g.horizontal_steps);
    g.vertical_steps = guess_steps(g.area_height, cfg.vertical_label_pitch);
    let h = g.area_height;
    g.vertical_ticks = tick_positions(h, g.vertical_steps)
        .into_iter()
        .map(|p| h - 1 - p)
        .collect();
}

fn collect_rows(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    s.rows = s.plot.included_rows().collect();
    if s.rows.is_empty() {
        return Err(BuildError::NoRows);
    }
    Ok(())
}

fn descriptors_xy(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    collect_rows(s)?;
    let (ds, plot) = (s.ds, s.plot);

    if let Some(cat) = plot.category {
        let view = ds.view(cat);
        let mut names: Vec<String> = Vec::new();
        s.row_series = s
            .rows
            .iter()
            .map(|&r| {
                let label = view.label(r);
                names.iter().position(|n| *n == label).unwrap_or_else(|| {
                    names.push(label);
                    names.len() - 1
                })
            })
            .collect();
        s.series = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Series {
                name,
                color: plot.palette[i % plot.palette.len()],
            })
            .collect();
    } else {
        s.series = s.value_series();
    }

    s.x_extent = if plot.kind == PlotKind::MultiLine {
        row_order_extent(s)
    } else {
        Extent::of_columns(&[ds.view(plot.label)], &plot.included)
    };
    s.y_extent = s.value_extent();

    let aspect = if plot.kind == PlotKind::MultiLine {
        s.cfg.aspect_line
    } else {
        s.cfg.aspect_scatter
    };
    let show_vertical_name = plot.axis_names && plot.values.len() == 1;
    let left_label_width = if plot.axis_labels {
        s.label_width_for(s.y_extent) + 1
    } else {
        0
    };
    let right_label_width = s.legend_width();
    let g = &mut s.geometry;
    g.show_vertical_name = show_vertical_name;
    g.name_gutter = if show_vertical_name { NAME_GUTTER } else { 0 };
    g.left_label_width = left_label_width;
    g.right_label_width = right_label_width;
    g.show_bottom_labels = plot.axis_labels;
    g.show_bottom_name = plot.axis_names;

    fit_area_width(s)?;
    fit_area_height(s, aspect)?;
    numeric_ticks(s);
    Ok(())
}

/// Label values at the first and last plotted rows, in row order.  Lines
/// are drawn against the row index, so a descending label column yields a
/// descending axis.
fn row_order_extent(s: &PlotStructure<'_>) -> Extent {
    let x = s.ds.view(s.plot.label);
    let at = |row: Option<&usize>| row.and_then(|&r| x.value_f64(r)).filter(|v| v.is_finite());
    match (at(s.rows.first()), at(s.rows.last())) {
        (Some(lo), Some(hi)) if (hi - lo).abs() > f64::EPSILON => Extent { lo, hi },
        _ => Extent::of_columns(&[x], &s.plot.included),
    }
}

fn descriptors_bar_vertical(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    collect_rows(s)?;
    let plot = s.plot;
    s.series = s.value_series();
    let ds = s.ds;
    let views: Vec<_> = plot.values.iter().map(|&v| ds.view(v)).collect();
    let scale = BarScale::new(&views, &plot.included);
    s.x_extent = scale.extent();
    s.bar_scale = Some(scale);

    let longest = s
        .rows
        .iter()
        .map(|&r| char_len(&s.label_text(r)))
        .max()
        .unwrap_or(0)
        .min(s.cfg.max_label_width);
    let right_label_width = s.legend_width();
    let per_row = plot.values.len().max(1);
    let g = &mut s.geometry;
    g.left_label_width = longest + 1;
    g.right_label_width = right_label_width;
    g.show_bottom_labels = plot.axis_labels;
    g.show_bottom_name = plot.axis_names;
    g.area_height = s.rows.len() * per_row;
    match plot.height {
        HeightPolicy::Exact(h) if h != g.total_rows() => warn!(
            requested = h,
            used = g.total_rows(),
            "vertical bars take one row per value, ignoring the requested height"
        ),
        _ => {}
    }
    fit_area_width(s)?;

    let cfg = s.cfg;
    let g = &mut s.geometry;
    g.horizontal_steps = guess_steps(g.area_width, cfg.horizontal_label_pitch);
    g.horizontal_ticks = tick_positions(g.area_width, g.horizontal_steps);
    g.vertical_steps = g.area_height.saturating_sub(1);
    g.vertical_ticks = (0..g.area_height).step_by(per_row).collect();
    Ok(())
}

fn descriptors_bar_horizontal(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    collect_rows(s)?;
    let plot = s.plot;
    s.series = s.value_series();
    let ds = s.ds;
    let views: Vec<_> = plot.values.iter().map(|&v| ds.view(v)).collect();
    let scale = BarScale::new(&views, &plot.included);
    s.y_extent = scale.extent();
    s.bar_scale = Some(scale);

    let left_label_width = if plot.axis_labels {
        s.label_width_for(s.y_extent) + 1
    } else {
        0
    };
    let right_label_width = s.legend_width();
    let g = &mut s.geometry;
    g.left_label_width = left_label_width;
    g.right_label_width = right_label_width;
    g.show_bottom_labels = true;
    g.show_bottom_name = plot.axis_names;
    let aspect = s.cfg.aspect_bar_horizontal;
    fit_area_width(s)?;
    fit_area_height(s, aspect)?;
    numeric_ticks(s);

    let (groups, series) = (s.rows.len(), plot.values.len());
    let area_width = s.geometry.area_width;
    let layout = GroupLayout::new(area_width, groups, series).ok_or(BuildError::AreaTooNarrow {
        min: GroupLayout::min_width(groups, series),
        got: area_width,
    })?;
    s.geometry.horizontal_steps = groups.saturating_sub(1);
    s.geometry.horizontal_ticks = (0..groups).map(|g| layout.center(g)).collect();
    s.layout = Some(layout);
    Ok(())
}

// --- Axis names ---

fn set_vertical_name(s: &mut PlotStructure<'_>, name: &str) {
    if s.geometry.show_vertical_name {
        let g = &s.cfg.glyphs;
        s.left_name = vertical_text(
            name,
            s.geometry.area_height,
            s.cfg.elision_floor,
            g.ellipsis,
            g.dot_fill,
        );
    }
}

fn set_bottom_name(s: &mut PlotStructure<'_>, name: &str) {
    if s.geometry.show_bottom_name {
        let w = s.geometry.area_width;
        s.bottom_name = Some(center(&s.elide(name, w), w));
    }
}

/// Label column along the bottom, the single value column up the side.
#[allow(clippy::unnecessary_wraps)]
fn label_axis_names(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let (ds, plot) = (s.ds, s.plot);
    if let Some(&v) = plot.values.first() {
        set_vertical_name(s, ds.name(v));
    }
    set_bottom_name(s, ds.name(plot.label));
    Ok(())
}

/// Value columns along the bottom.
#[allow(clippy::unnecessary_wraps)]
fn value_axis_names(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let (ds, plot) = (s.ds, s.plot);
    let names: Vec<&str> = plot.values.iter().map(|&v| ds.name(v)).collect();
    set_bottom_name(s, &names.join(", "));
    Ok(())
}

// --- Labels ---

#[allow(clippy::unnecessary_wraps)]
fn numeric_left_labels(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &s.geometry;
    let steps = g.vertical_ticks.len().saturating_sub(1);
    let labels: Vec<(usize, String)> = g
        .vertical_ticks
        .iter()
        .enumerate()
        .map(|(i, &row)| (row, format_number(s.y_extent.tick_value(i, steps), s.plot.auto_format)))
        .collect();
    s.left_labels = if g.left_label_width == 0 {
        vec![String::new(); g.area_height]
    } else {
        vertical_labels(g.area_height, g.left_label_width, &labels)
    };
    Ok(())
}

/// Data-row labels; the first body row of each row group carries one.
#[allow(clippy::unnecessary_wraps)]
fn row_labels(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &s.geometry;
    let width = g.left_label_width.saturating_sub(1);
    let labels: Vec<(usize, String)> = g
        .vertical_ticks
        .iter()
        .zip(&s.rows)
        .map(|(&body_row, &row)| (body_row, s.elide(&s.label_text(row), width)))
        .collect();
    s.left_labels = vertical_labels(g.area_height, g.left_label_width, &labels);
    Ok(())
}

/// One entry per series.  When an explicit height leaves too few rows the
/// last row counts the entries left out.
#[allow(clippy::unnecessary_wraps)]
fn legend(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &s.geometry;
    let w = g.right_label_width;
    let mut rows = vec![" ".repeat(w); g.area_height];
    if w > 0 {
        let overflow = s.series.len() > rows.len();
        let shown = if overflow {
            rows.len().saturating_sub(1)
        } else {
            s.series.len()
        };
        let mark = s.cfg.glyphs.legend_mark.to_string();
        for (slot, series) in rows.iter_mut().zip(&s.series[..shown]) {
            let name = s.elide(&series.name, w - LEGEND_PREFIX);
            *slot = format!(
                " {} {}",
                paint(s.cfg.color, series.color, &mark),
                pad_right(&name, w - LEGEND_PREFIX)
            );
        }
        if overflow {
            let hidden = s.series.len() - shown;
            debug!(hidden, "legend truncated by the plot height");
            let more = s.elide(&format!("+{hidden} more"), w - 1);
            if let Some(last) = rows.last_mut() {
                *last = format!(" {}", pad_right(&more, w - 1));
            }
        }
    }
    s.right_labels = rows;
    Ok(())
}

// --- Axis lines ---

#[allow(clippy::unnecessary_wraps)]
fn ticked_left_axis(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let glyphs = &s.cfg.glyphs;
    let g = &s.geometry;
    let mut axis = vec![glyphs.vertical; g.area_height];
    for &row in g.vertical_ticks.iter().filter(|&&r| r < g.area_height) {
        axis[row] = glyphs.tick_left;
    }
    s.left_axis = axis;
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn plain_right_axis(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    s.right_axis = vec![s.cfg.glyphs.vertical; s.geometry.area_height];
    Ok(())
}

/// Box corners; the bottom-left one becomes an area corner when both
/// adjoining axes carry labels.
#[allow(clippy::unnecessary_wraps)]
fn corners(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let glyphs = &s.cfg.glyphs;
    let g = &s.geometry;
    let mut c = [glyphs.corner_tl, glyphs.corner_tr, glyphs.corner_bl, glyphs.corner_br];
    if g.left_label_width > 0 && g.show_bottom_labels {
        c[2] = glyphs.area_corners[2];
    }
    s.corners = c;
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn plain_top(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    s.top_line = s
        .cfg
        .glyphs
        .horizontal
        .to_string()
        .repeat(s.geometry.area_width);
    Ok(())
}

fn bottom_line(s: &mut PlotStructure<'_>) {
    let glyphs = &s.cfg.glyphs;
    let g = &s.geometry;
    s.bottom_line = axis_with_ticks(
        g.area_width,
        &g.horizontal_ticks,
        glyphs.horizontal,
        glyphs.tick_bottom,
    );
}

#[allow(clippy::unnecessary_wraps)]
fn numeric_bottom(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    bottom_line(s);
    let g = &s.geometry;
    if g.show_bottom_labels {
        let steps = g.horizontal_ticks.len().saturating_sub(1);
        let labels: Vec<(usize, String)> = g
            .horizontal_ticks
            .iter()
            .enumerate()
            .map(|(i, &col)| (col, format_number(s.x_extent.tick_value(i, steps), s.plot.auto_format)))
            .collect();
        s.bottom_labels = Some(place_labels(g.area_width, &labels));
    }
    Ok(())
}

/// One elided row label under each bar group.
#[allow(clippy::unnecessary_wraps)]
fn group_bottom(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    bottom_line(s);
    let Some(layout) = s.layout else {
        unreachable!("horizontal bar descriptors set the group layout");
    };
    let mut line = String::with_capacity(s.geometry.area_width);
    for &row in &s.rows {
        line.push_str(&pad_right(
            &s.elide(&s.label_text(row), layout.group_width),
            layout.group_width,
        ));
    }
    s.bottom_labels = Some(pad_right(&line, s.geometry.area_width));
    Ok(())
}

// --- Bodies ---

fn bar_series<'s>(s: &'s PlotStructure<'_>) -> Vec<(crate::core::data::ColumnView<'s>, Rgb)> {
    s.plot
        .values
        .iter()
        .zip(&s.series)
        .map(|(&v, series)| (s.ds.view(v), series.color))
        .collect()
}

#[allow(clippy::unnecessary_wraps)]
fn body_bar_vertical(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let Some(scale) = s.bar_scale else {
        unreachable!("bar descriptors set the scale");
    };
    let series = bar_series(s);
    let body = vertical_rows(&scale, &series, &s.rows, s.geometry.area_width, s.cfg);
    s.body = body;
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn body_bar_horizontal(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let (Some(scale), Some(layout)) = (s.bar_scale, s.layout) else {
        unreachable!("bar descriptors set the scale and layout");
    };
    let series = bar_series(s);
    let g = &s.geometry;
    let body = horizontal_rows(
        &scale,
        &series,
        &s.rows,
        &layout,
        g.area_width,
        g.area_height,
        s.cfg,
    );
    s.body = body;
    Ok(())
}

fn finish_canvas(s: &mut PlotStructure<'_>, canvas: &Canvas) {
    let mixer = s.cfg.color.then(|| {
        let colors = s.series.iter().map(|x| x.color).collect();
        ColorMixer::new(colors, s.cfg, canvas.max_counts())
    });
    s.body = canvas.rows(mixer.as_ref());
}

#[allow(clippy::unnecessary_wraps)]
fn body_scatter(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &s.geometry;
    let mut canvas = Canvas::new(g.area_width, g.area_height, s.series.len());
    let x = s.ds.view(s.plot.label);
    for (k, &row) in s.rows.iter().enumerate() {
        let Some(fx) = x.value_f64(row).filter(|v| v.is_finite()) else {
            continue;
        };
        let fx = s.x_extent.fraction(fx);
        for (j, &v) in s.plot.values.iter().enumerate() {
            let Some(y) = s.ds.view(v).value_f64(row).filter(|v| v.is_finite()) else {
                continue;
            };
            let series = if s.plot.category.is_some() {
                s.row_series[k]
            } else {
                j
            };
            canvas.place(fx, s.y_extent.fraction(y), series);
        }
    }
    finish_canvas(s, &canvas);
    Ok(())
}

/// Series drawn against the row index, spread evenly across the width.
#[allow(clippy::unnecessary_wraps, clippy::cast_precision_loss)]
fn body_line(s: &mut PlotStructure<'_>) -> Result<(), BuildError> {
    let g = &s.geometry;
    let mut canvas = Canvas::new(g.area_width, g.area_height, s.series.len());
    let multipliers = (
        s.cfg.line_horizontal_multiplier,
        s.cfg.line_vertical_multiplier,
    );
    let last = s.rows.len().saturating_sub(1);
    for (j, &v) in s.plot.values.iter().enumerate() {
        let view = s.ds.view(v);
        let mut prev = None;
        for (k, &row) in s.rows.iter().enumerate() {
            let Some(y) = view.value_f64(row).filter(|v| v.is_finite()) else {
                // a gap in the data breaks the line
                prev = None;
                continue;
            };
            let fx = if last == 0 { 0.5 } else { k as f64 / last as f64 };
            let here = canvas.to_pixel(fx, s.y_extent.fraction(y));
            match prev {
                Some(from) => canvas.line(from, here, j, multipliers),
                None => canvas.set(here.0, here.1, j),
            }
            prev = Some(here);
        }
    }
    finish_canvas(s, &canvas);
    Ok(())
}
