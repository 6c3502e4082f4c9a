//! Turns a partially filled [`DesiredPlot`] into a [`ResolvedPlot`].
//!
//! Resolution is a fixed list of stages run in order; each either advances
//! the working [`Draft`] or stops the pipeline with a [`ResolveError`].
//! There is no backtracking.

mod stages;

use std::{fmt, str::FromStr};

use tracing::{debug, trace};

use crate::core::{
    assess::{Assessment, assess_store},
    color::Palette,
    config::Config,
    data::DataStore,
    error::ResolveError,
};

/// Chart family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlotKind {
    /// One row per record, bar grows to the right.
    BarVertical,
    /// One row per (record, value column).
    BarMultiVertical,
    /// One column group per record, bar grows upwards.
    BarHorizontalSingle,
    /// One column group per record holding one bar per value column.
    BarHorizontalMulti,
    Scatter,
    MultiLine,
}

impl PlotKind {
    pub const ALL: [Self; 6] = [
        Self::BarVertical,
        Self::BarMultiVertical,
        Self::BarHorizontalSingle,
        Self::BarHorizontalMulti,
        Self::Scatter,
        Self::MultiLine,
    ];

    #[inline]
    #[must_use]
    pub fn is_bar(self) -> bool {
        !matches!(self, Self::Scatter | Self::MultiLine)
    }

    /// Short name accepted by [`FromStr`].
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::BarVertical => "barv",
            Self::BarMultiVertical => "barvm",
            Self::BarHorizontalSingle => "barhs",
            Self::BarHorizontalMulti => "barhm",
            Self::Scatter => "scatter",
            Self::MultiLine => "line",
        }
    }

    /// Allowed number of value columns.
    #[must_use]
    pub fn value_range(self, cfg: &Config, has_category: bool) -> (usize, usize) {
        match self {
            Self::BarVertical | Self::BarHorizontalSingle => (1, 1),
            Self::BarMultiVertical | Self::BarHorizontalMulti => (2, cfg.max_bar_values),
            Self::Scatter if has_category => (1, 1),
            Self::Scatter => (1, cfg.max_scatter_values),
            Self::MultiLine => (1, cfg.max_line_values),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BarVertical => "vertical bar",
            Self::BarMultiVertical => "multi-value vertical bar",
            Self::BarHorizontalSingle => "horizontal bar",
            Self::BarHorizontalMulti => "multi-value horizontal bar",
            Self::Scatter => "scatter plot",
            Self::MultiLine => "multi-line plot",
        })
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| {
                let keys: Vec<_> = Self::ALL.iter().map(|k| k.key()).collect();
                format!("unknown plot kind `{s}`, expected one of {}", keys.join(", "))
            })
    }
}

/// A column named by index, by name, or both (which must then agree).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnRef {
    pub id: Option<usize>,
    pub name: Option<String>,
}

impl ColumnRef {
    #[must_use]
    pub fn id(id: usize) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Purely numeric text is an index, anything else a name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        s.parse::<usize>().map_or_else(|_| Self::name(s), Self::id)
    }
}

/// How tall the plot will be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightPolicy {
    /// Picked by the structure builder from the area width.
    Derived,
    /// Total rows, header and footer included.
    Exact(usize),
}

/// A plot request; any subset of fields may be set.
#[derive(Clone, Debug, Default)]
pub struct DesiredPlot {
    pub kind: Option<PlotKind>,
    pub label: Option<ColumnRef>,
    pub category: Option<ColumnRef>,
    pub values: Vec<ColumnRef>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub axis_names: Option<bool>,
    pub axis_labels: Option<bool>,
    pub auto_format: Option<bool>,
    pub legend: Option<bool>,
    pub palette: Option<Palette>,
    pub filter_sigma: Option<f64>,
}

impl DesiredPlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn kind(mut self, k: PlotKind) -> Self {
        self.kind = Some(k);
        self
    }
    #[must_use]
    pub fn label(mut self, c: ColumnRef) -> Self {
        self.label = Some(c);
        self
    }
    #[must_use]
    pub fn category(mut self, c: ColumnRef) -> Self {
        self.category = Some(c);
        self
    }
    #[must_use]
    pub fn value(mut self, c: ColumnRef) -> Self {
        self.values.push(c);
        self
    }
    #[must_use]
    pub fn width(mut self, w: usize) -> Self {
        self.width = Some(w);
        self
    }
    #[must_use]
    pub fn height(mut self, h: usize) -> Self {
        self.height = Some(h);
        self
    }
    #[must_use]
    pub fn axis_names(mut self, on: bool) -> Self {
        self.axis_names = Some(on);
        self
    }
    #[must_use]
    pub fn axis_labels(mut self, on: bool) -> Self {
        self.axis_labels = Some(on);
        self
    }
    #[must_use]
    pub fn auto_format(mut self, on: bool) -> Self {
        self.auto_format = Some(on);
        self
    }
    #[must_use]
    pub fn legend(mut self, on: bool) -> Self {
        self.legend = Some(on);
        self
    }
    #[must_use]
    pub fn palette(mut self, p: Palette) -> Self {
        self.palette = Some(p);
        self
    }
    #[must_use]
    pub fn filter_sigma(mut self, s: f64) -> Self {
        self.filter_sigma = Some(s);
        self
    }
}

/// A request with every field decided; immutable input to the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPlot {
    pub kind: PlotKind,
    /// Row labels for bars, x axis for scatter / line plots
    pub label: usize,
    pub category: Option<usize>,
    pub values: Vec<usize>,
    pub width: usize,
    pub height: HeightPolicy,
    pub axis_names: bool,
    pub axis_labels: bool,
    pub auto_format: bool,
    pub legend: bool,
    pub palette: Palette,
    pub filter_sigma: f64,
    /// Per-row inclusion mask after null and outlier filtering
    pub included: Vec<bool>,
}

impl ResolvedPlot {
    /// Indices of rows that survived filtering.
    pub fn included_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.included
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
    }

    #[must_use]
    pub fn included_count(&self) -> usize {
        self.included.iter().filter(|k| **k).count()
    }
}

/// Working state threaded through the stages.
#[derive(Debug)]
pub(crate) struct Draft<'a> {
    pub ds: &'a DataStore,
    pub cfg: &'a Config,
    pub request: &'a DesiredPlot,
    pub assessments: Vec<Assessment>,
    pub kind: Option<PlotKind>,
    pub label: Option<usize>,
    pub category: Option<usize>,
    pub values: Vec<usize>,
    pub values_explicit: bool,
    pub width: Option<usize>,
    pub height: Option<HeightPolicy>,
    pub axis_names: Option<bool>,
    pub axis_labels: Option<bool>,
    pub auto_format: Option<bool>,
    pub legend: Option<bool>,
    pub filter_sigma: f64,
    pub included: Option<Vec<bool>>,
}

type Stage = fn(&mut Draft<'_>) -> Result<(), ResolveError>;

const STAGES: [(&str, Stage); 8] = [
    ("names", stages::names_to_ids),
    ("kind", stages::infer_kind),
    ("label", stages::select_label),
    ("category", stages::select_category),
    ("values", stages::select_values),
    ("size", stages::resolve_size),
    ("flags", stages::default_flags),
    ("filter", stages::filter_rows),
];

/// Run every stage; the first failure is returned as is.
pub fn resolve(
    ds: &DataStore,
    request: &DesiredPlot,
    cfg: &Config,
) -> Result<ResolvedPlot, ResolveError> {
    let mut draft = Draft {
        ds,
        cfg,
        request,
        assessments: assess_store(ds, cfg),
        kind: request.kind,
        label: None,
        category: None,
        values: Vec::new(),
        values_explicit: false,
        width: None,
        height: None,
        axis_names: None,
        axis_labels: None,
        auto_format: None,
        legend: None,
        filter_sigma: request.filter_sigma.unwrap_or(0.0),
        included: None,
    };

    for (name, stage) in STAGES {
        stage(&mut draft)?;
        trace!(
            stage = name,
            kind = ?draft.kind,
            label = ?draft.label,
            category = ?draft.category,
            values = ?draft.values,
            "stage done"
        );
    }
    let resolved = draft.finish();
    debug!(
        kind = %resolved.kind,
        label = ds.name(resolved.label),
        category = ?resolved.category.map(|c| ds.name(c)),
        values = ?resolved.values.iter().map(|&v| ds.name(v)).collect::<Vec<_>>(),
        width = resolved.width,
        rows = resolved.included_count(),
        "plot resolved"
    );
    Ok(resolved)
}

impl Draft<'_> {
    fn finish(self) -> ResolvedPlot {
        let (Some(kind), Some(label), Some(width), Some(height), Some(included)) =
            (self.kind, self.label, self.width, self.height, self.included)
        else {
            unreachable!("every stage ran, all fields are set");
        };
        ResolvedPlot {
            kind,
            label,
            category: self.category,
            values: self.values,
            width,
            height,
            axis_names: self.axis_names.unwrap_or(false),
            axis_labels: self.axis_labels.unwrap_or(false),
            auto_format: self.auto_format.unwrap_or(true),
            legend: self.legend.unwrap_or(false),
            palette: self.request.palette.unwrap_or(self.cfg.palette),
            filter_sigma: self.filter_sigma,
            included,
        }
    }
}
