//! Centralised error types used across the crate.
//!
//! Every stage owns one closed enum; [`PlotError`] is the umbrella the
//! public entry points return.

use std::{fmt, io};

use thiserror::Error;

use crate::{core::color::ColorError, resolve::PlotKind};

/// Precise configuration faults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration missing field `{0}`")]
    MissingField(&'static str),
    #[error("min width {low} must be > 0 and <= max width {high}")]
    InvalidWidthBounds { low: usize, high: usize },
    #[error("width fraction {0} must be in (0, 1]")]
    InvalidFraction(f64),
    #[error("time-series tolerance {0} must be a non-negative number")]
    InvalidTolerance(f64),
    #[error("series limit {0} must be between 1 and the palette size")]
    SeriesLimit(usize),
}

/// Faults of the columnar store itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("column `{name}` has {got} rows, expected {want}")]
    RaggedColumns {
        name: String,
        want: usize,
        got: usize,
    },
    #[error("duplicate column name `{0}`")]
    DuplicateName(String),
    #[error("appended rows do not match the schema: {0}")]
    SchemaMismatch(String),
}

/// Which part a column plays in a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Label,
    Category,
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Label => "label",
            Self::Category => "category",
            Self::Value => "value",
        })
    }
}

/// Reasons a plot request cannot be turned into a resolved plot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no column named `{0}`")]
    UnknownColumnName(String),
    #[error("column index {index} out of range ({count} columns)")]
    ColumnIndexOutOfRange { index: usize, count: usize },
    #[error("{role} column given as index {index} and as `{name}`, which differ")]
    ConflictingColumnReference {
        role: ColumnRole,
        index: usize,
        name: String,
    },
    #[error("no numeric column left to plot as values")]
    NoUseableValueColumns,
    #[error("{kind} cannot use {role} column `{name}`: {reason}")]
    KindConflictsWithColumn {
        kind: PlotKind,
        role: ColumnRole,
        name: String,
        reason: &'static str,
    },
    #[error("{kind} needs a string label column, none found")]
    NoStringLabelColumn { kind: PlotKind },
    #[error("multi-line plot needs an evenly spaced (time-series like) column, none found")]
    NoTimeSeriesColumn,
    #[error("scatter plot needs a numeric x column, none found")]
    NoScatterXColumn,
    #[error("{kind} does not take a category column")]
    CategoryNotAllowed { kind: PlotKind },
    #[error("column `{0}` does not look like a category column")]
    NotCategoryLike(String),
    #[error("a category column cannot be combined with more than one value column")]
    CategoryWithMultipleValues,
    #[error("value column `{0}` is not numeric")]
    ValueColumnNotArithmetic(String),
    #[error("column `{name}` is already used as the {role} column")]
    ColumnAlreadyClaimed { name: String, role: ColumnRole },
    #[error("too many value columns for {kind}: at most {max}, got {got}")]
    TooManyValueColumns {
        kind: PlotKind,
        max: usize,
        got: usize,
    },
    #[error("too few value columns for {kind}: need {min}, only {got} available")]
    TooFewValueColumns {
        kind: PlotKind,
        min: usize,
        got: usize,
    },
    #[error("width too small: need at least {min}, got {got}")]
    WidthTooSmall { min: usize, got: usize },
    #[error("width too large: at most {max}, got {got}")]
    WidthTooLarge { max: usize, got: usize },
    #[error("height too small: need at least {min}, got {got}")]
    HeightTooSmall { min: usize, got: usize },
}

/// Layout faults found while building a plot structure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("plot area too narrow: need ≥{min} columns, {got} left after labels and padding")]
    AreaTooNarrow { min: usize, got: usize },
    #[error("plot area too short: need ≥{min} rows, {got} left after header and footer")]
    AreaTooShort { min: usize, got: usize },
    #[error("no rows left to plot after filtering")]
    NoRows,
}

/// Faults of the input parsers.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: malformed JSON: {source}")]
    JsonLine {
        line: usize,
        source: serde_json::Error,
    },
    #[error("input is empty")]
    Empty,
    #[error("JSON input must be an array of objects")]
    NotAnArray,
    #[error("record {record} is not an object")]
    NotAnObject { record: usize },
    #[error("record {record} has fields {got:?}, expected {want:?}")]
    InconsistentShape {
        record: usize,
        want: Vec<String>,
        got: Vec<String>,
    },
    #[error("record {record}: field `{column}` is {got}, column holds {want}")]
    TypeMismatch {
        record: usize,
        column: String,
        want: &'static str,
        got: &'static str,
    },
    #[error("record {record}: field `{column}` holds an unsupported nested value")]
    UnsupportedValue { record: usize, column: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Top-level error type bubbled up by public APIs.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("{failed} of {total} plots failed")]
    PlotsFailed { failed: usize, total: usize },
}
