//! A collection of constants.  Every value here is only a *default*; the
//! renderer reads the live values from [`crate::core::config::Config`].

/// Braille has 2 horizontal dots and four vertical dots that can be either off or on
pub const BRAILLE_HORIZONTAL_RESOLUTION: usize = 2;
/// Braille has 2 horizontal dots and four vertical dots that can be either off or on
pub const BRAILLE_VERTICAL_RESOLUTION: usize = 4;

/// Whole plot (labels, axes and legend included) must be at least this wide
pub const MIN_PLOT_WIDTH: usize = 24;
/// And at most this wide
pub const MAX_PLOT_WIDTH: usize = 1024;
/// Used when the terminal size is unknown
pub const DEFAULT_PLOT_WIDTH: usize = 72;
/// Share of the terminal width a plot takes when no width was requested
pub const DEFAULT_WIDTH_FRACTION: f64 = 0.7;

/// Plot area (between the axis lines) must be at least 8 characters wide
pub const MIN_AREA_WIDTH: usize = 8;
/// Plot area must be at least 3 characters tall
pub const MIN_AREA_HEIGHT: usize = 3;
/// Explicit plot height must leave room for the area plus both axis lines
pub const MIN_PLOT_HEIGHT: usize = MIN_AREA_HEIGHT + 2;

/// Longest row label kept before eliding
pub const MAX_LABEL_WIDTH: usize = 24;
/// Longest legend entry kept before eliding
pub const MAX_LEGEND_WIDTH: usize = 20;
/// Below this width labels are truncated to one char and dot-filled
pub const LABEL_ELISION_FLOOR: usize = 4;

/// Horizontal distance between two numeric tick labels
pub const HORIZONTAL_LABEL_PITCH: usize = 12;
/// Vertical distance between two numeric tick labels
pub const VERTICAL_LABEL_PITCH: usize = 4;

/// Most categories (and series) one plot can tell apart by color
pub const MAX_CATEGORIES: usize = 6;
/// Scatter plots take at most this many value columns
pub const MAX_SCATTER_VALUES: usize = 6;
/// Line plots take at most this many value columns
pub const MAX_LINE_VALUES: usize = 3;
/// Multi-value bar plots take at most this many value columns
pub const MAX_BAR_VALUES: usize = 6;

/// Accepted relative deviation of one step above the mean step
pub const TS_TOLERANCE_UPPER: f64 = 0.1;
/// Accepted relative deviation of one step below the mean step
pub const TS_TOLERANCE_LOWER: f64 = 0.1;

/// Interpolated points per horizontal dot of distance
pub const LINE_HORIZONTAL_MULTIPLIER: f64 = 1.0;
/// Interpolated points per vertical dot of distance
pub const LINE_VERTICAL_MULTIPLIER: f64 = 1.0;

/// area height = area width * ratio
pub const ASPECT_SCATTER: f64 = 0.35;
pub const ASPECT_LINE: f64 = 0.3;
pub const ASPECT_BAR_HORIZONTAL: f64 = 0.3;

/// Dimmest share of a series color a lone dot is drawn with
pub const MIN_BLEND_INTENSITY: f64 = 0.45;

/// Numbers printed without SI rebasing keep at most this many decimals
pub const DECIMAL_PRECISION: usize = 2;
