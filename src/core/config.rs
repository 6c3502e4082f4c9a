//! Run-time configuration object + fluent builder.
//!
//! One `Config` is built at start-up and handed by reference to the
//! resolver, the structure builder, the canvas and the mixer.

use crate::core::{
    color::{DEFAULT_PALETTE, Palette, Rgb},
    constants as k,
    error::ConfigError,
};

/// Box-drawing and block glyphs used for axes and bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub horizontal: char,
    pub vertical: char,
    pub tick_bottom: char,
    pub tick_top: char,
    pub tick_left: char,
    pub tick_right: char,
    pub corner_tl: char,
    pub corner_tr: char,
    pub corner_bl: char,
    pub corner_br: char,
    /// Corners used when the axis labels sit flush against the corner
    pub area_corners: [char; 4],
    pub ellipsis: char,
    pub dot_fill: char,
    pub legend_mark: char,
    /// `▏` .. `█`, index = eighths - 1
    pub eighths_horizontal: [char; 8],
    /// `▁` .. `█`, index = eighths - 1
    pub eighths_vertical: [char; 8],
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            horizontal: '─',
            vertical: '│',
            tick_bottom: '┬',
            tick_top: '┴',
            tick_left: '┤',
            tick_right: '├',
            corner_tl: '┌',
            corner_tr: '┐',
            corner_bl: '└',
            corner_br: '┘',
            area_corners: ['┼', '┼', '┼', '┼'],
            ellipsis: '…',
            dot_fill: '.',
            legend_mark: '■',
            eighths_horizontal: ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'],
            eighths_vertical: ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'],
        }
    }
}

/// Immutable parameters handed to every stage.
#[derive(Debug, Clone)]
pub struct Config {
    pub min_width: usize,
    pub max_width: usize,
    pub default_width: usize,
    pub default_width_fraction: f64,
    /// Columns of the attached terminal, if any
    pub terminal_width: Option<usize>,
    pub min_height: usize,

    pub min_area_width: usize,
    pub min_area_height: usize,
    pub max_label_width: usize,
    pub max_legend_width: usize,
    pub elision_floor: usize,
    pub horizontal_label_pitch: usize,
    pub vertical_label_pitch: usize,

    pub max_categories: usize,
    pub max_scatter_values: usize,
    pub max_line_values: usize,
    pub max_bar_values: usize,

    pub ts_tolerance_upper: f64,
    pub ts_tolerance_lower: f64,

    pub line_horizontal_multiplier: f64,
    pub line_vertical_multiplier: f64,

    pub aspect_scatter: f64,
    pub aspect_line: f64,
    pub aspect_bar_horizontal: f64,

    pub palette: Palette,
    pub fake_zero: Rgb,
    pub min_blend_intensity: f64,
    pub color: bool,
    pub glyphs: Glyphs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_width: k::MIN_PLOT_WIDTH,
            max_width: k::MAX_PLOT_WIDTH,
            default_width: k::DEFAULT_PLOT_WIDTH,
            default_width_fraction: k::DEFAULT_WIDTH_FRACTION,
            terminal_width: None,
            min_height: k::MIN_PLOT_HEIGHT,
            min_area_width: k::MIN_AREA_WIDTH,
            min_area_height: k::MIN_AREA_HEIGHT,
            max_label_width: k::MAX_LABEL_WIDTH,
            max_legend_width: k::MAX_LEGEND_WIDTH,
            elision_floor: k::LABEL_ELISION_FLOOR,
            horizontal_label_pitch: k::HORIZONTAL_LABEL_PITCH,
            vertical_label_pitch: k::VERTICAL_LABEL_PITCH,
            max_categories: k::MAX_CATEGORIES,
            max_scatter_values: k::MAX_SCATTER_VALUES,
            max_line_values: k::MAX_LINE_VALUES,
            max_bar_values: k::MAX_BAR_VALUES,
            ts_tolerance_upper: k::TS_TOLERANCE_UPPER,
            ts_tolerance_lower: k::TS_TOLERANCE_LOWER,
            line_horizontal_multiplier: k::LINE_HORIZONTAL_MULTIPLIER,
            line_vertical_multiplier: k::LINE_VERTICAL_MULTIPLIER,
            aspect_scatter: k::ASPECT_SCATTER,
            aspect_line: k::ASPECT_LINE,
            aspect_bar_horizontal: k::ASPECT_BAR_HORIZONTAL,
            palette: DEFAULT_PALETTE,
            fake_zero: Rgb::fake_zero(),
            min_blend_intensity: k::MIN_BLEND_INTENSITY,
            color: true,
            glyphs: Glyphs::default(),
        }
    }
}

impl Config {
    #[inline]
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Width used when the request names none.
    #[must_use]
    pub fn derived_width(&self) -> usize {
        let w = match self.terminal_width {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            Some(cols) => (cols as f64 * self.default_width_fraction).floor() as usize,
            None => self.default_width,
        };
        w.clamp(self.min_width, self.max_width)
    }
}

/// Fluent builder; starts from [`Config::default`].
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    pub(crate) fn new() -> Self {
        Self {
            inner: Config::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn terminal_width(mut self, cols: Option<usize>) -> Self {
        self.inner.terminal_width = cols;
        self
    }
    #[inline]
    #[must_use]
    pub fn width_bounds(mut self, r: std::ops::RangeInclusive<usize>) -> Self {
        self.inner.min_width = *r.start();
        self.inner.max_width = *r.end();
        self
    }
    #[inline]
    #[must_use]
    pub fn default_width(mut self, w: usize) -> Self {
        self.inner.default_width = w;
        self
    }
    #[inline]
    #[must_use]
    pub fn default_width_fraction(mut self, f: f64) -> Self {
        self.inner.default_width_fraction = f;
        self
    }
    #[inline]
    #[must_use]
    pub fn min_area(mut self, width: usize, height: usize) -> Self {
        self.inner.min_area_width = width;
        self.inner.min_area_height = height;
        self
    }
    #[inline]
    #[must_use]
    pub fn ts_tolerance(mut self, lower: f64, upper: f64) -> Self {
        self.inner.ts_tolerance_lower = lower;
        self.inner.ts_tolerance_upper = upper;
        self
    }
    #[inline]
    #[must_use]
    pub fn palette(mut self, p: Palette) -> Self {
        self.inner.palette = p;
        self
    }
    #[inline]
    #[must_use]
    pub fn fake_zero(mut self, c: Rgb) -> Self {
        self.inner.fake_zero = c;
        self
    }
    #[inline]
    #[must_use]
    pub fn color(mut self, on: bool) -> Self {
        self.inner.color = on;
        self
    }
    #[inline]
    #[must_use]
    pub fn max_scatter_values(mut self, n: usize) -> Self {
        self.inner.max_scatter_values = n;
        self
    }
    #[inline]
    #[must_use]
    pub fn glyphs(mut self, g: Glyphs) -> Self {
        self.inner.glyphs = g;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let c = self.inner;
        if c.min_width == 0 || c.min_width > c.max_width {
            return Err(ConfigError::InvalidWidthBounds {
                low: c.min_width,
                high: c.max_width,
            });
        }
        if !(c.default_width_fraction > 0.0 && c.default_width_fraction <= 1.0) {
            return Err(ConfigError::InvalidFraction(c.default_width_fraction));
        }
        if c.min_area_width == 0 || c.min_area_height == 0 {
            return Err(ConfigError::MissingField("min_area"));
        }
        for t in [c.ts_tolerance_lower, c.ts_tolerance_upper] {
            if !(t.is_finite() && t >= 0.0) {
                return Err(ConfigError::InvalidTolerance(t));
            }
        }
        if c.max_scatter_values == 0 || c.max_scatter_values > c.palette.len() {
            return Err(ConfigError::SeriesLimit(c.max_scatter_values));
        }
        Ok(c)
    }
}

/// Ergonomic `?` on a builder chain.
impl From<ConfigBuilder> for Result<Config, ConfigError> {
    fn from(b: ConfigBuilder) -> Self {
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_width_uses_terminal_fraction() {
        let cfg = Config::builder()
            .terminal_width(Some(100))
            .default_width_fraction(0.5)
            .build()
            .unwrap();
        assert_eq!(cfg.derived_width(), 50);
    }

    #[test]
    fn derived_width_falls_back_and_clamps() {
        let cfg = Config::builder().build().unwrap();
        assert_eq!(cfg.derived_width(), k::DEFAULT_PLOT_WIDTH);

        let tiny = Config::builder().terminal_width(Some(10)).build().unwrap();
        assert_eq!(tiny.derived_width(), k::MIN_PLOT_WIDTH);
    }

    #[test]
    fn builder_rejects_inverted_bounds() {
        let err = Config::builder().width_bounds(50..=10).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidWidthBounds { low: 50, high: 10 }
        ));
    }

    #[test]
    fn builder_rejects_negative_tolerance() {
        assert!(Config::builder().ts_tolerance(-0.1, 0.1).build().is_err());
    }
}
