//! Sub-cell rasterizer on 2x4-dot braille cells.
//!
//! ### Workflow
//! 1. [`Canvas::place`] / [`Canvas::line`] map data fractions into pixel
//!    space; `(0, 0)` is the bottom-left dot of the bottom-left cell.
//! 2. Every hit ORs one dot bit into its cell and bumps a per-cell,
//!    per-dot, per-series occupancy counter.
//! 3. [`Canvas::rows`] emits the glyph stream top row first.  Every braille
//!    scalar U+2800..U+28FF encodes to the fixed pattern
//!    `E2 A0+((mask>>6)&3) 80|mask&0x3F`, so cells are written as bytes
//!    without going through `char::encode_utf8`.

use crate::{
    core::{
        color::AnsiCode,
        constants::{BRAILLE_HORIZONTAL_RESOLUTION as DOTS_X, BRAILLE_VERTICAL_RESOLUTION as DOTS_Y},
    },
    render::mixer::ColorMixer,
};

// --- Dot Masks ---

/// Bit of each dot, indexed `[column][row]` with row 0 at the top of a cell.
///
/// Left column: dots 1, 2, 3, 7; right column: dots 4, 5, 6, 8.
const DOT_BITS: [[u8; DOTS_Y]; DOTS_X] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

const RESET_SEQ: &[u8] = b"\x1b[0m";

/// UTF-8 bytes of the braille glyph for `mask`.
#[inline]
#[must_use]
pub const fn braille_bytes(mask: u8) -> [u8; 3] {
    [
        0xE2,
        // the two most significant bits are the non-standard bottom dots
        0xA0 | ((mask >> 6) & 0x03),
        // the six classic dots
        0x80 | (mask & 0x3F),
    ]
}

/// Grid of braille cells with occupancy counters for colour blending.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    series: usize,
    masks: Vec<u8>,
    /// `((cell * series) + s) * 8 + dot`
    counts: Vec<u32>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: usize, height: usize, series: usize) -> Self {
        let series = series.max(1);
        let cells = width * height;
        Self {
            width,
            height,
            series,
            masks: vec![0; cells],
            counts: vec![0; cells * series * DOTS_X * DOTS_Y],
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }
    #[inline]
    #[must_use]
    pub fn series(&self) -> usize {
        self.series
    }
    #[inline]
    #[must_use]
    pub fn pixel_width(&self) -> usize {
        self.width * DOTS_X
    }
    #[inline]
    #[must_use]
    pub fn pixel_height(&self) -> usize {
        self.height * DOTS_Y
    }

    /// Cell index of (`col`, `row`), row 0 at the bottom.
    #[inline]
    fn cell(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// Light the dot at pixel (`px`, `py`) for `series`.  Off-canvas pixels
    /// are ignored.
    pub fn set(&mut self, px: usize, py: usize, series: usize) {
        if px >= self.pixel_width() || py >= self.pixel_height() || series >= self.series {
            return;
        }
        let (col, sub_x) = (px / DOTS_X, px % DOTS_X);
        let (row, sub_y) = (py / DOTS_Y, DOTS_Y - 1 - py % DOTS_Y);
        let cell = self.cell(col, row);
        self.masks[cell] |= DOT_BITS[sub_x][sub_y];
        let dot = sub_x * DOTS_Y + sub_y;
        self.counts[(cell * self.series + series) * DOTS_X * DOTS_Y + dot] += 1;
    }

    /// Pixel nearest to the data fractions `fx`, `fy` (each in `[0, 1]`).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn to_pixel(&self, fx: f64, fy: f64) -> (usize, usize) {
        let map = |f: f64, px: usize| -> usize {
            let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
            (f * px.saturating_sub(1) as f64).round() as usize
        };
        (map(fx, self.pixel_width()), map(fy, self.pixel_height()))
    }

    /// Scatter placement of one point.
    pub fn place(&mut self, fx: f64, fy: f64, series: usize) {
        let (px, py) = self.to_pixel(fx, fy);
        self.set(px, py, series);
    }

    /// Connect two pixels with interpolated dots.  The number of steps is the
    /// larger pixel distance scaled by the axis multipliers, so consecutive
    /// dots are never more than one pixel apart at multipliers `>= 1`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn line(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
        series: usize,
        multipliers: (f64, f64),
    ) {
        let (x0, y0) = (from.0 as f64, from.1 as f64);
        let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);
        let steps = (dx.abs() * multipliers.0)
            .max(dy.abs() * multipliers.1)
            .ceil()
            .max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = dx.mul_add(t, x0).round() as usize;
            let py = dy.mul_add(t, y0).round() as usize;
            self.set(px, py, series);
        }
    }

    /// Dot mask of the cell at (`col`, `row`), row 0 at the bottom.
    #[inline]
    #[must_use]
    pub fn mask(&self, col: usize, row: usize) -> u8 {
        self.masks[self.cell(col, row)]
    }

    /// Hits per series inside one cell, summed over its eight dots.
    #[must_use]
    pub fn cell_counts(&self, col: usize, row: usize) -> Vec<u32> {
        let base = self.cell(col, row) * self.series;
        (0..self.series)
            .map(|s| {
                let start = (base + s) * DOTS_X * DOTS_Y;
                self.counts[start..start + DOTS_X * DOTS_Y].iter().sum()
            })
            .collect()
    }

    /// Largest per-cell count of every series over the whole canvas.
    #[must_use]
    pub fn max_counts(&self) -> Vec<u32> {
        let mut max = vec![0; self.series];
        for row in 0..self.height {
            for col in 0..self.width {
                for (m, c) in max.iter_mut().zip(self.cell_counts(col, row)) {
                    *m = (*m).max(c);
                }
            }
        }
        max
    }

    /// One string per cell row, top row first.  Empty cells are spaces;
    /// with a mixer each run of equally coloured cells gets one escape and a
    /// trailing reset.
    #[must_use]
    pub fn rows(&self, mixer: Option<&ColorMixer>) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|row| self.encode_row(row, mixer))
            .collect()
    }

    fn encode_row(&self, row: usize, mixer: Option<&ColorMixer>) -> String {
        let mut buf = Vec::with_capacity(self.width * 3);
        let mut open = None;
        for col in 0..self.width {
            let mask = self.mask(col, row);
            let color = match (mask, mixer) {
                (0, _) | (_, None) => None,
                (_, Some(m)) => m.mix(&self.cell_counts(col, row)),
            };
            if color != open {
                if open.is_some() {
                    buf.extend_from_slice(RESET_SEQ);
                }
                if let Some(c) = color {
                    buf.extend_from_slice(AnsiCode::from(c).as_str().as_bytes());
                }
                open = color;
            }
            if mask == 0 {
                buf.push(b' ');
            } else {
                buf.extend_from_slice(&braille_bytes(mask));
            }
        }
        if open.is_some() {
            buf.extend_from_slice(RESET_SEQ);
        }
        // only ASCII escapes and whole braille scalars were written
        String::from_utf8_lossy(&buf).into_owned()
    }
}
