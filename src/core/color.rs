//! Zero-alloc ANSI colour wrapper plus the RGB triples the mixer works on.

use std::{fmt, str};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex colour digit in `{0}`")]
    InvalidHexDigit(String),
    #[error("hex colour `{0}` must be exactly 6 digits")]
    InvalidHexLength(String),
    #[error("palette needs {want} colours, got {got}")]
    PaletteSize { want: usize, got: usize },
}

// --- Rgb ---

/// One 24-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn industrial_orange() -> Self {
        Self::new(210, 135, 10)
    }

    /// The near-black colour blends start from.
    pub const fn fake_zero() -> Self {
        Self::new(30, 30, 30)
    }

    #[inline]
    #[must_use]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    #[must_use]
    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }

    /// Parse colour names or `#rrggbb`.  Falls back to hex parser on miss.
    pub fn from_name(s: &str) -> Result<Self, ColorError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(Self::new(0, 0, 0)),
            "red" => Ok(Self::new(205, 49, 49)),
            "green" => Ok(Self::new(80, 190, 80)),
            "yellow" => Ok(Self::new(220, 210, 60)),
            "blue" => Ok(Self::new(60, 140, 230)),
            "magenta" => Ok(Self::new(200, 80, 200)),
            "cyan" => Ok(Self::new(40, 190, 200)),
            "white" => Ok(Self::new(230, 230, 230)),
            "orange" | "industrial" => Ok(Self::industrial_orange()),
            _ => Self::from_hex(s),
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let h = hex.trim().trim_start_matches('#');
        if h.len() != 6 || !h.is_ascii() {
            return Err(ColorError::InvalidHexLength(hex.to_owned()));
        }
        let byte = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHexDigit(hex.to_owned()))
        };
        Ok(Self::new(byte(&h[..2])?, byte(&h[2..4])?, byte(&h[4..])?))
    }

    /// Foreground escape for this colour.
    #[inline]
    #[must_use]
    pub fn fg(self) -> AnsiCode {
        AnsiCode::rgb(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Series colours, in the order series are assigned.
pub type Palette = [Rgb; 6];

pub const DEFAULT_PALETTE: Palette = [
    Rgb::industrial_orange(),
    Rgb::new(60, 140, 230),
    Rgb::new(80, 190, 80),
    Rgb::new(200, 80, 200),
    Rgb::new(40, 190, 200),
    Rgb::new(220, 210, 60),
];

/// Parse exactly six comma separated colours.
pub fn parse_palette(list: &str) -> Result<Palette, ColorError> {
    let colors = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(Rgb::from_name)
        .collect::<Result<Vec<_>, _>>()?;
    let got = colors.len();
    colors
        .try_into()
        .map_err(|_| ColorError::PaletteSize { want: 6, got })
}

// --- AnsiCode ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnsiCode {
    Static(&'static str),
    Inline { buf: [u8; 20], len: u8 },
}

impl AnsiCode {
    #[inline]
    pub const fn reset() -> Self {
        Self::Static("\x1b[0m")
    }

    /// True-colour escape `ESC[38;2;R;G;Bm`.
    #[must_use]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        let mut buf = [0u8; 20];
        buf[..7].copy_from_slice(b"\x1b[38;2;");
        let mut len = 7;

        for (i, v) in [r, g, b].into_iter().enumerate() {
            len += write_u8(&mut buf[len..], v);
            if i != 2 {
                buf[len] = b';';
                len += 1;
            }
        }
        buf[len] = b'm';
        len += 1;
        // at most 19 bytes: ESC[38;2; + 3×3 digits + 2 separators + m
        Self::Inline {
            buf,
            len: len as u8,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            // only ever filled with ASCII by `rgb`
            Self::Inline { buf, len } => str::from_utf8(&buf[..*len as usize]).unwrap_or(""),
        }
    }
}

impl From<Rgb> for AnsiCode {
    #[inline]
    fn from(c: Rgb) -> Self {
        c.fg()
    }
}

// --- Helpers ---
fn write_u8(dst: &mut [u8], mut n: u8) -> usize {
    let mut tmp = [0u8; 3];
    let mut i = 3;
    loop {
        i -= 1;
        tmp[i] = b'0' + n % 10;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    let len = 3 - i;
    dst[..len].copy_from_slice(&tmp[i..]);
    len
}

impl fmt::Display for AnsiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrap `text` in colour + reset sequence.
#[inline]
pub fn colorize(c: &AnsiCode, text: &str) -> String {
    format!("{c}{text}{}", AnsiCode::reset())
}

/// Like [`colorize`] but honours the colour switch.
#[inline]
pub fn paint(enabled: bool, c: Rgb, text: &str) -> String {
    if enabled {
        colorize(&c.fg(), text)
    } else {
        text.to_owned()
    }
}
