//! Tick-label and text-fitting helpers.  Widths are counted in `char`s.

use crate::core::constants::DECIMAL_PRECISION;

const SI_PREFIXES: [&str; 21] = [
    "q", "r", "y", "z", "a", "f", "p", "n", "μ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
    "R", "Q",
];
/// Index of the empty prefix in `SI_PREFIXES`
const SI_UNIT: i32 = 10;

/// Rebase `v` into `±1..999` and append an SI prefix.
///
/// `|v| >= 10` after rebasing prints without decimals, smaller values with
/// one; trailing `.0` is dropped.  Magnitudes outside the `q..Q` prefixes
/// fall back to a one-digit mantissa with an exponent.  At most 5 chars
/// besides the sign for exponents within `±99`.
///
/// ```
/// use braille_plot::core::format::format_si;
/// assert_eq!(format_si(1500.0), "1.5k");
/// assert_eq!(format_si(-999.0), "-999");
/// assert_eq!(format_si(0.0), "0");
/// assert_eq!(format_si(1e36), "1e36");
/// ```
#[must_use]
pub fn format_si(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if v == 0.0 {
        return "0".into();
    }

    #[allow(clippy::cast_possible_truncation)]
    let mut exp = (v.abs().log10() / 3.0).floor() as i32;
    if !(-SI_UNIT..=SI_UNIT).contains(&exp) {
        return format!("{v:.0e}");
    }
    loop {
        let scaled = v / 10f64.powi(exp * 3);
        let decimals = usize::from(scaled.abs() < 10.0);
        let text = format!("{scaled:.decimals$}");
        let rounded = text.parse::<f64>().unwrap_or(scaled);
        if rounded.abs() >= 1000.0 {
            if exp == SI_UNIT {
                return format!("{v:.0e}");
            }
            exp += 1;
            continue;
        }
        if rounded == 0.0 {
            // underflow below the smallest prefix
            return "0".into();
        }
        let idx = usize::try_from(exp + SI_UNIT).unwrap_or(0);
        return format!("{}{}", trim_zeros(&text), SI_PREFIXES[idx]);
    }
}

/// Plain decimal rendering used when auto-formatting is off.
#[must_use]
pub fn format_plain(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        trim_zeros(&format!("{v:.DECIMAL_PRECISION$}")).to_owned()
    }
}

/// Pick [`format_si`] or [`format_plain`].
#[inline]
#[must_use]
pub fn format_number(v: f64, auto_format: bool) -> String {
    if auto_format {
        format_si(v)
    } else {
        format_plain(v)
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Shorten `s` to `width` chars by replacing its middle with `ellipsis`.
///
/// Widths below `floor` keep only the first char and fill with `dot`.
#[must_use]
pub fn elide_middle(s: &str, width: usize, floor: usize, ellipsis: char, dot: char) -> String {
    let len = s.chars().count();
    if len <= width {
        return s.to_owned();
    }
    if width == 0 {
        return String::new();
    }
    if width < floor {
        let mut out: String = s.chars().take(1).collect();
        out.extend(std::iter::repeat_n(dot, width - 1));
        return out;
    }
    let tail = (width - 1) / 2;
    let head = width - 1 - tail;
    let mut out: String = s.chars().take(head).collect();
    out.push(ellipsis);
    out.extend(s.chars().skip(len - tail));
    out
}

#[inline]
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Right-align `s` in `width` chars.
#[must_use]
pub fn pad_left(s: &str, width: usize) -> String {
    let n = char_len(s);
    format!("{}{s}", " ".repeat(width.saturating_sub(n)))
}

/// Left-align `s` in `width` chars.
#[must_use]
pub fn pad_right(s: &str, width: usize) -> String {
    let n = char_len(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(n)))
}

/// Center `s` in `width` chars (extra space goes right).
#[must_use]
pub fn center(s: &str, width: usize) -> String {
    let n = char_len(s);
    let pad = width.saturating_sub(n);
    format!("{}{s}{}", " ".repeat(pad / 2), " ".repeat(pad - pad / 2))
}
