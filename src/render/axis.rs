//! Tick-marked axis lines and tick-label placement.
//!
//! Every function returns exactly the requested number of glyph cells, so the
//! frame can concatenate fragments without re-measuring them.

use crate::core::format::{char_len, elide_middle, pad_left};

/// Tick offsets along an axis of `length` cells split into `steps` even
/// intervals; always starts at `0` and ends at `length - 1`.
#[must_use]
pub fn tick_positions(length: usize, steps: usize) -> Vec<usize> {
    if length == 0 {
        return Vec::new();
    }
    let steps = steps.min(length - 1);
    if steps == 0 {
        return vec![0];
    }
    (0..=steps).map(|i| i * (length - 1) / steps).collect()
}

/// Interval count for `length` cells with one label every `pitch` cells.
#[inline]
#[must_use]
pub fn guess_steps(length: usize, pitch: usize) -> usize {
    (length / pitch.max(1)).max(1)
}

/// `filler` runs broken by `tick` at evenly spaced positions.
///
/// ```
/// use braille_plot::render::axis::create_tick_marked_axis;
/// assert_eq!(create_tick_marked_axis(9, 2, '─', '┬'), "┬───┬───┬");
/// ```
#[must_use]
pub fn create_tick_marked_axis(length: usize, steps: usize, filler: char, tick: char) -> String {
    axis_with_ticks(length, &tick_positions(length, steps), filler, tick)
}

/// Like [`create_tick_marked_axis`] with explicit tick offsets; offsets past
/// the end are ignored.
#[must_use]
pub fn axis_with_ticks(length: usize, ticks: &[usize], filler: char, tick: char) -> String {
    let mut cells = vec![filler; length];
    for &t in ticks.iter().filter(|&&t| t < length) {
        cells[t] = tick;
    }
    cells.into_iter().collect()
}

/// Lay `labels` out along a horizontal line of `length` cells.
///
/// The first label starts at its tick, the last ends at its tick, the others
/// are centred.  A label that would touch its left neighbour is dropped.
#[must_use]
pub fn place_labels(length: usize, labels: &[(usize, String)]) -> String {
    let mut cells = vec![' '; length];
    let mut free_from = 0usize;
    let last = labels.len().saturating_sub(1);
    for (k, (pos, text)) in labels.iter().enumerate() {
        let n = char_len(text);
        if n == 0 || n > length {
            continue;
        }
        let start = if k == 0 {
            *pos
        } else if k == last {
            (pos + 1).saturating_sub(n)
        } else {
            pos.saturating_sub(n / 2)
        }
        .min(length - n);
        if start < free_from {
            continue;
        }
        for (cell, ch) in cells[start..start + n].iter_mut().zip(text.chars()) {
            *cell = ch;
        }
        free_from = start + n + 1;
    }
    cells.into_iter().collect()
}

/// One right-aligned label per body row; `labels` pairs a row (0 = top)
/// with its text.  Each entry is `width` cells, the last one a space.
#[must_use]
pub fn vertical_labels(height: usize, width: usize, labels: &[(usize, String)]) -> Vec<String> {
    let blank = " ".repeat(width);
    let mut rows = vec![blank; height];
    if width == 0 {
        return rows;
    }
    for (row, text) in labels {
        if let Some(slot) = rows.get_mut(*row) {
            let fitted: String = text.chars().take(width - 1).collect();
            *slot = format!("{} ", pad_left(&fitted, width - 1));
        }
    }
    rows
}

/// `name` written top to bottom, vertically centred, one char per row.
#[must_use]
pub fn vertical_text(name: &str, height: usize, floor: usize, ellipsis: char, dot: char) -> Vec<char> {
    let fitted: Vec<char> = elide_middle(name, height, floor, ellipsis, dot)
        .chars()
        .collect();
    let top = (height - fitted.len()) / 2;
    let mut col = vec![' '; height];
    col[top..top + fitted.len()].copy_from_slice(&fitted);
    col
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn tick_axis_has_exactly_length_cells() {
        for length in 0..60 {
            for steps in 0..20 {
                let axis = create_tick_marked_axis(length, steps, '─', '┬');
                assert_eq!(char_len(&axis), length, "length {length} steps {steps}");
                if length > 0 {
                    assert!(axis.starts_with('┬'));
                }
            }
        }
    }

    #[rstest]
    #[case(10, 3, vec![0, 3, 6, 9])]
    #[case(5, 10, vec![0, 1, 2, 3, 4])]
    #[case(1, 4, vec![0])]
    #[case(0, 4, vec![])]
    fn ticks_are_spread_evenly(#[case] length: usize, #[case] steps: usize, #[case] want: Vec<usize>) {
        assert_eq!(tick_positions(length, steps), want);
    }

    #[test]
    fn guessed_steps_never_zero() {
        assert_eq!(guess_steps(3, 12), 1);
        assert_eq!(guess_steps(60, 12), 5);
        assert_eq!(guess_steps(60, 0), 60);
    }

    #[test]
    fn labels_anchor_to_edges_and_skip_overlaps() {
        let out = place_labels(
            12,
            &[(0, "0".into()), (5, "50".into()), (6, "60".into()), (11, "100".into())],
        );
        assert_eq!(out, "0   50   100");
        assert_eq!(char_len(&out), 12);
    }

    #[test]
    fn vertical_labels_are_right_aligned() {
        let rows = vertical_labels(3, 5, &[(0, "10".into()), (2, "123456".into())]);
        assert_eq!(rows, ["  10 ", "     ", "1234 "]);
    }

    #[test]
    fn vertical_text_is_centred() {
        assert_eq!(vertical_text("ab", 4, 4, '…', '.'), [' ', 'a', 'b', ' ']);
        assert_eq!(vertical_text("abcdef", 3, 4, '…', '.'), ['a', '.', '.']);
    }
}
