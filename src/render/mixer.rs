//! Per-cell colour blending for overlapping series.
//!
//! A series' colour fades from its palette entry towards the near-black
//! anchor as its hit count in a cell drops below the busiest cell of that
//! series.  Cells shared by several series take the count-weighted mean and
//! are then clamped into the range the dominant series can reach.

use crate::core::{color::Rgb, config::Config};

#[derive(Debug, Clone)]
pub struct ColorMixer {
    colors: Vec<Rgb>,
    anchor: [f64; 3],
    min_intensity: f64,
    max_counts: Vec<u32>,
    /// Per series, per channel `(low, high)` over every reachable count
    bounds: Vec<[(f64, f64); 3]>,
}

impl ColorMixer {
    /// `colors[s]` and `max_counts[s]` describe series `s`.
    #[must_use]
    pub fn new(colors: Vec<Rgb>, cfg: &Config, max_counts: Vec<u32>) -> Self {
        let mut mixer = Self {
            colors,
            anchor: channels_f64(cfg.fake_zero),
            min_intensity: cfg.min_blend_intensity.clamp(0.0, 1.0),
            max_counts,
            bounds: Vec::new(),
        };
        mixer.bounds = (0..mixer.colors.len())
            .map(|s| {
                let max = mixer.max_counts.get(s).copied().unwrap_or(1).max(1);
                let (lo, hi) = (mixer.shade(s, 1), mixer.shade(s, max));
                std::array::from_fn(|c| (lo[c].min(hi[c]), lo[c].max(hi[c])))
            })
            .collect();
        mixer
    }

    /// `min + (1 - min) * count / max_count` for series `s`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn intensity(&self, s: usize, count: u32) -> f64 {
        let max = self.max_counts.get(s).copied().unwrap_or(1).max(1);
        let ratio = f64::from(count.min(max)) / f64::from(max);
        (1.0 - self.min_intensity).mul_add(ratio, self.min_intensity)
    }

    /// Anchor moved towards the series colour by its intensity.
    fn shade(&self, s: usize, count: u32) -> [f64; 3] {
        let base = channels_f64(self.colors[s % self.colors.len()]);
        let t = self.intensity(s, count);
        std::array::from_fn(|c| (base[c] - self.anchor[c]).mul_add(t, self.anchor[c]))
    }

    /// Colour of a cell given its per-series hit counts; `None` if empty.
    ///
    /// Every series present contributes its own shade to the weighted mean,
    /// but only the dominant series' reachable range clamps the result.  The
    /// other series' bounds are not applied, so a shared cell always reads
    /// as a shade of its busiest series.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mix(&self, counts: &[u32]) -> Option<Rgb> {
        if self.colors.is_empty() {
            return None;
        }
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return None;
        }
        let mut acc = [0.0f64; 3];
        for (s, &n) in counts.iter().enumerate().filter(|(_, n)| **n > 0) {
            let shade = self.shade(s, n);
            for c in 0..3 {
                acc[c] += shade[c] * f64::from(n);
            }
        }
        // first series wins ties
        let dominant = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (s, &n)| if n > best.1 { (s, n) } else { best })
            .0;
        let bounds = self.bounds.get(dominant).copied();
        let rgb: [u8; 3] = std::array::from_fn(|c| {
            let mut v = acc[c] / f64::from(total);
            if let Some(b) = bounds {
                v = v.clamp(b[c].0, b[c].1);
            }
            v.round().clamp(0.0, 255.0) as u8
        });
        Some(Rgb::from_channels(rgb))
    }
}

fn channels_f64(c: Rgb) -> [f64; 3] {
    c.channels().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer(max: Vec<u32>) -> ColorMixer {
        let colors = vec![Rgb::new(200, 100, 0), Rgb::new(0, 100, 200)];
        ColorMixer::new(colors, &Config::default(), max)
    }

    #[test]
    fn busiest_cell_gets_full_colour() {
        let m = mixer(vec![4, 4]);
        assert_eq!(m.mix(&[4, 0]), Some(Rgb::new(200, 100, 0)));
        assert_eq!(m.mix(&[0, 0]), None);
    }

    #[test]
    fn lone_dot_never_fades_to_anchor() {
        let m = mixer(vec![10, 10]);
        let dim = m.mix(&[1, 0]).unwrap();
        assert_ne!(dim, Rgb::fake_zero());
        assert!(dim.r < 200 && dim.r > Rgb::fake_zero().r);
        assert!((m.intensity(0, 1) - (0.45 + 0.55 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn overlap_stays_within_dominant_bounds() {
        let m = mixer(vec![2, 2]);
        let mixed = m.mix(&[2, 1]).unwrap();
        let lo = m.shade(0, 1);
        let hi = m.shade(0, 2);
        for (c, v) in mixed.channels().into_iter().enumerate() {
            let (a, b) = (lo[c].min(hi[c]), lo[c].max(hi[c]));
            let v = f64::from(v);
            assert!(v >= a.floor() && v <= b.ceil(), "channel {c}: {v} not in {a}..{b}");
        }
    }

    #[test]
    fn every_overlap_lands_in_the_busiest_series_range() {
        let colors = vec![Rgb::new(230, 40, 40), Rgb::new(40, 200, 90), Rgb::new(60, 90, 240)];
        let m = ColorMixer::new(colors, &Config::default(), vec![3, 5, 2]);
        for a in 0..=3 {
            for b in 0..=5 {
                for c in 0..=2 {
                    let counts = [a, b, c];
                    let Some(mixed) = m.mix(&counts) else {
                        assert_eq!(a + b + c, 0);
                        continue;
                    };
                    let top = *counts.iter().max().unwrap();
                    let dominant = counts.iter().position(|&n| n == top).unwrap();
                    let max = [3, 5, 2][dominant];
                    let (lo, hi) = (m.shade(dominant, 1), m.shade(dominant, max));
                    for (ch, v) in mixed.channels().into_iter().enumerate() {
                        let (low, high) = (lo[ch].min(hi[ch]).floor(), lo[ch].max(hi[ch]).ceil());
                        let v = f64::from(v);
                        assert!(
                            v >= low && v <= high,
                            "{counts:?} channel {ch}: {v} outside {low}..{high}"
                        );
                    }
                }
            }
        }
    }
}
