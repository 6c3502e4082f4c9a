//! Flattens a [`PlotStructure`] into the final string.
//!
//! Row layout, top to bottom:
//! - top axis line between the top corners
//! - one line per body row: name gutter, left labels, left axis, body,
//!   right axis, legend
//! - bottom axis line between the bottom corners
//! - optional tick-label row, optional axis-name row
//!
//! Every line holds exactly `geometry.width` visible cells and ends in `\n`.

use crate::render::structure::PlotStructure;

#[inline]
fn push_spaces(buf: &mut String, n: usize) {
    buf.extend(std::iter::repeat_n(' ', n));
}

/// One footer line aligned under the plot area.
fn push_under_area(buf: &mut String, s: &PlotStructure<'_>, text: &str) {
    let g = s.geometry();
    push_spaces(buf, g.left_pad() + 1);
    buf.push_str(text);
    push_spaces(buf, 1 + g.right_label_width);
    buf.push('\n');
}

/// Assemble every row of `s`.
#[must_use]
pub fn flatten(s: &PlotStructure<'_>) -> String {
    let g = s.geometry();
    // body cells take up to three bytes, escapes add more
    let mut buf = String::with_capacity(g.total_rows() * (g.width * 4 + 1));

    // --- top ---
    push_spaces(&mut buf, g.left_pad());
    buf.push(s.corners[0]);
    buf.push_str(&s.top_line);
    buf.push(s.corners[1]);
    push_spaces(&mut buf, g.right_label_width);
    buf.push('\n');

    // --- body ---
    for r in 0..g.area_height {
        if g.name_gutter > 0 {
            buf.push(s.left_name.get(r).copied().unwrap_or(' '));
            push_spaces(&mut buf, g.name_gutter - 1);
        }
        buf.push_str(&s.left_labels[r]);
        buf.push(s.left_axis[r]);
        buf.push_str(&s.body[r]);
        buf.push(s.right_axis[r]);
        buf.push_str(&s.right_labels[r]);
        buf.push('\n');
    }

    // --- bottom ---
    push_spaces(&mut buf, g.left_pad());
    buf.push(s.corners[2]);
    buf.push_str(&s.bottom_line);
    buf.push(s.corners[3]);
    push_spaces(&mut buf, g.right_label_width);
    buf.push('\n');

    if let Some(labels) = &s.bottom_labels {
        push_under_area(&mut buf, s, labels);
    }
    if let Some(name) = &s.bottom_name {
        push_under_area(&mut buf, s, name);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            config::Config,
            data::{Column, ColumnData, DataStore},
            format::char_len,
        },
        render::structure::build,
        resolve::{ColumnRef, DesiredPlot, PlotKind, resolve},
    };

    fn store() -> DataStore {
        DataStore::new(vec![
            Column::new(
                "city",
                ColumnData::Str(["oslo", "rome", "lima", "perth"].map(String::from).to_vec()),
            ),
            Column::new("rain", ColumnData::Double(vec![76.0, 71.5, 0.8, 73.3])),
            Column::new("sun", ColumnData::Int(vec![1668, 2473, 1230, 3200])),
        ])
        .unwrap()
    }

    fn render(req: &DesiredPlot) -> String {
        let ds = store();
        let cfg = Config::builder().color(false).build().unwrap();
        let plot = resolve(&ds, req, &cfg).unwrap();
        flatten(&build(&ds, &plot, &cfg).unwrap())
    }

    #[test]
    fn every_line_has_the_plot_width() {
        for kind in [
            PlotKind::BarVertical,
            PlotKind::BarMultiVertical,
            PlotKind::BarHorizontalSingle,
            PlotKind::BarHorizontalMulti,
            PlotKind::Scatter,
        ] {
            let req = DesiredPlot::new()
                .kind(kind)
                .width(50)
                .axis_labels(true)
                .axis_names(true)
                .legend(true);
            let out = render(&req);
            assert!(out.ends_with('\n'));
            for line in out.lines() {
                assert_eq!(char_len(line), 50, "{kind}: {line:?}");
            }
        }
    }

    #[test]
    fn vertical_bar_rows_show_labels() {
        let out = render(&DesiredPlot::new().value(ColumnRef::name("rain")).width(30));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4 + 2);
        assert!(lines[1].starts_with(" oslo ┤█"));
        assert!(lines[4].starts_with("perth ┤█"));
        assert!(lines[0].starts_with("      ┌─"));
        assert!(lines[5].starts_with("      └┬"));
    }

    #[test]
    fn footer_rows_follow_flags() {
        let req = DesiredPlot::new()
            .value(ColumnRef::name("sun"))
            .axis_labels(true)
            .axis_names(true);
        let out = render(&req);
        let last = out.lines().last().unwrap();
        assert_eq!(last.trim(), "sun");
        assert_eq!(out.lines().count(), 4 + 4);
    }
}
