use braille_plot::{
    AnsiCode, Column, ColumnData, ColumnRef, Config, DataStore, DesiredPlot, PlotError, PlotKind,
    ResolveError, render, render_plot, resolve,
};
use rstest::rstest;

fn plain() -> Config {
    Config::builder().color(false).build().unwrap()
}

fn strs(name: &str, v: &[&str]) -> Column {
    Column::new(name, ColumnData::Str(v.iter().map(ToString::to_string).collect()))
}

fn labelled() -> DataStore {
    DataStore::new(vec![
        strs(
            "city",
            &["oslo", "rome", "lima", "perth", "quito", "cairo", "bern", "riga", "hanoi", "baku"],
        ),
        Column::new(
            "rain",
            ColumnData::Double(vec![76.0, 71.5, 0.8, 73.3, 95.1, 2.4, 87.0, 54.2, 140.3, 19.7]),
        ),
    ])
    .unwrap()
}

fn timeline() -> DataStore {
    DataStore::new(vec![
        Column::new("t", ColumnData::Int((0..12).collect())),
        Column::new(
            "load",
            ColumnData::Double(vec![3.1, 7.4, 1.2, 9.9, 4.4, 2.0, 8.8, 5.5, 6.1, 0.3, 7.7, 2.2]),
        ),
        Column::new(
            "temp",
            ColumnData::Int(vec![12, -4, 30, 7, 19, 2, 25, -9, 14, 5, 28, 1]),
        ),
    ])
    .unwrap()
}

#[test]
fn labels_and_one_number_make_a_vertical_bar_chart() {
    let ds = labelled();
    let cfg = plain();
    let plot = resolve(&ds, &DesiredPlot::new(), &cfg).unwrap();
    assert_eq!(plot.kind, PlotKind::BarVertical);
    assert_eq!(plot.label, 0);
    assert_eq!(plot.values, [1]);

    let structure = render::build(&ds, &plot, &cfg).unwrap();
    let g = structure.geometry();
    assert_eq!(g.area_height, 10);
    let out = render::flatten(&structure);
    assert_eq!(out.lines().count(), g.area_height + g.header_rows() + g.footer_rows());
    assert_eq!(out.lines().count(), 12);
}

#[test]
fn incrementing_column_becomes_the_x_axis() {
    let ds = timeline();
    let cfg = plain();
    let plot = resolve(&ds, &DesiredPlot::new(), &cfg).unwrap();
    assert_eq!(plot.kind, PlotKind::MultiLine);
    assert_eq!(plot.label, 0);
    assert_eq!(plot.values, [1, 2]);

    let out = render_plot(&ds, &DesiredPlot::new().width(60), &cfg).unwrap();
    assert!(out.lines().all(|l| l.chars().count() == 60));
}

#[test]
fn vertical_bar_rejects_two_value_columns() {
    let ds = timeline();
    let req = DesiredPlot::new()
        .kind(PlotKind::BarVertical)
        .value(ColumnRef::name("load"))
        .value(ColumnRef::name("temp"));
    let err = render_plot(&ds, &req, &plain()).unwrap_err();
    assert!(matches!(
        err,
        PlotError::Resolve(ResolveError::TooManyValueColumns {
            kind: PlotKind::BarVertical,
            max: 1,
            got: 2
        })
    ));
    assert!(err.to_string().contains("too many value columns for vertical bar"));
}

#[rstest]
#[case::labelled(labelled())]
#[case::timeline(timeline())]
#[case::two_numbers(DataStore::new(vec![
    strs("name", &["a", "b", "c"]),
    Column::new("x", ColumnData::Double(vec![3.1, 7.4, 1.2])),
    Column::new("y", ColumnData::Int(vec![5, -3, 8])),
]).unwrap())]
fn narrow_width_is_rejected_for_any_data(#[case] ds: DataStore) {
    let cfg = plain();
    let err = resolve(&ds, &DesiredPlot::new().width(cfg.min_width - 1), &cfg).unwrap_err();
    assert_eq!(
        err,
        ResolveError::WidthTooSmall {
            min: cfg.min_width,
            got: cfg.min_width - 1
        }
    );
}

#[test]
fn colour_switch_controls_escapes() {
    let ds = labelled();
    let req = DesiredPlot::new().width(40);
    let plain_out = render_plot(&ds, &req, &plain()).unwrap();
    assert!(!plain_out.contains('\x1b'));
    let coloured = render_plot(&ds, &req, &Config::default()).unwrap();
    assert!(coloured.contains("\x1b[38;2;"));
}

#[rstest]
#[case(PlotKind::BarVertical)]
#[case(PlotKind::BarHorizontalSingle)]
#[case(PlotKind::Scatter)]
fn every_kind_fills_the_requested_box(#[case] kind: PlotKind) {
    let ds = DataStore::new(vec![
        strs("name", &["a", "b", "c", "d", "e", "f"]),
        Column::new("x", ColumnData::Double(vec![3.1, 7.4, 1.2, 9.9, 4.4, 2.0])),
        Column::new("y", ColumnData::Int(vec![5, -3, 8, 1, 0, 6])),
    ])
    .unwrap();
    let req = DesiredPlot::new()
        .kind(kind)
        .width(48)
        .height(16)
        .axis_labels(true)
        .axis_names(true);
    let out = render_plot(&ds, &req, &plain()).unwrap();
    for line in out.lines() {
        assert_eq!(line.chars().count(), 48, "{kind}: {line:?}");
    }
    if kind != PlotKind::BarVertical {
        assert_eq!(out.lines().count(), 16, "{kind}");
    }
}

fn rising_line(gap: Option<u8>) -> String {
    let v = (0..9u8)
        .map(|i| if Some(i) == gap { f64::NAN } else { f64::from(i) })
        .collect();
    let ds = DataStore::new(vec![
        Column::new("t", ColumnData::Int((0..9).collect())),
        Column::new("v", ColumnData::Double(v)),
    ])
    .unwrap();
    let req = DesiredPlot::new()
        .kind(PlotKind::MultiLine)
        .label(ColumnRef::name("t"))
        .value(ColumnRef::name("v"))
        .width(40);
    render_plot(&ds, &req, &plain()).unwrap()
}

#[test]
fn missing_sample_breaks_the_line() {
    // the axis column comes first, so area column 19 is char 20; the
    // samples either side of row 4 sit in area columns 14 and 23
    let middle = |out: &str| -> Vec<char> {
        let lines: Vec<&str> = out.lines().collect();
        lines[1..lines.len() - 1]
            .iter()
            .map(|l| l.chars().nth(20).unwrap())
            .collect()
    };
    let whole = rising_line(None);
    let broken = rising_line(Some(4));
    assert!(middle(&whole).iter().any(|c| *c != ' '), "{whole}");
    assert!(middle(&broken).iter().all(|c| *c == ' '), "{broken}");
    assert!(broken.lines().all(|l| l.chars().count() == 40));
}

#[test]
fn scatter_category_colours_points_and_fills_the_legend() {
    let ds = DataStore::new(vec![
        Column::new(
            "km",
            ColumnData::Double(vec![1.0, 2.0, 3.0, 4.0, 11.0, 12.0, 13.0, 14.0, 21.0, 22.0, 23.0, 24.0]),
        ),
        Column::new(
            "minutes",
            ColumnData::Double(vec![1.0, 2.0, 1.0, 2.0, 11.0, 12.0, 11.0, 12.0, 21.0, 22.0, 21.0, 22.0]),
        ),
        strs(
            "mode",
            &["bike", "bike", "bike", "bike", "bus", "bus", "bus", "bus", "train", "train", "train", "train"],
        ),
    ])
    .unwrap();
    let cfg = Config::default();
    let req = DesiredPlot::new()
        .kind(PlotKind::Scatter)
        .label(ColumnRef::name("km"))
        .value(ColumnRef::name("minutes"))
        .category(ColumnRef::name("mode"))
        .legend(true)
        .width(48);
    let plot = resolve(&ds, &req, &cfg).unwrap();
    assert_eq!(plot.category, Some(2));

    let structure = render::build(&ds, &plot, &cfg).unwrap();
    let names: Vec<&str> = structure.series().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["bike", "bus", "train"]);

    // groups sit far apart, so each one's busiest cell shows its own colour
    let body = structure.body().join("\n");
    for series in structure.series() {
        let code = AnsiCode::from(series.color);
        assert!(body.contains(code.as_str()), "{} not drawn", series.name);
    }

    let out = render::flatten(&structure);
    for name in names {
        assert!(out.contains(name), "legend lacks {name}");
    }
}
