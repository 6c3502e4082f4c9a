use std::{
    io::{self, Write},
    path::Path,
};

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    core::{
        bounds::terminal_width,
        color::{DEFAULT_PALETTE, paint, parse_palette},
        config::Config,
        data::DataStore,
        error::PlotError,
    },
    input::{ParseCache, read_stdin},
    render_plot,
    resolve::{ColumnRef, DesiredPlot},
};

use super::parse::PlotArgs;

/// Install the stderr subscriber once; `RUST_LOG` wins over `--debug`.
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Map the command line onto a plot request.
pub fn request(a: &PlotArgs) -> Result<DesiredPlot, PlotError> {
    let mut req = DesiredPlot::new()
        .axis_names(a.names)
        .axis_labels(!a.no_labels)
        .legend(!a.no_legend)
        .auto_format(!a.no_autoformat);
    req.kind = a.kind;
    req.label = a.label.as_deref().map(ColumnRef::parse);
    req.category = a.category.as_deref().map(ColumnRef::parse);
    req.values = a
        .values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| ColumnRef::parse(v))
        .collect();
    req.width = a.width;
    req.height = a.height;
    req.filter_sigma = a.filter;
    if let Some(p) = &a.palette {
        req = req.palette(parse_palette(p)?);
    }
    Ok(req)
}

pub fn plot(a: &PlotArgs) -> Result<(), PlotError> {
    let cfg = Config::builder()
        .terminal_width(terminal_width())
        .color(!a.no_color)
        .build()?;
    let req = request(a)?;
    debug!(files = a.files.len(), "plot requests");

    let mut cache = ParseCache::new();
    let mut out = io::stdout().lock();
    let mut failed = 0;
    for file in &a.files {
        let rendered = if file == "-" {
            read_stdin(a.format)
                .map_err(PlotError::from)
                .and_then(|ds| render_plot(&ds, &req, &cfg))
        } else {
            load(&mut cache, file, a)
                .and_then(|ds| render_plot(ds, &req, &cfg))
        };
        match rendered {
            Ok(text) => out.write_all(text.as_bytes())?,
            Err(e) => {
                warn!(input = %file, error = %e, "plot skipped");
                failed += 1;
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        return Err(PlotError::PlotsFailed {
            failed,
            total: a.files.len(),
        });
    }
    Ok(())
}

fn load<'c>(cache: &'c mut ParseCache, file: &str, a: &PlotArgs) -> Result<&'c DataStore, PlotError> {
    Ok(cache.load(Path::new(file), a.format)?)
}

/// Print the default palette and the accepted colour syntax.
pub fn colors() {
    println!("\nDefault series colours:");
    for (i, c) in DEFAULT_PALETTE.iter().enumerate() {
        let [r, g, b] = c.channels();
        println!(
            "  {} {}  #{r:02x}{g:02x}{b:02x}",
            i + 1,
            paint(true, *c, "■■■■")
        );
    }
    println!(
        "\nOverride with --palette and six comma separated colours, each a name\n\
         (black, red, green, yellow, blue, magenta, cyan, white, orange) or #RRGGBB.\n"
    );
}

/// Print handy invocations for new users.
pub fn examples() {
    let bin = "braille-plot";
    println!(
        "
Example invocations
-------------------
• Let the data decide  : {bin} plot cities.csv
• Several files        : {bin} plot a.json b.ndjson c.tsv
• From a pipe          : cat cities.json | {bin} plot -
• Pick the kind        : {bin} plot cities.csv --kind barhm
• Choose columns       : {bin} plot cities.csv -x city -y rain,sun
• Columns by index     : {bin} plot cities.csv -x 0 -y 2
• Split by category    : {bin} plot trips.csv --kind scatter -x km -y minutes -c mode
• Fixed size           : {bin} plot cities.csv --width 80 --height 20 --names
• Drop outliers        : {bin} plot sensor.ndjson --filter 3
• Own colours          : {bin} plot cities.csv --palette red,#3c8ce6,green,cyan,white,orange
• Why that plot?       : {bin} plot cities.csv --debug
"
    );
}
