use clap::{Args, Parser, Subcommand};

use crate::{input::InputFormat, resolve::PlotKind};

/// Top-level CLI structure.
#[derive(Parser)]
#[command(
    name = "braille-plot",
    version,
    about = "Infer and draw bar, scatter and line charts in the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plot one or more JSON, NDJSON, CSV or TSV inputs
    Plot(PlotArgs),
    /// Show the default series palette and the colour syntax
    Colors,
    /// Print example invocations
    Examples,
}

/// `braille-plot plot …`
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Input files, one plot each (use `-` for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    pub files: Vec<String>,

    /// Input format (detected from extension or content if omitted)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<InputFormat>,

    /// Plot kind: barv, barvm, barhs, barhm, scatter or line
    #[arg(short, long)]
    pub kind: Option<PlotKind>,

    /// Label column (bar labels, or the x axis), by name or index
    #[arg(short = 'x', long, value_name = "COLUMN")]
    pub label: Option<String>,

    /// Category column splitting one value column into series
    #[arg(short, long, value_name = "COLUMN")]
    pub category: Option<String>,

    /// Value columns, comma separated names or indices
    #[arg(short = 'y', long, value_name = "COLUMNS", value_delimiter = ',')]
    pub values: Vec<String>,

    /// Total width in columns
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Total height in rows, labels and axis names included
    #[arg(long)]
    pub height: Option<usize>,

    /// Print axis names
    #[arg(long)]
    pub names: bool,

    /// Hide axis tick labels
    #[arg(long)]
    pub no_labels: bool,

    /// Hide the legend
    #[arg(long)]
    pub no_legend: bool,

    /// Print numbers in full instead of SI-abbreviated
    #[arg(long)]
    pub no_autoformat: bool,

    /// Drop rows further than SIGMA standard deviations from the mean
    #[arg(long, value_name = "SIGMA")]
    pub filter: Option<f64>,

    /// Six comma separated series colours (names or `#RRGGBB`)
    #[arg(long, value_name = "COLORS")]
    pub palette: Option<String>,

    /// Plain glyphs without colour escapes
    #[arg(long)]
    pub no_color: bool,

    /// Log resolution and layout decisions to stderr
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plot_arguments_parse() {
        let cli = Cli::try_parse_from([
            "braille-plot", "plot", "a.csv", "b.json", "-k", "scatter", "-x", "0", "-y",
            "rain,2", "--format", "tsv", "--filter", "2.5", "--no-color",
        ])
        .unwrap();
        let Command::Plot(a) = cli.cmd else {
            panic!("expected plot");
        };
        assert_eq!(a.files, ["a.csv", "b.json"]);
        assert_eq!(a.kind, Some(PlotKind::Scatter));
        assert_eq!(a.label.as_deref(), Some("0"));
        assert_eq!(a.values, ["rain", "2"]);
        assert_eq!(a.format, Some(InputFormat::Tsv));
        assert_eq!(a.filter, Some(2.5));
        assert!(a.no_color && !a.names);
    }

    #[test]
    fn stdin_is_the_default_input() {
        let cli = Cli::try_parse_from(["braille-plot", "plot"]).unwrap();
        let Command::Plot(a) = cli.cmd else {
            panic!("expected plot");
        };
        assert_eq!(a.files, ["-"]);
        assert!(a.values.is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["braille-plot", "plot", "-k", "pie"]).is_err());
    }
}
