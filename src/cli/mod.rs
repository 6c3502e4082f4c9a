mod handlers;
pub mod parse;

use clap::Parser;
pub use parse::Cli;

use crate::core::error::PlotError;

pub fn run() -> Result<(), PlotError> {
    let cli = parse::Cli::parse();
    match cli.cmd {
        parse::Command::Plot(a) => {
            handlers::init_tracing(a.debug);
            handlers::plot(&a)
        }
        parse::Command::Colors => {
            handlers::colors();
            Ok(())
        }
        parse::Command::Examples => {
            handlers::examples();
            Ok(())
        }
    }
}
