//! Layout and rasterisation of a resolved plot.

pub mod axis;
pub mod bars;
pub mod braille;
pub mod frame;
pub mod mixer;
pub mod structure;

pub use braille::Canvas;
pub use frame::flatten;
pub use mixer::ColorMixer;
pub use structure::{Geometry, PlotStructure, Series, build};

use crate::{
    core::{config::Config, data::DataStore, error::BuildError},
    resolve::ResolvedPlot,
};

/// Build the structure of `plot` and flatten it in one go.
pub fn render(ds: &DataStore, plot: &ResolvedPlot, cfg: &Config) -> Result<String, BuildError> {
    build(ds, plot, cfg).map(|s| flatten(&s))
}
