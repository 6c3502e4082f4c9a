//! Public-facing crate root: re-exports plus the one-shot [`render_plot`].
//!
//! A plot is produced in three steps:
//! 1. [`resolve()`] fills every open field of a [`DesiredPlot`] from the data,
//! 2. [`render::build`] lays out a [`PlotStructure`],
//! 3. [`render::flatten`] joins it into the final string.

pub mod cli;
pub mod core;
pub mod input;
pub mod render;
pub mod resolve;

pub use crate::core::{
    color::{AnsiCode, ColorError, DEFAULT_PALETTE, Palette, Rgb, colorize},
    config::{Config, ConfigBuilder},
    data::{Column, ColumnData, ColumnType, DataStore},
    error::{BuildError, ConfigError, DataError, ParseError, PlotError, ResolveError},
};

pub use input::{InputFormat, ParseCache};
pub use render::{Geometry, PlotStructure};
pub use resolve::{ColumnRef, DesiredPlot, HeightPolicy, PlotKind, ResolvedPlot, resolve};

/// Resolve `request` against `ds` and render it in one go.
pub fn render_plot(ds: &DataStore, request: &DesiredPlot, cfg: &Config) -> Result<String, PlotError> {
    let plot = resolve(ds, request, cfg)?;
    Ok(render::render(ds, &plot, cfg)?)
}
