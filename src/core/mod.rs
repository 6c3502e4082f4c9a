//! Aggregates the “business logic” layer.

pub mod assess;
pub mod bounds;
pub mod color;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod format;

// re-export frequently-used items for convenience
pub use assess::{Assessment, assess_column, assess_store};
pub use bounds::{Extent, IntExtent};
pub use color::{AnsiCode, ColorError, Palette, Rgb, colorize};
pub use config::{Config, ConfigBuilder, Glyphs};
pub use data::{Column, ColumnData, ColumnType, ColumnView, DataStore};
pub use error::{BuildError, ConfigError, DataError, ParseError, PlotError, ResolveError};
