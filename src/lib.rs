//! RasterPad — a raster drawing surface with flood fill and snapshot undo/redo.
//!
//! [`surface::DrawingSurface`] owns a [`canvas::PixelBuffer`] and a
//! [`components::history::HistoryStack`] and turns pointer input into
//! strokes, shapes and [`ops::fill::flood_fill`] calls.

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod components;
pub mod ops;
pub mod settings;
pub mod surface;

pub use canvas::{Color, PixelBuffer};
pub use components::history::{HistoryEntry, HistoryStack};
pub use components::tools::Tool;
pub use ops::fill::{FillResult, flood_fill};
pub use surface::DrawingSurface;
