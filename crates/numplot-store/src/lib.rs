mod bounds;
mod render;
pub mod store;

pub use render::{legend, LegendEntry};
pub use store::{PlotSize, PngStore};
