//! Domain models for legend-tree.
//!
//! - [`LayerNode`]: an owned map content tree. Layers may carry legend items
//!   of their own, group other layers, or both.
//! - [`LayerRecord`] / [`LayerId`]: a layer as supplied by an external source,
//!   linking to its sublayers by id.
//! - [`LegendItem`] and [`Swatch`]: how one symbol class of a layer is drawn.
//! - [`LegendEntry`] and [`LegendSection`]: the flattened rows a list shows.

mod layer;
mod legend;

pub use layer::*;
pub use legend::*;
