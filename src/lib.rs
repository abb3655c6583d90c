pub mod config;
pub mod contents;
pub mod error;
pub mod legend;
pub mod models;
pub mod toc;
pub mod tree_render;

pub use contents::{ContentsDocument, MapContents};
pub use error::ContentsError;
pub use legend::{flatten, sections, LegendDataSource};
