use serde::{Deserialize, Serialize};

/// How one symbol class of a layer is drawn in a legend.
///
/// Swatches come in a few shapes depending on the renderer that produced
/// them, so they are modelled as a closed set of variants rather than an
/// open type hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Swatch {
    /// A picture: file path, URL or data URI.
    Image { source: String },
    /// A solid fill.
    Fill { color: Rgba },
    /// A point symbol drawn with a single glyph.
    Marker { glyph: char, color: Rgba },
}

impl Swatch {
    /// Single-character stand-in used by text renderers.
    pub fn glyph(&self) -> char {
        match self {
            Self::Image { .. } => '▣',
            Self::Fill { .. } => '■',
            Self::Marker { glyph, .. } => *glyph,
        }
    }
}

/// An RGBA colour, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

/// A single (label, swatch) pair owned by a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub swatch: Option<Swatch>,
}

impl LegendItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            swatch: None,
        }
    }

    pub fn with_swatch(mut self, swatch: Swatch) -> Self {
        self.swatch = Some(swatch);
        self
    }
}

/// One row of a flattened legend.
///
/// Entries carry no identity beyond their position in the list they were
/// produced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Name of the layer the item belongs to.
    pub owner_name: String,
    /// The legend item's label.
    pub detail: String,
    pub swatch: Option<Swatch>,
}

impl LegendEntry {
    pub(crate) fn from_item(owner_name: &str, item: &LegendItem) -> Self {
        Self {
            owner_name: owner_name.to_string(),
            detail: item.label.clone(),
            swatch: item.swatch.clone(),
        }
    }
}

/// The legend of one leaf layer, as shown under its own header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendSection {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}
