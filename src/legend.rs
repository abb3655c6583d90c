//! Legend flattening and the list data source built on top of it.

use crate::models::{LayerNode, LegendEntry, LegendSection};

/// Flatten a layer tree into legend rows in display order.
///
/// Pre-order: a node's own items come first, in their given order, followed
/// by the flattened rows of each child in turn. A node with no items adds
/// nothing but is still descended into.
///
/// ```
/// use legend_tree::legend::flatten;
/// use legend_tree::models::{LayerNode, LegendItem};
///
/// let tree = LayerNode::new("Roads")
///     .with_items([LegendItem::new("Highway")])
///     .with_children([LayerNode::new("Local").with_items([LegendItem::new("Street")])]);
///
/// let rows: Vec<_> = flatten(&tree).into_iter().map(|e| e.detail).collect();
/// assert_eq!(rows, ["Highway", "Street"]);
/// ```
pub fn flatten(root: &LayerNode) -> Vec<LegendEntry> {
    let mut entries = Vec::with_capacity(root.legend_item_count());
    flatten_into(&mut entries, root);
    entries
}

fn flatten_into(entries: &mut Vec<LegendEntry>, node: &LayerNode) {
    entries.extend(
        node.legend_items
            .iter()
            .map(|item| LegendEntry::from_item(&node.name, item)),
    );
    for child in &node.children {
        flatten_into(entries, child);
    }
}

/// Group a tree's legend under one header per layer.
///
/// Every leaf layer gets a section, even an empty one, so a list can show
/// the layer while its legend is still missing. A group layer only gets a
/// section when it carries items of its own.
pub fn sections(root: &LayerNode) -> Vec<LegendSection> {
    let mut sections = Vec::new();
    sections_into(&mut sections, root);
    sections
}

fn sections_into(sections: &mut Vec<LegendSection>, node: &LayerNode) {
    if !node.has_children() || !node.legend_items.is_empty() {
        sections.push(LegendSection {
            title: node.name.clone(),
            entries: node
                .legend_items
                .iter()
                .map(|item| LegendEntry::from_item(&node.name, item))
                .collect(),
        });
    }
    for child in &node.children {
        sections_into(sections, child);
    }
}

/// Rows for a legend list, flattened once and served from memory.
///
/// Row queries never walk the tree; call [`refresh`](Self::refresh) after the
/// tree changes.
#[derive(Debug, Clone, Default)]
pub struct LegendDataSource {
    rows: Vec<LegendEntry>,
}

impl LegendDataSource {
    pub fn new(root: &LayerNode) -> Self {
        let mut source = Self::default();
        source.refresh(root);
        source
    }

    pub fn from_entries(rows: Vec<LegendEntry>) -> Self {
        Self { rows }
    }

    pub fn refresh(&mut self, root: &LayerNode) {
        self.rows = flatten(root);
        tracing::debug!(layer = %root.name, rows = self.rows.len(), "Rebuilt legend rows");
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&LegendEntry> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[LegendEntry] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
