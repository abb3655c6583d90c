use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LegendItem;

/// A node in the content tree of a map.
///
/// A node may carry legend items of its own, child nodes (a group layer), or
/// both. Owned children make the tree finite and acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerNode {
    pub name: String,
    #[serde(default)]
    pub legend_items: Vec<LegendItem>,
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legend_items: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = LegendItem>,
    {
        self.legend_items.extend(items);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = LayerNode>,
    {
        self.children.extend(children);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn add_child(&mut self, child: LayerNode) {
        self.children.push(child);
    }

    /// Insert a child at `index`, appending when the index is past the end.
    pub fn insert_child(&mut self, index: usize, child: LayerNode) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Remove the first immediate child called `name`.
    pub fn remove_child_named(&mut self, name: &str) -> Option<LayerNode> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    pub fn child_named(&self, name: &str) -> Option<&LayerNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every node below this one in pre-order, not counting itself.
    pub fn descendants(&self) -> impl Iterator<Item = &LayerNode> {
        let mut stack: Vec<&LayerNode> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of nodes below this one, not counting itself.
    pub fn descendant_count(&self) -> usize {
        self.descendants().count()
    }

    /// Legend items held by this node and every node below it.
    ///
    /// This is exactly the number of entries a flatten produces.
    pub fn legend_item_count(&self) -> usize {
        self.legend_items.len()
            + self
                .descendants()
                .map(|node| node.legend_items.len())
                .sum::<usize>()
    }

    /// Rows a fully expanded table of contents needs below this node:
    /// every descendant plus every legend item in the subtree.
    pub fn descendant_and_legend_count(&self) -> usize {
        self.descendant_count() + self.legend_item_count()
    }

    /// Longest path to a leaf, counted in edges. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

// Dropped through an explicit stack so a very deep tree doesn't overflow.
impl Drop for LayerNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Identity of a layer within a [`MapContents`](super::MapContents) snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A layer as handed over by an external source: sublayers are referenced by
/// id, so nothing stops a malformed snapshot from pointing back at an
/// ancestor or at a layer that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: LayerId,
    pub name: String,
    #[serde(default)]
    pub legend_items: Vec<LegendItem>,
    #[serde(default)]
    pub sublayers: Vec<LayerId>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub can_change_visibility: bool,
}

fn default_true() -> bool {
    true
}

impl LayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            legend_items: Vec::new(),
            sublayers: Vec::new(),
            visible: true,
            can_change_visibility: true,
        }
    }
}
