//! Id-linked map contents snapshots and the documents they are loaded from.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::ContentsError;
use crate::models::{LayerId, LayerNode, LayerRecord, LegendEntry};

/// A snapshot of a map's content tree as a table of layers linked by id.
///
/// This is the shape an external source hands over. Unlike [`LayerNode`] it
/// can be malformed, so every traversal validates as it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapContents {
    pub root: LayerId,
    pub layers: Vec<LayerRecord>,
}

/// A layer reached during a validated walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub layer: &'a LayerRecord,
    /// Distance from the root; the root itself is at depth 0.
    pub depth: usize,
}

impl MapContents {
    /// Build a snapshot from an owned tree, minting a fresh id per node.
    pub fn from_tree(tree: &LayerNode) -> Self {
        fn push(node: &LayerNode, layers: &mut Vec<LayerRecord>) -> LayerId {
            let slot = layers.len();
            layers.push(LayerRecord {
                legend_items: node.legend_items.clone(),
                ..LayerRecord::new(node.name.clone())
            });
            let sublayers = node
                .children
                .iter()
                .map(|child| push(child, layers))
                .collect();
            layers[slot].sublayers = sublayers;
            layers[slot].id
        }

        let mut layers = Vec::new();
        let root = push(tree, &mut layers);
        Self { root, layers }
    }

    /// Look up a record by id. Ids are only guaranteed unique in a
    /// snapshot that passes [`walk`](Self::walk).
    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Map every id to its record, rejecting ids used by more than one record.
    pub(crate) fn index(&self) -> Result<HashMap<LayerId, &LayerRecord>, ContentsError> {
        let mut index = HashMap::with_capacity(self.layers.len());
        for layer in &self.layers {
            if index.insert(layer.id, layer).is_some() {
                tracing::warn!(layer = %layer.id, name = %layer.name, "Layer id used twice");
                return Err(ContentsError::DuplicateLayer { id: layer.id });
            }
        }
        Ok(index)
    }

    /// Walk every layer reachable from the root in pre-order.
    ///
    /// Fails on a duplicated id, the first layer reached twice or the first
    /// dangling id, so a cyclic snapshot is reported instead of looping
    /// forever.
    pub fn walk(&self) -> Result<Vec<Visit<'_>>, ContentsError> {
        let index = self.index()?;
        let mut visited = HashSet::new();
        let mut visits = Vec::new();
        let mut stack = vec![(self.root, None, 0)];

        while let Some((id, parent, depth)) = stack.pop() {
            let layer = match (index.get(&id), parent) {
                (Some(layer), _) => *layer,
                (None, Some(parent)) => return Err(ContentsError::UnknownLayer { parent, id }),
                (None, None) => return Err(ContentsError::MissingRoot(id)),
            };
            if !visited.insert(id) {
                tracing::warn!(layer = %id, name = %layer.name, "Layer reached twice");
                return Err(ContentsError::Cycle {
                    id,
                    name: layer.name.clone(),
                });
            }
            visits.push(Visit { layer, depth });
            // Reversed so the first sublayer is popped first.
            for sub in layer.sublayers.iter().rev() {
                stack.push((*sub, Some(id), depth + 1));
            }
        }

        Ok(visits)
    }

    /// Flatten the legend in display order, see [`crate::legend::flatten`].
    pub fn flatten(&self) -> Result<Vec<LegendEntry>, ContentsError> {
        let entries: Vec<LegendEntry> = self
            .walk()?
            .into_iter()
            .flat_map(|visit| {
                let layer = visit.layer;
                layer
                    .legend_items
                    .iter()
                    .map(move |item| LegendEntry::from_item(&layer.name, item))
            })
            .collect();
        tracing::debug!(root = %self.root, entries = entries.len(), "Flattened map contents");
        Ok(entries)
    }

    /// Rebuild an owned tree, validating the snapshot first.
    ///
    /// Built from the pre-order walk without recursion: `open` holds the
    /// path from the root to the current layer, and a layer is attached to
    /// its parent once a visit at the same or a shallower depth arrives.
    pub fn to_tree(&self) -> Result<LayerNode, ContentsError> {
        fn close(open: &mut Vec<LayerNode>) {
            if let Some(node) = open.pop() {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(node);
                }
            }
        }

        let mut open: Vec<LayerNode> = Vec::new();
        for visit in self.walk()? {
            while open.len() > visit.depth {
                close(&mut open);
            }
            open.push(LayerNode {
                name: visit.layer.name.clone(),
                legend_items: visit.layer.legend_items.clone(),
                children: Vec::new(),
            });
        }
        while open.len() > 1 {
            close(&mut open);
        }

        open.pop().ok_or(ContentsError::MissingRoot(self.root))
    }
}

/// A contents document on disk: either a nested tree or an id-linked table.
///
/// A document with a `root` or `layers` key is read as a table, anything
/// else as a tree, so field errors are reported against the intended shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ContentsDocument {
    Table(MapContents),
    Tree(LayerNode),
}

impl<'de> Deserialize<'de> for ContentsDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_table = value.get("root").is_some() || value.get("layers").is_some();
        if is_table {
            MapContents::deserialize(value)
                .map(Self::Table)
                .map_err(<D::Error as de::Error>::custom)
        } else {
            LayerNode::deserialize(value)
                .map(Self::Tree)
                .map_err(<D::Error as de::Error>::custom)
        }
    }
}

impl ContentsDocument {
    pub fn from_json(json: &str) -> Result<Self, ContentsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ContentsError> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), kind = document.kind(), "Loaded contents document");
        Ok(document)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Tree(_) => "tree",
        }
    }

    /// The document as an owned tree, validating table documents.
    pub fn into_tree(self) -> Result<LayerNode, ContentsError> {
        match self {
            Self::Table(contents) => contents.to_tree(),
            Self::Tree(tree) => Ok(tree),
        }
    }

    pub fn into_contents(self) -> MapContents {
        match self {
            Self::Table(contents) => contents,
            Self::Tree(tree) => MapContents::from_tree(&tree),
        }
    }
}
