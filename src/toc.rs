//! Expandable table of contents over a map contents snapshot.
//!
//! The outline starts with the root's sublayers, all collapsed. Expanding a
//! layer inserts its sublayers right below it, or its legend items when it has
//! no sublayers. Collapsing removes everything nested under it.
//!
//! Expanded and visibility state lives in a side table keyed by [`LayerId`];
//! the snapshot itself is never touched and the state is dropped with the
//! outline.

use std::collections::HashMap;

use crate::contents::MapContents;
use crate::error::ContentsError;
use crate::models::{LayerId, LayerRecord, LegendItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Layer { id: LayerId, level: usize },
    Legend { owner: LayerId, item: usize, level: usize },
}

impl Row {
    fn level(&self) -> usize {
        match self {
            Self::Layer { level, .. } | Self::Legend { level, .. } => *level,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LayerState {
    expanded: bool,
    visible: bool,
}

/// One visible row of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocRow<'a> {
    Layer {
        id: LayerId,
        name: &'a str,
        level: usize,
        expanded: bool,
        visible: bool,
        can_change_visibility: bool,
    },
    Legend {
        owner: &'a str,
        item: &'a LegendItem,
        level: usize,
    },
}

#[derive(Debug)]
pub struct TocOutline<'a> {
    layers: HashMap<LayerId, &'a LayerRecord>,
    parents: HashMap<LayerId, LayerId>,
    state: HashMap<LayerId, LayerState>,
    top: Vec<LayerId>,
    rows: Vec<Row>,
}

impl<'a> TocOutline<'a> {
    /// Build a collapsed outline. The snapshot is validated up front, so a
    /// cyclic or dangling snapshot is rejected here rather than on expand.
    pub fn new(contents: &'a MapContents) -> Result<Self, ContentsError> {
        let visits = contents.walk()?;

        let mut parents = HashMap::new();
        let mut state = HashMap::new();
        for visit in &visits {
            let layer = visit.layer;
            state.insert(
                layer.id,
                LayerState {
                    expanded: false,
                    visible: layer.visible,
                },
            );
            for sub in &layer.sublayers {
                parents.insert(*sub, layer.id);
            }
        }

        let layers = contents.index()?;
        let top = layers[&contents.root].sublayers.clone();
        let mut outline = Self {
            layers,
            parents,
            state,
            top,
            rows: Vec::new(),
        };
        outline.reset_rows();
        Ok(outline)
    }

    fn reset_rows(&mut self) {
        self.rows = self
            .top
            .iter()
            .map(|id| Row::Layer { id: *id, level: 0 })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<TocRow<'a>> {
        self.rows.get(index).map(|row| self.resolve(*row))
    }

    pub fn rows(&self) -> impl Iterator<Item = TocRow<'a>> + '_ {
        self.rows.iter().map(|row| self.resolve(*row))
    }

    fn resolve(&self, row: Row) -> TocRow<'a> {
        match row {
            Row::Layer { id, level } => {
                let layer = self.layers[&id];
                let state = self.state[&id];
                TocRow::Layer {
                    id,
                    name: &layer.name,
                    level,
                    expanded: state.expanded,
                    visible: state.visible,
                    can_change_visibility: layer.can_change_visibility,
                }
            }
            Row::Legend { owner, item, level } => {
                let layer = self.layers[&owner];
                TocRow::Legend {
                    owner: &layer.name,
                    item: &layer.legend_items[item],
                    level,
                }
            }
        }
    }

    /// Expand or collapse the layer at `index`.
    ///
    /// Returns `false` when the row is out of range or is a legend row.
    pub fn toggle(&mut self, index: usize) -> bool {
        let Some(Row::Layer { id, level }) = self.rows.get(index).copied() else {
            return false;
        };
        let expanded = self.state[&id].expanded;
        if expanded {
            self.collapse_at(index, level);
        } else {
            self.expand_at(index, id, level);
        }
        if let Some(state) = self.state.get_mut(&id) {
            state.expanded = !expanded;
        }
        tracing::debug!(layer = %id, expanded = !expanded, rows = self.rows.len(), "Toggled layer");
        true
    }

    fn expand_at(&mut self, index: usize, id: LayerId, level: usize) {
        let layer = self.layers[&id];
        let level = level + 1;
        let children: Vec<Row> = if !layer.sublayers.is_empty() {
            layer
                .sublayers
                .iter()
                .map(|sub| Row::Layer { id: *sub, level })
                .collect()
        } else {
            (0..layer.legend_items.len())
                .map(|item| Row::Legend {
                    owner: id,
                    item,
                    level,
                })
                .collect()
        };
        self.rows.splice(index + 1..index + 1, children);
    }

    fn collapse_at(&mut self, index: usize, level: usize) {
        let end = self.rows[index + 1..]
            .iter()
            .position(|row| row.level() <= level)
            .map_or(self.rows.len(), |offset| index + 1 + offset);
        for row in self.rows.drain(index + 1..end) {
            if let Row::Layer { id, .. } = row {
                if let Some(state) = self.state.get_mut(&id) {
                    state.expanded = false;
                }
            }
        }
    }

    /// Change the visibility of the layer at `index`.
    ///
    /// Only layer rows that allow it are affected; returns whether the change
    /// took effect.
    pub fn set_visibility(&mut self, index: usize, visible: bool) -> bool {
        let Some(Row::Layer { id, .. }) = self.rows.get(index).copied() else {
            return false;
        };
        if !self.layers[&id].can_change_visibility {
            return false;
        }
        match self.state.get_mut(&id) {
            Some(state) => {
                state.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Collapse every layer. Visibility choices are kept.
    pub fn collapse_all(&mut self) {
        for state in self.state.values_mut() {
            state.expanded = false;
        }
        self.reset_rows();
    }

    /// Whether a layer and all of its ancestors are switched on.
    pub fn is_effectively_visible(&self, id: LayerId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.state.get(&id) {
                Some(state) if state.visible => current = self.parents.get(&id).copied(),
                _ => return false,
            }
        }
        true
    }

    /// Ids of every layer that would be drawn, in no particular order.
    pub fn visible_layers(&self) -> Vec<LayerId> {
        self.state
            .keys()
            .copied()
            .filter(|id| self.is_effectively_visible(*id))
            .collect()
    }

    /// Plain-text rendering, `indent` spaces per level.
    pub fn render(&self, indent: usize) -> String {
        let mut output = String::new();
        for (i, row) in self.rows().enumerate() {
            match row {
                TocRow::Layer {
                    name,
                    level,
                    expanded,
                    visible,
                    ..
                } => {
                    let arrow = if expanded { '▾' } else { '▸' };
                    let check = if visible { 'x' } else { ' ' };
                    output.push_str(&format!(
                        "{:>3} {}{} [{}] {}\n",
                        i,
                        " ".repeat(indent * level),
                        arrow,
                        check,
                        name
                    ));
                }
                TocRow::Legend { item, level, .. } => {
                    let glyph = item.swatch.as_ref().map_or('·', |s| s.glyph());
                    output.push_str(&format!(
                        "{:>3} {}{} {}\n",
                        i,
                        " ".repeat(indent * level),
                        glyph,
                        item.label
                    ));
                }
            }
        }
        output
    }
}
