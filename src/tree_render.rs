//! ASCII tree rendering for layer hierarchies.

use crate::models::{LayerNode, LegendItem};

const NO_SWATCH: char = '·';

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Draw legend items as leaves under their layer.
    pub show_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_legend: true }
    }
}

/// Render a layer tree as ASCII art.
///
/// Example output:
/// ```text
/// Operational
/// ├── Roads
/// │   ├── ■ Highway
/// │   └── ■ Street
/// └── Parcels
///     └── ▣ Residential
/// ```
pub fn render_tree(root: &LayerNode, options: &RenderOptions) -> String {
    let mut output = String::new();
    output.push_str(&root.name);
    output.push('\n');
    render_children(&mut output, root, "", options);
    output
}

enum Line<'a> {
    Item(&'a LegendItem),
    Layer(&'a LayerNode),
}

fn render_children(output: &mut String, node: &LayerNode, prefix: &str, options: &RenderOptions) {
    let items = node
        .legend_items
        .iter()
        .filter(|_| options.show_legend)
        .map(Line::Item);
    let lines: Vec<Line> = items.chain(node.children.iter().map(Line::Layer)).collect();

    for (i, line) in lines.iter().enumerate() {
        let is_last = i == lines.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);

        match line {
            Line::Item(item) => {
                output.push(item.swatch.as_ref().map_or(NO_SWATCH, |s| s.glyph()));
                output.push(' ');
                output.push_str(&item.label);
                output.push('\n');
            }
            Line::Layer(child) => {
                output.push_str(&child.name);
                output.push('\n');
                let continuation = if is_last { "    " } else { "│   " };
                let child_prefix = format!("{}{}", prefix, continuation);
                render_children(output, child, &child_prefix, options);
            }
        }
    }
}
