use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use legend_tree::config::{AppConfig, OutputFormat};
use legend_tree::toc::TocOutline;
use legend_tree::tree_render::{render_tree, RenderOptions};
use legend_tree::{sections, ContentsDocument, LegendDataSource};

#[derive(Parser)]
#[command(name = "legend")]
#[command(about = "Flatten map layer trees into display-ordered legend lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every legend item in display order
    Flatten {
        /// Contents document (nested tree or id-linked table)
        file: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Print the legend grouped under one header per layer
    Sections {
        file: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Draw the layer tree
    Tree {
        file: PathBuf,

        /// Leave legend items out of the drawing
        #[arg(long)]
        no_legend: bool,
    },
    /// Print layer and legend counts
    Stats { file: PathBuf },
    /// Show the table of contents after expanding the given rows in turn
    Toc {
        file: PathBuf,

        /// Row to toggle; may be repeated and is applied in order
        #[arg(short, long)]
        expand: Vec<usize>,

        /// Row to switch off; applied after all expansions
        #[arg(long)]
        hide: Vec<usize>,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing on stderr so stdout stays clean for JSON output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "legend_tree=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(file: &Path) -> anyhow::Result<ContentsDocument> {
    ContentsDocument::from_path(file)
        .with_context(|| format!("Failed to load contents from {}", file.display()))
}

fn to_json<T: Serialize>(value: &T, indent: usize) -> anyhow::Result<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();

    match cli.command {
        Commands::Flatten { file, format } => {
            let source = match load(&file)? {
                ContentsDocument::Table(contents) => {
                    LegendDataSource::from_entries(contents.flatten()?)
                }
                ContentsDocument::Tree(tree) => LegendDataSource::new(&tree),
            };
            tracing::info!("Flattened {} legend rows", source.row_count());

            match format.unwrap_or(config.format) {
                OutputFormat::Json => println!("{}", to_json(&source.rows(), config.indent)?),
                OutputFormat::Text => {
                    for (i, entry) in source.rows().iter().enumerate() {
                        let glyph = entry.swatch.as_ref().map_or('·', |s| s.glyph());
                        println!("{:>3} {} {}  ({})", i, glyph, entry.detail, entry.owner_name);
                    }
                }
            }
        }
        Commands::Sections { file, format } => {
            let tree = load(&file)?.into_tree()?;
            let sections = sections(&tree);

            match format.unwrap_or(config.format) {
                OutputFormat::Json => println!("{}", to_json(&sections, config.indent)?),
                OutputFormat::Text => {
                    let pad = " ".repeat(config.indent);
                    for section in &sections {
                        println!("{}", section.title);
                        for entry in &section.entries {
                            let glyph = entry.swatch.as_ref().map_or('·', |s| s.glyph());
                            println!("{}{} {}", pad, glyph, entry.detail);
                        }
                    }
                }
            }
        }
        Commands::Tree { file, no_legend } => {
            let tree = load(&file)?.into_tree()?;
            let options = RenderOptions {
                show_legend: config.show_legend && !no_legend,
            };
            print!("{}", render_tree(&tree, &options));
        }
        Commands::Stats { file } => {
            let tree = load(&file)?.into_tree()?;
            println!("root:          {}", tree.name);
            println!("layers:        {}", tree.descendant_count() + 1);
            println!("depth:         {}", tree.depth());
            println!("legend items:  {}", tree.legend_item_count());
            println!("outline rows:  {}", tree.descendant_and_legend_count());
        }
        Commands::Toc { file, expand, hide } => {
            let contents = load(&file)?.into_contents();
            let mut outline = TocOutline::new(&contents)?;
            for row in expand {
                if !outline.toggle(row) {
                    tracing::warn!("Row {} is not a layer, skipping", row);
                }
            }
            for row in hide {
                if !outline.set_visibility(row, false) {
                    tracing::warn!("Visibility of row {} cannot be changed", row);
                }
            }
            print!("{}", outline.render(config.indent));
        }
        Commands::Config { save } => {
            println!("{}", to_json(&config, config.indent)?);
            if save {
                config.save()?;
                tracing::info!("Saved configuration");
            }
        }
    }

    Ok(())
}
