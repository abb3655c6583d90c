use std::io::Write;

use legend_tree::models::*;
use legend_tree::ContentsError;
use speculate2::speculate;

fn record(name: &str, labels: &[&str]) -> LayerRecord {
    LayerRecord {
        legend_items: labels.iter().map(|l| LegendItem::new(*l)).collect(),
        ..LayerRecord::new(name)
    }
}

fn write_document(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes())
        .expect("Failed to write document");
    file
}

speculate! {
    describe "MapContents" {
        describe "flatten" {
            it "follows sublayer order rather than table order" {
                let mut root = record("Root", &["r"]);
                let a = record("A", &["a"]);
                let b = record("B", &["b"]);
                root.sublayers = vec![b.id, a.id];
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![a, b, root],
                };

                let details: Vec<_> = contents
                    .flatten()
                    .expect("valid snapshot")
                    .into_iter()
                    .map(|e| e.detail)
                    .collect();
                assert_eq!(details, ["r", "b", "a"]);
            }

            it "fails fast on a cycle instead of hanging" {
                let mut root = record("Root", &["r"]);
                let mut group = record("Group", &["g"]);
                let mut inner = record("Inner", &["i"]);
                inner.sublayers = vec![group.id];
                group.sublayers = vec![inner.id];
                root.sublayers = vec![group.id];
                let group_id = group.id;
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![root, group, inner],
                };

                match contents.flatten() {
                    Err(ContentsError::Cycle { id, name }) => {
                        assert_eq!(id, group_id);
                        assert_eq!(name, "Group");
                    }
                    other => panic!("expected a cycle error, got {:?}", other),
                }
            }

            it "rejects a layer shared by two parents" {
                let mut root = record("Root", &[]);
                let mut a = record("A", &[]);
                let mut b = record("B", &[]);
                let shared = record("Shared", &["s"]);
                a.sublayers = vec![shared.id];
                b.sublayers = vec![shared.id];
                root.sublayers = vec![a.id, b.id];
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![root, a, b, shared],
                };

                assert!(matches!(contents.flatten(), Err(ContentsError::Cycle { .. })));
            }
        }

        describe "duplicate ids" {
            it "rejects two records sharing an id" {
                let mut root = record("Root", &[]);
                let first = record("A", &["first"]);
                let second = LayerRecord {
                    id: first.id,
                    ..record("A-dup", &["second"])
                };
                root.sublayers = vec![first.id];
                let first_id = first.id;
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![root, first, second],
                };

                match contents.flatten() {
                    Err(ContentsError::DuplicateLayer { id }) => assert_eq!(id, first_id),
                    other => panic!("expected a duplicate id error, got {:?}", other),
                }
                assert!(matches!(contents.to_tree(), Err(ContentsError::DuplicateLayer { .. })));
                assert!(matches!(
                    legend_tree::toc::TocOutline::new(&contents),
                    Err(ContentsError::DuplicateLayer { .. })
                ));
            }

            it "rejects a duplicate even when it is unreachable" {
                let root = record("Root", &[]);
                let stray = LayerRecord {
                    id: root.id,
                    ..record("Stray", &[])
                };
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![root, stray],
                };

                assert!(matches!(contents.walk(), Err(ContentsError::DuplicateLayer { .. })));
            }
        }

        describe "to_tree" {
            it "rebuilds a very deep chain without exhausting the stack" {
                const DEPTH: usize = 200_000;
                let mut layers: Vec<LayerRecord> = (0..DEPTH)
                    .map(|i| record(&format!("L{}", i), &[]))
                    .collect();
                for i in 0..DEPTH - 1 {
                    let next = layers[i + 1].id;
                    layers[i].sublayers.push(next);
                }
                layers[DEPTH - 1].legend_items.push(LegendItem::new("bottom"));
                let contents = ::legend_tree::MapContents {
                    root: layers[0].id,
                    layers,
                };

                let tree = contents.to_tree().expect("valid snapshot");

                let mut node = &tree;
                let mut depth = 0;
                while let Some(child) = node.children.first() {
                    assert_eq!(node.children.len(), 1);
                    node = child;
                    depth += 1;
                }
                assert_eq!(depth, DEPTH - 1);
                assert_eq!(node.name, format!("L{}", DEPTH - 1));
                assert_eq!(node.legend_items[0].label, "bottom");
                assert_eq!(tree.depth(), DEPTH - 1);
                assert_eq!(tree.descendant_count(), DEPTH - 1);
                assert_eq!(tree.legend_item_count(), 1);
            }

            it "keeps sibling order when rebuilding" {
                let mut root = record("Root", &[]);
                let mut a = record("A", &[]);
                let a1 = record("A1", &["x"]);
                let b = record("B", &["y"]);
                a.sublayers = vec![a1.id];
                root.sublayers = vec![a.id, b.id];
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![b, a1, a, root],
                };

                let tree = contents.to_tree().expect("valid snapshot");
                let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, ["A", "B"]);
                assert_eq!(tree.children[0].children[0].name, "A1");
                assert!(tree.children[1].children.is_empty());
            }

            it "refuses a snapshot with a dangling sublayer" {
                let mut root = record("Root", &[]);
                root.sublayers = vec![LayerId::new()];
                let contents = ::legend_tree::MapContents {
                    root: root.id,
                    layers: vec![root],
                };

                assert!(matches!(contents.to_tree(), Err(ContentsError::UnknownLayer { .. })));
            }
        }
    }

    describe "ContentsDocument" {
        it "loads a nested tree from disk" {
            let file = write_document(r#"{
                "name": "Operational",
                "children": [
                    {
                        "name": "Zoning",
                        "legend_items": [
                            { "label": "Residential", "swatch": { "kind": "fill", "color": [255, 255, 0, 255] } },
                            { "label": "Hospital", "swatch": { "kind": "marker", "glyph": "H", "color": [255, 0, 0, 255] } },
                            { "label": "Park", "swatch": { "kind": "image", "source": "park.png" } }
                        ]
                    }
                ]
            }"#);

            let document = ::legend_tree::ContentsDocument::from_path(file.path()).expect("Failed to load");
            assert_eq!(document.kind(), "tree");

            let tree = document.into_tree().expect("valid tree");
            let glyphs: Vec<_> = legend_tree::flatten(&tree)
                .iter()
                .map(|e| e.swatch.as_ref().map(Swatch::glyph))
                .collect();
            assert_eq!(glyphs, [Some('■'), Some('H'), Some('▣')]);
        }

        it "loads an id-linked table" {
            let root = LayerId::new();
            let child = LayerId::new();
            let json = format!(r#"{{
                "root": "{root}",
                "layers": [
                    {{ "id": "{child}", "name": "Wells", "legend_items": [{{ "label": "Active" }}], "visible": false }},
                    {{ "id": "{root}", "name": "Map", "sublayers": ["{child}"] }}
                ]
            }}"#);
            let file = write_document(&json);

            let contents = ::legend_tree::ContentsDocument::from_path(file.path())
                .expect("Failed to load")
                .into_contents();
            assert_eq!(contents.root, root);
            assert!(!contents.layer(child).expect("child exists").visible);
            assert_eq!(contents.flatten().expect("valid snapshot").len(), 1);
        }

        it "reports a missing file" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let result = ::legend_tree::ContentsDocument::from_path(&dir.path().join("missing.json"));
            assert!(matches!(result, Err(ContentsError::Io { .. })));
        }

        it "reports the field error of a malformed tree" {
            let result = ::legend_tree::ContentsDocument::from_json(r#"{ "name": 5 }"#);
            match result {
                Err(ContentsError::Json(e)) => {
                    let message = e.to_string();
                    assert!(message.contains("invalid type"), "{}", message);
                    assert!(!message.contains("untagged"), "{}", message);
                }
                other => panic!("expected a json error, got {:?}", other),
            }
        }

        it "reports the field error of a malformed table" {
            let json = format!(r#"{{ "root": "{}" }}"#, LayerId::new());
            match ::legend_tree::ContentsDocument::from_json(&json) {
                Err(ContentsError::Json(e)) => {
                    assert!(e.to_string().contains("missing field `layers`"), "{}", e);
                }
                other => panic!("expected a json error, got {:?}", other),
            }
        }

        it "reports malformed json" {
            let file = write_document("{ not json");
            let result = ::legend_tree::ContentsDocument::from_path(file.path());
            assert!(matches!(result, Err(ContentsError::Json(_))));
        }
    }
}
