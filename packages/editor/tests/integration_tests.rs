//! End-to-end document lifecycle tests: build → save → load → render.

use anyhow::Result;
use penmark_document::builtins::tags;
use penmark_document::{DocumentNode, NodePath};
use penmark_editor::{EditOp, EditorConfig, EditorSession, MemoryClipboard};
use penmark_render::HostUpdate;
use serde_json::json;

fn session() -> EditorSession<MemoryClipboard> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    EditorSession::new(EditorConfig::default(), MemoryClipboard::new())
}

fn insert_at_end(
    session: &mut EditorSession<MemoryClipboard>,
    node: DocumentNode,
) -> penmark_editor::UpdateResult {
    let index = session.tree().root().children.len();
    session
        .apply(EditOp::Insert {
            parent_path: NodePath::root(),
            index,
            node,
        })
        .expect("insert should succeed")
}

#[test]
fn code_block_survives_save_and_load() -> Result<()> {
    let mut author = session();
    let code = DocumentNode::new(author.mint_key(), tags::CODE)
        .attr("code", "print(1)")
        .attr("language", "python");
    insert_at_end(&mut author, code);

    let blob = author.save();

    let mut reader = session();
    let result = reader.load(&blob);

    let reloaded = &reader.tree().root().children[0];
    assert_eq!(reloaded.node_type, tags::CODE);
    assert_eq!(reloaded.attr_str("code"), Some("print(1)"));
    assert_eq!(reloaded.attr_str("language"), Some("python"));

    // Mounted through the code-block renderer, not the placeholder path.
    let mounted = result
        .updates
        .iter()
        .find_map(|update| match update {
            HostUpdate::Mount { key, view } if *key == reloaded.key => Some(view),
            _ => None,
        })
        .expect("code block should mount a host view");
    assert_eq!(mounted.tag(), Some("pre"));
    Ok(())
}

#[test]
fn save_load_round_trip_preserves_structure() {
    let mut author = session();
    let heading = DocumentNode::new(author.mint_key(), tags::HEADING)
        .attr("level", 1)
        .attr("text", "Title");
    insert_at_end(&mut author, heading);
    let video = DocumentNode::new(author.mint_key(), tags::VIDEO)
        .attr("src", "https://www.youtube.com/watch?v=abc123")
        .attr("title", "Demo");
    insert_at_end(&mut author, video);
    let table = author.create_table(2, 3);
    insert_at_end(&mut author, table);

    let blob = author.save();
    let mut reader = session();
    reader.load(&blob);

    assert!(author.tree().root().same_structure(reader.tree().root()));
}

#[test]
fn unknown_block_type_loads_as_placeholder_between_intact_siblings() {
    let mut reader = session();
    let blob = json!({
        "type": "root",
        "version": 1,
        "children": [
            { "type": "paragraph", "version": 1, "text": "before" },
            { "type": "poll", "version": 2, "question": "?" },
            { "type": "paragraph", "version": 1, "text": "after" },
        ],
    });

    let result = reader.load(&blob);

    let children = &reader.tree().root().children;
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].attr_str("text"), Some("before"));
    assert_eq!(children[1].node_type, tags::UNSUPPORTED);
    assert_eq!(children[2].attr_str("text"), Some("after"));

    // The placeholder mounts a visible stand-in view.
    let placeholder_view = result
        .updates
        .iter()
        .find_map(|update| match update {
            HostUpdate::Mount { key, view } if *key == children[1].key => Some(view),
            _ => None,
        })
        .expect("placeholder should mount");
    assert_eq!(placeholder_view.tag(), Some("div"));

    // Saving again does not lose the unknown block.
    let saved = reader.save();
    assert_eq!(saved["children"][1]["type"], "poll");
    assert_eq!(saved["children"][1]["question"], "?");
}

#[test]
fn generated_markdown_lands_in_the_tree_and_mounts_decorators() {
    let mut session = session();
    let markdown = "\
## Update

Some intro text.

```rust
fn main() {}
```
";
    let result = session.insert_generated_content(markdown).unwrap();

    let types: Vec<&str> = session
        .tree()
        .root()
        .children
        .iter()
        .map(|node| node.node_type.as_str())
        .collect();
    assert_eq!(types, ["heading", "paragraph", "code"]);

    // Exactly the code block is a decorator here, so exactly one mount.
    let mounts = result
        .updates
        .iter()
        .filter(|update| matches!(update, HostUpdate::Mount { .. }))
        .count();
    assert_eq!(mounts, 1);
}

#[test]
fn malformed_media_url_blocks_insertion_with_a_field_error() {
    let mut session = session();
    let node = DocumentNode::new(session.mint_key(), tags::IMAGE).attr("src", "garbage");

    let err = session
        .apply(EditOp::Insert {
            parent_path: NodePath::root(),
            index: 0,
            node,
        })
        .unwrap_err();

    match err {
        penmark_document::DocumentError::InvalidAttribute { name, .. } => {
            assert_eq!(name, "src")
        }
        other => panic!("expected a field-level validation error, got {other}"),
    }
    assert!(session.tree().root().children.is_empty());
}

#[test]
fn removing_a_decorator_unmounts_its_view() {
    let mut session = session();
    let image = DocumentNode::new(session.mint_key(), tags::IMAGE)
        .attr("src", "https://a.example/a.png");
    let key = image.key.clone();
    insert_at_end(&mut session, image);

    let result = session.apply(EditOp::Remove { key: key.clone() }).unwrap();
    assert_eq!(result.updates, vec![HostUpdate::Unmount { key }]);
}

#[test]
fn versions_bump_once_per_applied_edit() {
    let mut session = session();
    assert_eq!(session.version(), 0);

    let quote = DocumentNode::new(session.mint_key(), tags::BLOCKQUOTE).attr("text", "q");
    insert_at_end(&mut session, quote);
    assert_eq!(session.version(), 1);

    session.insert_generated_content("More.\n").unwrap();
    assert_eq!(session.version(), 2);
}
