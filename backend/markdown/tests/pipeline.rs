use std::sync::Arc;
use std::time::Duration;

use chatmark_clipboard::MemoryClipboard;
use chatmark_core::Clipboard;
use markdown::{
    CopyIndicator, MarkdownView, NodeKind, Pipeline, Registry, Renderer, render,
    standard_builder, standard_registry,
};

const DIAGRAM_DOC: &str = "# Title\n\n```mermaid\ngraph TD; A-->B;\n```\n";

fn mermaid_view() -> (MarkdownView, Arc<MemoryClipboard>) {
    let clipboard = Arc::new(MemoryClipboard::new());
    let view = MarkdownView::new(
        Arc::new(standard_registry().unwrap()),
        Some(clipboard.clone() as Arc<dyn Clipboard>),
    )
    .with_id("msg-1");
    (view, clipboard)
}

#[tokio::test(start_paused = true)]
async fn test_diagram_block_end_to_end() {
    let (mut view, clipboard) = mermaid_view();
    let root = view.set_text(DIAGRAM_DOC);

    let children = root.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].tag(), Some("h1"));
    assert_eq!(children[0].text_content(), "Title");

    let block = &children[1];
    assert_eq!(block.class(), Some("md-code"));
    assert_eq!(block.children()[0].class(), Some("md-code-header"));
    assert_eq!(block.children()[1].class(), Some("md-diagram"));
    assert_eq!(block.children()[1].text_content(), "graph TD; A-->B;");

    let header = view.header(0).unwrap();
    assert_eq!(header.language(), "mermaid");
    assert_eq!(header.code(), "graph TD; A-->B;");
    assert_eq!(header.indicator(), CopyIndicator::Copy);

    assert!(view.copy_block(0).await);
    assert_eq!(clipboard.contents().as_deref(), Some("graph TD; A-->B;"));
    assert_eq!(view.header(0).unwrap().controller().copied_value().as_deref(), Some("graph TD; A-->B;"));

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert!(view.header(0).unwrap().is_copied());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!view.header(0).unwrap().is_copied());
}

#[test]
fn test_language_override_is_case_insensitive() {
    let registry = standard_registry().unwrap();
    for fence in ["Mermaid", "MERMAID", "mermaid"] {
        let root = render(&format!("```{fence}\ngraph LR;\n```"), &registry);
        assert_eq!(root.find_by_class("md-diagram").len(), 1, "{fence}");
    }
    let root = render("```mermaid-js\ngraph LR;\n```", &registry);
    assert!(root.find_by_class("md-diagram").is_empty());
    assert_eq!(root.find_by_class("md-code-block").len(), 1);
}

#[test]
fn test_streaming_reuses_finished_blocks() {
    let registry = standard_registry().unwrap();
    let mut pipeline = Pipeline::new();
    let full = "Intro paragraph.\n\n```rust\nfn main() {}\n```\n\nTrailing words";
    let mut cut = full.len() / 2;
    while !full.is_char_boundary(cut) {
        cut += 1;
    }

    pipeline.render(&full[..cut], &registry);
    let incremental = pipeline.render(full, &registry);
    assert!(pipeline.last_stats().reused >= 1);
    assert_eq!(incremental, render(full, &registry));
}

#[tokio::test(start_paused = true)]
async fn test_copy_state_does_not_touch_render_cache() {
    let (mut view, _clipboard) = mermaid_view();
    view.set_text(DIAGRAM_DOC);
    view.set_text(DIAGRAM_DOC);
    let stats = view.last_stats();
    assert_eq!(stats.rendered, 0);

    let before = view.current();
    assert!(view.copy_block(0).await);
    let after = view.current();
    assert_eq!(view.last_stats(), stats);
    assert_ne!(before, after);
    assert_eq!(after.find_by_class("md-diagram"), before.find_by_class("md-diagram"));
}

#[test]
fn test_custom_registry_with_failing_override() {
    let registry: Registry = standard_builder()
        .bind_language(
            "broken",
            Renderer::new("broken", |_, _| panic!("unsupported syntax")),
        )
        .build()
        .unwrap();
    let root = render("# Ok\n\n```broken\nkeep me\n```\n\nstill rendered", &registry);
    assert_eq!(root.children()[0].tag(), Some("h1"));
    assert_eq!(root.find_by_class("md-fallback")[0].text_content(), "keep me\n");
    assert_eq!(root.children()[2].text_content(), "still rendered");
    assert!(registry.is_bound(NodeKind::CodeBlock));
}

#[test]
fn test_element_tree_serializes() {
    let registry = standard_registry().unwrap();
    let root = render("Hello **world**", &registry);
    let json = serde_json::to_value(&root).unwrap();
    assert_eq!(json["tag"], "div");
    assert_eq!(json["children"][0]["tag"], "p");
    assert_eq!(json["children"][0]["children"][0], "Hello ");

    let html = root.to_html();
    assert!(html.contains("<strong class=\"md-strong\">world</strong>"));
}
