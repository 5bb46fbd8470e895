//! Incremental Render Pipeline
//!
//! Parse, then a post-order walk that renders children before their parent
//! and resolves each node against the [`Registry`]. Renders are memoized on
//! `(registry, kind, renderer identity, content hash)`, so re-rendering a
//! growing buffer only recomputes the subtrees that changed.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use chatmark_core::RenderError;
use logging::{EventLogger, RenderEvent};
use tracing::{debug, warn};

use crate::code_block::wrap_code_block;
use crate::element::{Element, ElementNode};
use crate::ir::{IrParser, Node, NodeKind, ParseOptions};
use crate::registry::{Registry, RegistryId, RendererId};

/// Render a text buffer once, without a persistent cache.
pub fn render(text: &str, registry: &Registry) -> Element {
    Pipeline::new().render(text, registry)
}

/// Counters for the most recent render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Nodes whose renderer actually ran.
    pub rendered: usize,
    /// Subtrees served from the memo cache.
    pub reused: usize,
    /// Nodes that degraded to raw text after a renderer failure.
    pub fallbacks: usize,
    /// Nodes rendered by the passthrough because their kind was unbound.
    pub unknown_kinds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    // A cached subtree embeds its descendants' renderers, which only the
    // registry determines.
    registry: RegistryId,
    kind: NodeKind,
    renderer: RendererId,
    content: u64,
}

pub struct Pipeline {
    options: ParseOptions,
    scope: String,
    current: HashMap<MemoKey, Element>,
    previous: HashMap<MemoKey, Element>,
    stats: RenderStats,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            scope: "markdown".to_string(),
            current: HashMap::new(),
            previous: HashMap::new(),
            stats: RenderStats::default(),
        }
    }

    /// Name attached to render events from this pipeline.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn last_stats(&self) -> RenderStats {
        self.stats
    }

    pub fn cached_entries(&self) -> usize {
        self.current.len()
    }

    pub fn clear_cache(&mut self) {
        self.current.clear();
        self.previous.clear();
    }

    pub fn render(&mut self, text: &str, registry: &Registry) -> Element {
        let nodes = IrParser::parse_with(text, self.options);
        self.render_nodes(&nodes, registry)
    }

    /// Render an already parsed tree into the root container.
    pub fn render_nodes(&mut self, nodes: &[Node], registry: &Registry) -> Element {
        // Entries not touched by this render are dropped at the end.
        self.previous = std::mem::take(&mut self.current);
        self.stats = RenderStats::default();

        let children = nodes
            .iter()
            .map(|node| self.render_node(node, registry))
            .collect();
        self.previous.clear();

        debug!(
            scope = %self.scope,
            rendered = self.stats.rendered,
            reused = self.stats.reused,
            fallbacks = self.stats.fallbacks,
            "Rendered markdown"
        );
        ElementNode::new("div").class("md-root").children(children).into()
    }

    fn render_node(&mut self, node: &Node, registry: &Registry) -> Element {
        let renderer = registry.resolve_node(node);
        let key = MemoKey {
            registry: registry.id(),
            kind: node.kind,
            renderer: renderer.id(),
            content: node.fingerprint(),
        };

        if let Some(hit) = self.lookup(&key) {
            self.stats.reused += 1;
            return hit;
        }

        if renderer == registry.fallback() {
            self.stats.unknown_kinds += 1;
            EventLogger::log_event(
                &self.scope,
                RenderEvent::UnknownKind {
                    kind: node.kind.to_string(),
                },
            );
        }

        let children: Vec<Element> = node
            .children
            .iter()
            .map(|child| self.render_node(child, registry))
            .collect();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(node, children)))
            .unwrap_or_else(|_| Err(RenderError::Panicked(renderer.name().to_string())));

        let element = match outcome {
            Ok(element) => {
                self.stats.rendered += 1;
                element
            }
            Err(err) => {
                self.stats.fallbacks += 1;
                warn!(kind = %node.kind, renderer = renderer.name(), error = %err, "Renderer failed; showing raw text");
                EventLogger::log_event(
                    &self.scope,
                    RenderEvent::RendererFailed {
                        kind: node.kind.to_string(),
                        renderer: renderer.name().to_string(),
                        error: err.to_string(),
                    },
                );
                raw_text_fallback(node)
            }
        };

        let element = if node.kind == NodeKind::CodeBlock {
            wrap_code_block(node, element)
        } else {
            element
        };

        self.current.insert(key, element.clone());
        element
    }

    fn lookup(&mut self, key: &MemoKey) -> Option<Element> {
        if let Some(hit) = self.current.get(key) {
            return Some(hit.clone());
        }
        let hit = self.previous.remove(key)?;
        self.current.insert(*key, hit.clone());
        Some(hit)
    }
}

fn raw_text_fallback(node: &Node) -> Element {
    let tag = if node.kind.is_block() { "div" } else { "span" };
    ElementNode::new(tag)
        .class("md-fallback")
        .attr("data-kind", node.kind.to_string())
        .child(Element::text(node.plain_text()))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Renderer;
    use crate::renderers::{standard_builder, standard_registry};

    #[test]
    fn test_post_order_children_rendered_first() {
        let registry = standard_registry().unwrap();
        let root = render("Some **bold** text", &registry);
        let p = &root.children()[0];
        assert_eq!(p.tag(), Some("p"));
        assert_eq!(p.children()[1].tag(), Some("strong"));
        assert_eq!(p.text_content(), "Some bold text");
    }

    #[test]
    fn test_empty_text_renders_empty_root() {
        let registry = standard_registry().unwrap();
        let root = render("", &registry);
        assert_eq!(root.class(), Some("md-root"));
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_unchanged_render_is_fully_reused() {
        let registry = standard_registry().unwrap();
        let mut pipeline = Pipeline::new();
        let text = "# Title\n\nA paragraph with *emphasis*.\n";
        let first = pipeline.render(text, &registry);
        assert_eq!(pipeline.last_stats().reused, 0);

        let second = pipeline.render(text, &registry);
        assert_eq!(first, second);
        assert_eq!(pipeline.last_stats().rendered, 0);
        assert_eq!(pipeline.last_stats().reused, 2);
    }

    #[test]
    fn test_switching_registry_does_not_reuse_subtrees() {
        let paragraph = Renderer::new("paragraph", |_, children| {
            Ok(ElementNode::new("p").children(children).into())
        });
        let text_with = |name: &str, f: fn(&str) -> String| {
            Renderer::new(name, move |node, _| Ok(Element::text(f(node.literal().unwrap_or_default()))))
        };
        let shouting = Registry::builder()
            .bind(NodeKind::Paragraph, paragraph.clone())
            .bind(NodeKind::Text, text_with("upper", str::to_uppercase))
            .build()
            .unwrap();
        let quiet = Registry::builder()
            .bind(NodeKind::Paragraph, paragraph)
            .bind(NodeKind::Text, text_with("plain", str::to_string))
            .build()
            .unwrap();
        assert_ne!(shouting.id(), quiet.id());

        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.render("hello", &shouting).text_content(), "HELLO");
        let root = pipeline.render("hello", &quiet);
        assert_eq!(root, render("hello", &quiet));
        assert_eq!(root.text_content(), "hello");
        assert_eq!(pipeline.last_stats().reused, 0);
    }

    #[test]
    fn test_appended_text_reuses_prefix() {
        let registry = standard_registry().unwrap();
        let mut pipeline = Pipeline::new();
        pipeline.render("# Title\n\nFirst para.\n\nSec", &registry);
        let root = pipeline.render("# Title\n\nFirst para.\n\nSecond para.", &registry);

        let stats = pipeline.last_stats();
        assert_eq!(stats.reused, 2);
        assert!(stats.rendered >= 2);
        assert_eq!(root.children()[2].text_content(), "Second para.");
    }

    #[test]
    fn test_cache_only_keeps_live_entries() {
        let registry = standard_registry().unwrap();
        let mut pipeline = Pipeline::new();
        pipeline.render("alpha\n\nbeta\n\ngamma", &registry);
        let before = pipeline.cached_entries();
        pipeline.render("alpha", &registry);
        assert!(pipeline.cached_entries() < before);
    }

    #[test]
    fn test_failing_renderer_is_contained() {
        let registry = standard_builder()
            .bind_language(
                "boom",
                Renderer::new("boom", |_, _| {
                    Err(RenderError::Rejected {
                        renderer: "boom".into(),
                        message: "bad input".into(),
                    })
                }),
            )
            .build()
            .unwrap();
        let mut pipeline = Pipeline::new();
        let root = pipeline.render("before\n\n```boom\nraw source\n```\n\nafter", &registry);

        assert_eq!(pipeline.last_stats().fallbacks, 1);
        assert_eq!(root.children().len(), 3);
        let fallback = &root.find_by_class("md-fallback")[0];
        assert_eq!(fallback.text_content(), "raw source\n");
        assert_eq!(root.children()[2].text_content(), "after");
    }

    #[test]
    fn test_panicking_renderer_is_contained() {
        let registry = standard_builder()
            .bind_language("panic", Renderer::new("panic", |_, _| panic!("renderer bug")))
            .build()
            .unwrap();
        let root = render("```panic\nx\n```\n\nstill here", &registry);
        assert_eq!(root.find_by_class("md-fallback").len(), 1);
        assert_eq!(root.children()[1].text_content(), "still here");
    }

    #[test]
    fn test_unbound_kind_passes_through() {
        let registry = crate::registry::Registry::builder()
            .bind(NodeKind::Text, crate::renderers::for_kind(NodeKind::Text))
            .build()
            .unwrap();
        let mut pipeline = Pipeline::new();
        let root = pipeline.render("> quoted", &registry);
        assert_eq!(root.text_content(), "quoted");
        assert_eq!(root.children()[0].tag(), Some("div"));
        assert_eq!(pipeline.last_stats().unknown_kinds, 2);
    }

    #[test]
    fn test_table_shape_preserved() {
        let registry = standard_registry().unwrap();
        let root = render(
            "| a | b | c |\n|:--|:-:|--:|\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |\n",
            &registry,
        );
        let rows = root.find_by_tag("tr");
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.children().len(), 3);
            let aligns: Vec<_> = row.children().iter().map(|c| c.attr("align")).collect();
            assert_eq!(aligns, vec![Some("left"), Some("center"), Some("right")]);
        }
        assert_eq!(root.find_by_tag("th").len(), 3);
        assert_eq!(root.find_by_tag("td").len(), 6);
    }
}
