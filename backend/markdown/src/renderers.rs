//! Standard renderer set.
//!
//! One renderer per node kind, each tagging its element with the structural
//! role and a `md-*` class hint for the host's stylesheet.

use chatmark_core::RegistryError;

use crate::code_block::language_label;
use crate::element::{Element, ElementNode};
use crate::ir::{Alignment, Node, NodeKind};
use crate::registry::{Registry, RegistryBuilder, Renderer};

/// Language served by the diagram renderer in the standard registry.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Standard bindings plus the `mermaid` diagram override.
pub fn standard_registry() -> Result<Registry, RegistryError> {
    standard_builder()
        .bind_language(DIAGRAM_LANGUAGE, diagram())
        .build()
}

/// Every kind bound to its standard renderer, no language overrides.
pub fn standard_builder() -> RegistryBuilder {
    NodeKind::ALL
        .into_iter()
        .fold(Registry::builder(), |builder, kind| builder.bind(kind, for_kind(kind)))
}

/// Renderers that configuration can refer to by name.
pub fn by_name(name: &str) -> Option<Renderer> {
    match name {
        "diagram" => Some(diagram()),
        "code" => Some(code_block()),
        "passthrough" => Some(crate::registry::passthrough()),
        _ => None,
    }
}

pub fn for_kind(kind: NodeKind) -> Renderer {
    match kind {
        NodeKind::Heading(level) => heading(level),
        NodeKind::Paragraph => container("p", "md-p"),
        NodeKind::Blockquote => container("blockquote", "md-blockquote"),
        NodeKind::UnorderedList => container("ul", "md-ul"),
        NodeKind::OrderedList => ordered_list(),
        NodeKind::ListItem => container("li", "md-li"),
        NodeKind::TaskListMarker => task_marker(),
        NodeKind::Table => container("table", "md-table"),
        NodeKind::TableRow => container("tr", "md-tr"),
        NodeKind::TableCell => table_cell(),
        NodeKind::HorizontalRule => container("hr", "md-hr"),
        NodeKind::CodeBlock => code_block(),
        NodeKind::Html => literal("span", "md-html"),
        NodeKind::FootnoteDefinition => footnote_definition(),
        NodeKind::Emphasis => container("em", "md-em"),
        NodeKind::Strong => container("strong", "md-strong"),
        NodeKind::Strikethrough => container("del", "md-del"),
        NodeKind::Link => link(),
        NodeKind::Image => image(),
        NodeKind::CodeSpan => literal("code", "md-code-inline"),
        NodeKind::Superscript => container("sup", "md-sup"),
        NodeKind::Text => text(),
        NodeKind::SoftBreak => Renderer::new("soft_break", |_, _| Ok(Element::text("\n"))),
        NodeKind::HardBreak => container("br", "md-br"),
    }
}

fn container(tag: &'static str, class: &'static str) -> Renderer {
    Renderer::new(tag, move |_, children| {
        Ok(ElementNode::new(tag).class(class).children(children).into())
    })
}

fn literal(tag: &'static str, class: &'static str) -> Renderer {
    Renderer::new(tag, move |node, _| {
        Ok(ElementNode::new(tag)
            .class(class)
            .child(Element::text(node.literal().unwrap_or_default()))
            .into())
    })
}

fn heading(level: u8) -> Renderer {
    let (tag, class) = match level {
        1 => ("h1", "md-h1"),
        2 => ("h2", "md-h2"),
        3 => ("h3", "md-h3"),
        4 => ("h4", "md-h4"),
        5 => ("h5", "md-h5"),
        _ => ("h6", "md-h6"),
    };
    container(tag, class)
}

fn text() -> Renderer {
    Renderer::new("text", |node, _| Ok(Element::text(node.literal().unwrap_or_default())))
}

fn ordered_list() -> Renderer {
    Renderer::new("ol", |node, children| {
        let mut element = ElementNode::new("ol").class("md-ol").children(children);
        if let Some(start) = node.attrs.start.filter(|start| *start != 1) {
            element = element.attr("start", start.to_string());
        }
        Ok(element.into())
    })
}

fn task_marker() -> Renderer {
    Renderer::new("task_marker", |node, _| {
        let mut element = ElementNode::new("input")
            .class("md-task")
            .attr("type", "checkbox")
            .attr("disabled", "");
        if node.attrs.checked == Some(true) {
            element = element.attr("checked", "");
        }
        Ok(element.into())
    })
}

fn table_cell() -> Renderer {
    Renderer::new("table_cell", |node, children| {
        let (tag, class) = if node.attrs.header {
            ("th", "md-th")
        } else {
            ("td", "md-td")
        };
        let mut element = ElementNode::new(tag).class(class).children(children);
        if let Some(align) = node.attrs.alignment.and_then(|a: Alignment| a.as_str()) {
            element = element.attr("align", align);
        }
        Ok(element.into())
    })
}

fn footnote_definition() -> Renderer {
    Renderer::new("footnote", |node, children| {
        let label = node.attrs.label.clone().unwrap_or_default();
        Ok(ElementNode::new("section")
            .class("md-footnote")
            .attr("id", format!("fn-{label}"))
            .children(children)
            .into())
    })
}

fn link() -> Renderer {
    Renderer::new("a", |node, children| {
        let mut element = ElementNode::new("a")
            .class("md-a")
            .attr("href", node.attrs.href.clone().unwrap_or_default())
            .children(children);
        if let Some(title) = &node.attrs.title {
            element = element.attr("title", title.clone());
        }
        Ok(element.into())
    })
}

fn image() -> Renderer {
    Renderer::new("img", |node: &Node, _| {
        let mut element = ElementNode::new("img")
            .class("md-img")
            .attr("src", node.attrs.href.clone().unwrap_or_default())
            .attr("alt", node.plain_text());
        if let Some(title) = &node.attrs.title {
            element = element.attr("title", title.clone());
        }
        Ok(element.into())
    })
}

/// Generic code block body: `pre > code` with the raw text.
pub fn code_block() -> Renderer {
    Renderer::new("code_block", |node, _| {
        let code = ElementNode::new("code")
            .class("md-code-block")
            .attr("data-language", language_label(node.language()))
            .child(Element::text(node.literal().unwrap_or_default()));
        Ok(ElementNode::new("pre").class("md-pre").child(code).into())
    })
}

/// Diagram body: the source is kept verbatim for a client-side diagram engine.
pub fn diagram() -> Renderer {
    Renderer::new("diagram", |node, _| {
        Ok(ElementNode::new("div")
            .class("md-diagram")
            .attr("data-language", language_label(node.language()))
            .child(
                ElementNode::new("pre")
                    .class("md-diagram-source")
                    .child(Element::text(node.literal().unwrap_or_default())),
            )
            .into())
    })
}
