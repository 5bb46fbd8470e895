//! Visual element tree produced by renderers.
//!
//! Elements carry structure (tag), a styling hint (class) and attributes.
//! They do not own a theme.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Element {
    Text(String),
    Node(ElementNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementNode {
    pub tag: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<&'static str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl ElementNode {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }
}

impl From<ElementNode> for Element {
    fn from(node: ElementNode) -> Self {
        Element::Node(node)
    }
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element::Text(text.into())
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Element::Node(node) => Some(node.tag),
            Element::Text(_) => None,
        }
    }

    pub fn class(&self) -> Option<&'static str> {
        match self {
            Element::Node(node) => node.class,
            Element::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Element::Node(node) => node.attrs.get(name).map(String::as_str),
            Element::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Node(node) => &node.children,
            Element::Text(_) => &[],
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Element::Node(node) => Some(node),
            Element::Text(_) => None,
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Element::Text(text) => out.push_str(text),
            Element::Node(node) => {
                for child in &node.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// All elements matching `predicate`, in document order.
    pub fn find_all(&self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if predicate(element) {
                found.push(element);
            }
        });
        found
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.find_all(&|e| e.tag() == Some(tag))
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.find_all(&|e| e.class() == Some(class))
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Escaped HTML rendition of the subtree.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Element::Text(text) => escape_into(out, text),
            Element::Node(node) => {
                out.push('<');
                out.push_str(node.tag);
                if let Some(class) = node.class {
                    out.push_str(" class=\"");
                    escape_into(out, class);
                    out.push('"');
                }
                for (name, value) in &node.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, value);
                    out.push('"');
                }
                out.push('>');
                if is_void(node.tag) {
                    return;
                }
                for child in &node.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(node.tag);
                out.push('>');
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input")
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
