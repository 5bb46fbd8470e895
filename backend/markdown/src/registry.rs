//! Renderer Registry
//!
//! Immutable `kind → renderer` table plus a code-language override table.
//! Every renderer is allocated once when the registry is built and handed out
//! by reference afterwards, so its identity can key memoized renders.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chatmark_core::{RegistryError, RenderError};

use crate::element::{Element, ElementNode};
use crate::ir::{Node, NodeKind};

pub type RenderResult = Result<Element, RenderError>;

type RenderFn = dyn Fn(&Node, Vec<Element>) -> RenderResult + Send + Sync;

/// Identity of a renderer value; equal only for clones of the same renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(usize);

/// A render function: node plus already-rendered children to an element.
#[derive(Clone)]
pub struct Renderer {
    name: Arc<str>,
    func: Arc<RenderFn>,
}

impl Renderer {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Node, Vec<Element>) -> RenderResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> RendererId {
        RendererId(Arc::as_ptr(&self.func) as *const () as usize)
    }

    pub fn render(&self, node: &Node, children: Vec<Element>) -> RenderResult {
        (self.func)(node, children)
    }
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Eq for Renderer {}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("name", &self.name)
            .field("id", &self.id())
            .finish()
    }
}

/// Renders children verbatim inside a neutral container. Leaf payloads are
/// kept as text so unknown kinds never lose content.
pub fn passthrough() -> Renderer {
    Renderer::new("passthrough", |node, children| {
        let mut element = ElementNode::new("div").children(children);
        if element.children.is_empty() {
            if let Some(literal) = node.literal() {
                element = element.child(Element::text(literal));
            }
        }
        Ok(element.into())
    })
}

/// Identity of a built registry. Clones share it; every `build()` mints a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(u64);

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct Registry {
    id: RegistryId,
    kinds: HashMap<NodeKind, Renderer>,
    languages: HashMap<String, Renderer>,
    fallback: Renderer,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Renderer bound to `kind`, or the passthrough fallback.
    pub fn resolve(&self, kind: NodeKind) -> &Renderer {
        self.kinds.get(&kind).unwrap_or(&self.fallback)
    }

    pub fn is_bound(&self, kind: NodeKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Code-block override for `language`, matched lower-cased and exactly.
    pub fn resolve_code_override(&self, language: &str) -> Option<&Renderer> {
        self.languages.get(&language.to_lowercase())
    }

    /// Full resolution for a node: language override first for code blocks,
    /// then the kind table.
    pub fn resolve_node(&self, node: &Node) -> &Renderer {
        if node.kind == NodeKind::CodeBlock {
            if let Some(renderer) = node.language().and_then(|l| self.resolve_code_override(l)) {
                return renderer;
            }
        }
        self.resolve(node.kind)
    }

    pub fn fallback(&self) -> &Renderer {
        &self.fallback
    }

    /// Languages with an override, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<_> = self.languages.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}

/// Collects bindings; all problems surface from `build`.
#[derive(Default)]
pub struct RegistryBuilder {
    kinds: HashMap<NodeKind, Renderer>,
    languages: HashMap<String, Renderer>,
    fallback: Option<Renderer>,
    errors: Vec<RegistryError>,
}

impl RegistryBuilder {
    pub fn bind(self, kind: NodeKind, renderer: Renderer) -> Self {
        self.bind_optional(kind, Some(renderer))
    }

    /// Bind a renderer that may be missing (e.g., looked up by name).
    pub fn bind_optional(mut self, kind: NodeKind, renderer: Option<Renderer>) -> Self {
        let Some(renderer) = renderer else {
            self.errors.push(RegistryError::EmptyBinding(kind.to_string()));
            return self;
        };
        if self.kinds.insert(kind, renderer).is_some() {
            self.errors.push(RegistryError::DuplicateKind(kind.to_string()));
        }
        self
    }

    pub fn bind_language(self, language: &str, renderer: Renderer) -> Self {
        self.bind_language_optional(language, Some(renderer))
    }

    pub fn bind_language_optional(mut self, language: &str, renderer: Option<Renderer>) -> Self {
        let key = language.trim().to_lowercase();
        if key.is_empty() {
            self.errors.push(RegistryError::EmptyLanguage);
            return self;
        }
        let Some(renderer) = renderer else {
            self.errors.push(RegistryError::EmptyLanguageBinding(key));
            return self;
        };
        if self.languages.contains_key(&key) {
            self.errors.push(RegistryError::DuplicateLanguage(key));
            return self;
        }
        self.languages.insert(key, renderer);
        self
    }

    /// Replace the passthrough used for unbound kinds.
    pub fn fallback(mut self, renderer: Renderer) -> Self {
        self.fallback = Some(renderer);
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(Registry {
            id: RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)),
            kinds: self.kinds,
            languages: self.languages,
            fallback: self.fallback.unwrap_or_else(passthrough),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: &'static str) -> Renderer {
        Renderer::new(tag, move |_, children| Ok(ElementNode::new(tag).children(children).into()))
    }

    #[test]
    fn test_resolve_returns_same_identity() {
        let registry = Registry::builder()
            .bind(NodeKind::Paragraph, tagged("p"))
            .build()
            .unwrap();
        let first = registry.resolve(NodeKind::Paragraph);
        let second = registry.resolve(NodeKind::Paragraph);
        assert_eq!(first.id(), second.id());
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_distinct_renderers_have_distinct_ids() {
        let a = tagged("p");
        let b = tagged("p");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_unbound_kind_uses_fallback() {
        let registry = Registry::builder().build().unwrap();
        assert!(!registry.is_bound(NodeKind::Table));
        assert_eq!(registry.resolve(NodeKind::Table), registry.fallback());
        let element = registry
            .resolve(NodeKind::Text)
            .render(&Node::text("kept"), Vec::new())
            .unwrap();
        assert_eq!(element.text_content(), "kept");
    }

    #[test]
    fn test_duplicate_kind_is_build_error() {
        let err = Registry::builder()
            .bind(NodeKind::Paragraph, tagged("p"))
            .bind(NodeKind::Paragraph, tagged("div"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKind("paragraph".into()));
    }

    #[test]
    fn test_empty_binding_is_build_error() {
        let err = Registry::builder()
            .bind_optional(NodeKind::Heading(2), None)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyBinding("h2".into()));

        let err = Registry::builder()
            .bind_language_optional("mermaid", None)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyLanguageBinding("mermaid".into()));
    }

    #[test]
    fn test_language_keys_normalized() {
        let err = Registry::builder()
            .bind_language("Mermaid", tagged("a"))
            .bind_language("mermaid", tagged("b"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateLanguage("mermaid".into()));

        let err = Registry::builder()
            .bind_language("  ", tagged("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyLanguage);
    }

    #[test]
    fn test_override_only_applies_to_code_blocks() {
        let diagram = tagged("figure");
        let registry = Registry::builder()
            .bind(NodeKind::CodeBlock, tagged("pre"))
            .bind(NodeKind::CodeSpan, tagged("code"))
            .bind_language("mermaid", diagram.clone())
            .build()
            .unwrap();

        let block = Node::code_block(Some("Mermaid"), "graph TD;");
        assert_eq!(registry.resolve_node(&block).id(), diagram.id());

        let other = Node::code_block(Some("rust"), "fn main() {}");
        assert_eq!(registry.resolve_node(&other).name(), "pre");

        let untagged = Node::code_block(None, "text");
        assert_eq!(registry.resolve_node(&untagged).name(), "pre");

        let mut span = Node::new(NodeKind::CodeSpan);
        span.attrs.language = Some("mermaid".into());
        assert_eq!(registry.resolve_node(&span).name(), "code");

        assert!(registry.resolve_code_override("mermaidx").is_none());
        assert!(registry.resolve_code_override("MERMAID").is_some());
    }
}
