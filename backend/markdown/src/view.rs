//! Markdown View
//!
//! The mounting layer around the pipeline. Owns the text buffer, re-renders
//! as it grows, and keeps one [`CodeBlockHeader`] per header slot in the
//! rendered tree. Clipboard state changes only patch headers into the last
//! render; they never trigger a re-render.

use std::sync::Arc;
use std::time::Duration;

use chatmark_clipboard::DEFAULT_COPIED_DURATION;
use chatmark_core::Clipboard;
use tracing::debug;

use crate::code_block::{CodeBlockHeader, is_header_slot, slot_source};
use crate::element::{Element, ElementNode};
use crate::ir::ParseOptions;
use crate::pipeline::{Pipeline, RenderStats};
use crate::registry::Registry;

pub struct MarkdownView {
    id: String,
    registry: Arc<Registry>,
    pipeline: Pipeline,
    clipboard: Option<Arc<dyn Clipboard>>,
    copied_duration: Duration,
    buffer: String,
    rendered: Element,
    headers: Vec<CodeBlockHeader>,
}

impl MarkdownView {
    pub fn new(registry: Arc<Registry>, clipboard: Option<Arc<dyn Clipboard>>) -> Self {
        Self {
            id: "markdown".to_string(),
            registry,
            pipeline: Pipeline::new(),
            clipboard,
            copied_duration: DEFAULT_COPIED_DURATION,
            buffer: String::new(),
            rendered: ElementNode::new("div").class("md-root").into(),
            headers: Vec::new(),
        }
    }

    /// Identifier used in logs and render events (e.g., a message id).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self.pipeline = Pipeline::with_options(self.pipeline.options()).with_scope(self.id.clone());
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.pipeline = Pipeline::with_options(options).with_scope(self.id.clone());
        self
    }

    pub fn with_copied_duration(mut self, copied_duration: Duration) -> Self {
        self.copied_duration = copied_duration;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn headers(&self) -> &[CodeBlockHeader] {
        &self.headers
    }

    pub fn header(&self, index: usize) -> Option<&CodeBlockHeader> {
        self.headers.get(index)
    }

    pub fn last_stats(&self) -> RenderStats {
        self.pipeline.last_stats()
    }

    /// Replace the whole buffer and re-render.
    pub fn set_text(&mut self, text: impl Into<String>) -> Element {
        self.buffer = text.into();
        self.refresh()
    }

    /// Append a streamed chunk and re-render.
    pub fn push_str(&mut self, chunk: &str) -> Element {
        self.buffer.push_str(chunk);
        self.refresh()
    }

    /// Copy the text of code block `index`. `false` if there is no such block.
    pub async fn copy_block(&self, index: usize) -> bool {
        match self.headers.get(index) {
            Some(header) => header.copy().await,
            None => false,
        }
    }

    /// The last render with every header slot replaced by its live header.
    pub fn current(&self) -> Element {
        let mut element = self.rendered.clone();
        let mut next = 0;
        patch_slots(&mut element, &self.headers, &mut next);
        element
    }

    fn refresh(&mut self) -> Element {
        self.rendered = self.pipeline.render(&self.buffer, &self.registry);
        self.mount_headers();
        self.current()
    }

    fn mount_headers(&mut self) {
        let mut sources = Vec::new();
        collect_slots(&self.rendered, &mut sources);

        for (index, (language, code)) in sources.iter().enumerate() {
            match self.headers.get_mut(index) {
                Some(header) => {
                    header.update(Some(language), code);
                }
                None => {
                    debug!(view = %self.id, index, language = %language, "Mounting code block header");
                    self.headers.push(CodeBlockHeader::new(
                        Some(language),
                        code.clone(),
                        self.clipboard.clone(),
                        self.copied_duration,
                    ));
                }
            }
        }

        if self.headers.len() > sources.len() {
            debug!(view = %self.id, removed = self.headers.len() - sources.len(), "Unmounting code block headers");
            // Dropping a header cancels its pending revert timer.
            self.headers.truncate(sources.len());
        }
    }
}

fn collect_slots(element: &Element, out: &mut Vec<(String, String)>) {
    if let Some(source) = slot_source(element) {
        out.push(source);
        return;
    }
    for child in element.children() {
        collect_slots(child, out);
    }
}

fn patch_slots(element: &mut Element, headers: &[CodeBlockHeader], next: &mut usize) {
    if is_header_slot(element) {
        if let Some(header) = headers.get(*next) {
            *element = header.render();
        }
        *next += 1;
        return;
    }
    if let Some(node) = element.as_node_mut() {
        for child in &mut node.children {
            patch_slots(child, headers, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::standard_registry;
    use chatmark_clipboard::MemoryClipboard;

    fn view(clipboard: Arc<MemoryClipboard>) -> MarkdownView {
        MarkdownView::new(
            Arc::new(standard_registry().unwrap()),
            Some(clipboard as Arc<dyn Clipboard>),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_block_gets_its_own_controller() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut view = view(clipboard.clone());
        view.set_text("```rust\nlet a = 1;\n```\n\n```py\nb = 2\n```\n");
        assert_eq!(view.headers().len(), 2);

        assert!(view.copy_block(1).await);
        assert!(!view.headers()[0].is_copied());
        assert!(view.headers()[1].is_copied());
        assert_eq!(clipboard.contents().as_deref(), Some("b = 2"));

        let states: Vec<_> = view
            .current()
            .find_by_class("md-copy")
            .iter()
            .map(|b| b.attr("data-state").map(str::to_string))
            .collect();
        assert_eq!(states, vec![Some("copy".into()), Some("copied".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_state_does_not_rerender() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut view = view(clipboard);
        view.set_text("intro\n\n```sh\necho hi\n```\n");
        let stats = view.last_stats();

        assert!(view.copy_block(0).await);
        let patched = view.current();
        assert_eq!(view.last_stats(), stats);
        assert_eq!(patched.find_by_class("md-copy")[0].text_content(), "copied");
        assert!(patched.find_all(&|e: &Element| e.attr("data-code").is_some()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_streaming_keeps_header_state() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut view = view(clipboard);
        view.push_str("```sh\necho hi\n```\n");
        assert!(view.copy_block(0).await);

        view.push_str("\nmore text arriving");
        assert_eq!(view.headers().len(), 1);
        assert!(view.headers()[0].is_copied());
        assert!(view.last_stats().reused >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_blocks_unmount() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut view = view(clipboard);
        view.set_text("```a\n1\n```\n\n```b\n2\n```\n");
        assert!(view.copy_block(1).await);
        view.set_text("```a\n1\n```\n");
        assert_eq!(view.headers().len(), 1);
        assert!(!view.copy_block(1).await);
    }

    #[tokio::test]
    async fn test_growing_fence_updates_header_text() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let mut view = view(clipboard);
        view.push_str("```rust\nfn main(");
        assert_eq!(view.headers()[0].code(), "fn main(");
        view.push_str(") {}\n```");
        assert_eq!(view.headers()[0].code(), "fn main() {}");
        assert_eq!(view.headers()[0].language(), "rust");
    }
}
