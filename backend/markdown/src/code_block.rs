//! Code Block Header
//!
//! Each rendered code block carries a header slot. The mounting layer binds
//! every slot to a [`CodeBlockHeader`], which owns the block's language label,
//! its raw text and an independent [`ClipboardController`].

use std::sync::Arc;
use std::time::Duration;

use chatmark_clipboard::{ClipboardController, CopyPhase};
use chatmark_core::Clipboard;
use logging::{EventLogger, RenderEvent};
use tracing::debug;

use crate::element::{Element, ElementNode};
use crate::ir::{Node, NodeKind};

/// Label shown when a code block declares no language.
pub const DEFAULT_LANGUAGE_LABEL: &str = "plaintext";

pub(crate) const SLOT_ATTR: &str = "data-slot";
pub(crate) const SLOT_VALUE: &str = "code-header";
const SLOT_LANGUAGE: &str = "data-language";
const SLOT_CODE: &str = "data-code";

/// Lower-cased language label, `plaintext` when absent or blank.
pub fn language_label(language: Option<&str>) -> String {
    match language.map(str::trim) {
        Some(language) if !language.is_empty() => language.to_lowercase(),
        _ => DEFAULT_LANGUAGE_LABEL.to_string(),
    }
}

/// Wraps a rendered code block body with its header slot.
pub(crate) fn wrap_code_block(node: &Node, body: Element) -> Element {
    let slot = ElementNode::new("div")
        .class("md-code-header")
        .attr(SLOT_ATTR, SLOT_VALUE)
        .attr(SLOT_LANGUAGE, language_label(node.language()))
        .attr(SLOT_CODE, node.literal().unwrap_or_default());
    ElementNode::new("div")
        .class("md-code")
        .child(slot)
        .child(body)
        .into()
}

pub(crate) fn is_header_slot(element: &Element) -> bool {
    element.attr(SLOT_ATTR) == Some(SLOT_VALUE)
}

/// `(language label, code)` carried by a header slot.
pub(crate) fn slot_source(element: &Element) -> Option<(String, String)> {
    if !is_header_slot(element) {
        return None;
    }
    Some((
        element.attr(SLOT_LANGUAGE).unwrap_or(DEFAULT_LANGUAGE_LABEL).to_string(),
        element.attr(SLOT_CODE).unwrap_or_default().to_string(),
    ))
}

pub struct CodeBlockAnalyzer;

impl CodeBlockAnalyzer {
    /// Extracts every code block as `(language label, code)`, in document order.
    pub fn extract_blocks(nodes: &[Node]) -> Vec<(String, String)> {
        let mut blocks = Vec::new();
        Self::collect(nodes, &mut blocks);
        blocks
    }

    fn collect(nodes: &[Node], blocks: &mut Vec<(String, String)>) {
        for node in nodes {
            if node.kind == NodeKind::CodeBlock {
                blocks.push((
                    language_label(node.language()),
                    node.literal().unwrap_or_default().to_string(),
                ));
            }
            Self::collect(&node.children, blocks);
        }
    }
}

/// What the copy button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyIndicator {
    Copy,
    Copied,
}

impl CopyIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyIndicator::Copy => "copy",
            CopyIndicator::Copied => "copied",
        }
    }
}

#[derive(Debug)]
pub struct CodeBlockHeader {
    language: String,
    code: String,
    controller: ClipboardController,
}

impl CodeBlockHeader {
    pub fn new(
        language: Option<&str>,
        code: impl Into<String>,
        clipboard: Option<Arc<dyn Clipboard>>,
        copied_duration: Duration,
    ) -> Self {
        Self {
            language: language_label(language),
            code: code.into(),
            controller: ClipboardController::with_duration(clipboard, copied_duration),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn controller(&self) -> &ClipboardController {
        &self.controller
    }

    pub fn is_copied(&self) -> bool {
        self.controller.is_copied()
    }

    /// Copy is disabled for empty blocks and while the confirmation shows.
    pub fn can_copy(&self) -> bool {
        !self.code.is_empty() && !self.controller.is_copied()
    }

    pub fn indicator(&self) -> CopyIndicator {
        if self.controller.is_copied() {
            CopyIndicator::Copied
        } else {
            CopyIndicator::Copy
        }
    }

    /// Copy the block's text. No-op (returns `false`) when copying is disabled
    /// or another copy of this block is still in flight.
    pub async fn copy(&self) -> bool {
        if !self.can_copy() {
            debug!(language = %self.language, "Copy disabled for code block");
            return false;
        }
        if self.controller.phase() != CopyPhase::Idle {
            debug!(language = %self.language, "Copy already in progress");
            return false;
        }
        let copied = self.controller.copy(&self.code).await;
        if let Some(event) = self.copy_event(copied) {
            EventLogger::log_event("code_block", event);
        }
        copied
    }

    /// Event for a finished copy attempt. `None` when the controller refused
    /// because a copy was already running, since nothing was written.
    fn copy_event(&self, copied: bool) -> Option<RenderEvent> {
        if copied {
            return Some(RenderEvent::CodeCopied {
                language: self.language.clone(),
                chars: self.code.chars().count(),
                preview: self.code.clone(),
            });
        }
        if self.controller.phase() != CopyPhase::Idle {
            return None;
        }
        let reason = if self.controller.has_capability() {
            "write rejected"
        } else {
            "clipboard unavailable"
        };
        Some(RenderEvent::CopyFailed {
            language: self.language.clone(),
            reason: reason.to_string(),
        })
    }

    /// Re-point the header at new block content. A text change while the
    /// confirmation shows resets the controller, so "copied" never refers to
    /// text that is no longer on screen. Returns whether anything changed.
    pub fn update(&mut self, language: Option<&str>, code: &str) -> bool {
        let language = language_label(language);
        let code_changed = self.code != code;
        let changed = code_changed || self.language != language;
        if code_changed {
            self.controller.reset();
            self.code = code.to_string();
        }
        self.language = language;
        changed
    }

    pub fn render(&self) -> Element {
        let indicator = self.indicator();
        let mut button = ElementNode::new("button")
            .class("md-copy")
            .attr("type", "button")
            .attr("aria-label", "Copy")
            .attr("data-state", indicator.as_str())
            .child(Element::text(indicator.as_str()));
        if self.code.is_empty() {
            button = button.attr("disabled", "");
        }
        ElementNode::new("div")
            .class("md-code-header")
            .child(
                ElementNode::new("span")
                    .class("md-code-language")
                    .child(Element::text(self.language.clone())),
            )
            .child(button)
            .into()
    }
}
