//! Markdown Intermediate Representation
//!
//! Parses markdown syntax into a strongly-typed node tree, built from
//! `pulldown-cmark` events. Parsing is total: malformed markup degrades to
//! the nearest valid reading and never errors.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use pulldown_cmark::{
    Alignment as CmarkAlignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag,
};
use serde::{Deserialize, Serialize};

use crate::autolink;
use crate::plain_text::PlainText;

/// Classification of a parsed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Heading with level 1–6.
    Heading(u8),
    Paragraph,
    Blockquote,
    UnorderedList,
    OrderedList,
    ListItem,
    TaskListMarker,
    Table,
    TableRow,
    TableCell,
    HorizontalRule,
    CodeBlock,
    Html,
    FootnoteDefinition,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    CodeSpan,
    Superscript,
    Text,
    SoftBreak,
    HardBreak,
}

impl NodeKind {
    /// Every kind the parser can produce.
    pub const ALL: [NodeKind; 29] = [
        NodeKind::Heading(1),
        NodeKind::Heading(2),
        NodeKind::Heading(3),
        NodeKind::Heading(4),
        NodeKind::Heading(5),
        NodeKind::Heading(6),
        NodeKind::Paragraph,
        NodeKind::Blockquote,
        NodeKind::UnorderedList,
        NodeKind::OrderedList,
        NodeKind::ListItem,
        NodeKind::TaskListMarker,
        NodeKind::Table,
        NodeKind::TableRow,
        NodeKind::TableCell,
        NodeKind::HorizontalRule,
        NodeKind::CodeBlock,
        NodeKind::Html,
        NodeKind::FootnoteDefinition,
        NodeKind::Emphasis,
        NodeKind::Strong,
        NodeKind::Strikethrough,
        NodeKind::Link,
        NodeKind::Image,
        NodeKind::CodeSpan,
        NodeKind::Superscript,
        NodeKind::Text,
        NodeKind::SoftBreak,
        NodeKind::HardBreak,
    ];

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Heading(_)
                | NodeKind::Paragraph
                | NodeKind::Blockquote
                | NodeKind::UnorderedList
                | NodeKind::OrderedList
                | NodeKind::ListItem
                | NodeKind::Table
                | NodeKind::TableRow
                | NodeKind::TableCell
                | NodeKind::HorizontalRule
                | NodeKind::CodeBlock
                | NodeKind::Html
                | NodeKind::FootnoteDefinition
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Heading(level) => return write!(f, "h{level}"),
            NodeKind::Paragraph => "paragraph",
            NodeKind::Blockquote => "blockquote",
            NodeKind::UnorderedList => "unordered_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::TaskListMarker => "task_list_marker",
            NodeKind::Table => "table",
            NodeKind::TableRow => "table_row",
            NodeKind::TableCell => "table_cell",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Html => "html",
            NodeKind::FootnoteDefinition => "footnote_definition",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::CodeSpan => "code_span",
            NodeKind::Superscript => "superscript",
            NodeKind::Text => "text",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::HardBreak => "hard_break",
        };
        f.write_str(name)
    }
}

/// Column alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

impl From<CmarkAlignment> for Alignment {
    fn from(value: CmarkAlignment) -> Self {
        match value {
            CmarkAlignment::None => Alignment::None,
            CmarkAlignment::Left => Alignment::Left,
            CmarkAlignment::Center => Alignment::Center,
            CmarkAlignment::Right => Alignment::Right,
        }
    }
}

/// Kind-specific data carried by a node. Unused fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    /// Code block language (first word of the fence info string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Opaque text payload: text runs, code spans, code blocks, raw HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Table header row or cell.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub header: bool,
    /// Ordered list start number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// Task list marker state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Footnote label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Text);
        node.attrs.literal = Some(text.into());
        node
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading(level.clamp(1, 6))).with_children(children)
    }

    pub fn code_block(language: Option<&str>, code: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::CodeBlock);
        node.attrs.language = language.map(str::to_string);
        node.attrs.literal = Some(code.into());
        node
    }

    pub fn link(href: impl Into<String>, title: Option<String>, children: Vec<Node>) -> Self {
        let mut node = Self::new(NodeKind::Link).with_children(children);
        node.attrs.href = Some(href.into());
        node.attrs.title = title;
        node
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn literal(&self) -> Option<&str> {
        self.attrs.literal.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.attrs.language.as_deref()
    }

    /// Text content with all markup stripped.
    pub fn plain_text(&self) -> String {
        PlainText::render(std::slice::from_ref(self))
    }

    /// Content hash over kind, attributes and the whole subtree.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Parser switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// GitHub-flavored extensions: tables, strikethrough, task lists,
    /// footnotes and bare-URL autolinks.
    pub gfm: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl ParseOptions {
    pub fn commonmark() -> Self {
        Self { gfm: false }
    }

    fn cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

pub struct IrParser;

impl IrParser {
    /// Parses markdown with GitHub-flavored extensions enabled.
    pub fn parse(markdown: &str) -> Vec<Node> {
        Self::parse_with(markdown, ParseOptions::default())
    }

    pub fn parse_with(markdown: &str, options: ParseOptions) -> Vec<Node> {
        let mut builder = TreeBuilder::default();
        for event in Parser::new_ext(markdown, options.cmark_options()) {
            builder.push(event);
        }
        let mut nodes = builder.finish();
        if options.gfm {
            autolink::link_bare_urls(&mut nodes);
        }
        nodes
    }
}

#[derive(Default)]
struct TableContext {
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
    // Some event streams nest a row inside the head; that row is folded away.
    nested_head_row: bool,
}

/// Folds the flat event stream into a tree using a stack of open nodes.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Node>,
    tables: Vec<TableContext>,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(top) = self.stack.last_mut() {
                    if top.kind == NodeKind::CodeBlock {
                        top.attrs.literal.get_or_insert_with(String::new).push_str(&text);
                        return;
                    }
                }
                self.append(Node::text(text.into_string()));
            }
            Event::Code(code) => {
                let mut node = Node::new(NodeKind::CodeSpan);
                node.attrs.literal = Some(code.into_string());
                self.append(node);
            }
            Event::Html(html) => {
                if let Some(last) = self.children_mut().last_mut() {
                    if last.kind == NodeKind::Html {
                        last.attrs.literal.get_or_insert_with(String::new).push_str(&html);
                        return;
                    }
                }
                let mut node = Node::new(NodeKind::Html);
                node.attrs.literal = Some(html.into_string());
                self.append(node);
            }
            Event::FootnoteReference(label) => {
                let label = label.into_string();
                let link = Node::link(
                    format!("#fn-{label}"),
                    None,
                    vec![Node::text(label.clone())],
                );
                let mut sup = Node::new(NodeKind::Superscript).with_children(vec![link]);
                sup.attrs.label = Some(label);
                self.append(sup);
            }
            Event::SoftBreak => self.append(Node::new(NodeKind::SoftBreak)),
            Event::HardBreak => self.append(Node::new(NodeKind::HardBreak)),
            Event::Rule => self.append(Node::new(NodeKind::HorizontalRule)),
            Event::TaskListMarker(checked) => {
                let mut node = Node::new(NodeKind::TaskListMarker);
                node.attrs.checked = Some(checked);
                self.append(node);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Paragraph => Node::new(NodeKind::Paragraph),
            Tag::Heading(level, _, _) => Node::new(NodeKind::Heading(heading_level(level))),
            Tag::BlockQuote => Node::new(NodeKind::Blockquote),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                let mut node = Node::new(NodeKind::CodeBlock);
                node.attrs.language = language;
                node.attrs.literal = Some(String::new());
                node
            }
            Tag::List(Some(start)) => {
                let mut node = Node::new(NodeKind::OrderedList);
                node.attrs.start = Some(start);
                node
            }
            Tag::List(None) => Node::new(NodeKind::UnorderedList),
            Tag::Item => Node::new(NodeKind::ListItem),
            Tag::FootnoteDefinition(label) => {
                let mut node = Node::new(NodeKind::FootnoteDefinition);
                node.attrs.label = Some(label.into_string());
                node
            }
            Tag::Table(alignments) => {
                self.tables.push(TableContext {
                    alignments: alignments.into_iter().map(Alignment::from).collect(),
                    ..Default::default()
                });
                Node::new(NodeKind::Table)
            }
            Tag::TableHead => {
                if let Some(table) = self.tables.last_mut() {
                    table.in_head = true;
                    table.column = 0;
                }
                let mut row = Node::new(NodeKind::TableRow);
                row.attrs.header = true;
                row
            }
            Tag::TableRow => {
                if let Some(table) = self.tables.last_mut() {
                    table.column = 0;
                    if table.in_head {
                        table.nested_head_row = true;
                        return;
                    }
                }
                Node::new(NodeKind::TableRow)
            }
            Tag::TableCell => {
                let mut cell = Node::new(NodeKind::TableCell);
                if let Some(table) = self.tables.last_mut() {
                    let alignment = table.alignments.get(table.column).copied().unwrap_or_default();
                    cell.attrs.alignment = Some(alignment);
                    cell.attrs.header = table.in_head;
                    table.column += 1;
                }
                cell
            }
            Tag::Emphasis => Node::new(NodeKind::Emphasis),
            Tag::Strong => Node::new(NodeKind::Strong),
            Tag::Strikethrough => Node::new(NodeKind::Strikethrough),
            Tag::Link(_, url, title) => Node::link(url.into_string(), non_empty(&title), Vec::new()),
            Tag::Image(_, url, title) => {
                let mut node = Node::new(NodeKind::Image);
                node.attrs.href = Some(url.into_string());
                node.attrs.title = non_empty(&title);
                node
            }
        };
        self.stack.push(node);
    }

    fn end(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::TableHead => {
                if let Some(table) = self.tables.last_mut() {
                    table.in_head = false;
                    table.nested_head_row = false;
                }
            }
            Tag::TableRow => {
                if let Some(table) = self.tables.last_mut() {
                    if table.nested_head_row {
                        table.nested_head_row = false;
                        return;
                    }
                }
            }
            Tag::Table(_) => {
                self.tables.pop();
            }
            _ => {}
        }
        self.close();
    }

    fn close(&mut self) {
        let Some(mut node) = self.stack.pop() else {
            return;
        };
        if node.kind == NodeKind::CodeBlock {
            if let Some(code) = node.attrs.literal.as_mut() {
                if code.ends_with('\n') {
                    code.pop();
                }
            }
        }
        self.append(node);
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        }
    }

    fn append(&mut self, node: Node) {
        let children = self.children_mut();
        if node.kind == NodeKind::Text {
            if let Some(last) = children.last_mut() {
                if last.kind == NodeKind::Text {
                    let text = node.attrs.literal.unwrap_or_default();
                    last.attrs.literal.get_or_insert_with(String::new).push_str(&text);
                    return;
                }
            }
        }
        children.push(node);
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
