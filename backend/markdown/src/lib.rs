//! Markdown rendering pipeline.
//!
//! Parses chat Markdown (with GFM extensions) into a node tree, renders it
//! through a [`Registry`] of per-kind renderers with memoization, and mounts a
//! copy-to-clipboard [`CodeBlockHeader`] over every code block.

mod autolink;
pub mod code_block;
pub mod element;
pub mod ir;
pub mod pipeline;
pub mod plain_text;
pub mod registry;
pub mod renderers;
pub mod stream;
pub mod view;

pub use code_block::{CodeBlockAnalyzer, CodeBlockHeader, CopyIndicator, language_label};
pub use element::{Element, ElementNode};
pub use ir::{Alignment, IrParser, Node, NodeKind, ParseOptions};
pub use pipeline::{Pipeline, RenderStats, render};
pub use plain_text::PlainText;
pub use registry::{Registry, RegistryBuilder, RegistryId, RenderResult, Renderer, RendererId};
pub use renderers::{DIAGRAM_LANGUAGE, standard_builder, standard_registry};
pub use stream::{render_stream, spawn_chunked};
pub use view::MarkdownView;
