//! `render`, `blocks` and `copy` subcommands.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use markdown::{
    render_stream, spawn_chunked, CodeBlockAnalyzer, Element, IrParser, MarkdownView, ParseOptions,
    PlainText,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::terminal_output::{self, Column};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlocksFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct BlockSummary {
    index: usize,
    language: String,
    lines: usize,
    chars: usize,
    code: String,
}

/// Stream pacing for `render --stream`.
pub struct StreamOptions {
    pub chunk_chars: usize,
    pub delay: Duration,
}

/// Read the file at `path`, or stdin when absent or `-`.
pub async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn format_element(element: &Element, text: &str, options: ParseOptions, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Html => element.to_html(),
        OutputFormat::Json => serde_json::to_string_pretty(element)?,
        OutputFormat::Text => PlainText::render(&IrParser::parse_with(text, options)),
    })
}

pub async fn render(
    mut view: MarkdownView,
    options: ParseOptions,
    text: String,
    format: OutputFormat,
    stream: Option<StreamOptions>,
) -> Result<()> {
    let mut stdout = std::io::stdout();

    let Some(stream) = stream else {
        let element = view.set_text(text.as_str());
        writeln!(stdout, "{}", format_element(&element, &text, options, format)?)?;
        return Ok(());
    };

    if format == OutputFormat::Text {
        bail!("--stream supports html and json output");
    }

    let live = stdout.is_terminal() && terminal_output::supports_color();
    let rx = spawn_chunked(text, stream.chunk_chars, stream.delay);
    let mut failure = None;
    let chunks = render_stream(&mut view, rx, |frame| {
        if failure.is_some() {
            return;
        }
        let written = format_element(frame, "", options, format)
            .and_then(|out| Ok(terminal_output::write_frame(&mut stdout, &out, live)?));
        if let Err(err) = written {
            failure = Some(err);
        }
    })
    .await;
    if let Some(err) = failure {
        return Err(err);
    }

    let stats = view.last_stats();
    info!(chunks, rendered = stats.rendered, reused = stats.reused, "Stream complete");
    Ok(())
}

pub fn blocks(text: &str, options: ParseOptions, format: BlocksFormat) -> Result<()> {
    let summaries: Vec<BlockSummary> = CodeBlockAnalyzer::extract_blocks(&IrParser::parse_with(text, options))
        .into_iter()
        .enumerate()
        .map(|(index, (language, code))| BlockSummary {
            index,
            language,
            lines: code.lines().count(),
            chars: code.chars().count(),
            code,
        })
        .collect();

    match format {
        BlocksFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        BlocksFormat::Table if summaries.is_empty() => terminal_output::note_info("No code blocks"),
        BlocksFormat::Table => {
            let columns = [
                Column::right("#"),
                Column::left("Language"),
                Column::right("Lines"),
                Column::left("Preview").max_width(48),
            ];
            let rows: Vec<Vec<String>> = summaries
                .iter()
                .map(|block| {
                    vec![
                        block.index.to_string(),
                        block.language.clone(),
                        block.lines.to_string(),
                        logging::preview(&block.code),
                    ]
                })
                .collect();
            print!("{}", terminal_output::render_table(&columns, &rows));
        }
    }
    Ok(())
}

/// Copy block `index` to the clipboard and report the header state.
pub async fn copy(mut view: MarkdownView, text: &str, index: usize) -> Result<()> {
    view.set_text(text);
    let count = view.headers().len();
    let Some(header) = view.header(index) else {
        bail!("No code block at index {index} ({count} found)");
    };
    let language = header.language().to_string();

    if view.copy_block(index).await {
        let header = view.header(index).context("code block header unmounted")?;
        terminal_output::note_success(&format!(
            "Copied {language} block {index} ({} chars) [{}]",
            header.code().chars().count(),
            header.indicator().as_str()
        ));
        Ok(())
    } else if view.header(index).is_some_and(|h| h.code().is_empty()) {
        terminal_output::note_warn(&format!("Block {index} is empty; nothing to copy"));
        Ok(())
    } else {
        terminal_output::note_error("Clipboard unavailable or write rejected");
        bail!("Copy failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmark_clipboard::MemoryClipboard;
    use chatmark_core::Clipboard;
    use markdown::standard_registry;
    use std::sync::Arc;

    fn view(clipboard: Option<Arc<dyn Clipboard>>) -> MarkdownView {
        MarkdownView::new(Arc::new(standard_registry().unwrap()), clipboard)
    }

    #[test]
    fn formats_html_json_and_text() {
        let text = "Hello **there**";
        let mut view = view(None);
        let element = view.set_text(text);
        let options = ParseOptions::default();

        let html = format_element(&element, text, options, OutputFormat::Html).unwrap();
        assert!(html.starts_with("<div class=\"md-root\">"));
        let json = format_element(&element, text, options, OutputFormat::Json).unwrap();
        assert!(json.contains("\"md-strong\""));
        let plain = format_element(&element, text, options, OutputFormat::Text).unwrap();
        assert_eq!(plain.trim(), "Hello there");
    }

    #[tokio::test]
    async fn copy_writes_selected_block() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let view = view(Some(clipboard.clone() as Arc<dyn Clipboard>));
        copy(view, "```a\none\n```\n\n```b\ntwo\n```\n", 1).await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn copy_out_of_range_is_error() {
        let err = copy(view(None), "no code here", 0).await.unwrap_err();
        assert!(err.to_string().contains("No code block at index 0"));
    }

    #[tokio::test]
    async fn copy_without_clipboard_fails() {
        assert!(copy(view(None), "```\nx\n```", 0).await.is_err());
    }
}
