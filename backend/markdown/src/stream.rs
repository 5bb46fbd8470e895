//! Streaming
//!
//! Feeds text deltas from a channel into a [`MarkdownView`], re-rendering
//! after every chunk so unchanged prefixes come straight from the memo cache.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::element::Element;
use crate::view::MarkdownView;

/// Drain `rx` into `view`, calling `on_frame` with each patched render.
/// Returns the number of chunks consumed once the sender side closes.
pub async fn render_stream<F>(
    view: &mut MarkdownView,
    mut rx: mpsc::Receiver<String>,
    mut on_frame: F,
) -> usize
where
    F: FnMut(&Element),
{
    let mut chunks = 0;
    while let Some(chunk) = rx.recv().await {
        chunks += 1;
        let frame = view.push_str(&chunk);
        let stats = view.last_stats();
        debug!(
            view = %view.id(),
            chunk = chunks,
            rendered = stats.rendered,
            reused = stats.reused,
            "Stream frame"
        );
        on_frame(&frame);
    }
    chunks
}

/// Split `text` into `chunk_chars`-sized deltas and send them with `delay`
/// between each, the way a model response arrives.
pub fn spawn_chunked(text: String, chunk_chars: usize, delay: Duration) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    let chunk_chars = chunk_chars.max(1);
    tokio::spawn(async move {
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(chunk_chars) {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if tx.send(chunk.iter().collect()).await.is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::standard_registry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stream_matches_one_shot_render() {
        let text = "# Notes\n\nSome *text* here.\n\n```rust\nfn main() {}\n```\n";
        let registry = Arc::new(standard_registry().unwrap());

        let mut streamed = MarkdownView::new(registry.clone(), None);
        let mut frames = 0;
        let chunks = render_stream(
            &mut streamed,
            spawn_chunked(text.to_string(), 7, Duration::ZERO),
            |_| frames += 1,
        )
        .await;
        assert_eq!(chunks, frames);
        assert_eq!(streamed.text(), text);

        let mut whole = MarkdownView::new(registry, None);
        whole.set_text(text);
        assert_eq!(streamed.current(), whole.current());
        assert_eq!(streamed.headers().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_chunked_respects_char_boundaries() {
        let mut rx = spawn_chunked("héllo wörld".to_string(), 3, Duration::from_millis(50));
        let mut collected = Vec::new();
        while let Some(chunk) = rx.recv().await {
            collected.push(chunk);
        }
        assert_eq!(collected, vec!["hél", "lo ", "wör", "ld"]);
    }
}
