use async_trait::async_trait;

use crate::error::ClipboardError;

/// The system clipboard as seen by copy affordances.
///
/// Environments without a clipboard pass `None` where a handle is expected
/// instead of an implementation that always fails, so callers can detect the
/// missing capability before attempting a write.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Backend name for logs (e.g., "memory", "system").
    fn name(&self) -> &str;

    /// Write `text` to the clipboard. Resolves once the write is accepted.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
