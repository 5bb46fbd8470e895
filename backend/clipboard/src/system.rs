//! Native clipboard backend over arboard.

use std::sync::Arc;

use async_trait::async_trait;
use chatmark_core::{Clipboard, ClipboardError};
use tracing::debug;

/// The OS clipboard. Writes run on the blocking pool. On Linux a write
/// completes once another owner holds the text.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Probe for a usable clipboard; `None` when the platform has none
    /// (headless sessions, missing display server).
    pub fn detect() -> Option<Arc<dyn Clipboard>> {
        match arboard::Clipboard::new() {
            Ok(_) => Some(Arc::new(SystemClipboard)),
            Err(e) => {
                debug!(error = %e, "System clipboard unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    fn name(&self) -> &str {
        "system"
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || write_blocking(text))
            .await
            .map_err(|e| ClipboardError::WriteRejected(e.to_string()))?
    }
}

// X11 and Wayland serve the selection from the owning process, so the write
// waits until a clipboard manager or another client takes ownership.
#[cfg(target_os = "linux")]
fn write_blocking(text: String) -> Result<(), ClipboardError> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new().map_err(|_| ClipboardError::Unavailable)?;
    clipboard
        .set()
        .wait()
        .text(text)
        .map_err(|e| ClipboardError::WriteRejected(e.to_string()))
}

#[cfg(not(target_os = "linux"))]
fn write_blocking(text: String) -> Result<(), ClipboardError> {
    let mut clipboard = arboard::Clipboard::new().map_err(|_| ClipboardError::Unavailable)?;
    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::WriteRejected(e.to_string()))
}
