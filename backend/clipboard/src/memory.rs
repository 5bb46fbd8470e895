//! In-process clipboard backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chatmark_core::{Clipboard, ClipboardError};

/// Holds the last written text in memory. Can be told to reject writes.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    writes: AtomicUsize,
    rejecting: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write is rejected.
    pub fn rejecting() -> Self {
        let clipboard = Self::default();
        clipboard.set_rejecting(true);
        clipboard
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(ClipboardError::WriteRejected("memory clipboard is read-only".into()));
        }
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_write_and_reject() {
        let clipboard = MemoryClipboard::new();
        clipboard.write_text("hello").await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));

        clipboard.set_rejecting(true);
        let err = clipboard.write_text("bye").await.unwrap_err();
        assert!(matches!(err, ClipboardError::WriteRejected(_)));
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));
        assert_eq!(clipboard.write_count(), 1);
    }
}
