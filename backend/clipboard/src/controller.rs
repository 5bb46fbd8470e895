//! Clipboard Controller
//!
//! Copies text, flips to a confirmed state and reverts after a timeout.
//! One controller per copy affordance; nothing is shared between instances.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chatmark_core::Clipboard;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long the "copied" confirmation stays up by default.
pub const DEFAULT_COPIED_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyPhase {
    #[default]
    Idle,
    Copying,
    Copied,
}

/// Observable state of one controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardState {
    pub phase: CopyPhase,
    /// Last value written successfully; cleared when a write fails.
    pub copied_value: Option<String>,
}

impl ClipboardState {
    pub fn is_copied(&self) -> bool {
        self.phase == CopyPhase::Copied
    }
}

pub struct ClipboardController {
    clipboard: Option<Arc<dyn Clipboard>>,
    copied_duration: Duration,
    state: Arc<watch::Sender<ClipboardState>>,
    revert: Mutex<Option<JoinHandle<()>>>,
    // Bumped by `reset`; a write that finishes under an older epoch is stale.
    epoch: AtomicU64,
}

impl ClipboardController {
    pub fn new(clipboard: Option<Arc<dyn Clipboard>>) -> Self {
        Self::with_duration(clipboard, DEFAULT_COPIED_DURATION)
    }

    pub fn with_duration(clipboard: Option<Arc<dyn Clipboard>>, copied_duration: Duration) -> Self {
        let (tx, _rx) = watch::channel(ClipboardState::default());
        Self {
            clipboard,
            copied_duration,
            state: Arc::new(tx),
            revert: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn copied_duration(&self) -> Duration {
        self.copied_duration
    }

    /// Whether a clipboard backend was supplied at all.
    pub fn has_capability(&self) -> bool {
        self.clipboard.is_some()
    }

    pub fn state(&self) -> ClipboardState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> CopyPhase {
        self.state.borrow().phase
    }

    pub fn is_copied(&self) -> bool {
        self.state.borrow().is_copied()
    }

    pub fn copied_value(&self) -> Option<String> {
        self.state.borrow().copied_value.clone()
    }

    /// Watch state transitions (e.g., to re-draw a copy indicator).
    pub fn subscribe(&self) -> watch::Receiver<ClipboardState> {
        self.state.subscribe()
    }

    /// Whether a revert timer is scheduled and has not fired yet.
    pub fn has_pending_revert(&self) -> bool {
        self.lock_revert()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Write `text` to the clipboard and enter the confirmed state.
    ///
    /// Returns `false` without touching state when `text` is empty, when no
    /// clipboard is available, or while a write or confirmation is already in
    /// progress. A rejected write returns `false` and leaves the controller idle.
    pub async fn copy(&self, text: &str) -> bool {
        if text.is_empty() {
            debug!("Ignoring copy of empty text");
            return false;
        }

        let Some(clipboard) = self.clipboard.clone() else {
            warn!("Clipboard not supported; copy skipped");
            return false;
        };

        let started = self.state.send_if_modified(|state| {
            if state.phase != CopyPhase::Idle {
                return false;
            }
            state.phase = CopyPhase::Copying;
            true
        });
        if !started {
            debug!(phase = ?self.phase(), "Copy ignored while confirmation is pending");
            return false;
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let mut guard = CopyingGuard::new(&self.state);
        let result = clipboard.write_text(text).await;
        guard.disarm();

        if self.epoch.load(Ordering::SeqCst) != epoch {
            // Reset while the write was in flight; the new text owns the state.
            debug!(backend = clipboard.name(), "Copy finished after reset; not confirming");
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                self.state.send_modify(|state| {
                    state.phase = CopyPhase::Copied;
                    state.copied_value = Some(text.to_string());
                });
                self.schedule_revert();
                debug!(
                    backend = clipboard.name(),
                    chars = text.chars().count(),
                    "Copied to clipboard"
                );
                true
            }
            Err(err) => {
                warn!(backend = clipboard.name(), error = %err, "Clipboard write failed");
                self.state.send_modify(|state| {
                    state.phase = CopyPhase::Idle;
                    state.copied_value = None;
                });
                false
            }
        }
    }

    /// Cancel any pending revert and return to `Idle` immediately.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.lock_revert().take() {
            handle.abort();
        }
        self.state.send_if_modified(|state| {
            if state.phase == CopyPhase::Idle && state.copied_value.is_none() {
                return false;
            }
            state.phase = CopyPhase::Idle;
            state.copied_value = None;
            true
        });
    }

    fn schedule_revert(&self) {
        let state = Arc::clone(&self.state);
        let duration = self.copied_duration;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            state.send_if_modified(|state| {
                if state.phase != CopyPhase::Copied {
                    return false;
                }
                state.phase = CopyPhase::Idle;
                true
            });
            debug!("Copy confirmation reverted");
        });

        if let Some(previous) = self.lock_revert().replace(handle) {
            previous.abort();
        }
    }

    fn lock_revert(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.revert.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ClipboardController {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_revert().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ClipboardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardController")
            .field("capability", &self.has_capability())
            .field("copied_duration", &self.copied_duration)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Puts a `Copying` controller back to `Idle` if the copy future is dropped
/// before the write resolves.
struct CopyingGuard<'a> {
    state: &'a watch::Sender<ClipboardState>,
    armed: bool,
}

impl<'a> CopyingGuard<'a> {
    fn new(state: &'a watch::Sender<ClipboardState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CopyingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|state| {
            if state.phase != CopyPhase::Copying {
                return false;
            }
            state.phase = CopyPhase::Idle;
            true
        });
    }
}
