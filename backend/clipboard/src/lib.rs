//! Copy affordance state machine for chatmark.
//!
//! `ClipboardController` wraps a [`chatmark_core::Clipboard`] with the
//! `Idle → Copying → Copied → Idle` confirmation cycle. Backends:
//! - `MemoryClipboard` for tests and headless hosts
//! - `SystemClipboard` (feature `system-clipboard`) over arboard

pub mod controller;
pub mod memory;
#[cfg(feature = "system-clipboard")]
pub mod system;

pub use controller::{ClipboardController, ClipboardState, CopyPhase, DEFAULT_COPIED_DURATION};
pub use memory::MemoryClipboard;
#[cfg(feature = "system-clipboard")]
pub use system::SystemClipboard;
