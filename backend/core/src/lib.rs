//! Shared error types and collaborator traits for chatmark.

pub mod error;
pub mod traits;

pub use error::{ChatmarkError, ClipboardError, RegistryError, RenderError};
pub use traits::Clipboard;
