//! Wiring from loaded config to renderer registry, clipboard and view.

use std::sync::Arc;

use chatmark_config::ChatmarkConfig;
use chatmark_core::{ChatmarkError, Clipboard, RegistryError};
use markdown::renderers::{by_name, standard_builder};
use markdown::{MarkdownView, ParseOptions, Registry};
use tracing::{debug, warn};

/// Standard bindings plus every configured language override.
pub fn registry_from_config(config: &ChatmarkConfig) -> Result<Registry, ChatmarkError> {
    let mut builder = standard_builder();
    for (language, name) in config.language_overrides() {
        let renderer =
            by_name(name).ok_or_else(|| RegistryError::UnknownRenderer(name.to_string()))?;
        debug!(language, renderer = name, "Binding language override");
        builder = builder.bind_language(language, renderer);
    }
    Ok(builder.build()?)
}

/// The clipboard the config asks for, if the platform has one.
pub fn clipboard_from_config(config: &ChatmarkConfig) -> Option<Arc<dyn Clipboard>> {
    if !config.clipboard_enabled() {
        debug!("Clipboard disabled by config");
        return None;
    }
    let clipboard = system_clipboard();
    if clipboard.is_none() {
        warn!("No system clipboard available; copy will report failure");
    }
    clipboard
}

#[cfg(feature = "system-clipboard")]
fn system_clipboard() -> Option<Arc<dyn Clipboard>> {
    chatmark_clipboard::SystemClipboard::detect()
}

#[cfg(not(feature = "system-clipboard"))]
fn system_clipboard() -> Option<Arc<dyn Clipboard>> {
    None
}

pub fn parse_options(config: &ChatmarkConfig) -> ParseOptions {
    if config.gfm() {
        ParseOptions::default()
    } else {
        ParseOptions::commonmark()
    }
}

pub fn view_from_config(
    config: &ChatmarkConfig,
    registry: Arc<Registry>,
    clipboard: Option<Arc<dyn Clipboard>>,
) -> MarkdownView {
    MarkdownView::new(registry, clipboard)
        .with_id("cli")
        .with_options(parse_options(config))
        .with_copied_duration(config.copied_duration())
}
