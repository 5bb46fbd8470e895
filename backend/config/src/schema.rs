//! chatmark configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills in the rest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{DEFAULT_COPIED_DURATION_MS, DEFAULT_LOG_LEVEL};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatmarkConfig {
    /// Parsing and renderer bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderConfig>,

    /// Copy-to-clipboard behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<ClipboardConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// GitHub-flavored extensions (tables, task lists, strikethrough, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gfm: Option<bool>,

    /// Code-fence language → renderer name (`diagram`, `code`, `passthrough`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub language_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardConfig {
    /// Use the system clipboard. When false, copy reports failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// How long the "copied" confirmation stays up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for the rolling JSON log file; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl ChatmarkConfig {
    pub fn gfm(&self) -> bool {
        self.render.as_ref().and_then(|r| r.gfm).unwrap_or(true)
    }

    pub fn language_overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.render
            .iter()
            .flat_map(|r| r.language_overrides.iter())
            .map(|(language, renderer)| (language.as_str(), renderer.as_str()))
    }

    pub fn clipboard_enabled(&self) -> bool {
        self.clipboard.as_ref().and_then(|c| c.enabled).unwrap_or(true)
    }

    pub fn copied_duration(&self) -> Duration {
        let ms = self
            .clipboard
            .as_ref()
            .and_then(|c| c.copied_duration_ms)
            .unwrap_or(DEFAULT_COPIED_DURATION_MS);
        Duration::from_millis(ms)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .map(PathBuf::from)
    }
}
