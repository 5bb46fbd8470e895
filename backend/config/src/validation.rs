//! Config validation: field-path errors and warnings in one pass.

use crate::schema::ChatmarkConfig;
use thiserror::Error;

/// Renderer names a language override may refer to.
pub const RENDERER_NAMES: &[&str] = &["diagram", "code", "passthrough"];

/// Above this the confirmation outlives any reasonable glance.
pub const MAX_SENSIBLE_COPIED_DURATION_MS: u64 = 60_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &ChatmarkConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_render(config, &mut report);
    validate_clipboard(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_render(config: &ChatmarkConfig, report: &mut ValidationReport) {
    let Some(render) = &config.render else { return };
    let mut seen = std::collections::HashSet::new();
    for (language, renderer) in &render.language_overrides {
        if !seen.insert(language.trim().to_lowercase()) {
            report.error(
                format!("render.languageOverrides.{language}"),
                "Language is bound twice once lower-cased",
            );
        }
        let path = format!("render.languageOverrides.{language}");
        if language.trim().is_empty() {
            report.error("render.languageOverrides", "Language key cannot be empty");
            continue;
        }
        if !RENDERER_NAMES.contains(&renderer.as_str()) {
            report.error(
                &path,
                format!(
                    "Unknown renderer '{renderer}'. Use one of: {}",
                    RENDERER_NAMES.join(", ")
                ),
            );
        }
        if language.to_lowercase() != *language {
            report.warn(&path, "Code fence languages are matched lower-cased");
        }
    }
}

fn validate_clipboard(config: &ChatmarkConfig, report: &mut ValidationReport) {
    let Some(clipboard) = &config.clipboard else { return };
    match clipboard.copied_duration_ms {
        Some(0) => report.error("clipboard.copiedDurationMs", "copiedDurationMs must be > 0"),
        Some(ms) if ms > MAX_SENSIBLE_COPIED_DURATION_MS => report.warn(
            "clipboard.copiedDurationMs",
            format!("{ms} ms keeps the copied confirmation up for over a minute"),
        ),
        _ => {}
    }
}

fn validate_logging(config: &ChatmarkConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown log level '{level}'. Use one of: {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{ClipboardConfig, RenderConfig};

    #[test]
    fn defaulted_config_is_valid() {
        let report = validate(&apply_all_defaults(ChatmarkConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_duration_is_error() {
        let cfg = ChatmarkConfig {
            clipboard: Some(ClipboardConfig {
                copied_duration_ms: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "clipboard.copiedDurationMs");
    }

    #[test]
    fn long_duration_is_warning() {
        let cfg = ChatmarkConfig {
            clipboard: Some(ClipboardConfig {
                copied_duration_ms: Some(120_000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn unknown_renderer_and_mixed_case_language() {
        let mut render = RenderConfig::default();
        render.language_overrides.insert("Graphviz".into(), "diagram".into());
        render.language_overrides.insert("plantuml".into(), "sparkles".into());
        let cfg = ChatmarkConfig {
            render: Some(render),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("sparkles"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].path.ends_with("Graphviz"));
    }
}
