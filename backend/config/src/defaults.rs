//! Config defaults: fills unset values after loading.

use crate::schema::{ChatmarkConfig, ClipboardConfig, LoggingConfig, RenderConfig};

/// How long the "copied" confirmation stays up.
pub const DEFAULT_COPIED_DURATION_MS: u64 = 3000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Language bound to the diagram renderer out of the box.
pub const DEFAULT_DIAGRAM_LANGUAGE: &str = "mermaid";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ChatmarkConfig) -> ChatmarkConfig {
    let config = apply_render_defaults(config);
    let config = apply_clipboard_defaults(config);
    apply_logging_defaults(config)
}

/// GFM on, and `mermaid` rendered as a diagram unless the user rebound it.
fn apply_render_defaults(mut config: ChatmarkConfig) -> ChatmarkConfig {
    let render = config.render.get_or_insert_with(RenderConfig::default);
    if render.gfm.is_none() {
        render.gfm = Some(true);
    }
    let rebound = render
        .language_overrides
        .keys()
        .any(|language| language.trim().eq_ignore_ascii_case(DEFAULT_DIAGRAM_LANGUAGE));
    if !rebound {
        render
            .language_overrides
            .insert(DEFAULT_DIAGRAM_LANGUAGE.to_string(), "diagram".to_string());
    }
    config
}

fn apply_clipboard_defaults(mut config: ChatmarkConfig) -> ChatmarkConfig {
    let clipboard = config.clipboard.get_or_insert_with(ClipboardConfig::default);
    if clipboard.enabled.is_none() {
        clipboard.enabled = Some(true);
    }
    if clipboard.copied_duration_ms.is_none() {
        clipboard.copied_duration_ms = Some(DEFAULT_COPIED_DURATION_MS);
    }
    config
}

fn apply_logging_defaults(mut config: ChatmarkConfig) -> ChatmarkConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_mermaid_diagram_binding() {
        let cfg = apply_all_defaults(ChatmarkConfig::default());
        let render = cfg.render.unwrap();
        assert_eq!(render.gfm, Some(true));
        assert_eq!(render.language_overrides["mermaid"], "diagram");
        assert_eq!(cfg.clipboard.unwrap().copied_duration_ms, Some(3000));
    }

    #[test]
    fn does_not_override_user_binding() {
        let mut cfg = ChatmarkConfig::default();
        let mut render = RenderConfig::default();
        render
            .language_overrides
            .insert("Mermaid".to_string(), "code".to_string());
        cfg.render = Some(render);

        let render = apply_all_defaults(cfg).render.unwrap();
        assert_eq!(render.language_overrides.len(), 1);
        assert_eq!(render.language_overrides["Mermaid"], "code");
    }

    #[test]
    fn does_not_override_user_duration() {
        let mut cfg = ChatmarkConfig::default();
        cfg.clipboard = Some(ClipboardConfig {
            copied_duration_ms: Some(500),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.clipboard.unwrap().copied_duration_ms, Some(500));
    }
}
