//! Render Event Logger
//!
//! Structured events (copy, copy failure, renderer failure, unknown kind)
//! emitted on the `render_events` target as NDJSON-ready records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::{preview, redact_sensitive_data};

/// Target used for all render events, so they can be filtered separately.
pub const EVENT_TARGET: &str = "render_events";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RenderEvent {
    CodeCopied {
        language: String,
        chars: usize,
        preview: String,
    },
    CopyFailed {
        language: String,
        reason: String,
    },
    RendererFailed {
        kind: String,
        renderer: String,
        error: String,
    },
    UnknownKind {
        kind: String,
    },
}

impl RenderEvent {
    /// Whether the event signals degraded output.
    pub fn is_warning(&self) -> bool {
        !matches!(self, RenderEvent::CodeCopied { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub scope: String,
    pub timestamp: DateTime<Utc>,
    pub event: RenderEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts the event's free text and hands it to tracing.
    pub fn log_event(scope: &str, event: RenderEvent) -> EventLogEntry {
        let event = Self::redact(event);
        let entry = EventLogEntry {
            scope: scope.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_warning() {
            warn!(target: EVENT_TARGET, scope = %entry.scope, event = %json, "Render event");
        } else {
            info!(target: EVENT_TARGET, scope = %entry.scope, event = %json, "Render event");
        }
        entry
    }

    fn redact(event: RenderEvent) -> RenderEvent {
        match event {
            RenderEvent::CodeCopied {
                language,
                chars,
                preview: text,
            } => RenderEvent::CodeCopied {
                language,
                chars,
                preview: preview(&redact_sensitive_data(&text)),
            },
            RenderEvent::CopyFailed { language, reason } => RenderEvent::CopyFailed {
                language,
                reason: redact_sensitive_data(&reason),
            },
            RenderEvent::RendererFailed {
                kind,
                renderer,
                error,
            } => RenderEvent::RendererFailed {
                kind,
                renderer,
                error: redact_sensitive_data(&error),
            },
            other => other,
        }
    }
}
