//! Telemetry and structured logging components for chatmark.
//!
//! Handles log redaction, console + rolling NDJSON output, and typed render
//! event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, RenderEvent};
pub use logger::init_logger;
pub use redact::{preview, redact_sensitive_data};
