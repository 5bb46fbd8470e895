use thiserror::Error;

/// Top-level error type for the chatmark pipeline.
#[derive(Debug, Error)]
pub enum ChatmarkError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// Errors reported once, when a renderer registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("kind `{0}` is bound more than once")]
    DuplicateKind(String),

    #[error("kind `{0}` is bound to an empty renderer")]
    EmptyBinding(String),

    #[error("language override `{0}` is bound more than once")]
    DuplicateLanguage(String),

    #[error("language override `{0}` is bound to an empty renderer")]
    EmptyLanguageBinding(String),

    #[error("language override key cannot be empty")]
    EmptyLanguage,

    #[error("unknown renderer name `{0}`")]
    UnknownRenderer(String),
}

/// Error raised by a single renderer. Contained at the node boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("renderer `{renderer}` rejected node: {message}")]
    Rejected { renderer: String, message: String },

    #[error("renderer `{0}` panicked")]
    Panicked(String),
}

/// Failures of the system clipboard collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard capability unavailable")]
    Unavailable,

    #[error("clipboard write rejected: {0}")]
    WriteRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_component_errors() {
        let err: ChatmarkError = RegistryError::UnknownRenderer("sparkles".into()).into();
        assert_eq!(err.to_string(), "registry error: unknown renderer name `sparkles`");

        let err: ChatmarkError = RenderError::Panicked("diagram".into()).into();
        assert!(matches!(err, ChatmarkError::Render(_)));
    }
}
