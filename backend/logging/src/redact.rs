//! Log Redaction Layer
//!
//! Scrubs API keys, access tokens, and phone numbers from strings prior to
//! logging. Copied code often carries credentials.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());
static ASSIGNED_SECRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)((?:api[_-]?key|secret|token|password)\s*[:=]\s*)["']?[^\s"']{8,}["']?"#).unwrap()
});

/// Longest preview kept in logs, in characters.
const PREVIEW_CHARS: usize = 80;

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = input.to_string();

    // Redact telephone numbers
    redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string();

    // Redact API keys and bearer tokens
    redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();

    redacted = ASSIGNED_SECRET_RE
        .replace_all(&redacted, "${1}[REDACTED_SECRET]")
        .to_string();

    redacted
}

/// First line of `input`, cut to a log-friendly length.
pub fn preview(input: &str) -> String {
    let line = input.lines().next().unwrap_or_default();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn test_assigned_secret_redaction() {
        let clean = redact_sensitive_data("API_KEY=\"abcdef123456\"\nprint(1)");
        assert!(!clean.contains("abcdef123456"));
        assert!(clean.contains("print(1)"));
    }

    #[test]
    fn test_preview_takes_first_line() {
        assert_eq!(preview("one\ntwo"), "one");
        let long = "y".repeat(100);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 1);
    }
}
