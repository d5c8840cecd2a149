//! Error types for kfdeck.
//!
//! Library crates use [`KfDeckError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all kfdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum KfDeckError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with something other than 200 OK.
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// The response body is not the kind of document we asked for.
    #[error("{url}: expected {expected} content, got '{found}'")]
    ContentType {
        url: String,
        expected: &'static str,
        found: String,
    },

    /// A page or payload did not match the layout the extractors expect.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// An input line is not a supported deck link.
    #[error("invalid deck link '{link}': {reason}")]
    InvalidLink { link: String, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the report failed.
    #[error("export error: {0}")]
    Export(String),

    /// A deck in a batch failed; carries its position and input line.
    #[error("deck {number} ({link}): {source}")]
    Deck {
        number: usize,
        link: String,
        source: Box<KfDeckError>,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KfDeckError>;

impl KfDeckError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an invalid-link error.
    pub fn invalid_link(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLink {
            link: link.into(),
            reason: reason.into(),
        }
    }

    /// Attach batch position to a per-deck failure.
    pub fn in_deck(self, number: usize, link: impl Into<String>) -> Self {
        Self::Deck {
            number,
            link: link.into(),
            source: Box::new(self),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = KfDeckError::config("unknown output format");
        assert_eq!(err.to_string(), "config error: unknown output format");

        let err = KfDeckError::Http {
            url: "https://decksofkeyforge.com/api/decks/x/simple".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 from https://decksofkeyforge.com/api/decks/x/simple"
        );
    }

    #[test]
    fn content_type_error_names_both_sides() {
        let err = KfDeckError::ContentType {
            url: "https://example.com".into(),
            expected: "html",
            found: "application/json".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("expected html"));
        assert!(msg.contains("application/json"));
    }

    #[test]
    fn deck_context_wraps_source() {
        let err = KfDeckError::parse("no deck title").in_deck(3, "https://x");
        assert_eq!(err.to_string(), "deck 3 (https://x): parse error: no deck title");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_link_display() {
        let err = KfDeckError::invalid_link("ftp://nope", "unsupported host");
        assert!(err.to_string().contains("ftp://nope"));
        assert!(err.to_string().contains("unsupported host"));
    }
}
