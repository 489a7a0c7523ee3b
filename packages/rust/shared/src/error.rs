//! Error types for ContentSynth.
//!
//! Library crates use [`SynthError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ContentSynth operations.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// Configuration loading or validation error (including a missing API key).
    #[error("config error: {message}")]
    Config { message: String },

    /// The content proxy or the AI endpoint could not be reached, or answered non-2xx.
    #[error("network error: {0}")]
    Network(String),

    /// The proxy reached the target, but the target answered with an error status.
    #[error("{message}")]
    RemoteContent { code: u16, message: String },

    /// A fetch or extraction succeeded but yielded no usable text.
    #[error("{0}")]
    EmptyContent(String),

    /// The requested source format cannot be ingested this way.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The generative model failed or returned malformed output.
    #[error("{0}")]
    Ai(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Decoding error (proxy envelope, URL, config file).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SynthError>;

impl SynthError {
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

    /// Create a remote-content error for a target status code.
    pub fn remote(code: u16, msg: impl Into<String>) -> Self {
        Self::RemoteContent {
            code,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Message suitable for showing inline in the UI.
    ///
    /// File read failures collapse to a fixed sentence; everything else uses `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { .. } => "Failed to read the file.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SynthError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SynthError::remote(404, "Content not found at the source URL (Error 404).");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn io_errors_have_fixed_user_message() {
        let err = SynthError::io(
            "/tmp/missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.txt"));
        assert_eq!(err.user_message(), "Failed to read the file.");
    }
}
