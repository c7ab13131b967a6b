//! Error types for quotegrab

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quotegrab operations
pub type Result<T> = std::result::Result<T, GrabError>;

/// Main error type for quotegrab
#[derive(Error, Debug)]
pub enum GrabError {
    /// Fingerprint log could not be opened, read, or appended to
    #[error("Fingerprint log error ({}): {source}", path.display())]
    FingerprintLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text log could not be opened or appended to
    #[error("Text log error ({}): {source}", path.display())]
    TextLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GrabError {
    pub fn fingerprint_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrabError::FingerprintLog {
            path: path.into(),
            source,
        }
    }

    pub fn text_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrabError::TextLog {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        GrabError::Config(message.into())
    }
}
