use std::path::PathBuf;

use chrono::NaiveDate;

/// Reasons a hearing document is rejected before attribution.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The source file could not be opened or read.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed XML encountered while streaming.
    #[error("XML structure error: {message}")]
    Structure { message: String },

    /// No `NumericDate` element with content.
    #[error("document has no NumericDate")]
    MissingDate,

    /// `NumericDate` is not a real calendar date.
    #[error("invalid NumericDate '{0}'")]
    InvalidDate(String),

    /// Date precedes the earliest supported hearing date.
    #[error("date {date} is before earliest accepted date {earliest}")]
    TooEarly { date: NaiveDate, earliest: NaiveDate },
}

impl DocumentError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from reading the document rather than from date validation.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Structure { .. })
    }
}

/// Failures inside the bounded intro/segmentation step.
#[derive(Debug, thiserror::Error)]
pub enum AttributionError {
    /// The per-file deadline expired.
    #[error("Timeout")]
    Timeout,

    /// A dynamically built pattern failed to compile.
    #[error("pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),
}
