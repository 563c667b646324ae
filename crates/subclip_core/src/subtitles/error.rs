//! Subtitle error types.

use std::path::PathBuf;

/// Errors that can occur during subtitle import/export.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    /// Failed to read subtitle file.
    #[error("Failed to read file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write subtitle file.
    #[error("Failed to write file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File exceeds the configured import limit.
    #[error("File is too large to import ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Bytes could not be decoded with any supported encoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Raised when every supported encoding has been tried and rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not decode file (tried {})", tried.join(", "))]
pub struct DecodeError {
    /// Encodings attempted, in order.
    pub tried: Vec<&'static str>,
}

/// Errors produced while reading timestamps or blocks.
///
/// During SRT parsing these are collected as non-fatal diagnostics; they
/// only surface as hard errors from explicit user edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Invalid or malformed SRT time format.
    #[error("Invalid time format at line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    /// Invalid in-app clock value (`MM:SS.mmm`).
    #[error("Invalid clock value: '{0}'")]
    InvalidClock(String),

    /// Cue ends before it starts.
    #[error("Cue at line {line} ends before it starts")]
    InvertedTiming { line: usize },

    /// Block without a timing line.
    #[error("Block at line {line} has no timing line")]
    MissingTiming { line: usize },

    /// Generic parse error.
    #[error("Parse error at line {line}: {message}")]
    Generic { line: usize, message: String },
}

impl SubtitleError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl ParseError {
    /// Create a generic parse error.
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self::Generic {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid time error.
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    /// Line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidTime { line, .. }
            | Self::InvertedTiming { line }
            | Self::MissingTiming { line }
            | Self::Generic { line, .. } => Some(*line),
            Self::InvalidClock(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_lists_encodings() {
        let err = DecodeError {
            tried: vec!["UTF-8", "Windows-1252"],
        };
        assert_eq!(
            err.to_string(),
            "Could not decode file (tried UTF-8, Windows-1252)"
        );
    }

    #[test]
    fn parse_error_line_lookup() {
        assert_eq!(ParseError::MissingTiming { line: 7 }.line(), Some(7));
        assert_eq!(ParseError::InvalidClock("x".into()).line(), None);
    }
}
