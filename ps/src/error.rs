//! Progress store errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors from progress store operations
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Progress state at {path} is corrupt: {source}")]
    StateCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize progress state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unknown tutorial: {0}")]
    UnknownTutorial(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Position {position} is out of range for group {group} ({len} tutorials)")]
    PositionOutOfRange { group: String, position: usize, len: usize },
}

impl ProgressError {
    /// True when the persisted document could not be parsed
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::StateCorruption { .. })
    }
}

/// Result type for progress store operations
pub type ProgressResult<T> = Result<T, ProgressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_message_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProgressError::StateCorruption {
            path: PathBuf::from("/tmp/state.json"),
            source,
        };

        assert!(err.is_corruption());
        assert!(err.to_string().contains("/tmp/state.json"));
    }

    #[test]
    fn test_position_out_of_range_message() {
        let err = ProgressError::PositionOutOfRange {
            group: "basic".to_string(),
            position: 7,
            len: 3,
        };

        let msg = err.to_string();
        assert!(msg.contains("7"));
        assert!(msg.contains("basic"));
        assert!(!err.is_corruption());
    }
}
