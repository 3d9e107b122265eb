use std::fmt;
use thiserror::Error;

/// Sub-resources an editor owns and tears down on destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    TextArea,
    Toolbar,
    Hoverbar,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextArea => write!(f, "text area"),
            Self::Toolbar => write!(f, "toolbar"),
            Self::Hoverbar => write!(f, "hoverbar"),
        }
    }
}

/// Errors surfaced by editor lifecycle operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to destroy {part}: {reason}")]
    Teardown { part: Part, reason: String },

    #[error("Invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for editor lifecycle operations
pub type EditorResult<T> = Result<T, EditorError>;
