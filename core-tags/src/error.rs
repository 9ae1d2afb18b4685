use thiserror::Error;

/// Errors that can occur while reading or writing tags.
#[derive(Error, Debug)]
pub enum TagError {
    /// The file could not be opened or probed.
    #[error("Failed to open file for tagging: {0}")]
    Open(String),

    /// The container was recognized but its tags could not be parsed.
    #[error("Failed to parse tags: {0}")]
    Parse(String),

    /// Pending edits could not be written out.
    #[error("Failed to save tags: {0}")]
    Save(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TagError>;
