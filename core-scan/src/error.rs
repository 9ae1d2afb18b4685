use thiserror::Error;

/// Errors that can occur while scanning an audio stream.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The media source could not be opened.
    #[error("Failed to open media source: {0}")]
    OpenFailed(String),

    /// The decode pipeline could not be assembled (probe or decoder init).
    #[error("Failed to set up decode pipeline: {0}")]
    PipelineSetup(String),

    /// The container holds no track the decoder registry can handle.
    #[error("No decodable audio track found")]
    NoAudioTrack,

    /// Unrecoverable error while pulling decoded buffers.
    #[error("Decoding failed: {0}")]
    DecodeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
