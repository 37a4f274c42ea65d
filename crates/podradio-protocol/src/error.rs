//! Codec and framing error types.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while turning documents into values and back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document is not well-formed, lacks `success`, or does not match
    /// the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl CodecError {
    /// Creates a malformed-document error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Errors raised while reading or writing newline-delimited frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the stream before a delimiter arrived.
    #[error("stream closed with {buffered} bytes of an unterminated frame")]
    Closed { buffered: usize },

    /// Frame exceeds the maximum allowed size.
    #[error("frame too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}
