//! Protocol error types.

use thiserror::Error;

/// Result alias for frame decoding.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while turning raw bytes into a [`crate::Frame`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Zero bytes were read. On a stream this means the peer closed.
    #[error("empty frame")]
    Empty,

    /// The chunk exceeds the configured read size.
    #[error("frame too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the rejected chunk.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The chunk is not valid UTF-8.
    #[error("invalid utf-8 after {valid_up_to} bytes")]
    InvalidUtf8 {
        /// Length of the longest valid prefix.
        valid_up_to: usize,
    },
}
