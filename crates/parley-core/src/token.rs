//! Reversible text tokens.
//!
//! Tokens are standard Base64 (with padding) over the UTF-8 bytes of the
//! text. The transform is deterministic and total in the encode direction;
//! decoding rejects anything [`encode`] could not have produced.
//!
//! Nothing on the relay path uses tokens. They are a standalone utility for
//! callers that need an opaque, copy-pasteable form of a string.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Errors from [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Invalid alphabet, length, or padding.
    #[error("invalid token: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The token decodes to bytes that are not UTF-8.
    #[error("token is not utf-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode text as a token.
pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a token produced by [`encode`].
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(token.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}
