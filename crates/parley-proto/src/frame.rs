//! Text frames.
//!
//! A [`Frame`] owns the raw bytes of one read and guarantees they are valid
//! UTF-8. The payload is kept as [`Bytes`] so a broadcast can hand the same
//! buffer to every recipient without copying.

use std::fmt;

use bytes::Bytes;

use crate::{
    control::Control,
    errors::{ProtocolError, Result},
};

/// One unit of text as delivered by a single read call.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Default read size for one frame, in bytes.
    pub const MAX_SIZE: usize = 1024;

    /// Decode a chunk read from a connection.
    ///
    /// Rejects empty chunks (a closed peer), chunks longer than
    /// [`Self::MAX_SIZE`], and anything that is not UTF-8.
    pub fn decode(chunk: &[u8]) -> Result<Self> {
        Self::decode_with_limit(chunk, Self::MAX_SIZE)
    }

    /// Decode a chunk against a caller-supplied size limit.
    pub fn decode_with_limit(chunk: &[u8], max: usize) -> Result<Self> {
        if chunk.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if chunk.len() > max {
            return Err(ProtocolError::TooLarge { size: chunk.len(), max });
        }
        std::str::from_utf8(chunk)
            .map_err(|e| ProtocolError::InvalidUtf8 { valid_up_to: e.valid_up_to() })?;

        Ok(Self { payload: Bytes::copy_from_slice(chunk) })
    }

    /// Build a frame from text. Used by tests and tools that originate
    /// messages rather than read them.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { payload: Bytes::from(text.into()) }
    }

    /// The frame as text.
    pub fn as_str(&self) -> &str {
        // decode() validated the bytes and from_text() started from a String
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }

    /// The raw payload, cheap to clone.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty. Only possible via [`Self::from_text`].
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Interpret the frame as an in-band control message, if it is one.
    pub fn control(&self) -> Option<Control<'_>> {
        Control::parse(self.as_str())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame").field("len", &self.len()).field("text", &self.as_str()).finish()
    }
}
