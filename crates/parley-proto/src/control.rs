//! In-band control convention.
//!
//! Control frames share the chat stream. A frame whose text, split on
//! [`DELIMITER`], starts with exactly [`PSEUDONYM_TAG`] carries a display
//! name in its second segment. Later segments are ignored.

/// Segment separator for control frames.
pub const DELIMITER: char = '$';

/// First segment of a pseudonym registration.
pub const PSEUDONYM_TAG: &str = "pseudo";

/// A control message recognized inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control<'a> {
    /// Display name announcement.
    ///
    /// `None` when the frame has no usable name segment. The frame is then
    /// relayed as plain chat without registering anything.
    Pseudonym(Option<&'a str>),
}

impl<'a> Control<'a> {
    /// Parse control text.
    ///
    /// The name segment has trailing line terminators stripped so that
    /// line-oriented clients (`nc`, `telnet`) register the name they typed.
    /// An empty name counts as absent.
    pub fn parse(text: &'a str) -> Option<Self> {
        let mut segments = text.split(DELIMITER);
        if segments.next()? != PSEUDONYM_TAG {
            return None;
        }

        let name = segments.next().map(|s| s.trim_end_matches(['\r', '\n'])).filter(|s| !s.is_empty());
        Some(Control::Pseudonym(name))
    }

    /// The announced display name, if any.
    pub fn pseudonym(&self) -> Option<&'a str> {
        match self {
            Control::Pseudonym(name) => *name,
        }
    }
}

/// Build the control text announcing `name`.
pub fn pseudonym_frame(name: &str) -> String {
    format!("{PSEUDONYM_TAG}{DELIMITER}{name}")
}
