//! Wire conventions for the Parley chat relay.
//!
//! Parley has no binary framing. A frame is whatever a single read on a TCP
//! connection delivers, interpreted as UTF-8 text. The only structure inside
//! a frame is the in-band pseudonym convention: text that splits on `$` with
//! a leading `pseudo` segment announces a display name.
//!
//! ```text
//! pseudo$alice        -> Control::Pseudonym(Some("alice"))
//! pseudo              -> Control::Pseudonym(None)
//! hello everyone      -> no control
//! ```
//!
//! A control frame is still an ordinary chat message: the relay registers
//! the name and then broadcasts the frame verbatim. There is no escaping, so
//! a display name containing `$` is truncated at the first `$`. Trailing
//! `\r` and `\n` are stripped from the name, so `pseudo$bob\r\n` from a
//! line-oriented client registers `bob`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod control;
pub mod errors;
pub mod frame;

pub use control::Control;
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
