//! Command codec for the PodRadio control protocol.
//!
//! # Protocol Overview
//!
//! Every message is a single compact JSON document followed by a newline:
//!
//! ```text
//! {"action":"get_status"}\n
//! {"success":true,"data":{...}}\n
//! ```
//!
//! Requests are [`Command`]s, tagged by their `action` field. Replies are
//! [`Response`] documents carrying a `success` flag, an optional
//! command-specific `data` payload and an optional `error` message.
//!
//! # Example
//!
//! ```rust
//! use podradio_protocol::{Command, decode_response, encode_command};
//!
//! let bytes = encode_command(&Command::GetStatus).unwrap();
//! assert_eq!(bytes, br#"{"action":"get_status"}"#);
//!
//! let response = decode_response(br#"{"success":false,"error":"not found"}"#).unwrap();
//! assert_eq!(response.error.as_deref(), Some("not found"));
//! ```

mod codec;
mod error;
mod framing;
mod types;

pub use codec::{decode_response, encode_command};
pub use error::{CodecError, CodecResult, FrameError, FrameResult};
pub use framing::{FrameReader, FrameWriter};
pub use types::{
    Command, Direction, PlayerCommand, Playback, PodcastList, Response, Selection,
};

/// Frame delimiter.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Maximum frame size, delimiter excluded (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;
