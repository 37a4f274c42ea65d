//! Encoding commands and decoding responses.
//!
//! Both functions work on the frame body only; the delimiter is handled by
//! [`crate::FrameWriter`] and [`crate::FrameReader`].

use crate::error::{CodecError, CodecResult};
use crate::types::{Command, Response};

/// Encodes a command to its canonical compact JSON document.
///
/// Compact JSON escapes control characters inside strings, so the output
/// never contains a raw newline.
pub fn encode_command(command: &Command) -> CodecResult<Vec<u8>> {
    Ok(serde_json::to_vec(command)?)
}

/// Decodes a response document.
///
/// Fails with [`CodecError::Malformed`] when the bytes are not JSON, when
/// `success` is missing or not a boolean, or when a failure carries `data`.
pub fn decode_response(data: &[u8]) -> CodecResult<Response> {
    let response: Response = serde_json::from_slice(data)?;

    if !response.success && response.data.is_some() {
        return Err(CodecError::malformed("failure response carries data"));
    }

    Ok(response)
}
