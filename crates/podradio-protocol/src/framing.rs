//! Newline-delimited message framing.
//!
//! Each frame is one document followed by a single `\n`:
//!
//! ```text
//! +------------------+----+
//! |  JSON document   | \n |
//! +------------------+----+
//! ```
//!
//! A `\r` right before the delimiter is dropped and blank lines between
//! frames are skipped.

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::error::{FrameError, FrameResult};
use crate::{FRAME_DELIMITER, MAX_FRAME_SIZE};

/// Reads newline-delimited frames from a byte stream.
///
/// Bytes of a frame that is still incomplete when a read fails (for example
/// on a read timeout) are kept, and the next call picks up where this one
/// stopped. A frame over [`MAX_FRAME_SIZE`] is consumed up to its delimiter
/// before [`FrameError::TooLarge`] is returned, so the next call starts on a
/// frame boundary.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    partial: Vec<u8>,
    /// Bytes dropped so far from an oversized frame.
    discarded: Option<usize>,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new FrameReader wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            partial: Vec::new(),
            discarded: None,
        }
    }

    /// Reads the next frame and returns it without its delimiter.
    ///
    /// Returns [`FrameError::Closed`] once the stream reaches EOF before a
    /// delimiter, whether or not part of a frame was received.
    pub fn read_frame(&mut self) -> FrameResult<Vec<u8>> {
        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if available.is_empty() {
                let buffered = self.partial.len() + self.discarded.take().unwrap_or(0);
                self.partial.clear();
                return Err(FrameError::Closed { buffered });
            }

            let delimiter = available.iter().position(|&b| b == FRAME_DELIMITER);
            let body = &available[..delimiter.unwrap_or(available.len())];
            match self.discarded.as_mut() {
                Some(skipped) => *skipped += body.len(),
                None => self.partial.extend_from_slice(body),
            }
            let used = delimiter.map_or(available.len(), |pos| pos + 1);
            self.reader.consume(used);

            if self.partial.len() > MAX_FRAME_SIZE {
                self.discarded = Some(self.partial.len());
                self.partial = Vec::new();
            }

            if delimiter.is_none() {
                continue;
            }

            if let Some(size) = self.discarded.take() {
                return Err(FrameError::TooLarge {
                    size,
                    max: MAX_FRAME_SIZE,
                });
            }

            let mut frame = std::mem::take(&mut self.partial);
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            if frame.is_empty() {
                continue;
            }
            return Ok(frame);
        }
    }

    /// Number of bytes of an unterminated frame held from earlier reads.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Returns a mutable reference to the underlying reader.
    ///
    /// Writing through it is fine; reading directly would skip buffered bytes.
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }
}

/// Writes newline-delimited frames to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new FrameWriter wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one frame body followed by the delimiter, then flushes.
    ///
    /// A body containing a raw newline would split into two frames on the
    /// peer and is rejected with `InvalidInput`.
    pub fn write_frame(&mut self, body: &[u8]) -> FrameResult<()> {
        if body.contains(&FRAME_DELIMITER) {
            return Err(FrameError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame body contains a raw newline",
            )));
        }
        if body.len() > MAX_FRAME_SIZE {
            return Err(FrameError::TooLarge {
                size: body.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let mut buffer = Vec::with_capacity(body.len() + 1);
        buffer.extend_from_slice(body);
        buffer.push(FRAME_DELIMITER);

        self.writer.write_all(&buffer)?;
        self.writer.flush()?;
        Ok(())
    }
}
