//! Transport session: one bidirectional byte stream to one endpoint.
//!
//! The session moves whole frames. It knows nothing about commands; the
//! [`crate::PodRadioClient`] encodes and decodes around it.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use podradio_protocol::{FrameError, FrameReader, FrameWriter};

use crate::endpoint::Endpoint;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Connection and stream level faults.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached.
    #[error("cannot reach {endpoint}: {source}")]
    Unreachable {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// `connect` was called on a connected session.
    #[error("session is already connected")]
    AlreadyConnected,

    /// An operation needed a stream but the session is disconnected.
    #[error("session is not connected")]
    NotConnected,

    /// Lower-level read or write failure, including timeouts.
    ///
    /// A timeout also drops the stream, since the peer may still answer.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream before a full frame arrived.
    #[error("peer closed the stream ({buffered} bytes of an unterminated frame)")]
    Closed { buffered: usize },
}

impl From<FrameError> for TransportError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => Self::Io(e),
            FrameError::Closed { buffered } => Self::Closed { buffered },
            FrameError::TooLarge { size, max } => Self::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame too large: {} bytes (max: {})", size, max),
            )),
        }
    }
}

/// Stream options applied when a session connects.
///
/// Both timeouts default to `None`: reads and writes block until they
/// complete. A timeout surfaces as [`TransportError::Io`] and leaves the
/// session disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum time a single read may block.
    pub read_timeout: Option<Duration>,
    /// Maximum time a single write may block.
    pub write_timeout: Option<Duration>,
}

impl SessionOptions {
    /// Builder: set the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Builder: set the write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}

/// Opens the byte stream a session runs on.
pub trait Connector {
    /// Stream type produced by this connector.
    type Stream: Read + Write;

    /// Opens a stream to `endpoint`, applying `options`.
    fn open(&self, endpoint: &Endpoint, options: &SessionOptions) -> io::Result<Self::Stream>;
}

/// Connects over TCP; the endpoint channel is the port.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    /// Creates a connector that blocks until the OS gives up connecting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector that gives up connecting after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
        }
    }

    fn dial(&self, endpoint: &Endpoint) -> io::Result<TcpStream> {
        let target = (endpoint.address(), endpoint.channel());
        let Some(timeout) = self.connect_timeout else {
            return TcpStream::connect(target);
        };

        let mut last_error = None;
        for addr in target.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        }))
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn open(&self, endpoint: &Endpoint, options: &SessionOptions) -> io::Result<TcpStream> {
        let stream = self.dial(endpoint)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(options.read_timeout)?;
        stream.set_write_timeout(options.write_timeout)?;
        Ok(stream)
    }
}

/// `WouldBlock` is what a socket read timeout reports on Unix.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Whether a session holds a live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

enum Link<S> {
    Down,
    Up {
        endpoint: Endpoint,
        frames: FrameReader<S>,
    },
}

/// A single stream to one endpoint, moving newline-delimited frames.
pub struct Session<C: Connector> {
    connector: C,
    options: SessionOptions,
    link: Link<C::Stream>,
}

impl<C: Connector> Session<C> {
    /// Creates a disconnected session.
    pub fn new(connector: C, options: SessionOptions) -> Self {
        Self {
            connector,
            options,
            link: Link::Down,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        match self.link {
            Link::Down => ConnectionState::Disconnected,
            Link::Up { .. } => ConnectionState::Connected,
        }
    }

    /// Returns true if the session holds a live stream.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Endpoint of the live stream.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match &self.link {
            Link::Down => None,
            Link::Up { endpoint, .. } => Some(endpoint),
        }
    }

    /// Opens a stream to `endpoint`.
    pub fn connect(&mut self, endpoint: &Endpoint) -> TransportResult<()> {
        if self.is_connected() {
            return Err(TransportError::AlreadyConnected);
        }

        let stream = self
            .connector
            .open(endpoint, &self.options)
            .map_err(|source| {
                warn!(endpoint = %endpoint, error = %source, "connect failed");
                TransportError::Unreachable {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        info!(
            address = %endpoint.address(),
            channel = endpoint.channel(),
            "session connected"
        );

        self.link = Link::Up {
            endpoint: endpoint.clone(),
            frames: FrameReader::new(stream),
        };
        Ok(())
    }

    /// Writes one frame body followed by the delimiter.
    pub fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        let Link::Up { frames, .. } = &mut self.link else {
            return Err(TransportError::NotConnected);
        };

        match FrameWriter::new(frames.get_mut()).write_frame(bytes) {
            Ok(()) => {
                debug!(bytes = bytes.len(), "frame sent");
                Ok(())
            }
            Err(FrameError::Io(e)) if is_timeout(&e) => {
                warn!(error = %e, "send timed out, dropping the stream");
                self.link = Link::Down;
                Err(TransportError::Io(e))
            }
            Err(e) => {
                warn!(error = %e, "send failed");
                Err(e.into())
            }
        }
    }

    /// Blocks until one full frame arrives and returns it without the delimiter.
    ///
    /// If the peer closes the stream or the read times out the session drops
    /// the stream and becomes disconnected; other failures leave it
    /// connected. An oversized frame is skipped whole, so the next call
    /// starts on the following frame.
    pub fn receive(&mut self) -> TransportResult<Vec<u8>> {
        let Link::Up { frames, .. } = &mut self.link else {
            return Err(TransportError::NotConnected);
        };

        match frames.read_frame() {
            Ok(frame) => {
                debug!(bytes = frame.len(), "frame received");
                Ok(frame)
            }
            Err(FrameError::Closed { buffered }) => {
                warn!(buffered, "peer closed the stream");
                self.link = Link::Down;
                Err(TransportError::Closed { buffered })
            }
            Err(FrameError::Io(e)) if is_timeout(&e) => {
                warn!(error = %e, "reply timed out, dropping the stream");
                self.link = Link::Down;
                Err(TransportError::Io(e))
            }
            Err(e) => {
                warn!(error = %e, "receive failed");
                Err(e.into())
            }
        }
    }

    /// Releases the stream. Safe to call in any state.
    pub fn close(&mut self) {
        if let Link::Up { endpoint, .. } = std::mem::replace(&mut self.link, Link::Down) {
            info!(endpoint = %endpoint, "session closed");
        }
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.close();
    }
}
