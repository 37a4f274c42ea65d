//! Client error types.

use thiserror::Error;

use podradio_protocol::CodecError;

use crate::transport::TransportError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Why a command exchange failed.
#[derive(Debug, Error)]
pub enum CommunicationError {
    /// The stream failed while sending or receiving.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The reply could not be decoded or interpreted.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors that can occur in the client.
///
/// A reply with `success=false` is not an error; see [`crate::Outcome`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The resolver found no service endpoint.
    #[error("PodRadio service not found")]
    ServiceNotFound,

    /// Opening the session failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(#[source] TransportError),

    /// An operation was issued without a live session.
    #[error("not connected to a PodRadio service")]
    NotConnected,

    /// A command could not be sent or its reply could not be read.
    #[error("communication failed: {0}")]
    CommunicationFailed(#[from] CommunicationError),

    /// Configuration could not be loaded (command line front end only).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns true if the failure happened mid-exchange.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::CommunicationFailed(_))
    }
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        Self::CommunicationFailed(CommunicationError::Codec(err))
    }
}
