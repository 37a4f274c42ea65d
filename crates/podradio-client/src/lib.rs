//! Client for the PodRadio control protocol.
//!
//! [`PodRadioClient`] owns one [`Session`] and exposes typed operations on
//! top of a single request/response choke point, [`PodRadioClient::execute`].
//! Everything is synchronous and blocking: one request is outstanding at a
//! time and the calling thread waits for its reply.
//!
//! ```no_run
//! use podradio_client::{Endpoint, PodRadioClient, SessionOptions, StaticResolver, TcpConnector};
//!
//! let resolver = StaticResolver::with_default(Endpoint::new("127.0.0.1", 7070));
//! let mut client = PodRadioClient::new(resolver, TcpConnector::new(), SessionOptions::default());
//! client.connect(None)?;
//! if let Some(status) = client.get_status()?.completed() {
//!     println!("{} podcasts", status.subscription_count);
//! }
//! client.disconnect();
//! # Ok::<(), podradio_client::ClientError>(())
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod endpoint;
pub mod error;
#[cfg(target_os = "linux")]
pub mod rfcomm;
pub mod transport;

#[cfg(test)]
mod testing;

pub use cli::Cli;
pub use client::{Outcome, PodRadioClient, Refusal};
pub use endpoint::{DEFAULT_CHANNEL, Endpoint, Resolver, StaticResolver};
pub use error::{ClientError, ClientResult, CommunicationError};
#[cfg(target_os = "linux")]
pub use rfcomm::RfcommConnector;
pub use transport::{
    ConnectionState, Connector, Session, SessionOptions, TcpConnector, TransportError,
    TransportResult,
};
