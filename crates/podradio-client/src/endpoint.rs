//! Service endpoints and the resolver seam.
//!
//! Discovering a service (an SDP lookup of "PodRadio Control" on Bluetooth)
//! happens outside this crate. The client only needs something that turns
//! an optional target identifier into at most one [`Endpoint`].

use std::fmt;

/// Channel a PodRadio service listens on unless configured otherwise.
pub const DEFAULT_CHANNEL: u16 = 1;

/// Where a service instance can be reached. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: String,
    channel: u16,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(address: impl Into<String>, channel: u16) -> Self {
        Self {
            address: address.into(),
            channel,
        }
    }

    /// Device address (`AA:BB:CC:DD:EE:FF` for RFCOMM, a host name or IP for TCP).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// RFCOMM channel, or TCP port.
    pub fn channel(&self) -> u16 {
        self.channel
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.channel)
    }
}

/// Turns an optional target identifier into a reachable endpoint.
pub trait Resolver {
    /// Returns the endpoint for `target`, or for any service when `target`
    /// is `None`. `None` means no service was found.
    fn resolve(&self, target: Option<&str>) -> Option<Endpoint>;
}

impl<F> Resolver for F
where
    F: Fn(Option<&str>) -> Option<Endpoint>,
{
    fn resolve(&self, target: Option<&str>) -> Option<Endpoint> {
        self(target)
    }
}

/// Resolver backed by a fixed, configured endpoint.
///
/// An explicit target is taken as the device address on the configured
/// channel; no target falls back to the default endpoint, if any.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    default: Option<Endpoint>,
    channel: u16,
}

impl StaticResolver {
    /// Creates a resolver with no default endpoint.
    pub fn new(channel: u16) -> Self {
        Self {
            default: None,
            channel,
        }
    }

    /// Creates a resolver that falls back to `endpoint`.
    pub fn with_default(endpoint: Endpoint) -> Self {
        Self {
            channel: endpoint.channel(),
            default: Some(endpoint),
        }
    }
}

impl Default for StaticResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, target: Option<&str>) -> Option<Endpoint> {
        match target {
            Some(address) if !address.trim().is_empty() => {
                Some(Endpoint::new(address.trim(), self.channel))
            }
            Some(_) => None,
            None => self.default.clone(),
        }
    }
}
