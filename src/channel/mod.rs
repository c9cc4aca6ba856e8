//! Channel module for the broker core
//!
//! Owns the outbound channels used to reach registered clients. The
//! transport itself is abstracted behind [`Channel`] and
//! [`ChannelConnector`]; a TCP implementation is provided.

pub mod registry;
pub mod tcp;

use async_trait::async_trait;
use std::io;

// Re-export key types
pub use registry::ChannelManager;
pub use tcp::{TcpChannel, TcpConnector};

/// A live outbound transport to one client.
pub trait Channel: Send + Sync + 'static {
    /// Whether the channel can no longer be used.
    fn is_shutdown(&self) -> bool;

    /// Releases the underlying transport. Must be safe to call repeatedly.
    fn shutdown(&self);
}

/// Constructs channels to a client address.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    type Channel: Channel;

    /// Opens a new channel. A connector enforcing a deadline reports it as
    /// `io::ErrorKind::TimedOut`.
    async fn connect(&self, address: &str, port: u16) -> io::Result<Self::Channel>;
}
