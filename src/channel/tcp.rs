//! Module `tcp`
//!
//! TCP implementation of the channel primitives. A `TcpChannel` wraps one
//! connected stream; writing to a broken stream or calling `shutdown`
//! releases the stream and marks the channel unusable.

use async_trait::async_trait;
use log::{debug, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::channel::{Channel, ChannelConnector};

/// Outbound TCP connection to a client.
pub struct TcpChannel {
    peer_addr: SocketAddr,
    stream: Mutex<Option<TcpStream>>,
    shutdown: AtomicBool,
}

impl TcpChannel {
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer_addr = stream.peer_addr()?;
        Ok(Self {
            peer_addr,
            stream: Mutex::new(Some(stream)),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Writes a frame to the client. A write failure shuts the channel down
    /// so the next lookup replaces it.
    pub async fn send(&self, payload: &[u8]) -> io::Result<()> {
        let mut guard = self.stream.lock().await;
        if self.is_shutdown() {
            guard.take();
            return Err(self.not_connected());
        }
        let stream = match guard.as_mut() {
            Some(stream) => stream,
            None => return Err(self.not_connected()),
        };

        let result = async {
            stream.write_all(payload).await?;
            stream.flush().await
        }
        .await;

        if let Err(e) = &result {
            warn!("Write to {} failed, shutting channel down: {}", self.peer_addr, e);
            self.shutdown.store(true, Ordering::SeqCst);
        }
        // shutdown() may have run while this write held the lock.
        if self.is_shutdown() {
            guard.take();
        }
        result
    }

    fn not_connected(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotConnected,
            format!("channel to {} is shut down", self.peer_addr),
        )
    }
}

impl Channel for TcpChannel {
    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        // Otherwise the sender holding the lock drops the stream after its write.
        if let Ok(mut guard) = self.stream.try_lock() {
            guard.take();
        }
        debug!("Channel to {} shut down", self.peer_addr);
    }
}

/// Opens plain TCP channels with a connect deadline.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl ChannelConnector for TcpConnector {
    type Channel = TcpChannel;

    async fn connect(&self, address: &str, port: u16) -> io::Result<TcpChannel> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect((address, port)))
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {}:{} timed out", address, port),
                )
            })??;
        stream.set_nodelay(true)?;
        debug!("Connected to {}:{}", address, port);
        TcpChannel::new(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_and_send() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            buf
        });

        let connector = TcpConnector::new(Duration::from_secs(1));
        let channel = connector.connect("127.0.0.1", addr.port()).await.unwrap();
        channel.send(b"hello").await.unwrap();

        assert_eq!(&server.await.unwrap(), b"hello");
        assert_eq!(channel.peer_addr(), addr);
        assert!(!channel.is_shutdown());
    }

    #[tokio::test]
    async fn test_send_after_shutdown_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let connector = TcpConnector::new(Duration::from_secs(1));
        let channel = connector.connect("127.0.0.1", addr.port()).await.unwrap();
        channel.shutdown();
        channel.shutdown();

        let err = channel.send(b"x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(channel.is_shutdown());
    }

    #[tokio::test]
    async fn test_shutdown_during_send_releases_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let connector = TcpConnector::new(Duration::from_secs(1));
        let channel = connector.connect("127.0.0.1", addr.port()).await.unwrap();

        // Hold the stream lock the way an in-flight send does.
        let held = channel.stream.lock().await;
        channel.shutdown();
        drop(held);

        assert!(channel.send(b"x").await.is_err());
        assert!(channel.stream.lock().await.is_none());

        let received = tokio::time::timeout(Duration::from_secs(2), peer)
            .await
            .unwrap()
            .unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let connector = TcpConnector::new(Duration::from_secs(1));
        assert!(connector.connect("127.0.0.1", port).await.is_err());
    }
}
