//! Module `registry`
//!
//! Provides the channel lifecycle manager: one cached channel per registered
//! client, created lazily, replaced when it reports itself shut down and
//! released when invalidated.
//!
//! Each client owns a slot guarded by its own async mutex, so the
//! check-then-connect-then-publish sequence never runs twice concurrently
//! for the same client while different clients proceed independently.

use dashmap::DashMap;
use log::{debug, info};
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::channel::{Channel, ChannelConnector};
use crate::client::{ClientId, ClientRegistry};
use crate::error::ChannelError;

type ChannelSlot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Manages the outbound channel for every registered client.
pub struct ChannelManager<C: ChannelConnector> {
    registry: Arc<ClientRegistry>,
    connector: C,
    slots: DashMap<ClientId, ChannelSlot<C::Channel>>,
}

impl<C: ChannelConnector> ChannelManager<C> {
    pub fn new(registry: Arc<ClientRegistry>, connector: C) -> Self {
        Self {
            registry,
            connector,
            slots: DashMap::new(),
        }
    }

    /// Returns the cached channel for the client, establishing a new one if
    /// none is cached or the cached one has shut down.
    ///
    /// # Errors
    ///
    /// * `ChannelError::NotRegistered` - the client is unknown; nothing is connected
    /// * `ChannelError::ConnectTimeout` / `ChannelError::ConnectFailed` - the
    ///   connector could not open a channel
    pub async fn get_or_establish(
        &self,
        client_id: &ClientId,
    ) -> Result<Arc<C::Channel>, ChannelError> {
        let information = self
            .registry
            .get(client_id)
            .ok_or_else(|| ChannelError::NotRegistered(client_id.clone()))?;

        let slot = self.slot(client_id);
        let mut cached = slot.lock().await;

        if let Some(channel) = cached.as_ref() {
            if !channel.is_shutdown() {
                return Ok(Arc::clone(channel));
            }
        }

        if let Some(stale) = cached.take() {
            info!(
                "Replacing shut down channel for client {} with a new connection",
                client_id
            );
            stale.shutdown();
        }

        let channel = self
            .connector
            .connect(information.address(), information.port())
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::TimedOut => ChannelError::ConnectTimeout(client_id.clone()),
                _ => ChannelError::ConnectFailed {
                    client_id: client_id.clone(),
                    source,
                },
            })?;

        let channel = Arc::new(channel);
        *cached = Some(Arc::clone(&channel));
        info!(
            "Established channel to client {} at {}:{}",
            client_id,
            information.address(),
            information.port()
        );

        Ok(channel)
    }

    /// Drops and shuts down the cached channel for the client, if any.
    pub async fn invalidate(&self, client_id: &ClientId) {
        let slot = match self.slots.get(client_id) {
            Some(slot) => Arc::clone(slot.value()),
            None => return,
        };

        let mut cached = slot.lock().await;
        if let Some(channel) = cached.take() {
            channel.shutdown();
            info!("Invalidated channel for client {}", client_id);
        }
    }

    /// Returns the cached channel without establishing one.
    pub async fn cached(&self, client_id: &ClientId) -> Option<Arc<C::Channel>> {
        let slot = self.slots.get(client_id).map(|slot| Arc::clone(slot.value()))?;
        let cached = slot.lock().await;
        cached
            .as_ref()
            .filter(|channel| !channel.is_shutdown())
            .map(Arc::clone)
    }

    /// Shuts down every cached channel. Slots stay in place, so the manager
    /// remains usable afterwards.
    pub async fn shutdown_all(&self) -> usize {
        let slots: Vec<_> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut closed = 0;
        for slot in slots {
            if let Some(channel) = slot.lock().await.take() {
                channel.shutdown();
                closed += 1;
            }
        }
        debug!("Shut down {} cached channels", closed);
        closed
    }

    fn slot(&self, client_id: &ClientId) -> ChannelSlot<C::Channel> {
        Arc::clone(self.slots.entry(client_id.clone()).or_default().value())
    }
}
