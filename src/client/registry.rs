//! Client registry
//!
//! Single source of truth for client identity and status. Backed by a
//! sharded concurrent map so different clients never block each other.

use dashmap::DashMap;
use log::{debug, info};
use std::time::{Duration, SystemTime};

use crate::client::{ClientId, ClientInformation, ClientStatus};

/// Registry for tracking every client known to the broker
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientId, ClientInformation>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the client if it is not known yet and returns its id.
    ///
    /// Calling this repeatedly for the same address and port never creates a
    /// second entry and never resets an existing one.
    pub fn register_if_absent(&self, address: &str, port: u16) -> ClientId {
        let client_id = ClientId::new(address, port);
        self.clients.entry(client_id.clone()).or_insert_with(|| {
            info!("Registered client {}", client_id);
            ClientInformation::new(address, port)
        });
        client_id
    }

    pub fn exists(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn get(&self, client_id: &ClientId) -> Option<ClientInformation> {
        self.clients.get(client_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all clients at call time.
    pub fn get_all(&self) -> Vec<ClientInformation> {
        self.clients
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Replaces the stored entry for the client derived from `information`.
    pub fn update(&self, information: ClientInformation) {
        let client_id = information.client_id();
        debug!(
            "Updating client {} (status {:?})",
            client_id,
            information.status()
        );
        self.clients.insert(client_id, information);
    }

    /// Records a report from the client: registers it if needed, marks it
    /// online and refreshes its last report time.
    pub fn heartbeat(&self, address: &str, port: u16) -> ClientId {
        let client_id = ClientId::new(address, port);
        let now = SystemTime::now();
        let mut entry = self
            .clients
            .entry(client_id.clone())
            .or_insert_with(|| ClientInformation::new(address, port));
        if !entry.is_online() {
            info!("Client {} is back online", client_id);
        }
        let refreshed = entry
            .value()
            .clone()
            .with_status(ClientStatus::Online)
            .with_last_report_time(now);
        *entry = refreshed;
        client_id
    }

    /// Sets the status of an online client to offline if it has not reported
    /// within `threshold`, atomically with respect to concurrent heartbeats.
    /// Returns true if the status changed.
    pub(crate) fn expire_if_stale(
        &self,
        client_id: &ClientId,
        now: SystemTime,
        threshold: Duration,
    ) -> bool {
        match self.clients.get_mut(client_id) {
            Some(mut entry) => {
                if entry.is_online() && entry.since_last_report(now) > threshold {
                    let expired = entry.value().clone().with_status(ClientStatus::Offline);
                    *entry = expired;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
