//! Module `bindings`
//!
//! Maintains the many-to-many relation between pipe name patterns and the
//! clients bound to them, and resolves a concrete pipe name to the clients
//! currently online for it.

use dashmap::DashMap;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::client::{ClientId, ClientInformation, ClientRegistry};
use crate::error::BindingError;
use crate::pipe::PipePattern;

/// Clients bound to one pipe name pattern.
struct PipeBinding {
    pattern: PipePattern,
    clients: HashSet<ClientId>,
}

/// Index of pipe name patterns to bound clients.
pub struct PipeBindingIndex {
    registry: Arc<ClientRegistry>,
    bindings: DashMap<String, PipeBinding>,
}

impl PipeBindingIndex {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self {
            registry,
            bindings: DashMap::new(),
        }
    }

    /// Binds a client to a pipe name pattern.
    ///
    /// Binding the same client twice has no further effect. Client existence
    /// is not checked here.
    pub fn bind(&self, pattern: &str, client_id: ClientId) -> Result<(), BindingError> {
        let mut binding = match self.bindings.get_mut(pattern) {
            Some(binding) => binding,
            None => {
                let compiled = PipePattern::compile(pattern)?;
                self.bindings
                    .entry(pattern.to_string())
                    .or_insert_with(|| PipeBinding {
                        pattern: compiled,
                        clients: HashSet::new(),
                    })
            }
        };

        if binding.clients.insert(client_id.clone()) {
            info!("Client {} bound to pipe pattern '{}'", client_id, pattern);
        }
        Ok(())
    }

    /// Removes a client from a pattern. The pattern entry itself stays.
    /// Returns true if the client was bound.
    pub fn unbind(&self, pattern: &str, client_id: &ClientId) -> bool {
        let removed = self
            .bindings
            .get_mut(pattern)
            .map(|mut binding| binding.clients.remove(client_id))
            .unwrap_or(false);
        if removed {
            info!("Client {} unbound from pipe pattern '{}'", client_id, pattern);
        }
        removed
    }

    /// Clients bound to exactly this pattern, sorted.
    pub fn bound_clients(&self, pattern: &str) -> Vec<ClientId> {
        let mut clients: Vec<_> = self
            .bindings
            .get(pattern)
            .map(|binding| binding.clients.iter().cloned().collect())
            .unwrap_or_default();
        clients.sort();
        clients
    }

    /// Patterns the client is bound to, sorted.
    pub fn patterns_for(&self, client_id: &ClientId) -> Vec<String> {
        let mut patterns: Vec<_> = self
            .bindings
            .iter()
            .filter(|entry| entry.clients.contains(client_id))
            .map(|entry| entry.key().clone())
            .collect();
        patterns.sort();
        patterns
    }

    pub fn pattern_count(&self) -> usize {
        self.bindings.len()
    }

    /// Returns the online clients serving `pipe_name`.
    ///
    /// When several patterns match, the longest pattern wins and equal
    /// lengths fall back to lexicographic order. No match yields an empty
    /// result.
    pub fn resolve_online_clients(&self, pipe_name: &str) -> Vec<ClientInformation> {
        let client_ids = match self.matching_clients(pipe_name) {
            Some(client_ids) => client_ids,
            None => {
                debug!("No pipe pattern matches '{}'", pipe_name);
                return Vec::new();
            }
        };

        let mut online = Vec::with_capacity(client_ids.len());
        for client_id in client_ids {
            match self.registry.get(&client_id) {
                Some(info) if info.is_online() => online.push(info),
                Some(_) => {}
                None => warn!(
                    "Client {} is bound to pipe '{}' but not registered",
                    client_id, pipe_name
                ),
            }
        }
        online
    }

    /// Picks the matching pattern and copies its client set out of the map.
    fn matching_clients(&self, pipe_name: &str) -> Option<Vec<ClientId>> {
        let mut best: Option<(String, Vec<ClientId>)> = None;

        for entry in self.bindings.iter() {
            if !entry.pattern.matches(pipe_name) {
                continue;
            }
            let key = entry.key();
            let better = match &best {
                None => true,
                Some((current, _)) => {
                    key.len() > current.len() || (key.len() == current.len() && key < current)
                }
            };
            if better {
                let mut clients: Vec<_> = entry.clients.iter().cloned().collect();
                clients.sort();
                best = Some((key.clone(), clients));
            }
        }

        best.map(|(pattern, clients)| {
            debug!("Pipe '{}' resolved through pattern '{}'", pipe_name, pattern);
            clients
        })
    }
}
