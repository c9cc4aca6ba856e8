//! Client operations
//!
//! Handles lifecycle sweeps over the client registry.

use log::{debug, info};
use std::time::{Duration, SystemTime};

use crate::client::ClientRegistry;
use crate::client::results::ExpiryResult;

/// Marks every online client that has not reported within `threshold` as
/// offline. Entries are never removed.
pub fn expire_stale_clients(registry: &ClientRegistry, threshold: Duration) -> ExpiryResult {
    expire_stale_clients_at(registry, threshold, SystemTime::now())
}

/// Same as [`expire_stale_clients`] with an explicit reference time.
pub fn expire_stale_clients_at(
    registry: &ClientRegistry,
    threshold: Duration,
    now: SystemTime,
) -> ExpiryResult {
    let snapshot = registry.get_all();
    let checked = snapshot.len();

    let expired: Vec<_> = snapshot
        .iter()
        .filter(|info| info.is_online())
        .map(|info| info.client_id())
        .filter(|client_id| registry.expire_if_stale(client_id, now, threshold))
        .collect();

    for client_id in &expired {
        info!("Client {} expired, marked offline", client_id);
    }
    debug!(
        "Expiry sweep checked {} clients, expired {}",
        checked,
        expired.len()
    );

    ExpiryResult { expired, checked }
}
