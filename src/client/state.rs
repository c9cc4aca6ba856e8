//! Module `state`
//!
//! Defines the identity and status of a client known to the broker:
//! `ClientId`, `ClientStatus` and `ClientInformation`.

use std::fmt;
use std::time::{Duration, SystemTime};

/// Separator between address and port inside a client id.
const CLIENT_ID_SEPARATOR: &str = "::";

/// Deterministic client key, formatted as `<address>::<port>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(address: &str, port: u16) -> Self {
        Self(format!("{address}{CLIENT_ID_SEPARATOR}{port}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Liveness state of a registered client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientStatus {
    #[default]
    Online,
    Offline,
}

/// Represents one client known to the broker.
///
/// Identity is derived from `address` and `port`; the remaining fields are
/// state the broker assigns and replaces over time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInformation {
    address: String,
    port: u16,
    status: ClientStatus,
    registered_at: SystemTime,
    last_report_time: SystemTime,
}

impl ClientInformation {
    /// Creates a freshly registered client with the default status.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        let now = SystemTime::now();
        Self {
            address: address.into(),
            port,
            status: ClientStatus::default(),
            registered_at: now,
            last_report_time: now,
        }
    }

    /// Returns the id derived from this client's address and port.
    pub fn client_id(&self) -> ClientId {
        ClientId::new(&self.address, self.port)
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn status(&self) -> ClientStatus {
        self.status
    }

    pub fn is_online(&self) -> bool {
        self.status == ClientStatus::Online
    }

    pub fn registered_at(&self) -> SystemTime {
        self.registered_at
    }

    pub fn last_report_time(&self) -> SystemTime {
        self.last_report_time
    }

    /// Time elapsed since the last report, zero if the clock went backwards.
    pub fn since_last_report(&self, now: SystemTime) -> Duration {
        now.duration_since(self.last_report_time)
            .unwrap_or(Duration::ZERO)
    }

    // --------------------
    // Builder-style setters
    // --------------------

    pub fn with_status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_last_report_time(mut self, time: SystemTime) -> Self {
        self.last_report_time = time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_format() {
        assert_eq!(ClientId::new("10.0.0.1", 9000).as_str(), "10.0.0.1::9000");
        assert_eq!(ClientId::new("localhost", 1).to_string(), "localhost::1");
    }

    #[test]
    fn test_client_id_distinct_per_port() {
        assert_ne!(ClientId::new("10.0.0.1", 9000), ClientId::new("10.0.0.1", 9001));
    }

    #[test]
    fn test_new_client_defaults() {
        let info = ClientInformation::new("10.0.0.1", 9000);
        assert_eq!(info.status(), ClientStatus::Online);
        assert_eq!(info.registered_at(), info.last_report_time());
        assert_eq!(info.client_id(), ClientId::new("10.0.0.1", 9000));
    }

    #[test]
    fn test_since_last_report_clamps_future_timestamps() {
        let now = SystemTime::now();
        let info = ClientInformation::new("a", 1)
            .with_last_report_time(now + Duration::from_secs(60));
        assert_eq!(info.since_last_report(now), Duration::ZERO);
    }
}
