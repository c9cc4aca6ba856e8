use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::channel::{ChannelConnector, ChannelManager, TcpConnector};
use crate::client::{ClientId, ClientInformation, ClientRegistry, ExpiryResult, expire_stale_clients};
use crate::config::BrokerConfig;
use crate::error::{BindingError, ChannelError};
use crate::pipe::PipeBindingIndex;

/// The broker's client-membership and connection-routing core.
///
/// Owns one client registry, one pipe binding index and one channel manager,
/// all sharing the same registry. Construct one per broker (or per test).
pub struct Broker<C: ChannelConnector = TcpConnector> {
    registry: Arc<ClientRegistry>,
    bindings: PipeBindingIndex,
    channels: ChannelManager<C>,
    config: Arc<BrokerConfig>,
    expiry_monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Broker<TcpConnector> {
    /// Creates a broker core that opens plain TCP channels.
    pub fn new(config: BrokerConfig) -> Self {
        let connector = TcpConnector::new(config.connect_timeout());
        Self::with_connector(config, connector)
    }
}

impl<C: ChannelConnector + 'static> Broker<C> {
    pub fn with_connector(config: BrokerConfig, connector: C) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        Self {
            bindings: PipeBindingIndex::new(Arc::clone(&registry)),
            channels: ChannelManager::new(Arc::clone(&registry), connector),
            registry,
            config: Arc::new(config),
            expiry_monitor: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &PipeBindingIndex {
        &self.bindings
    }

    pub fn channels(&self) -> &ChannelManager<C> {
        &self.channels
    }

    // --------------------
    // Client entry points
    // --------------------

    pub fn register(&self, address: &str, port: u16) -> ClientId {
        self.registry.register_if_absent(address, port)
    }

    pub fn heartbeat(&self, address: &str, port: u16) -> ClientId {
        self.registry.heartbeat(address, port)
    }

    pub fn client(&self, client_id: &ClientId) -> Option<ClientInformation> {
        self.registry.get(client_id)
    }

    pub fn update_client(&self, information: ClientInformation) {
        self.registry.update(information)
    }

    // --------------------
    // Pipe entry points
    // --------------------

    pub fn bind(&self, pattern: &str, client_id: ClientId) -> Result<(), BindingError> {
        self.bindings.bind(pattern, client_id)
    }

    pub fn online_clients(&self, pipe_name: &str) -> Vec<ClientInformation> {
        self.bindings.resolve_online_clients(pipe_name)
    }

    // --------------------
    // Channel entry points
    // --------------------

    pub async fn channel(&self, client_id: &ClientId) -> Result<Arc<C::Channel>, ChannelError> {
        self.channels.get_or_establish(client_id).await
    }

    pub async fn invalidate_channel(&self, client_id: &ClientId) {
        self.channels.invalidate(client_id).await
    }

    // --------------------
    // Lifecycle
    // --------------------

    /// Marks silent clients offline and releases their channels.
    pub async fn expire_stale_clients(&self) -> ExpiryResult {
        let result = expire_stale_clients(&self.registry, self.config.client_expired_threshold());
        for client_id in &result.expired {
            self.channels.invalidate(client_id).await;
        }
        result
    }

    /// Starts the periodic expiry sweep. Calling it again while a sweep task
    /// is running has no effect.
    pub async fn start_expiry_monitor(self: &Arc<Self>) {
        let mut monitor = self.expiry_monitor.lock().await;
        if monitor.is_some() {
            debug!("Expiry monitor already running");
            return;
        }

        let broker = Arc::clone(self);
        let period = self.config.expiry_check_interval();
        info!(
            "Starting client expiry monitor (every {:?}, threshold {:?})",
            period,
            self.config.client_expired_threshold()
        );

        *monitor = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                broker.expire_stale_clients().await;
            }
        }));
    }

    /// Stops the expiry monitor and closes every cached channel.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.expiry_monitor.lock().await.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("Expiry monitor terminated abnormally: {}", e);
                }
            }
        }

        let closed = self.channels.shutdown_all().await;
        info!("Broker core shut down, closed {} channels", closed);
    }
}
