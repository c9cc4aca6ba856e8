use std::sync::Arc;
use std::time::Duration;

use message_pipe_broker::Broker;
use message_pipe_broker::channel::Channel;
use message_pipe_broker::client::{ClientId, ClientStatus};
use message_pipe_broker::config::BrokerConfig;
use message_pipe_broker::error::ChannelError;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

// Helper to build an isolated broker
fn start_test_broker() -> Arc<Broker> {
    Arc::new(Broker::new(BrokerConfig {
        connect_timeout_secs: 2,
        ..BrokerConfig::default()
    }))
}

// Helper to start a client endpoint that counts accepted connections
async fn start_test_client() -> (u16, tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = socket.read_to_end(&mut buf).await;
                let _ = tx.send(buf);
            });
        }
    });

    (port, rx)
}

#[tokio::test]
async fn test_register_bind_resolve_and_send() {
    let broker = start_test_broker();
    let (port, mut received) = start_test_client().await;

    let id = broker.register("127.0.0.1", port);
    assert_eq!(id, broker.register("127.0.0.1", port));
    broker.bind("orders\\..*", id.clone()).unwrap();

    let online = broker.online_clients("orders.created");
    assert_eq!(online.len(), 1);
    assert_eq!(online[0].client_id(), id);
    assert!(broker.online_clients("invoices").is_empty());

    let channel = broker.channel(&id).await.unwrap();
    channel.send(b"payload").await.unwrap();
    assert!(Arc::ptr_eq(&channel, &broker.channel(&id).await.unwrap()));

    broker.shutdown().await;
    assert!(channel.is_shutdown());

    let bytes = tokio::time::timeout(Duration::from_secs(2), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bytes, b"payload");
}

#[tokio::test]
async fn test_invalidated_channel_reconnects() {
    let broker = start_test_broker();
    let (port, mut received) = start_test_client().await;
    let id = broker.register("127.0.0.1", port);

    let first = broker.channel(&id).await.unwrap();
    broker.invalidate_channel(&id).await;
    assert!(first.is_shutdown());

    // The first connection closes without data once invalidated.
    let closed = tokio::time::timeout(Duration::from_secs(2), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(closed.is_empty());

    let second = broker.channel(&id).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    second.send(b"again").await.unwrap();
    broker.shutdown().await;

    let bytes = tokio::time::timeout(Duration::from_secs(2), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bytes, b"again");
}

#[tokio::test]
async fn test_unreachable_client_surfaces_error() {
    let broker = start_test_broker();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let id = broker.register("127.0.0.1", port);

    let err = broker.channel(&id).await.err().unwrap();
    assert!(matches!(
        err,
        ChannelError::ConnectFailed { .. } | ChannelError::ConnectTimeout(_)
    ));
}

#[tokio::test]
async fn test_unregistered_client_is_rejected() {
    let broker = start_test_broker();
    let err = broker
        .channel(&ClientId::new("10.0.0.1", 9000))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ChannelError::NotRegistered(_)));
}

#[tokio::test]
async fn test_offline_clients_are_filtered() {
    let broker = start_test_broker();
    let a = broker.register("10.0.0.1", 9000);
    let b = broker.register("10.0.0.2", 9000);
    broker.bind("orders.*", a.clone()).unwrap();
    broker.bind("orders.*", b.clone()).unwrap();
    broker.bind("invoices", a.clone()).unwrap();

    let offline = broker.client(&a).unwrap().with_status(ClientStatus::Offline);
    broker.update_client(offline);

    let orders = broker.online_clients("orders.created");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].client_id(), b);
    assert!(broker.online_clients("invoices").is_empty());
}
