//! End-to-end relay tests over real loopback TCP.
//!
//! Each test starts a relay on an ephemeral port, connects plain tokio
//! `TcpStream` clients, and observes what they receive.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use parley_core::Registry;
use parley_server::{Server, ServerConfig, TcpTransport};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{sleep, timeout},
};

const WAIT: Duration = Duration::from_secs(5);

struct Relay {
    addr: SocketAddr,
    registry: Arc<Registry>,
}

impl Relay {
    fn start(config: ServerConfig) -> Self {
        let transport = TcpTransport::bind("127.0.0.1:0".parse().unwrap(), 128).unwrap();
        let server = Server::new(transport, config);
        let addr = server.local_addr().unwrap();
        let registry = server.registry();
        tokio::spawn(server.run());
        Self { addr, registry }
    }

    /// Connect one client and wait until the relay has registered it.
    async fn connect(&self) -> TcpStream {
        let before = self.registry.len();
        let stream = TcpStream::connect(self.addr).await.unwrap();
        let registry = Arc::clone(&self.registry);
        wait_until(move || registry.len() > before).await;
        stream
    }

    async fn connect_many(&self, n: usize) -> Vec<TcpStream> {
        let mut clients = Vec::with_capacity(n);
        for _ in 0..n {
            clients.push(self.connect().await);
        }
        clients
    }
}

async fn wait_until(cond: impl Fn() -> bool) {
    timeout(WAIT, async {
        while !cond() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn recv(stream: &mut TcpStream) -> String {
    let mut buf = [0u8; 2048];
    let n = timeout(WAIT, stream.read(&mut buf)).await.expect("no data in time").unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

/// Read until `len` bytes have arrived; frames may be split or coalesced.
async fn recv_len(stream: &mut TcpStream, len: usize) -> String {
    let mut out = Vec::with_capacity(len);
    let mut buf = [0u8; 2048];
    while out.len() < len {
        let n = timeout(WAIT, stream.read(&mut buf)).await.expect("no data in time").unwrap();
        assert_ne!(n, 0, "relay closed the connection");
        out.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(out).unwrap()
}

async fn assert_silent(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(150), stream.read(&mut buf)).await;
    assert!(result.is_err(), "expected no data, got {result:?}");
}

async fn assert_closed_by_relay(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let n = timeout(WAIT, stream.read(&mut buf)).await.expect("relay kept the connection open");
    // either a clean EOF or a reset, never data
    assert!(matches!(n, Ok(0) | Err(_)), "unexpected read result {n:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn message_reaches_every_other_client_but_not_sender() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(4).await;

    clients[0].write_all(b"hello from zero").await.unwrap();

    for client in &mut clients[1..] {
        assert_eq!(recv(client).await, "hello from zero");
    }
    assert_silent(&mut clients[0]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pseudonym_is_registered_once_and_relayed() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(2).await;

    clients[0].write_all(b"pseudo$alice").await.unwrap();
    assert_eq!(recv(&mut clients[1]).await, "pseudo$alice");

    clients[0].write_all(b"pseudo$alice").await.unwrap();
    assert_eq!(recv(&mut clients[1]).await, "pseudo$alice");

    assert_eq!(relay.registry.names(), vec!["alice".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pseudonym_without_name_is_relayed_as_chat() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(2).await;

    clients[0].write_all(b"pseudo").await.unwrap();
    assert_eq!(recv(&mut clients[1]).await, "pseudo");
    assert!(relay.registry.names().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn departed_client_is_removed_and_others_keep_chatting() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(3).await;

    let gone = clients.pop().unwrap();
    drop(gone);
    let registry = Arc::clone(&relay.registry);
    wait_until(move || registry.len() == 2).await;

    clients[0].write_all(b"still here").await.unwrap();
    assert_eq!(recv(&mut clients[1]).await, "still here");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn broken_peer_does_not_block_delivery_to_others() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(3).await;

    // break the last peer without waiting for the relay to notice
    clients[2].shutdown().await.unwrap();
    let broken = clients.pop().unwrap();
    drop(broken);

    for round in 0..5 {
        let text = format!("round {round}");
        clients[0].write_all(text.as_bytes()).await.unwrap();
        assert_eq!(recv(&mut clients[1]).await, text);
    }

    let registry = Arc::clone(&relay.registry);
    wait_until(move || registry.len() == 2).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_sender_order_is_preserved() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(2).await;

    let expected: String = (0..50).map(|i| format!("<{i}>")).collect();
    for i in 0..50 {
        clients[0].write_all(format!("<{i}>").as_bytes()).await.unwrap();
    }

    assert_eq!(recv_len(&mut clients[1], expected.len()).await, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_utf8_disconnects_only_the_sender() {
    let relay = Relay::start(ServerConfig::default());
    let mut clients = relay.connect_many(2).await;

    clients[0].write_all(&[0xc3, 0x28, 0xff]).await.unwrap();
    assert_closed_by_relay(&mut clients[0]).await;

    let registry = Arc::clone(&relay.registry);
    wait_until(move || registry.len() == 1).await;
    assert_silent(&mut clients[1]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn connection_limit_turns_away_extra_clients() {
    let config = ServerConfig { max_connections: Some(2), ..ServerConfig::default() };
    let relay = Relay::start(config);
    let mut clients = relay.connect_many(2).await;

    let mut extra = TcpStream::connect(relay.addr).await.unwrap();
    assert_closed_by_relay(&mut extra).await;
    assert_eq!(relay.registry.len(), 2);

    // a slot frees up once someone leaves
    drop(clients.pop());
    let registry = Arc::clone(&relay.registry);
    wait_until(move || registry.len() == 1).await;

    let mut late = relay.connect().await;
    clients[0].write_all(b"welcome").await.unwrap();
    assert_eq!(recv(&mut late).await, "welcome");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn registry_survives_connect_disconnect_churn() {
    let relay = Relay::start(ServerConfig::default());
    let mut observer = relay.connect().await;

    let workers: Vec<_> = (0..40)
        .map(|w| {
            let addr = relay.addr;
            tokio::spawn(async move {
                for cycle in 0..5 {
                    let mut stream = TcpStream::connect(addr).await.unwrap();
                    stream.write_all(format!("w{w}c{cycle};").as_bytes()).await.unwrap();
                    sleep(Duration::from_millis(2)).await;
                    drop(stream);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.await.unwrap();
    }

    let registry = Arc::clone(&relay.registry);
    wait_until(move || registry.len() == 1).await;

    assert!(relay.registry.names().is_empty());

    // the survivor is still fully functional
    let mut late = relay.connect().await;
    late.write_all(b"ping").await.unwrap();

    let mut seen = String::new();
    timeout(WAIT, async {
        while !seen.contains("ping") {
            seen.push_str(&recv(&mut observer).await);
        }
    })
    .await
    .expect("observer never saw the ping");
}
