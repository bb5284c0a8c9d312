//! In-process websocket peer for relay and session tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use frames::{Frame, decode_frame, encode_frame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::{ClientConfig, ReconnectPolicy};
use crate::relay::ConnectionStatus;

pub const WAIT: Duration = Duration::from_secs(2);

/// Accepts any number of connections. Every decoded text frame a client sends
/// lands in `received`, tagged with the 1-based connection it arrived on;
/// every string pushed is written raw to all clients.
pub struct TestServer {
    pub url: String,
    pub received: mpsc::UnboundedReceiver<(usize, Frame)>,
    push: broadcast::Sender<String>,
    kick: broadcast::Sender<()>,
    accepted: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (received_tx, received) = mpsc::unbounded_channel();
        let (push, _) = broadcast::channel::<String>(64);
        let (kick, _) = broadcast::channel::<()>(4);
        let accepted = Arc::new(AtomicUsize::new(0));
        let push_accept = push.clone();
        let kick_accept = kick.clone();
        let accepted_count = Arc::clone(&accepted);

        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let conn = accepted_count.fetch_add(1, Ordering::SeqCst) + 1;
                // Subscribe before the handshake so nothing pushed after the
                // client reports Connected can be missed.
                let mut outbound = push_accept.subscribe();
                let mut kicked = kick_accept.subscribe();
                let received_tx = received_tx.clone();
                tokio::spawn(async move {
                    let Ok(ws) = accept_async(tcp).await else {
                        return;
                    };
                    let (mut sink, mut stream) = ws.split();
                    loop {
                        tokio::select! {
                            _ = kicked.recv() => break,
                            raw = outbound.recv() => {
                                let Ok(raw) = raw else { break };
                                if sink.send(Message::Text(raw.into())).await.is_err() {
                                    break;
                                }
                            }
                            incoming = stream.next() => match incoming {
                                Some(Ok(Message::Text(text))) => {
                                    if let Ok(frame) = decode_frame(text.as_str()) {
                                        let _ = received_tx.send((conn, frame));
                                    }
                                }
                                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                                Some(Ok(_)) => {}
                            }
                        }
                    }
                });
            }
        });

        Self { url: format!("ws://{addr}"), received, push, kick, accepted }
    }

    /// Drop every live socket without a close handshake.
    pub fn drop_clients(&self) {
        self.kick.send(()).expect("a client is connected");
    }

    /// Connections accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig { url: self.url.clone(), reconnect: fast_policy(2) }
    }

    /// One retry with a backoff long enough to observe `Reconnecting`.
    pub fn recovering_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.url.clone(),
            reconnect: ReconnectPolicy { max_attempts: 1, delay: Duration::from_millis(200) },
        }
    }

    pub fn push_raw(&self, raw: &str) {
        self.push.send(raw.to_owned()).expect("a client is connected");
    }

    pub fn push_frame(&self, frame: &Frame) {
        self.push_raw(&encode_frame(frame).expect("encode"));
    }

    pub async fn next_frame(&mut self) -> Frame {
        self.next_frame_on().await.1
    }

    /// Next frame together with the connection it arrived on.
    pub async fn next_frame_on(&mut self) -> (usize, Frame) {
        timeout(WAIT, self.received.recv()).await.expect("frame before timeout").expect("server running")
    }

    pub async fn assert_no_frame(&mut self) {
        assert!(
            timeout(Duration::from_millis(100), self.received.recv()).await.is_err(),
            "server should not receive a frame"
        );
    }
}

pub fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy { max_attempts, delay: Duration::from_millis(10) }
}

pub async fn wait_for_status(rx: &mut watch::Receiver<ConnectionStatus>, want: ConnectionStatus) {
    timeout(WAIT, rx.wait_for(|status| *status == want))
        .await
        .expect("status before timeout")
        .expect("relay alive");
}

pub async fn next_inbound(rx: &mut broadcast::Receiver<Frame>) -> Frame {
    timeout(WAIT, rx.recv()).await.expect("frame before timeout").expect("relay alive")
}
