//! Websocket relay connection with a bounded reconnect loop.
//!
//! DESIGN
//! ======
//! A [`Relay`] owns one background task that holds the socket. Callers never
//! touch the socket directly: outbound frames go through an unbounded channel,
//! inbound frames fan out over a `broadcast` channel so any number of
//! subscribers see every frame in arrival order.
//!
//! Sends are fire-and-forget. While the status is anything but
//! [`ConnectionStatus::Connected`] a send is dropped and reports `false`.
//! Nothing is buffered across a reconnect.
//!
//! Room membership is the exception: the server forgets a connection's room
//! when the socket drops, so the relay remembers the last `join-room` and
//! writes it first on every new socket, before any queued frame.
//!
//! LIFECYCLE
//! =========
//! `Idle -> Connecting -> Connected`. When the socket drops (or the first
//! connect fails) the task moves to `Reconnecting { attempt }` and retries on
//! a fixed delay. A successful connect resets the attempt count, so one
//! outage allows the initial connect plus `max_attempts` retries. After the
//! last retry fails the status settles on `Offline` and the task exits;
//! [`Relay::connect`] starts a fresh one.
//! [`Relay::disconnect`] closes the socket and returns to `Idle`.

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use frames::{ChatMessage, DrawOp, Frame, RoomId, decode_frame, decode_frame_bytes, encode_frame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ReconnectPolicy};

/// Capacity of the inbound fan-out channel. Slow subscribers lag past this.
pub const INBOUND_CAPACITY: usize = 256;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Connection state, published through a `watch` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
    Offline,
}

/// Why a live socket stopped being pumped.
enum Ended {
    Lost,
    Shutdown,
}

pub struct Relay {
    url: String,
    policy: ReconnectPolicy,
    status_tx: watch::Sender<ConnectionStatus>,
    inbound_tx: broadcast::Sender<Frame>,
    outbound_tx: Option<mpsc::UnboundedSender<Frame>>,
    membership_tx: watch::Sender<Option<Frame>>,
    task: Option<JoinHandle<()>>,
}

impl Relay {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Idle);
        let (inbound_tx, _) = broadcast::channel(INBOUND_CAPACITY);
        let (membership_tx, _) = watch::channel(None);
        Self {
            url: config.url.clone(),
            policy: config.reconnect,
            status_tx,
            inbound_tx,
            outbound_tx: None,
            membership_tx,
            task: None,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start the connection task. No-op while a task is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self) {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!(url = %self.url, "relay already running");
            return;
        }
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.outbound_tx = Some(outbound_tx);
        self.task = Some(tokio::spawn(run_relay(
            self.url.clone(),
            self.policy,
            self.status_tx.clone(),
            self.inbound_tx.clone(),
            self.membership_tx.subscribe(),
            outbound_rx,
        )));
    }

    /// Close the socket, stop reconnecting, and wait for the task to exit.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Task`] if the connection task panicked.
    pub async fn disconnect(&mut self) -> Result<(), RelayError> {
        self.outbound_tx = None;
        if let Some(task) = self.task.take() {
            task.await?;
        }
        self.status_tx.send_replace(ConnectionStatus::Idle);
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Observe status transitions.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Receive every inbound frame decoded after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.inbound_tx.subscribe()
    }

    /// Queue a frame for the server.
    ///
    /// Returns `false` and drops the frame when not connected.
    pub fn send(&self, frame: Frame) -> bool {
        if !self.is_connected() {
            debug!(event = frame.event(), "dropping frame while disconnected");
            return false;
        }
        let Some(tx) = &self.outbound_tx else {
            return false;
        };
        tx.send(frame).is_ok()
    }

    pub fn send_draw(&self, room: &RoomId, op: DrawOp) -> bool {
        self.send(Frame::draw(room.clone(), op))
    }

    pub fn send_clear(&self, room: &RoomId) -> bool {
        self.send(Frame::clear(room.clone()))
    }

    pub fn send_chat(&self, room: &RoomId, message: ChatMessage) -> bool {
        self.send(Frame::chat(room.clone(), message))
    }

    /// Join `room` now if connected, and again on every later connection.
    ///
    /// The membership lock is held while queueing, so the connection task
    /// either sees this join in its snapshot or finds it in the queue, never both.
    pub fn join_room(&self, room: &RoomId, username: &str) -> bool {
        let join = Frame::join_room(room.clone(), username);
        let mut sent = false;
        self.membership_tx.send_modify(|membership| {
            sent = self.send(join.clone());
            *membership = Some(join);
        });
        sent
    }

    /// Leave `room` and stop rejoining it on reconnect.
    pub fn leave_room(&self, room: &RoomId) -> bool {
        let mut sent = false;
        self.membership_tx.send_if_modified(|membership| {
            sent = self.send(Frame::leave_room(room.clone()));
            let joined_here = membership.as_ref().is_some_and(|join| join.room_id() == Some(room));
            if joined_here {
                *membership = None;
            }
            joined_here
        });
        sent
    }

    /// The room re-joined on each new connection, if any.
    #[must_use]
    pub fn membership(&self) -> Option<RoomId> {
        self.membership_tx.borrow().as_ref().and_then(Frame::room_id).cloned()
    }
}

// =============================================================================
// CONNECTION TASK
// =============================================================================

async fn run_relay(
    url: String,
    policy: ReconnectPolicy,
    status_tx: watch::Sender<ConnectionStatus>,
    inbound_tx: broadcast::Sender<Frame>,
    membership_rx: watch::Receiver<Option<Frame>>,
    mut outbound_rx: mpsc::UnboundedReceiver<Frame>,
) {
    let mut attempt: u32 = 0;
    status_tx.send_replace(ConnectionStatus::Connecting);

    loop {
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                info!(%url, "relay connected");
                attempt = 0;
                // Anything queued before the previous socket died is stale.
                while outbound_rx.try_recv().is_ok() {}
                // Publish Connected under the membership lock; joins queued
                // after this point are not part of the snapshot.
                let rejoin = {
                    let membership = membership_rx.borrow();
                    status_tx.send_replace(ConnectionStatus::Connected);
                    (*membership).clone()
                };
                if let Ended::Shutdown = pump(socket, rejoin, &mut outbound_rx, &inbound_tx).await {
                    info!(%url, "relay closed");
                    status_tx.send_replace(ConnectionStatus::Idle);
                    return;
                }
                warn!(%url, "relay connection lost");
            }
            Err(e) => warn!(%url, error = %e, attempt, "relay connect failed"),
        }

        attempt += 1;
        if attempt > policy.max_attempts {
            warn!(%url, attempts = policy.max_attempts, "relay offline");
            status_tx.send_replace(ConnectionStatus::Offline);
            return;
        }
        status_tx.send_replace(ConnectionStatus::Reconnecting { attempt });

        // Frames arriving during the backoff are dropped; a closed channel means shutdown.
        let sleep = tokio::time::sleep(policy.delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => break,
                queued = outbound_rx.recv() => {
                    if queued.is_none() {
                        status_tx.send_replace(ConnectionStatus::Idle);
                        return;
                    }
                }
            }
        }
    }
}

async fn pump(
    socket: Socket,
    rejoin: Option<Frame>,
    outbound_rx: &mut mpsc::UnboundedReceiver<Frame>,
    inbound_tx: &broadcast::Sender<Frame>,
) -> Ended {
    let (mut sink, mut stream) = socket.split();

    if let Some(join) = rejoin {
        match encode_frame(&join) {
            Ok(text) => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!(error = %e, "rejoin send failed");
                    return Ended::Lost;
                }
                debug!(room = ?join.room_id(), "rejoined room");
            }
            Err(e) => warn!(error = %e, "failed to encode rejoin"),
        }
    }

    loop {
        tokio::select! {
            queued = outbound_rx.recv() => {
                let Some(frame) = queued else {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        debug!(error = %e, "close handshake failed");
                    }
                    return Ended::Shutdown;
                };
                let text = match encode_frame(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(event = frame.event(), error = %e, "failed to encode frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!(error = %e, "relay send failed");
                    return Ended::Lost;
                }
            }
            incoming = stream.next() => {
                let decoded = match incoming {
                    Some(Ok(Message::Text(text))) => decode_frame(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => decode_frame_bytes(&bytes),
                    Some(Ok(Message::Close(_))) | None => return Ended::Lost,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, "relay read failed");
                        return Ended::Lost;
                    }
                };
                match decoded {
                    Ok(frame) => {
                        if inbound_tx.send(frame).is_err() {
                            debug!("inbound frame with no subscribers");
                        }
                    }
                    Err(e) => warn!(error = %e, "skipping undecodable frame"),
                }
            }
        }
    }
}
