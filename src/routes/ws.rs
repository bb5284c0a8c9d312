//! WebSocket handler: per-room frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by event
//! - Frames from room peers → forward to client
//!
//! The server never interprets drawing content. `draw`, `clear` and `chat`
//! are relayed verbatim to the other members of the sender's room; the only
//! state it keeps is room membership, from which it derives presence frames.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → allocate client ID and outbound channel
//! 2. `join-room` → leave previous room, join, push `user-joined` + roster
//! 3. `draw` / `clear` / `chat` → relay to room peers (not back to sender)
//! 4. `leave-room` or close → `user-left` + roster to remaining members

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{CodecError, Frame, RoomId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

// =============================================================================
// CONNECTION STATE
// =============================================================================

/// What the dispatch layer knows about one websocket connection.
struct Connection {
    client_id: Uuid,
    /// Sender half of this connection's outbound channel, handed to the room.
    tx: mpsc::Sender<Frame>,
    /// Room this connection has joined, if any.
    room: Option<RoomId>,
}

impl Connection {
    fn new(client_id: Uuid, tx: mpsc::Sender<Frame>) -> Self {
        Self { client_id, tx, room: None }
    }

    fn in_room(&self, room_id: &RoomId) -> bool {
        self.room.as_ref() == Some(room_id)
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving frames from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.channel_capacity);
    let mut conn = Connection::new(client_id, client_tx);

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound(&state, &mut conn, frames::decode_frame(text.as_str())).await;
                    }
                    Message::Binary(bytes) => {
                        process_inbound(&state, &mut conn, frames::decode_frame_bytes(&bytes)).await;
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    leave_current_room(&state, &mut conn).await;
    info!(%client_id, "ws: client disconnected");
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    match frames::encode_frame(frame) {
        Ok(text) => socket.send(Message::Text(text.into())).await,
        Err(e) => {
            warn!(error = %e, event = frame.event(), "ws: failed to encode outbound frame");
            Ok(())
        }
    }
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Dispatch one decoded inbound frame. Malformed frames are logged and dropped;
/// the connection stays open.
async fn process_inbound(state: &AppState, conn: &mut Connection, decoded: Result<Frame, CodecError>) {
    let client_id = conn.client_id;
    let frame = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return;
        }
    };
    debug!(%client_id, event = frame.event(), "ws: recv frame");

    match frame {
        Frame::JoinRoom(join) => handle_join(state, conn, join.room_id, &join.username).await,
        Frame::LeaveRoom(leave) => {
            if conn.in_room(&leave.room_id) {
                leave_current_room(state, conn).await;
            } else {
                warn!(%client_id, room_id = %leave.room_id, "ws: leave for a room not joined");
            }
        }
        Frame::Draw(_) | Frame::Clear(_) | Frame::Chat(_) => relay_to_peers(state, conn, &frame).await,
        Frame::RoomUsers(_) | Frame::UserJoined(_) | Frame::UserLeft(_) => {
            warn!(%client_id, event = frame.event(), "ws: server-only event sent by client");
        }
    }
}

async fn handle_join(state: &AppState, conn: &mut Connection, room_id: RoomId, username: &str) {
    let username = username.trim();
    if username.is_empty() {
        warn!(client_id = %conn.client_id, %room_id, "ws: join without a username");
        return;
    }

    // Joining a new room leaves the previous one.
    if !conn.in_room(&room_id) {
        leave_current_room(state, conn).await;
    }

    let users = services::room::join_room(state, &room_id, conn.client_id, username, conn.tx.clone()).await;
    conn.room = Some(room_id.clone());

    services::room::broadcast(state, &room_id, &Frame::user_joined(username), Some(conn.client_id)).await;
    services::room::broadcast(state, &room_id, &Frame::room_users(room_id.clone(), users), None).await;
}

async fn leave_current_room(state: &AppState, conn: &mut Connection) {
    let Some(room_id) = conn.room.take() else {
        return;
    };
    let Some((username, users)) = services::room::part_room(state, &room_id, conn.client_id).await else {
        return;
    };
    services::room::broadcast(state, &room_id, &Frame::user_left(username), None).await;
    services::room::broadcast(state, &room_id, &Frame::room_users(room_id.clone(), users), None).await;
}

/// Relay a room-scoped frame to every other member of the sender's room.
async fn relay_to_peers(state: &AppState, conn: &Connection, frame: &Frame) {
    let Some(room_id) = frame.room_id() else {
        return;
    };
    if !conn.in_room(room_id) {
        warn!(client_id = %conn.client_id, %room_id, event = frame.event(), "ws: frame for a room not joined");
        return;
    }
    let delivered = services::room::broadcast(state, room_id, frame, Some(conn.client_id)).await;
    debug!(%room_id, event = frame.event(), delivered, "ws: relayed frame");
}
