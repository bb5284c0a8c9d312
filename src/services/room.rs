//! Room service: membership and fan-out.
//!
//! DESIGN
//! ======
//! Rooms are created on first join and evicted when the last member leaves.
//! Nothing is persisted. Fan-out is best effort: each member has a bounded
//! channel, and a member whose channel is full simply misses the frame.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use frames::{Frame, RoomId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{AppState, Member, RoomState};

// =============================================================================
// JOIN / PART
// =============================================================================

/// Add a connection to a room, creating the room if needed. Re-joining with
/// the same `client_id` updates the username in place.
///
/// Returns the roster after the join.
pub async fn join_room(
    state: &AppState,
    room_id: &RoomId,
    client_id: Uuid,
    username: &str,
    tx: mpsc::Sender<Frame>,
) -> Vec<String> {
    let mut rooms = state.rooms.write().await;
    let room = rooms.entry(room_id.clone()).or_insert_with(RoomState::new);

    if let Some(member) = room.members.iter_mut().find(|m| m.client_id == client_id) {
        username.clone_into(&mut member.username);
        member.tx = tx;
    } else {
        room.members.push(Member { client_id, username: username.to_owned(), tx });
    }

    info!(%room_id, %client_id, %username, members = room.members.len(), "client joined room");
    room.roster()
}

/// Remove a connection from a room. Evicts the room when it becomes empty.
///
/// Returns the departed username and the remaining roster, or `None` if the
/// connection was not in the room.
pub async fn part_room(state: &AppState, room_id: &RoomId, client_id: Uuid) -> Option<(String, Vec<String>)> {
    let mut rooms = state.rooms.write().await;
    let room = rooms.get_mut(room_id)?;
    let index = room.members.iter().position(|m| m.client_id == client_id)?;
    let member = room.members.remove(index);
    let roster = room.roster();

    info!(%room_id, %client_id, remaining = roster.len(), "client left room");
    if room.members.is_empty() {
        rooms.remove(room_id);
        info!(%room_id, "evicted empty room");
    }
    Some((member.username, roster))
}

/// Current roster of a room in join order; empty if the room does not exist.
pub async fn roster(state: &AppState, room_id: &RoomId) -> Vec<String> {
    let rooms = state.rooms.read().await;
    rooms.get(room_id).map(RoomState::roster).unwrap_or_default()
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Broadcast a frame to all members of a room, optionally excluding one.
///
/// Returns how many members the frame was queued for.
pub async fn broadcast(state: &AppState, room_id: &RoomId, frame: &Frame, exclude: Option<Uuid>) -> usize {
    let rooms = state.rooms.read().await;
    let Some(room) = rooms.get(room_id) else {
        return 0;
    };

    let mut delivered = 0;
    for member in &room.members {
        if exclude == Some(member.client_id) {
            continue;
        }
        match member.tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                debug!(%room_id, client_id = %member.client_id, event = frame.event(), "peer channel full; frame dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%room_id, client_id = %member.client_id, "peer channel closed");
            }
        }
    }
    delivered
}
