//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds a map of live rooms. A room exists only while it has members; each
//! member is one websocket connection with a sender for outgoing frames.

use std::collections::HashMap;
use std::sync::Arc;

use frames::{Frame, RoomId};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

// =============================================================================
// ROOM STATE
// =============================================================================

/// One connection present in a room.
#[derive(Debug, Clone)]
pub struct Member {
    pub client_id: Uuid,
    pub username: String,
    /// Sender for frames addressed to this connection.
    pub tx: mpsc::Sender<Frame>,
}

/// Per-room live state. Members are kept in join order.
#[derive(Debug, Default)]
pub struct RoomState {
    pub members: Vec<Member>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Usernames in join order.
    #[must_use]
    pub fn roster(&self) -> Vec<String> {
        self.members.iter().map(|m| m.username.clone()).collect()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomId, RoomState>>>,
    /// Capacity of each connection's outbound channel.
    pub channel_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(channel_capacity: usize) -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())), channel_capacity: channel_capacity.max(1) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
