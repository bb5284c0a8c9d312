//! Shared frame model and JSON codec for the realtime WS transport.
//!
//! This crate owns the wire representation used by both the relay server and
//! the client. Every message is one event name plus a payload, encoded as a
//! JSON text frame:
//!
//! ```text
//! {"event": "draw", "data": {"roomId": "ABC123", "from": {...}, ...}}
//! ```
//!
//! | Event | Direction | Payload |
//! |-------|-----------|---------|
//! | `draw` | both | [`DrawOp`] + room |
//! | `clear` | both | room |
//! | `chat` | both | [`ChatMessage`] + room |
//! | `join-room` | client → server | room + username |
//! | `leave-room` | client → server | room |
//! | `room-users` | server → client | full roster |
//! | `user-joined` / `user-left` | server → client | username |

pub mod chat;
pub mod draw;
pub mod room;

use serde::{Deserialize, Serialize};

pub use chat::{ChatMessage, now_ms};
pub use draw::{DrawOp, Point, Tool};
pub use room::{ROOM_ID_LEN, RoomId, RoomIdError};

/// Error returned by [`encode_frame`] and [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not valid JSON or does not match any known event.
    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),
    /// The frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A single message on the realtime wire protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Frame {
    Draw(DrawFrame),
    Clear(RoomRef),
    Chat(ChatFrame),
    JoinRoom(JoinRoom),
    LeaveRoom(RoomRef),
    RoomUsers(RoomUsers),
    UserJoined(UserRef),
    UserLeft(UserRef),
}

/// `draw` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawFrame {
    pub room_id: RoomId,
    #[serde(flatten)]
    pub op: DrawOp,
}

/// `chat` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatFrame {
    pub room_id: RoomId,
    #[serde(flatten)]
    pub message: ChatMessage,
}

/// Payload naming only a room (`clear`, `leave-room`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: RoomId,
}

/// `join-room` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
    pub username: String,
}

/// `room-users` payload: the full roster of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUsers {
    pub room_id: RoomId,
    pub users: Vec<String>,
}

/// `user-joined` / `user-left` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub username: String,
}

impl Frame {
    #[must_use]
    pub fn draw(room_id: RoomId, op: DrawOp) -> Self {
        Self::Draw(DrawFrame { room_id, op })
    }

    #[must_use]
    pub fn clear(room_id: RoomId) -> Self {
        Self::Clear(RoomRef { room_id })
    }

    #[must_use]
    pub fn chat(room_id: RoomId, message: ChatMessage) -> Self {
        Self::Chat(ChatFrame { room_id, message })
    }

    #[must_use]
    pub fn join_room(room_id: RoomId, username: impl Into<String>) -> Self {
        Self::JoinRoom(JoinRoom { room_id, username: username.into() })
    }

    #[must_use]
    pub fn leave_room(room_id: RoomId) -> Self {
        Self::LeaveRoom(RoomRef { room_id })
    }

    #[must_use]
    pub fn room_users(room_id: RoomId, users: Vec<String>) -> Self {
        Self::RoomUsers(RoomUsers { room_id, users })
    }

    #[must_use]
    pub fn user_joined(username: impl Into<String>) -> Self {
        Self::UserJoined(UserRef { username: username.into() })
    }

    #[must_use]
    pub fn user_left(username: impl Into<String>) -> Self {
        Self::UserLeft(UserRef { username: username.into() })
    }

    /// Wire event name, e.g. `"join-room"`.
    #[must_use]
    pub fn event(&self) -> &'static str {
        match self {
            Self::Draw(_) => "draw",
            Self::Clear(_) => "clear",
            Self::Chat(_) => "chat",
            Self::JoinRoom(_) => "join-room",
            Self::LeaveRoom(_) => "leave-room",
            Self::RoomUsers(_) => "room-users",
            Self::UserJoined(_) => "user-joined",
            Self::UserLeft(_) => "user-left",
        }
    }

    /// The room this frame is scoped to, if the payload names one.
    #[must_use]
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Draw(f) => Some(&f.room_id),
            Self::Chat(f) => Some(&f.room_id),
            Self::Clear(f) | Self::LeaveRoom(f) => Some(&f.room_id),
            Self::JoinRoom(f) => Some(&f.room_id),
            Self::RoomUsers(f) => Some(&f.room_id),
            Self::UserJoined(_) | Self::UserLeft(_) => None,
        }
    }
}

/// Encode a frame into a JSON text message.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_frame(frame: &Frame) -> Result<String, CodecError> {
    serde_json::to_string(frame).map_err(CodecError::Encode)
}

/// Decode a JSON text message into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON, unknown events, and
/// payloads that fail validation (e.g. an invalid room id).
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}

/// Decode a frame carried in a binary message (UTF-8 JSON).
///
/// # Errors
///
/// Same as [`decode_frame`].
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<Frame, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
