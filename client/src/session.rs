//! One participant's view of a shared board.
//!
//! A [`Session`] owns the drawing engine, the relay, the presence roster, the
//! chat log, and the current room. Local input is applied to the engine first
//! and whatever it emits is forwarded through the relay. Inbound frames are
//! routed by event; frames scoped to another room are ignored.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use canvas::engine::{Action, EngineCore};
use canvas::surface::Surface;
use frames::{ChatMessage, Frame, RoomId, RoomIdError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::{ChatLog, normalize_text};
use crate::presence::Presence;
use crate::relay::Relay;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid room code: {0}")]
    InvalidRoom(#[from] RoomIdError),
    #[error("username must not be empty")]
    BlankUsername,
    #[error("not in a room")]
    NotInRoom,
    #[error("message must not be empty")]
    BlankMessage,
}

pub struct Session<S: Surface> {
    engine: EngineCore<S>,
    relay: Relay,
    presence: Presence,
    chat: ChatLog,
    user_id: String,
    username: String,
    room: Option<RoomId>,
}

impl<S: Surface> Session<S> {
    /// A session with a fresh per-process user id and no room.
    #[must_use]
    pub fn new(engine: EngineCore<S>, relay: Relay) -> Self {
        Self {
            engine,
            relay,
            presence: Presence::default(),
            chat: ChatLog::default(),
            user_id: Uuid::new_v4().to_string(),
            username: String::new(),
            room: None,
        }
    }

    // =========================================================================
    // ROOM MEMBERSHIP
    // =========================================================================

    /// Enter `room_input` as `username`, leaving any previous room first.
    ///
    /// Presence and chat reset for the new room. The relay sends the join now
    /// if connected and repeats it first thing on every later connection, so
    /// membership survives reconnects and joins made while offline.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRoom`] or [`SessionError::BlankUsername`].
    pub fn join(&mut self, room_input: &str, username: &str) -> Result<RoomId, SessionError> {
        let room = RoomId::parse(room_input)?;
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::BlankUsername);
        }

        if let Some(previous) = self.room.take() {
            if previous != room {
                self.relay.leave_room(&previous);
            }
        }
        self.username = username.to_owned();
        self.presence.clear();
        self.chat.clear();
        self.room = Some(room.clone());

        let sent = self.relay.join_room(&room, &self.username);
        info!(room = %room, username = %self.username, sent, "joined room");
        Ok(room)
    }

    /// Leave the current room, if any.
    pub fn leave(&mut self) {
        let Some(room) = self.room.take() else {
            return;
        };
        self.relay.leave_room(&room);
        self.presence.clear();
        info!(room = %room, "left room");
    }

    // =========================================================================
    // LOCAL INPUT
    // =========================================================================

    /// Run an engine call and forward what it emits.
    ///
    /// Returns the actions unchanged so callers can react to
    /// [`Action::TextRequested`] and [`Action::RenderNeeded`].
    pub fn act(&mut self, f: impl FnOnce(&mut EngineCore<S>) -> Vec<Action>) -> Vec<Action> {
        let actions = f(&mut self.engine);
        self.dispatch(&actions);
        actions
    }

    /// Send broadcast and clear actions to the current room.
    ///
    /// Returns how many frames the relay accepted.
    pub fn dispatch(&self, actions: &[Action]) -> usize {
        let Some(room) = &self.room else {
            return 0;
        };
        actions
            .iter()
            .filter(|action| match action {
                Action::Broadcast(op) => self.relay.send_draw(room, op.clone()),
                Action::Cleared => self.relay.send_clear(room),
                Action::TextRequested { .. } | Action::RenderNeeded => false,
            })
            .count()
    }

    /// Post a chat message to the current room.
    ///
    /// The message is appended locally whether or not it could be sent; the
    /// server relays chat to peers only.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInRoom`] or [`SessionError::BlankMessage`].
    pub fn send_chat(&mut self, text: &str) -> Result<ChatMessage, SessionError> {
        let room = self.room.as_ref().ok_or(SessionError::NotInRoom)?;
        let text = normalize_text(text).ok_or(SessionError::BlankMessage)?;
        let message = ChatMessage::new(self.user_id.as_str(), self.username.as_str(), text);
        if !self.relay.send_chat(room, message.clone()) {
            debug!(room = %room, "chat not sent while disconnected");
        }
        self.chat.push(message.clone());
        Ok(message)
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Route one inbound frame. Returns whether it changed session state.
    pub fn apply(&mut self, frame: &Frame) -> bool {
        let Some(current) = &self.room else {
            debug!(event = frame.event(), "frame outside any room");
            return false;
        };
        if frame.room_id().is_some_and(|room| room != current) {
            debug!(event = frame.event(), "frame for another room");
            return false;
        }

        match frame {
            Frame::Draw(f) => {
                self.engine.apply_remote(&f.op);
                true
            }
            Frame::Clear(_) => {
                self.engine.apply_remote_clear();
                true
            }
            Frame::Chat(f) => self.chat.push(f.message.clone()),
            Frame::RoomUsers(f) => {
                self.presence.replace(f.users.iter().cloned());
                true
            }
            Frame::UserJoined(u) => {
                self.presence.add(u.username.as_str());
                true
            }
            Frame::UserLeft(u) => self.presence.remove(&u.username),
            Frame::JoinRoom(_) | Frame::LeaveRoom(_) => {
                warn!(event = frame.event(), "ignoring client-only frame from server");
                false
            }
        }
    }

    /// Apply every frame already waiting on `inbound`. Returns how many changed state.
    pub fn drain(&mut self, inbound: &mut broadcast::Receiver<Frame>) -> usize {
        let mut applied = 0;
        loop {
            match inbound.try_recv() {
                Ok(frame) => {
                    if self.apply(&frame) {
                        applied += 1;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session lagged behind relay");
                }
                Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                    return applied;
                }
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn engine(&self) -> &EngineCore<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineCore<S> {
        &mut self.engine
    }

    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut Relay {
        &mut self.relay
    }

    #[must_use]
    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    #[must_use]
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    #[must_use]
    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
