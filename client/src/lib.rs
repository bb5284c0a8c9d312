//! Native client for the collaborative whiteboard.
//!
//! Ties the drawing engine from `canvas` to a websocket relay: local gestures
//! are rendered first and then broadcast, inbound frames are applied to the
//! engine, the presence roster, or the chat log.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`relay`] | Websocket connection with reconnect policy and inbound fan-out |
//! | [`session`] | One participant: engine + relay + presence + chat + room |
//! | [`presence`] | Usernames believed present in the current room |
//! | [`chat`] | Append-only chat log |
//! | [`prefs`] | Persisted display name and panel position |
//! | [`config`] | Environment-driven client configuration |

pub mod chat;
pub mod config;
pub mod prefs;
pub mod presence;
pub mod relay;
pub mod session;

#[cfg(test)]
#[path = "test_helpers.rs"]
pub(crate) mod test_helpers;

pub use config::ClientConfig;
pub use relay::{ConnectionStatus, Relay};
pub use session::{Session, SessionError};
