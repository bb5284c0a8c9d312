//! Room identifiers.
//!
//! Rooms are named by short uppercase codes that users can read aloud and
//! type. Codes are generated client-side and normalized on every join so
//! `"abc123"` and `" ABC123 "` land in the same room.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a generated room code.
pub const ROOM_ID_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Error returned by [`RoomId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomIdError {
    #[error("room id is empty")]
    Empty,
    #[error("room id contains invalid character {0:?}")]
    InvalidChar(char),
}

/// A normalized room code: non-empty, ASCII uppercase letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Normalize user input into a room id: trims whitespace and uppercases.
    ///
    /// # Errors
    ///
    /// Returns [`RoomIdError::Empty`] for blank input and
    /// [`RoomIdError::InvalidChar`] for anything outside `[A-Za-z0-9]`.
    pub fn parse(input: &str) -> Result<Self, RoomIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RoomIdError::Empty);
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(RoomIdError::InvalidChar(bad));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Generate a fresh random room code.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Generate a room code from the given random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_ID_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}
