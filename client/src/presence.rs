//! Usernames believed present in the current room.
//!
//! The server's `room-users` roster is authoritative and replaces the list
//! wholesale; `user-joined` / `user-left` are incremental hints between
//! rosters. Names are unique. A name that joins again moves to the end.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    users: Vec<String>,
}

impl Presence {
    /// Replace the roster. Duplicate names keep their last position.
    pub fn replace<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.clear();
        for name in users {
            self.add(name);
        }
    }

    pub fn add(&mut self, username: impl Into<String>) {
        let username = username.into();
        self.users.retain(|existing| *existing != username);
        self.users.push(username);
    }

    /// Returns whether the name was present.
    pub fn remove(&mut self, username: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|existing| existing != username);
        self.users.len() != before
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.iter().any(|existing| existing == username)
    }

    /// Names in join order, oldest first.
    #[must_use]
    pub fn users(&self) -> &[String] {
        &self.users
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
