//! Snapshot-based undo/redo history.
//!
//! The stack holds full raster copies, oldest first, with a cursor at the
//! snapshot that matches the visible surface. Pushing after an undo discards
//! the redo branch. The stack is bounded: when it overflows, the oldest
//! snapshot is evicted in the same step that re-points the cursor at the
//! newest one, so the cursor is always a valid index.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_LIMIT;

/// Bounded undo/redo stack over snapshots of type `S`.
#[derive(Debug, Clone)]
pub struct History<S> {
    entries: VecDeque<S>,
    cursor: usize,
    capacity: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl<S> History<S> {
    /// An empty stack holding at most `capacity` snapshots (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), cursor: 0, capacity }
    }

    /// Record a new snapshot as the current state.
    pub fn push(&mut self, snapshot: S) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len().saturating_sub(1);
    }

    /// Step back one snapshot and return it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&S> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&S> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// The snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor)
    }

    /// Drop every snapshot.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}
