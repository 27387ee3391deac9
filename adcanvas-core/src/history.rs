//! Linear undo/redo over whole-document snapshots.
//!
//! ```text
//!  push D0   push D1   push D2   undo      push D3
//!  [D0]      [D0 D1]   [D0 D1 D2] [D0 D1 D2] [D0 D1 D3]
//!   ^             ^            ^      ^              ^
//! ```
//!
//! Navigating (undo, redo, [`History::jump_to`]) only moves the cursor and
//! never records a new entry. A push after an undo discards the redo range.

use crate::document::DesignDocument;

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Snapshot history with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<DesignDocument>,
    /// Index of the current entry; `None` only while empty.
    cursor: Option<usize>,
    /// Maximum retained entries; the oldest are evicted first.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Create an empty history retaining at most `max_depth` entries.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_depth: max_depth.max(1),
        }
    }

    /// Create a history seeded with an initial snapshot.
    #[must_use]
    pub fn with_initial(snapshot: DesignDocument, max_depth: usize) -> Self {
        let mut history = Self::new(max_depth);
        history.push(snapshot);
        history
    }

    /// Record a snapshot, discarding any redo entries past the cursor.
    pub fn push(&mut self, snapshot: DesignDocument) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_depth {
            let overflow = self.entries.len() - self.max_depth;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
        tracing::trace!(
            "History push: {} entries, cursor {}",
            self.entries.len(),
            self.entries.len() - 1
        );
    }

    /// Step back one entry. No-op at the oldest entry.
    pub fn undo(&mut self) -> Option<&DesignDocument> {
        let cursor = self.cursor.filter(|c| *c > 0)?;
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    /// Step forward one entry. No-op at the newest entry.
    pub fn redo(&mut self) -> Option<&DesignDocument> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        self.entries.get(cursor + 1)
    }

    /// Move the cursor to an arbitrary entry without recording anything.
    pub fn jump_to(&mut self, index: usize) -> Option<&DesignDocument> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = Some(index);
        self.entries.get(index)
    }

    /// The entry at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&DesignDocument> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Cursor position.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// All retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[DesignDocument] {
        &self.entries
    }

    /// Whether [`History::undo`] would move the cursor.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`History::redo`] would move the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and start again from `snapshot`.
    pub fn reset(&mut self, snapshot: DesignDocument) {
        self.entries.clear();
        self.cursor = None;
        self.push(snapshot);
    }
}
