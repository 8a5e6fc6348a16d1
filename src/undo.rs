//! Bounded undo history of annotation-set snapshots.
//!
//! Snapshots are pushed immediately before a mutation and popped on undo,
//! replacing the live set wholesale. When the history is full the oldest
//! snapshot is dropped first.

use crate::constants::UNDO_HISTORY_SIZE;

/// Generic snapshot history.
///
/// # Example
///
/// ```rust
/// use yolo_editor::undo::History;
///
/// let mut history: History<Vec<u32>> = History::new(2);
/// history.push(vec![1]);
/// history.push(vec![1, 2]);
/// history.push(vec![1, 2, 3]);
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.pop(), Some(vec![1, 2, 3]));
/// assert_eq!(history.pop(), Some(vec![1, 2]));
/// assert_eq!(history.pop(), None);
/// ```
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    /// Snapshots, oldest first
    entries: Vec<T>,
    /// Maximum number of snapshots kept
    limit: usize,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_SIZE)
    }
}

impl<T: Clone> History<T> {
    /// Create an empty history holding at most `limit` snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Push a snapshot (call this BEFORE making a change).
    pub fn push(&mut self, snapshot: T) {
        self.entries.push(snapshot);

        // FIFO eviction: the oldest snapshot goes first
        while self.entries.len() > self.limit {
            self.entries.remove(0);
        }
    }

    /// Take the most recent snapshot, or `None` if there is nothing to undo.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop all snapshots (on image change).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
