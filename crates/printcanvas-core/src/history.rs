//! Bounded snapshot-based undo/redo.

use crate::scene::{Scene, SceneSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A recorded scene state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub snapshot: SceneSnapshot,
    /// Milliseconds since the Unix epoch when the entry was recorded.
    pub timestamp_ms: u64,
}

impl HistoryEntry {
    fn new(snapshot: SceneSnapshot) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            snapshot,
            timestamp_ms,
        }
    }
}

/// Undo and redo stacks, each capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record the scene state (call before making changes).
    /// Clears the redo stack.
    pub fn commit(&mut self, scene: &Scene) {
        self.commit_snapshot(scene.snapshot());
    }

    /// Record an already captured snapshot.
    pub fn commit_snapshot(&mut self, snapshot: SceneSnapshot) {
        Self::push_bounded(&mut self.undo_stack, HistoryEntry::new(snapshot), self.limit);
        self.redo_stack.clear();
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        Self::push_bounded(&mut self.redo_stack, HistoryEntry::new(scene.snapshot()), self.limit);
        scene.restore(entry.snapshot);
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(entry) = self.redo_stack.pop_back() else {
            return false;
        };
        Self::push_bounded(&mut self.undo_stack, HistoryEntry::new(scene.snapshot()), self.limit);
        scene.restore(entry.snapshot);
        true
    }

    fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, limit: usize) {
        stack.push_back(entry);
        while stack.len() > limit {
            stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undo entry.
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
