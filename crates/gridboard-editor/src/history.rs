//! Bounded undo/redo history of whole-tree snapshots.
//!
//! Dual stacks with a depth limit: the oldest snapshot is evicted from
//! the front when the limit is exceeded, and any new snapshot clears
//! the redo stack (a new branch of history).
//!
//! ```text
//! snapshot(t5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [t1, t2, t3, t4, t5]              │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [t1, t2, t3]                      │
//! │ Redo Stack: [current, t5']                    │
//! └───────────────────────────────────────────────┘
//!
//! snapshot(t6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [t1, t2, t3, t6]                  │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Undo/redo on an empty stack is a no-op, not an error. While a
//! restore is in flight the `restoring` flag turns `snapshot` into a
//! no-op, so a restoration can never be mistaken for a new mutation and
//! re-captured.

use std::collections::VecDeque;

use gridboard_model::LayoutTree;

/// Configuration for the snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept for undo.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}

impl HistoryConfig {
    /// Configuration with a custom depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Unlimited depth (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Bounded undo/redo stacks of tree snapshots.
#[derive(Debug, Default)]
pub struct SnapshotHistory {
    /// Snapshots available for undo (newest at back).
    undo_stack: VecDeque<LayoutTree>,
    /// Snapshots available for redo (newest at back).
    redo_stack: VecDeque<LayoutTree>,
    config: HistoryConfig,
    restoring: bool,
}

impl SnapshotHistory {
    /// Empty history with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            restoring: false,
        }
    }

    /// Capture a deep, independent copy of the pre-mutation tree.
    ///
    /// Clears the redo stack and evicts the oldest snapshot past the
    /// depth limit. No-op while a restore is in flight.
    pub fn snapshot(&mut self, tree: &LayoutTree) {
        if self.restoring {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(tree.clone());
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the most recent snapshot, parking `current` for redo.
    ///
    /// Returns the restored tree, or `None` when there is nothing to
    /// undo.
    pub fn undo(&mut self, current: &LayoutTree) -> Option<LayoutTree> {
        let restored = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(current.clone());
        Some(restored)
    }

    /// Symmetric to [`SnapshotHistory::undo`], using the redo stack.
    pub fn redo(&mut self, current: &LayoutTree) -> Option<LayoutTree> {
        let restored = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(current.clone());
        Some(restored)
    }

    /// Mark a restore as in flight, making `snapshot` a no-op.
    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots available for undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of snapshots available for redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}
