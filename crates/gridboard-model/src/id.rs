//! Node identifiers and the monotonic allocator that mints them.

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Stable identifier for rows, columns, and modules.
///
/// `0` is reserved/invalid so IDs are always non-zero. Uniqueness is a
/// per-tree invariant checked by [`crate::validate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a new node ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, TreeError> {
        if raw == 0 {
            return Err(TreeError::ZeroNodeId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, TreeError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(TreeError::NodeIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic ID source for one editing session.
///
/// The allocator lives outside the tree value: undo restores an older
/// tree but never rewinds the allocator, so a fresh ID can never collide
/// with one that an undone (or evicted) snapshot still carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: NodeId,
}

impl IdAllocator {
    /// Allocator whose first ID is [`NodeId::MIN`].
    #[must_use]
    pub fn new() -> Self {
        Self { next: NodeId::MIN }
    }

    /// Mint the next ID.
    pub fn allocate(&mut self) -> Result<NodeId, TreeError> {
        let id = self.next;
        self.next = id.checked_next()?;
        Ok(id)
    }

    /// Ensure all future IDs are strictly greater than `id`.
    ///
    /// Used when adopting an existing tree so its IDs stay unique.
    pub fn reserve_past(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id >= self.next {
            self.next = id.checked_next()?;
        }
        Ok(())
    }

    /// The ID the next call to [`IdAllocator::allocate`] will return.
    #[must_use]
    pub fn peek(&self) -> NodeId {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
