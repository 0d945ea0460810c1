//! Persistence boundary.
//!
//! After every successful mutation (and every undo/redo restore) the
//! editor hands the resulting tree to a [`TreeSink`]. The tree is a
//! plain serializable value; what the sink does with it — config file,
//! network, nothing — is outside this core, which performs no I/O.

use gridboard_model::LayoutTree;

/// Receiver for post-mutation tree states.
pub trait TreeSink {
    /// Called with the new current tree after an atomic swap.
    fn tree_changed(&mut self, tree: &LayoutTree);
}

impl<F: FnMut(&LayoutTree)> TreeSink for F {
    fn tree_changed(&mut self, tree: &LayoutTree) {
        self(tree);
    }
}
