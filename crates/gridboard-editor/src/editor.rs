//! The editor: one owner for the current tree and its history.
//!
//! All input arrives as discrete events on one execution context and is
//! handled to completion; no operation suspends mid-mutation, so the
//! tree needs no locking — only the discipline of resolving addresses
//! against the current tree value, which the model crate enforces.

use tracing::debug;

use gridboard_drag::MoveRequest;
use gridboard_model::{
    AddressError, DetachedNode, IdAllocator, LayoutTree, MoveError, MoveOutcome, NestingLimits,
    NodeAddress, NodeRef, Placement, TreeError, insert, regenerate_ids, remove, resolve,
    resolve_move, subtree_depth, validate,
};

use crate::history::{HistoryConfig, SnapshotHistory};
use crate::persist::TreeSink;
use crate::registry::ModuleRegistry;

/// Editor-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub limits: NestingLimits,
}

impl EditorConfig {
    /// Override the history configuration.
    #[must_use]
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    /// Override the structural limits.
    #[must_use]
    pub fn with_limits(mut self, limits: NestingLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Failure of one editor operation. The tree is exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    /// A move or relative insert was rejected.
    Move(MoveError),
    /// An address failed to resolve (stale after an earlier edit).
    Address(AddressError),
    /// ID exhaustion or an invalid initial tree.
    Tree(TreeError),
    /// The registry knows no such module type.
    UnknownModuleType { type_name: String },
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move(error) => error.fmt(f),
            Self::Address(error) => error.fmt(f),
            Self::Tree(error) => error.fmt(f),
            Self::UnknownModuleType { type_name } => {
                write!(f, "unknown module type '{type_name}'")
            }
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Move(error) => Some(error),
            Self::Address(error) => Some(error),
            Self::Tree(error) => Some(error),
            Self::UnknownModuleType { .. } => None,
        }
    }
}

impl From<MoveError> for EditorError {
    fn from(error: MoveError) -> Self {
        Self::Move(error)
    }
}

impl From<AddressError> for EditorError {
    fn from(error: AddressError) -> Self {
        Self::Address(error)
    }
}

impl From<TreeError> for EditorError {
    fn from(error: TreeError) -> Self {
        Self::Tree(error)
    }
}

/// One editing session over one layout tree.
pub struct Editor<R> {
    registry: R,
    tree: LayoutTree,
    history: SnapshotHistory,
    ids: IdAllocator,
    limits: NestingLimits,
    sink: Option<Box<dyn TreeSink>>,
}

impl<R: ModuleRegistry> Editor<R> {
    /// Editor over an empty tree.
    #[must_use]
    pub fn new(registry: R, config: EditorConfig) -> Self {
        Self {
            registry,
            tree: LayoutTree::new(),
            history: SnapshotHistory::new(config.history),
            ids: IdAllocator::new(),
            limits: config.limits,
            sink: None,
        }
    }

    /// Editor over an existing tree (e.g. loaded by the host).
    ///
    /// The tree is validated against the invariants, and the ID
    /// allocator is advanced past every ID it contains.
    pub fn with_tree(
        registry: R,
        config: EditorConfig,
        tree: LayoutTree,
    ) -> Result<Self, TreeError> {
        validate(&tree, &config.limits)?;
        let mut ids = IdAllocator::new();
        if let Some(max) = tree.max_id() {
            ids.reserve_past(max)?;
        }
        Ok(Self {
            registry,
            tree,
            history: SnapshotHistory::new(config.history),
            ids,
            limits: config.limits,
            sink: None,
        })
    }

    /// The current tree.
    #[must_use]
    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// The module registry collaborator.
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// The structural limits in force.
    #[must_use]
    pub fn limits(&self) -> &NestingLimits {
        &self.limits
    }

    /// Attach the persistence sink.
    pub fn set_sink(&mut self, sink: Box<dyn TreeSink>) {
        self.sink = Some(sink);
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append an empty row, returning its address.
    pub fn add_row(&mut self) -> Result<NodeAddress, EditorError> {
        let id = self.ids.allocate()?;
        let mut next = self.tree.clone();
        next.rows.push(gridboard_model::Row::new(id));
        let address = NodeAddress::row(next.rows.len() - 1);
        self.commit(next);
        debug!(%address, %id, "row added");
        Ok(address)
    }

    /// Append an empty column to the row at `row`, returning its
    /// address.
    pub fn add_column(&mut self, row: usize) -> Result<NodeAddress, EditorError> {
        if row >= self.tree.rows.len() {
            return Err(AddressError::NotFound {
                address: NodeAddress::row(row),
            }
            .into());
        }
        let id = self.ids.allocate()?;
        let mut next = self.tree.clone();
        next.rows[row].columns.push(gridboard_model::Column::new(id));
        let address = NodeAddress::column(row, next.rows[row].columns.len() - 1);
        self.commit(next);
        debug!(%address, %id, "column added");
        Ok(address)
    }

    /// Append a default module of `type_name` to a column, returning
    /// its address.
    pub fn add_module(
        &mut self,
        row: usize,
        column: usize,
        type_name: &str,
    ) -> Result<NodeAddress, EditorError> {
        let column_addr = NodeAddress::column(row, column);
        resolve(&self.tree, &column_addr)?;
        let module = self.default_module(type_name)?;
        if subtree_depth(&module) > self.limits.max_nesting_depth {
            return Err(MoveError::DepthExceeded {
                depth: subtree_depth(&module),
                max: self.limits.max_nesting_depth,
            }
            .into());
        }
        let id = module.id;
        let mut next = self.tree.clone();
        let modules = &mut next.rows[row].columns[column].modules;
        modules.push(module);
        let address = NodeAddress::module(row, column, modules.len() - 1);
        self.commit(next);
        debug!(%address, %id, type_name, "module added");
        Ok(address)
    }

    /// Insert a default module of `type_name` relative to an existing
    /// node: `before`/`after` a module, or inside a container.
    pub fn insert_module(
        &mut self,
        target: &NodeAddress,
        placement: &Placement,
        type_name: &str,
    ) -> Result<(), EditorError> {
        let module = self.default_module(type_name)?;
        gridboard_model::check_depth(target, placement, &module, &self.limits)?;
        let id = module.id;
        let next = insert(&self.tree, target, DetachedNode::Module(module), placement)?;
        self.commit(next);
        debug!(target = %target, %id, type_name, "module inserted");
        Ok(())
    }

    /// Delete the node at `address`, returning the detached subtree.
    ///
    /// Any external editor state referencing the detached IDs (open
    /// settings panels etc.) must be invalidated by the host.
    pub fn delete(&mut self, address: &NodeAddress) -> Result<DetachedNode, EditorError> {
        let (next, detached) = remove(&self.tree, address)?;
        self.commit(next);
        debug!(%address, id = %detached.id(), "node deleted");
        Ok(detached)
    }

    /// Duplicate the node at `address` with every ID regenerated,
    /// inserting the copy right after the original. Returns the copy's
    /// address.
    pub fn duplicate(&mut self, address: &NodeAddress) -> Result<NodeAddress, EditorError> {
        let copy = match resolve(&self.tree, address)? {
            NodeRef::Row(row) => DetachedNode::Row(row.clone()),
            NodeRef::Column(column) => DetachedNode::Column(column.clone()),
            NodeRef::Module(module) => DetachedNode::Module(module.clone()),
        };
        let fresh = regenerate_ids(&copy, &mut self.ids)?;
        let next = insert(&self.tree, address, fresh, &Placement::After)?;
        self.commit(next);
        let copy_address = address.next_sibling();
        debug!(%address, copy = %copy_address, "node duplicated");
        Ok(copy_address)
    }

    /// Insert a copied subtree relative to `target`, regenerating every
    /// ID so repeated pastes of the same clipboard value stay legal.
    pub fn paste(
        &mut self,
        node: &DetachedNode,
        target: &NodeAddress,
        placement: &Placement,
    ) -> Result<(), EditorError> {
        let fresh = regenerate_ids(node, &mut self.ids)?;
        if let DetachedNode::Module(module) = &fresh {
            gridboard_model::check_depth(target, placement, module, &self.limits)?;
        }
        let pasted_id = fresh.id();
        let next = insert(&self.tree, target, fresh, placement)?;
        self.commit(next);
        debug!(target = %target, id = %pasted_id, "subtree pasted");
        Ok(())
    }

    /// Apply a drop emitted by the drag controller.
    ///
    /// Returns `true` if the tree changed; a move that resolves to the
    /// source's current position succeeds without mutating (and without
    /// burning a history entry).
    pub fn apply_move(&mut self, request: &MoveRequest) -> Result<bool, EditorError> {
        self.move_node(&request.source, &request.target, &request.placement)
    }

    /// Move a node; see [`gridboard_model::resolve_move`] for the rules.
    pub fn move_node(
        &mut self,
        source: &NodeAddress,
        target: &NodeAddress,
        placement: &Placement,
    ) -> Result<bool, EditorError> {
        match resolve_move(&self.tree, source, target, placement, &self.limits)? {
            MoveOutcome::Applied(next) => {
                self.commit(next);
                debug!(%source, %target, "move applied");
                Ok(true)
            }
            MoveOutcome::Unchanged => {
                debug!(%source, %target, "move was a no-op");
                Ok(false)
            }
        }
    }

    /// Restore the previous snapshot. Returns `false` on an empty
    /// stack (a no-op, not an error).
    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo(&self.tree) else {
            return false;
        };
        self.restore(restored);
        debug!("undo applied");
        true
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo(&self.tree) else {
            return false;
        };
        self.restore(restored);
        debug!("redo applied");
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn default_module(&mut self, type_name: &str) -> Result<gridboard_model::Module, EditorError> {
        let id = self.ids.allocate()?;
        self.registry
            .create_default(type_name, id)
            .ok_or_else(|| EditorError::UnknownModuleType {
                type_name: type_name.to_owned(),
            })
    }

    /// Snapshot the pre-mutation tree, swap in the new one, notify.
    fn commit(&mut self, next: LayoutTree) {
        self.history.snapshot(&self.tree);
        self.tree = next;
        self.notify();
    }

    /// Swap in a restored tree without re-capturing it as a mutation.
    fn restore(&mut self, restored: LayoutTree) {
        self.history.set_restoring(true);
        self.tree = restored;
        self.notify();
        self.history.set_restoring(false);
    }

    fn notify(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.tree_changed(&self.tree);
        }
    }
}
