#![forbid(unsafe_code)]

//! Layout tree document model for the gridboard editor core.
//!
//! This crate owns the structural side of a dashboard layout editor:
//!
//! - A recursive tree of rows, columns, and modules, where container
//!   modules hold further modules to a bounded nesting depth.
//! - Structural [`NodeAddress`] paths that identify one node or one
//!   insertion point at any depth.
//! - Pure [`resolve`]/[`remove`]/[`insert`] primitives: the input tree is
//!   never touched, a new tree value is returned, and the caller swaps it
//!   in atomically.
//! - A [`resolve_move`] pipeline that turns a drag-and-drop instruction
//!   into a new tree, rejecting self-containment and depth violations
//!   before any edit is computed.
//!
//! Addresses are positional, not stable: any removal shifts later sibling
//! indices, so an address must be recomputed against the current tree
//! before each use. [`NodeAddress::adjusted_for_removal`] is the single,
//! depth-uniform implementation of that index correction.

pub mod address;
pub mod error;
pub mod id;
pub mod movement;
pub mod ops;
pub mod tree;
pub mod validate;

pub use address::{AddressStep, NodeAddress};
pub use error::{AddressError, MoveError, TreeError};
pub use id::{IdAllocator, NodeId};
pub use movement::{MoveOutcome, resolve_move};
pub use ops::{NodeRef, Placement, insert, remove, resolve};
pub use tree::{
    Column, DetachedNode, LayoutTree, Module, ModuleBody, NodeKind, Row, Section, SectionKey,
};
pub use validate::{
    NestingLimits, can_nest, check_depth, container_depth_at, regenerate_ids, subtree_depth,
    validate,
};
