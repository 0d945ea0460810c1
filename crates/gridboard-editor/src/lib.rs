#![forbid(unsafe_code)]

//! Editor facade for the gridboard layout core.
//!
//! Ties the document model together with a bounded snapshot history and
//! two collaborator seams:
//!
//! - [`ModuleRegistry`]: per-module-type default factories and
//!   validation, owned by the host application.
//! - [`TreeSink`]: receives the tree after every successful mutation
//!   and every undo/redo restore; the persistence layer behind it is
//!   not this crate's business.
//!
//! Every mutating operation snapshots the pre-mutation tree, computes a
//! new tree value through the pure model primitives, swaps it in
//! atomically, and notifies the sink. A rejected operation mutates
//! nothing and leaves history untouched.

pub mod editor;
pub mod history;
pub mod persist;
pub mod registry;

pub use editor::{Editor, EditorConfig, EditorError};
pub use history::{HistoryConfig, SnapshotHistory};
pub use persist::TreeSink;
pub use registry::{ModuleRegistry, ValidationReport};
