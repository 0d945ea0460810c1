//! Error types for structural operations.
//!
//! Nothing here is fatal. An [`AddressError`] is an expected, recoverable
//! condition (addresses go stale whenever the tree changes underneath
//! them); a [`MoveError`] is a rejected instruction. In both cases the
//! operation that failed has computed nothing and mutated nothing.

use std::fmt;

use crate::address::NodeAddress;
use crate::id::NodeId;
use crate::tree::{NodeKind, SectionKey};

/// A structural address failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address does not point at an existing node in this tree,
    /// typically because it went stale after an earlier edit.
    NotFound { address: NodeAddress },
    /// The step sequence violates row/column/module/descent order.
    Malformed { reason: &'static str },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { address } => {
                write!(f, "address {address} does not resolve to a node")
            }
            Self::Malformed { reason } => write!(f, "malformed address: {reason}"),
        }
    }
}

impl std::error::Error for AddressError {}

/// A move or insert instruction was rejected before any edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Source or target address failed to resolve.
    Address(AddressError),
    /// The target lies at or inside the source subtree; applying the
    /// move would detach the subtree and silently lose it.
    SelfContainment {
        source: NodeAddress,
        target: NodeAddress,
    },
    /// Node kind and target collection do not match (e.g. dropping a row
    /// next to a module).
    KindMismatch { node: NodeKind, target: NodeKind },
    /// An inside placement targeted something that holds no children.
    NotAContainer { address: NodeAddress },
    /// An inside placement on a sectioned container needs a section key.
    SectionRequired { address: NodeAddress },
    /// A section key was given for a plain container.
    SectionNotAllowed { address: NodeAddress },
    /// The named section does not exist on the target container.
    UnknownSection {
        address: NodeAddress,
        section: SectionKey,
    },
    /// The placement would nest containers past the configured limit.
    DepthExceeded { depth: usize, max: usize },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(error) => error.fmt(f),
            Self::SelfContainment { source, target } => write!(
                f,
                "cannot move {source} into its own subtree (target {target})"
            ),
            Self::KindMismatch { node, target } => {
                write!(f, "cannot place a {node} relative to a {target}")
            }
            Self::NotAContainer { address } => {
                write!(f, "inside placement on non-container node {address}")
            }
            Self::SectionRequired { address } => write!(
                f,
                "inside placement on sectioned container {address} requires a section key"
            ),
            Self::SectionNotAllowed { address } => write!(
                f,
                "section key given for plain container {address}"
            ),
            Self::UnknownSection { address, section } => {
                write!(f, "container {address} has no section '{section}'")
            }
            Self::DepthExceeded { depth, max } => write!(
                f,
                "placement would nest containers {depth} deep (limit {max})"
            ),
        }
    }
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Address(error) => Some(error),
            _ => None,
        }
    }
}

impl From<AddressError> for MoveError {
    fn from(error: AddressError) -> Self {
        Self::Address(error)
    }
}

/// A tree-wide invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Node ID 0 is reserved.
    ZeroNodeId,
    /// The ID space is exhausted.
    NodeIdOverflow { current: NodeId },
    /// The same ID appears on two nodes.
    DuplicateNodeId { id: NodeId },
    /// A container module sits deeper than the configured limit.
    NestingTooDeep { id: NodeId, depth: usize, max: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroNodeId => write!(f, "node id 0 is invalid"),
            Self::NodeIdOverflow { current } => {
                write!(f, "node id overflow past {current}")
            }
            Self::DuplicateNodeId { id } => write!(f, "duplicate node id {id}"),
            Self::NestingTooDeep { id, depth, max } => write!(
                f,
                "module {id} nested {depth} levels deep (limit {max})"
            ),
        }
    }
}

impl std::error::Error for TreeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::NodeAddress;

    #[test]
    fn display_messages_carry_context() {
        let err = AddressError::NotFound {
            address: NodeAddress::module(0, 1, 2),
        };
        assert!(err.to_string().contains("row[0]/col[1]/mod[2]"));

        let err = MoveError::DepthExceeded { depth: 5, max: 4 };
        assert!(err.to_string().contains("5"));
        assert!(err.to_string().contains("4"));
    }

    #[test]
    fn move_error_sources_address_error() {
        use std::error::Error as _;
        let inner = AddressError::Malformed {
            reason: "address has no steps",
        };
        let err = MoveError::from(inner.clone());
        assert_eq!(
            err.source().map(ToString::to_string),
            Some(inner.to_string())
        );
    }
}
