//! The move resolver: one pure function from a tree and a structural
//! move instruction to a new tree.
//!
//! Rules run in a fixed order:
//!
//! 1. Self-containment: the target must not lie at or inside the source
//!    subtree (strict-prefix test on the pre-removal tree).
//! 2. Placement legality: both addresses resolve, node kinds match the
//!    target collection, inside placements hit a real container, and the
//!    nesting limit holds.
//! 3. No-op: moving a node onto its own current position succeeds with
//!    an unchanged tree.
//! 4. Apply: remove the source, re-derive the target address for the
//!    shortened tree, insert.
//!
//! The same four steps cover every combination: row beside row, column
//! beside column, module at any depth into any other depth. Nothing
//! here asks which concrete container type is involved.

use crate::address::NodeAddress;
use crate::error::MoveError;
use crate::ops::{NodeRef, Placement, insert, remove, resolve};
use crate::tree::{LayoutTree, ModuleBody, NodeKind};
use crate::validate::{NestingLimits, check_depth};

/// Result of a legal move instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move produced a new tree; the caller swaps it in atomically.
    Applied(LayoutTree),
    /// The instruction resolved to the source's current position; the
    /// existing tree is already the answer.
    Unchanged,
}

/// Compute the tree after moving the node at `source` to `target` with
/// the given placement.
///
/// Pure: `tree` is never modified, and a rejection means nothing was
/// computed for the caller to apply.
pub fn resolve_move(
    tree: &LayoutTree,
    source: &NodeAddress,
    target: &NodeAddress,
    placement: &Placement,
    limits: &NestingLimits,
) -> Result<MoveOutcome, MoveError> {
    // Rule 1: a node contains itself, so this also rejects target ==
    // source. Checked before anything else; removing the source first
    // would leave the target address pointing into a detached subtree.
    if source.is_prefix_of(target) {
        return Err(MoveError::SelfContainment {
            source: source.clone(),
            target: target.clone(),
        });
    }

    let source_ref = resolve(tree, source)?;
    let target_ref = resolve(tree, target)?;

    // Rule 2: placement legality on the pre-removal tree.
    match placement {
        Placement::Inside { section } => {
            let NodeRef::Module(target_module) = target_ref else {
                return Err(MoveError::NotAContainer {
                    address: target.clone(),
                });
            };
            match (&target_module.body, section) {
                (ModuleBody::Leaf, _) => {
                    return Err(MoveError::NotAContainer {
                        address: target.clone(),
                    });
                }
                (ModuleBody::Container { .. }, Some(_)) => {
                    return Err(MoveError::SectionNotAllowed {
                        address: target.clone(),
                    });
                }
                (ModuleBody::Sectioned { .. }, None) => {
                    return Err(MoveError::SectionRequired {
                        address: target.clone(),
                    });
                }
                (ModuleBody::Sectioned { .. }, Some(key)) => {
                    if target_module.section(key).is_none() {
                        return Err(MoveError::UnknownSection {
                            address: target.clone(),
                            section: key.clone(),
                        });
                    }
                }
                (ModuleBody::Container { .. }, None) => {}
            }
            let NodeRef::Module(source_module) = source_ref else {
                return Err(MoveError::KindMismatch {
                    node: source.kind(),
                    target: NodeKind::Module,
                });
            };
            check_depth(target, placement, source_module, limits)?;
        }
        Placement::Before | Placement::After => {
            if source.kind() != target.kind() {
                return Err(MoveError::KindMismatch {
                    node: source.kind(),
                    target: target.kind(),
                });
            }
            if let NodeRef::Module(source_module) = source_ref {
                check_depth(target, placement, source_module, limits)?;
            }
        }
    }

    // Rule 4 (apply), with rule 3 folded in: because remove and insert
    // are pure, "insertion point equals current position" is exactly
    // "the reassembled tree equals the input".
    let (without_source, detached) = remove(tree, source)?;
    let Some(adjusted_target) = target.adjusted_for_removal(source) else {
        // Unreachable after rule 1, but a stale answer here must never
        // turn into a silent drop of the detached subtree.
        return Err(MoveError::SelfContainment {
            source: source.clone(),
            target: target.clone(),
        });
    };
    let reassembled = insert(&without_source, &adjusted_target, detached, placement)?;

    if reassembled == *tree {
        return Ok(MoveOutcome::Unchanged);
    }
    Ok(MoveOutcome::Applied(reassembled))
}
