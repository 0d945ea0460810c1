//! Pure structural primitives: resolve, remove, insert.
//!
//! All three take the tree by shared reference and return a new value;
//! the input is never modified. Callers apply an edit by swapping the
//! returned tree in whole, which is what makes every mutation atomic:
//! a failed operation has produced nothing to swap.
//!
//! Descent through nested containers is driven entirely by the address
//! steps. There is one walk for every depth; no operation special-cases
//! how deep it is working.

use serde::{Deserialize, Serialize};

use crate::address::{AddressStep, NodeAddress};
use crate::error::{AddressError, MoveError};
use crate::tree::{
    Column, DetachedNode, LayoutTree, Module, ModuleBody, NodeKind, Row, SectionKey,
};

/// Where to place a node relative to the node at a target address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    /// As the previous sibling of the target.
    Before,
    /// As the next sibling of the target.
    After,
    /// Appended to the end of the target container's child collection.
    ///
    /// Plain containers take `section: None`; sectioned containers
    /// require the key of the section to append into.
    Inside { section: Option<SectionKey> },
}

impl Placement {
    /// Inside placement for a plain container.
    #[must_use]
    pub fn inside() -> Self {
        Self::Inside { section: None }
    }

    /// Inside placement for one section of a sectioned container.
    #[must_use]
    pub fn inside_section(section: impl Into<SectionKey>) -> Self {
        Self::Inside {
            section: Some(section.into()),
        }
    }
}

/// Read-only reference to one resolved node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'tree> {
    Row(&'tree Row),
    Column(&'tree Column),
    Module(&'tree Module),
}

impl NodeRef<'_> {
    /// ID of the resolved node.
    #[must_use]
    pub fn id(&self) -> crate::id::NodeId {
        match self {
            Self::Row(row) => row.id,
            Self::Column(column) => column.id,
            Self::Module(module) => module.id,
        }
    }

    /// Kind of the resolved node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Row(_) => NodeKind::Row,
            Self::Column(_) => NodeKind::Column,
            Self::Module(_) => NodeKind::Module,
        }
    }
}

/// Resolve an address against the current tree.
pub fn resolve<'tree>(
    tree: &'tree LayoutTree,
    address: &NodeAddress,
) -> Result<NodeRef<'tree>, AddressError> {
    let steps = address.steps();
    let not_found = || AddressError::NotFound {
        address: address.clone(),
    };

    let row = tree.rows.get(steps[0].index()).ok_or_else(not_found)?;
    let Some(step) = steps.get(1) else {
        return Ok(NodeRef::Row(row));
    };
    let column = row.columns.get(step.index()).ok_or_else(not_found)?;
    let Some(step) = steps.get(2) else {
        return Ok(NodeRef::Column(column));
    };
    let mut module = column.modules.get(step.index()).ok_or_else(not_found)?;
    for step in &steps[3..] {
        module = child_at(module, step).ok_or_else(not_found)?;
    }
    Ok(NodeRef::Module(module))
}

/// Detach the node at `address`, returning the shortened tree and the
/// detached node. Fails with no effect if the address is stale.
pub fn remove(
    tree: &LayoutTree,
    address: &NodeAddress,
) -> Result<(LayoutTree, DetachedNode), AddressError> {
    let mut next = tree.clone();
    let not_found = || AddressError::NotFound {
        address: address.clone(),
    };
    let steps = address.steps();
    let detached = match address.kind() {
        NodeKind::Row => {
            let index = steps[0].index();
            if index >= next.rows.len() {
                return Err(not_found());
            }
            DetachedNode::Row(next.rows.remove(index))
        }
        NodeKind::Column => {
            let row = next.rows.get_mut(steps[0].index()).ok_or_else(not_found)?;
            let index = steps[1].index();
            if index >= row.columns.len() {
                return Err(not_found());
            }
            DetachedNode::Column(row.columns.remove(index))
        }
        NodeKind::Module => {
            let collection = module_collection_mut(&mut next, address)?;
            let index = address.last().index();
            if index >= collection.len() {
                return Err(not_found());
            }
            DetachedNode::Module(collection.remove(index))
        }
    };
    Ok((next, detached))
}

/// Insert `node` relative to the node at `address`.
///
/// For [`Placement::Before`]/[`Placement::After`] the target must exist
/// and be of the same kind as `node`. For [`Placement::Inside`] the
/// target must be a container module and `node` a module; the child is
/// appended at the end of the selected collection.
pub fn insert(
    tree: &LayoutTree,
    address: &NodeAddress,
    node: DetachedNode,
    placement: &Placement,
) -> Result<LayoutTree, MoveError> {
    let mut next = tree.clone();
    match placement {
        Placement::Before => insert_beside(&mut next, address, node, 0)?,
        Placement::After => insert_beside(&mut next, address, node, 1)?,
        Placement::Inside { section } => insert_inside(&mut next, address, node, section.as_ref())?,
    }
    Ok(next)
}

fn insert_beside(
    tree: &mut LayoutTree,
    address: &NodeAddress,
    node: DetachedNode,
    offset: usize,
) -> Result<(), MoveError> {
    let not_found = || AddressError::NotFound {
        address: address.clone(),
    };
    if node.kind() != address.kind() {
        return Err(MoveError::KindMismatch {
            node: node.kind(),
            target: address.kind(),
        });
    }
    let steps = address.steps();
    match node {
        DetachedNode::Row(row) => {
            let index = steps[0].index();
            if index >= tree.rows.len() {
                return Err(not_found().into());
            }
            tree.rows.insert(index + offset, row);
        }
        DetachedNode::Column(column) => {
            let row = tree.rows.get_mut(steps[0].index()).ok_or_else(not_found)?;
            let index = steps[1].index();
            if index >= row.columns.len() {
                return Err(not_found().into());
            }
            row.columns.insert(index + offset, column);
        }
        DetachedNode::Module(module) => {
            let collection = module_collection_mut(tree, address)?;
            let index = address.last().index();
            if index >= collection.len() {
                return Err(not_found().into());
            }
            collection.insert(index + offset, module);
        }
    }
    Ok(())
}

fn insert_inside(
    tree: &mut LayoutTree,
    address: &NodeAddress,
    node: DetachedNode,
    section: Option<&SectionKey>,
) -> Result<(), MoveError> {
    let DetachedNode::Module(module) = node else {
        return Err(MoveError::KindMismatch {
            node: node.kind(),
            target: NodeKind::Module,
        });
    };
    if address.kind() != NodeKind::Module {
        return Err(MoveError::NotAContainer {
            address: address.clone(),
        });
    }
    let target = {
        let index = address.last().index();
        module_collection_mut(tree, address)?
            .get_mut(index)
            .ok_or_else(|| AddressError::NotFound {
                address: address.clone(),
            })?
    };
    match (&mut target.body, section) {
        (ModuleBody::Leaf, _) => Err(MoveError::NotAContainer {
            address: address.clone(),
        }),
        (ModuleBody::Container { children }, None) => {
            children.push(module);
            Ok(())
        }
        (ModuleBody::Container { .. }, Some(_)) => Err(MoveError::SectionNotAllowed {
            address: address.clone(),
        }),
        (ModuleBody::Sectioned { .. }, None) => Err(MoveError::SectionRequired {
            address: address.clone(),
        }),
        (ModuleBody::Sectioned { sections }, Some(key)) => {
            let Some(section) = sections.iter_mut().find(|s| s.key == *key) else {
                return Err(MoveError::UnknownSection {
                    address: address.clone(),
                    section: key.clone(),
                });
            };
            section.children.push(module);
            Ok(())
        }
    }
}

/// Walk to the collection that holds the module at `address`.
///
/// The final address step indexes into the returned collection; every
/// intermediate step selects a container (or section) to descend into.
fn module_collection_mut<'tree>(
    tree: &'tree mut LayoutTree,
    address: &NodeAddress,
) -> Result<&'tree mut Vec<Module>, AddressError> {
    let not_found = || AddressError::NotFound {
        address: address.clone(),
    };
    if address.kind() != NodeKind::Module {
        return Err(not_found());
    }
    let steps = address.steps();
    let column = tree
        .rows
        .get_mut(steps[0].index())
        .and_then(|row| row.columns.get_mut(steps[1].index()))
        .ok_or_else(not_found)?;
    let mut collection = &mut column.modules;
    for pair in steps[2..].windows(2) {
        let module = collection.get_mut(pair[0].index()).ok_or_else(not_found)?;
        collection = match &pair[1] {
            AddressStep::Child { .. } => module.children_mut().ok_or_else(not_found)?,
            AddressStep::SectionChild { section, .. } => {
                &mut module.section_mut(section).ok_or_else(not_found)?.children
            }
            _ => return Err(not_found()),
        };
    }
    Ok(collection)
}

fn child_at<'m>(module: &'m Module, step: &AddressStep) -> Option<&'m Module> {
    match step {
        AddressStep::Child { index } => module.children()?.get(*index),
        AddressStep::SectionChild { section, index } => {
            module.section(section)?.children.get(*index)
        }
        _ => None,
    }
}
