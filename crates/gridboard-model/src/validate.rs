//! Validation guard: nesting-depth accounting, ID regeneration, and
//! tree-wide invariant checks.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::address::{AddressStep, NodeAddress};
use crate::error::{MoveError, TreeError};
use crate::id::{IdAllocator, NodeId};
use crate::ops::Placement;
use crate::tree::{Column, DetachedNode, LayoutTree, Module, ModuleBody, Row, Section};

/// Default container nesting limit.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 4;

/// Structural limits enforced by add and move operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingLimits {
    /// Deepest container nesting allowed beneath a column.
    pub max_nesting_depth: usize,
}

impl NestingLimits {
    /// Limits with a custom nesting depth.
    #[must_use]
    pub fn new(max_nesting_depth: usize) -> Self {
        Self { max_nesting_depth }
    }
}

impl Default for NestingLimits {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Deepest container nesting inside one module subtree.
///
/// A leaf is 0; a container is 1 plus its deepest child. An empty
/// container still counts as one nesting level.
#[must_use]
pub fn subtree_depth(module: &Module) -> usize {
    match &module.body {
        ModuleBody::Leaf => 0,
        ModuleBody::Container { .. } | ModuleBody::Sectioned { .. } => {
            1 + module
                .child_modules()
                .map(subtree_depth)
                .max()
                .unwrap_or(0)
        }
    }
}

/// Container nesting level of the node at `address`.
///
/// A module directly inside a column sits at level 0; each container
/// descent step adds one.
#[must_use]
pub fn container_depth_at(address: &NodeAddress) -> usize {
    address
        .steps()
        .iter()
        .filter(|step| {
            matches!(
                step,
                AddressStep::Child { .. } | AddressStep::SectionChild { .. }
            )
        })
        .count()
}

/// Whether `subtree` may be appended inside a container at nesting level
/// `target_depth` without exceeding the limit.
#[must_use]
pub fn can_nest(target_depth: usize, subtree: &Module, limits: &NestingLimits) -> bool {
    target_depth + 1 + subtree_depth(subtree) <= limits.max_nesting_depth
}

/// Depth check for placing `module` at `target`/`placement`.
///
/// Edge placements land the module at the target's own nesting level;
/// inside placements land it one level below the target container.
/// Row/column targets carry no module nesting and always pass.
pub fn check_depth(
    target: &NodeAddress,
    placement: &Placement,
    module: &Module,
    limits: &NestingLimits,
) -> Result<(), MoveError> {
    let base = match placement {
        Placement::Inside { .. } => container_depth_at(target) + 1,
        Placement::Before | Placement::After => {
            if target.kind() != crate::tree::NodeKind::Module {
                return Ok(());
            }
            container_depth_at(target)
        }
    };
    let depth = base + subtree_depth(module);
    if depth > limits.max_nesting_depth {
        return Err(MoveError::DepthExceeded {
            depth,
            max: limits.max_nesting_depth,
        });
    }
    Ok(())
}

/// Structurally identical copy of `node` with every row/column/module ID
/// replaced by a fresh one.
///
/// Settings, type names, ordering, and section keys are preserved
/// exactly; section keys are content keys owned by the module type, not
/// structural IDs. Used by duplicate and paste to keep the global
/// ID-uniqueness invariant.
pub fn regenerate_ids(node: &DetachedNode, ids: &mut IdAllocator) -> Result<DetachedNode, TreeError> {
    Ok(match node {
        DetachedNode::Row(row) => DetachedNode::Row(regenerate_row(row, ids)?),
        DetachedNode::Column(column) => DetachedNode::Column(regenerate_column(column, ids)?),
        DetachedNode::Module(module) => DetachedNode::Module(regenerate_module(module, ids)?),
    })
}

fn regenerate_row(row: &Row, ids: &mut IdAllocator) -> Result<Row, TreeError> {
    Ok(Row {
        id: ids.allocate()?,
        columns: row
            .columns
            .iter()
            .map(|column| regenerate_column(column, ids))
            .collect::<Result<_, _>>()?,
        extensions: row.extensions.clone(),
    })
}

fn regenerate_column(column: &Column, ids: &mut IdAllocator) -> Result<Column, TreeError> {
    Ok(Column {
        id: ids.allocate()?,
        modules: column
            .modules
            .iter()
            .map(|module| regenerate_module(module, ids))
            .collect::<Result<_, _>>()?,
        extensions: column.extensions.clone(),
    })
}

fn regenerate_module(module: &Module, ids: &mut IdAllocator) -> Result<Module, TreeError> {
    let body = match &module.body {
        ModuleBody::Leaf => ModuleBody::Leaf,
        ModuleBody::Container { children } => ModuleBody::Container {
            children: children
                .iter()
                .map(|child| regenerate_module(child, ids))
                .collect::<Result<_, _>>()?,
        },
        ModuleBody::Sectioned { sections } => ModuleBody::Sectioned {
            sections: sections
                .iter()
                .map(|section| {
                    Ok(Section {
                        key: section.key.clone(),
                        children: section
                            .children
                            .iter()
                            .map(|child| regenerate_module(child, ids))
                            .collect::<Result<_, _>>()?,
                    })
                })
                .collect::<Result<_, TreeError>>()?,
        },
    };
    Ok(Module {
        id: ids.allocate()?,
        type_name: module.type_name.clone(),
        settings: module.settings.clone(),
        body,
    })
}

/// Check tree-wide invariants: non-zero IDs, ID uniqueness at every
/// depth, and the container nesting limit.
pub fn validate(tree: &LayoutTree, limits: &NestingLimits) -> Result<(), TreeError> {
    let mut seen = FxHashSet::default();
    for row in &tree.rows {
        check_id(row.id, &mut seen)?;
        for column in &row.columns {
            check_id(column.id, &mut seen)?;
            for module in &column.modules {
                let depth = subtree_depth(module);
                if depth > limits.max_nesting_depth {
                    return Err(TreeError::NestingTooDeep {
                        id: module.id,
                        depth,
                        max: limits.max_nesting_depth,
                    });
                }
                check_module_ids(module, &mut seen)?;
            }
        }
    }
    Ok(())
}

fn check_module_ids(module: &Module, seen: &mut FxHashSet<NodeId>) -> Result<(), TreeError> {
    check_id(module.id, seen)?;
    for child in module.child_modules() {
        check_module_ids(child, seen)?;
    }
    Ok(())
}

fn check_id(id: NodeId, seen: &mut FxHashSet<NodeId>) -> Result<(), TreeError> {
    if id.get() == 0 {
        return Err(TreeError::ZeroNodeId);
    }
    if !seen.insert(id) {
        return Err(TreeError::DuplicateNodeId { id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SectionKey;
    use proptest::prelude::*;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    fn nested(depth: usize, next_id: &mut u64) -> Module {
        let this = id(*next_id);
        *next_id += 1;
        if depth == 0 {
            return Module::leaf(this, "text");
        }
        let mut container = Module::container(this, "stack");
        container
            .children_mut()
            .unwrap()
            .push(nested(depth - 1, next_id));
        container
    }

    #[test]
    fn subtree_depth_counts_containers() {
        assert_eq!(subtree_depth(&Module::leaf(id(1), "text")), 0);
        assert_eq!(subtree_depth(&Module::container(id(1), "stack")), 1);
        let mut next_id = 1;
        assert_eq!(subtree_depth(&nested(3, &mut next_id)), 3);

        let mut tabs = Module::sectioned(id(90), "tabs", [Section::from("a")]);
        let mut next_id = 91;
        tabs.section_mut(&SectionKey::new("a"))
            .unwrap()
            .children
            .push(nested(2, &mut next_id));
        assert_eq!(subtree_depth(&tabs), 3);
    }

    #[test]
    fn container_depth_counts_descent_steps() {
        assert_eq!(container_depth_at(&NodeAddress::module(0, 0, 0)), 0);
        assert_eq!(container_depth_at(&NodeAddress::module(0, 0, 0).child(1)), 1);
        assert_eq!(
            container_depth_at(
                &NodeAddress::module(0, 0, 0)
                    .child(1)
                    .section_child("a", 0)
            ),
            2
        );
    }

    #[test]
    fn can_nest_applies_the_limit() {
        let limits = NestingLimits::new(2);
        let leaf = Module::leaf(id(1), "text");
        let container = Module::container(id(2), "stack");

        // Leaf inside a top-level container: depth 1.
        assert!(can_nest(0, &leaf, &limits));
        // Container inside a top-level container: depth 2.
        assert!(can_nest(0, &container, &limits));
        // Container one level down: depth 3, over the limit.
        assert!(!can_nest(1, &container, &limits));
    }

    #[test]
    fn check_depth_edge_vs_inside() {
        let limits = NestingLimits::new(2);
        let container = Module::container(id(2), "stack");
        let nested_target = NodeAddress::module(0, 0, 0).child(0);

        // Edge placement beside a node at level 1: container lands at
        // level 1, its children at level 2. Allowed.
        assert!(check_depth(&nested_target, &Placement::After, &container, &limits).is_ok());
        // Inside the same node: children at level 2, grandchildren at 3.
        assert_eq!(
            check_depth(&nested_target, &Placement::inside(), &container, &limits),
            Err(MoveError::DepthExceeded { depth: 3, max: 2 })
        );
        // Row/column edges carry no nesting.
        assert!(check_depth(&NodeAddress::row(0), &Placement::After, &container, &limits).is_ok());
    }

    #[test]
    fn regenerate_ids_freshens_every_level() {
        let mut tabs = Module::sectioned(id(4), "tabs", [Section::from("a")]);
        tabs.section_mut(&SectionKey::new("a"))
            .unwrap()
            .children
            .push(Module::leaf(id(5), "text").with_setting("content", "hi"));
        let mut column = Column::new(id(2));
        column.modules.push(Module::leaf(id(3), "image"));
        column.modules.push(tabs);
        let mut row = Row::new(id(1));
        row.columns.push(column);

        let mut ids = IdAllocator::new();
        ids.reserve_past(id(5)).unwrap();
        let copy = regenerate_ids(&DetachedNode::Row(row.clone()), &mut ids).unwrap();

        let DetachedNode::Row(copy) = copy else {
            panic!("kind preserved");
        };
        // Fresh ids everywhere.
        let original = LayoutTree { rows: vec![row] };
        let duplicated = LayoutTree { rows: vec![copy.clone()] };
        let old_ids = original.all_ids();
        for new_id in duplicated.all_ids() {
            assert!(!old_ids.contains(&new_id), "id {new_id} was reused");
        }
        // Content and structure preserved.
        assert_eq!(copy.columns.len(), 1);
        assert_eq!(copy.columns[0].modules[0].type_name, "image");
        let tabs = &copy.columns[0].modules[1];
        let section = tabs.section(&SectionKey::new("a")).unwrap();
        assert_eq!(section.children[0].settings.get("content").unwrap(), "hi");
    }

    #[test]
    fn validate_catches_duplicates_and_depth() {
        let mut row = Row::new(id(1));
        let mut column = Column::new(id(2));
        column.modules.push(Module::leaf(id(1), "text"));
        row.columns.push(column);
        let tree = LayoutTree { rows: vec![row] };
        assert_eq!(
            validate(&tree, &NestingLimits::default()),
            Err(TreeError::DuplicateNodeId { id: id(1) })
        );

        let mut next_id = 3;
        let deep = nested(3, &mut next_id);
        let deep_id = deep.id;
        let mut column = Column::new(id(2));
        column.modules.push(deep);
        let mut row = Row::new(id(1));
        row.columns.push(column);
        let tree = LayoutTree { rows: vec![row] };
        assert_eq!(
            validate(&tree, &NestingLimits::new(2)),
            Err(TreeError::NestingTooDeep {
                id: deep_id,
                depth: 3,
                max: 2
            })
        );
        assert!(validate(&tree, &NestingLimits::new(3)).is_ok());
    }

    proptest! {
        /// Regenerated subtrees never share an id with the original and
        /// keep its structure.
        #[test]
        fn regenerate_never_reuses_ids(depth in 0usize..4, start in 1u64..1000) {
            let mut next_id = start;
            let module = nested(depth, &mut next_id);
            let mut ids = IdAllocator::new();
            ids.reserve_past(id(next_id)).unwrap();

            let copy = regenerate_ids(&DetachedNode::Module(module.clone()), &mut ids).unwrap();
            let DetachedNode::Module(copy) = copy else {
                return Err(TestCaseError::fail("kind changed"));
            };
            prop_assert_eq!(subtree_depth(&copy), subtree_depth(&module));

            let mut originals = rustc_hash::FxHashSet::default();
            super::check_module_ids(&module, &mut originals).unwrap();
            let mut fresh = rustc_hash::FxHashSet::default();
            super::check_module_ids(&copy, &mut fresh).unwrap();
            prop_assert!(originals.is_disjoint(&fresh));
        }
    }
}
