//! Structural node addresses.
//!
//! A [`NodeAddress`] is a positional path: a row index, optionally a
//! column index, optionally a module index, then any number of
//! container-descent steps. It identifies exactly one node (or one
//! insertion point) in one specific tree value. It is *not* a stable
//! identifier: removing an earlier sibling shifts every later index, so
//! addresses must be recomputed against the current tree before use.
//!
//! [`NodeAddress::adjusted_for_removal`] is the one place that index
//! correction lives. Every caller at every depth goes through it; there
//! is deliberately no per-depth variant of this logic anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AddressError;
use crate::tree::{NodeKind, SectionKey};

/// One step of a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AddressStep {
    /// Index into the tree's row sequence.
    Row { index: usize },
    /// Index into a row's column sequence.
    Column { index: usize },
    /// Index into a column's module sequence.
    Module { index: usize },
    /// Index into a plain container's child sequence.
    Child { index: usize },
    /// Index into one section of a sectioned container.
    SectionChild { section: SectionKey, index: usize },
}

impl AddressStep {
    /// The sibling index this step selects.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Row { index }
            | Self::Column { index }
            | Self::Module { index }
            | Self::Child { index }
            | Self::SectionChild { index, .. } => *index,
        }
    }

    /// Same step with a different sibling index.
    #[must_use]
    fn with_index(&self, index: usize) -> Self {
        match self {
            Self::Row { .. } => Self::Row { index },
            Self::Column { .. } => Self::Column { index },
            Self::Module { .. } => Self::Module { index },
            Self::Child { .. } => Self::Child { index },
            Self::SectionChild { section, .. } => Self::SectionChild {
                section: section.clone(),
                index,
            },
        }
    }

    /// Whether two steps select siblings of the same collection.
    ///
    /// For section steps the section key must match too; two sections of
    /// the same container are distinct collections.
    #[must_use]
    pub fn same_collection(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Row { .. }, Self::Row { .. })
            | (Self::Column { .. }, Self::Column { .. })
            | (Self::Module { .. }, Self::Module { .. })
            | (Self::Child { .. }, Self::Child { .. }) => true,
            (
                Self::SectionChild { section: a, .. },
                Self::SectionChild { section: b, .. },
            ) => a == b,
            _ => false,
        }
    }

    /// Whether this step may follow `prev` in a well-formed address.
    fn may_follow(&self, prev: Option<&Self>) -> bool {
        match (prev, self) {
            (None, Self::Row { .. }) => true,
            (Some(Self::Row { .. }), Self::Column { .. }) => true,
            (Some(Self::Column { .. }), Self::Module { .. }) => true,
            (
                Some(Self::Module { .. } | Self::Child { .. } | Self::SectionChild { .. }),
                Self::Child { .. } | Self::SectionChild { .. },
            ) => true,
            _ => false,
        }
    }
}

/// A structural path to one node in a layout tree.
///
/// Always non-empty and well-formed by construction: row, then column,
/// then module, then container-descent steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<AddressStep>", into = "Vec<AddressStep>")]
pub struct NodeAddress {
    steps: Vec<AddressStep>,
}

impl NodeAddress {
    /// Address of a top-level row.
    #[must_use]
    pub fn row(index: usize) -> Self {
        Self {
            steps: vec![AddressStep::Row { index }],
        }
    }

    /// Address of a column inside a row.
    #[must_use]
    pub fn column(row: usize, column: usize) -> Self {
        Self {
            steps: vec![
                AddressStep::Row { index: row },
                AddressStep::Column { index: column },
            ],
        }
    }

    /// Address of a module directly inside a column.
    #[must_use]
    pub fn module(row: usize, column: usize, module: usize) -> Self {
        Self {
            steps: vec![
                AddressStep::Row { index: row },
                AddressStep::Column { index: column },
                AddressStep::Module { index: module },
            ],
        }
    }

    /// Extend a module address into a plain container's child.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if this address does not point at a module.
    #[must_use]
    pub fn child(mut self, index: usize) -> Self {
        debug_assert_eq!(self.kind(), NodeKind::Module);
        self.steps.push(AddressStep::Child { index });
        self
    }

    /// Extend a module address into one section of a sectioned container.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if this address does not point at a module.
    #[must_use]
    pub fn section_child(mut self, section: impl Into<SectionKey>, index: usize) -> Self {
        debug_assert_eq!(self.kind(), NodeKind::Module);
        self.steps.push(AddressStep::SectionChild {
            section: section.into(),
            index,
        });
        self
    }

    /// Build an address from raw steps, validating well-formedness.
    pub fn from_steps(steps: Vec<AddressStep>) -> Result<Self, AddressError> {
        if steps.is_empty() {
            return Err(AddressError::Malformed {
                reason: "address has no steps",
            });
        }
        let mut prev: Option<&AddressStep> = None;
        for step in &steps {
            if !step.may_follow(prev) {
                return Err(AddressError::Malformed {
                    reason: "steps out of row/column/module/descent order",
                });
            }
            prev = Some(step);
        }
        Ok(Self { steps })
    }

    /// The raw steps.
    #[must_use]
    pub fn steps(&self) -> &[AddressStep] {
        &self.steps
    }

    /// Final step of the path.
    #[must_use]
    pub fn last(&self) -> &AddressStep {
        // Non-empty by construction.
        &self.steps[self.steps.len() - 1]
    }

    /// Address of the containing collection's owner, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.steps.len() <= 1 {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    /// Address of the next sibling position (last index + 1).
    #[must_use]
    pub fn next_sibling(&self) -> Self {
        let mut steps = self.steps.clone();
        let last = self.last().clone();
        let len = steps.len();
        steps[len - 1] = last.with_index(last.index() + 1);
        Self { steps }
    }

    /// Which kind of node this address points at.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.last() {
            AddressStep::Row { .. } => NodeKind::Row,
            AddressStep::Column { .. } => NodeKind::Column,
            AddressStep::Module { .. }
            | AddressStep::Child { .. }
            | AddressStep::SectionChild { .. } => NodeKind::Module,
        }
    }

    /// Whether `self` is a (non-strict) prefix of `other`.
    ///
    /// `a.is_prefix_of(a)` is true; this is exactly the self-containment
    /// test the move resolver needs, since a node contains itself.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.steps.len() >= self.steps.len() && other.steps[..self.steps.len()] == self.steps[..]
    }

    /// Recompute this address after the node at `removed` was detached.
    ///
    /// Returns `None` when the address is stale (it pointed into the
    /// removed subtree). Otherwise, if this address passes through the
    /// removed node's parent collection at a later sibling index, that
    /// one index is decremented; all other addresses come back unchanged.
    ///
    /// This is the single index-shift rule for every depth and every
    /// collection kind; the move resolver relies on it instead of caching
    /// pre-removal target indices.
    #[must_use]
    pub fn adjusted_for_removal(&self, removed: &Self) -> Option<Self> {
        if removed.is_prefix_of(self) {
            return None;
        }
        let parent_len = removed.steps.len() - 1;
        if self.steps.len() <= parent_len || self.steps[..parent_len] != removed.steps[..parent_len]
        {
            return Some(self.clone());
        }
        let removed_last = removed.last();
        let at = &self.steps[parent_len];
        if at.same_collection(removed_last) && at.index() > removed_last.index() {
            let mut steps = self.steps.clone();
            steps[parent_len] = at.with_index(at.index() - 1);
            return Some(Self { steps });
        }
        Some(self.clone())
    }
}

impl TryFrom<Vec<AddressStep>> for NodeAddress {
    type Error = AddressError;

    fn try_from(steps: Vec<AddressStep>) -> Result<Self, Self::Error> {
        Self::from_steps(steps)
    }
}

impl From<NodeAddress> for Vec<AddressStep> {
    fn from(address: NodeAddress) -> Self {
        address.steps
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match step {
                AddressStep::Row { index } => write!(f, "row[{index}]")?,
                AddressStep::Column { index } => write!(f, "col[{index}]")?,
                AddressStep::Module { index } => write!(f, "mod[{index}]")?,
                AddressStep::Child { index } => write!(f, "child[{index}]")?,
                AddressStep::SectionChild { section, index } => {
                    write!(f, "section[{section}:{index}]")?;
                }
            }
        }
        Ok(())
    }
}
