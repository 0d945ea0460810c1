//! Declarative drop-target attachments.
//!
//! Instead of wiring callbacks onto every rendered node, the host
//! registers each node once with its structural address and capability
//! flags. Because addresses are positional, the host re-registers (or
//! clears and rebuilds) attachments whenever the tree changes shape.

use serde::{Deserialize, Serialize};

use gridboard_model::{NodeAddress, Placement, SectionKey};
use rustc_hash::FxHashMap;

/// Handle for one registered attachment.
///
/// Distinct from node IDs: one node may register several attachments
/// (e.g. a container's body as an edge target and its header as a
/// dedicated inside zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub(crate) u64);

impl AttachmentId {
    /// The raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Insertion side relative to a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Before,
    After,
}

impl Edge {
    /// The opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }

    /// Corresponding structural placement.
    #[must_use]
    pub fn placement(self) -> Placement {
        match self {
            Self::Before => Placement::Before,
            Self::After => Placement::After,
        }
    }
}

/// One rendered node's drag/drop contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Structural address at registration time.
    pub address: NodeAddress,
    /// Whether the node may start a drag.
    pub draggable: bool,
    /// Whether edges of the node accept drops.
    pub drop_target: bool,
    /// Whether this attachment is a dedicated "insert inside" zone
    /// (e.g. a container header).
    pub inside_target: bool,
    /// Section an inside zone appends into, for sectioned containers.
    pub section: Option<SectionKey>,
    /// Which edges accept drops.
    pub allowed_edges: Vec<Edge>,
}

impl Attachment {
    /// Attachment with the default capabilities: draggable, an edge
    /// drop target on both sides, not an inside zone.
    #[must_use]
    pub fn new(address: NodeAddress) -> Self {
        Self {
            address,
            draggable: true,
            drop_target: true,
            inside_target: false,
            section: None,
            allowed_edges: vec![Edge::Before, Edge::After],
        }
    }

    /// Disable dragging from this node.
    #[must_use]
    pub fn not_draggable(mut self) -> Self {
        self.draggable = false;
        self
    }

    /// Disable edge drops onto this node.
    #[must_use]
    pub fn not_drop_target(mut self) -> Self {
        self.drop_target = false;
        self
    }

    /// Restrict which edges accept drops.
    #[must_use]
    pub fn with_allowed_edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.allowed_edges = edges.into_iter().collect();
        self
    }

    /// Mark this attachment as a plain container's inside zone.
    #[must_use]
    pub fn inside_zone(mut self) -> Self {
        self.inside_target = true;
        self.drop_target = false;
        self
    }

    /// Mark this attachment as the inside zone of one section of a
    /// sectioned container.
    #[must_use]
    pub fn section_inside_zone(mut self, section: impl Into<SectionKey>) -> Self {
        self.inside_target = true;
        self.drop_target = false;
        self.section = Some(section.into());
        self
    }

    /// Whether edge drops on the given side are accepted.
    #[must_use]
    pub fn allows(&self, edge: Edge) -> bool {
        self.drop_target && self.allowed_edges.contains(&edge)
    }

    /// The placement an inside zone produces.
    #[must_use]
    pub fn inside_placement(&self) -> Placement {
        Placement::Inside {
            section: self.section.clone(),
        }
    }
}

/// Registry of all attachments for the current render pass.
#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    entries: FxHashMap<AttachmentId, Attachment>,
    next_id: u64,
}

impl AttachmentRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attachment, returning its handle.
    pub fn register(&mut self, attachment: Attachment) -> AttachmentId {
        self.next_id += 1;
        let id = AttachmentId(self.next_id);
        self.entries.insert(id, attachment);
        id
    }

    /// Remove one attachment.
    pub fn unregister(&mut self, id: AttachmentId) -> Option<Attachment> {
        self.entries.remove(&id)
    }

    /// Drop every attachment (host re-registers after a relayout).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up an attachment by handle.
    #[must_use]
    pub fn get(&self, id: AttachmentId) -> Option<&Attachment> {
        self.entries.get(&id)
    }

    /// Number of registered attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
