//! The drag session state machine.
//!
//! `Idle → Dragging → Idle`. A session is created at drag-start and
//! discarded on drop or cancel; hover samples in between only
//! reclassify the hovered target. At most one session exists at a time.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use gridboard_model::{NodeAddress, Placement};

use crate::attach::{Attachment, AttachmentId, AttachmentRegistry, Edge};

/// Pointer position in host coordinates (e.g. CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

/// Bounding box of a rendered node, supplied by the host per sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Vertical midpoint, the before/after boundary.
    #[must_use]
    pub fn midpoint_y(self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// A completed drop, ready for the move resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source: NodeAddress,
    pub target: NodeAddress,
    pub placement: Placement,
}

/// Session-wide notifications delivered through one queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragNotification {
    DragStarted {
        source: NodeAddress,
    },
    HoverChanged {
        target: NodeAddress,
        placement: Placement,
    },
    HoverCleared,
    Dropped {
        request: MoveRequest,
    },
    Cancelled,
}

/// An in-progress drag: the source captured at drag-start plus the
/// current hover classification.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    source: NodeAddress,
    hover: Option<(NodeAddress, Placement)>,
}

impl DragSession {
    /// Address the drag started from.
    #[must_use]
    pub fn source(&self) -> &NodeAddress {
        &self.source
    }

    /// Currently hovered target and placement, if any.
    #[must_use]
    pub fn hover(&self) -> Option<&(NodeAddress, Placement)> {
        self.hover.as_ref()
    }
}

/// Why a drag could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// Another session is already active.
    SessionActive,
    /// The attachment handle is not registered.
    UnknownAttachment { id: AttachmentId },
    /// The attachment is not draggable.
    NotDraggable { address: NodeAddress },
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionActive => write!(f, "a drag session is already active"),
            Self::UnknownAttachment { id } => {
                write!(f, "attachment {} is not registered", id.get())
            }
            Self::NotDraggable { address } => {
                write!(f, "node {address} is not draggable")
            }
        }
    }
}

impl std::error::Error for DragError {}

/// Owner of the (at most one) drag session and the attachment registry.
#[derive(Debug, Default)]
pub struct DragController {
    registry: AttachmentRegistry,
    session: Option<DragSession>,
    notifications: VecDeque<DragNotification>,
}

impl DragController {
    /// Idle controller with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attachment registry (host-side registration).
    pub fn registry_mut(&mut self) -> &mut AttachmentRegistry {
        &mut self.registry
    }

    /// Register an attachment (convenience passthrough).
    pub fn register(&mut self, attachment: Attachment) -> AttachmentId {
        self.registry.register(attachment)
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Next queued notification, oldest first.
    pub fn poll_notification(&mut self) -> Option<DragNotification> {
        self.notifications.pop_front()
    }

    /// `Idle → Dragging`: capture the source address.
    pub fn begin_drag(&mut self, id: AttachmentId) -> Result<(), DragError> {
        if self.session.is_some() {
            return Err(DragError::SessionActive);
        }
        let attachment = self
            .registry
            .get(id)
            .ok_or(DragError::UnknownAttachment { id })?;
        if !attachment.draggable {
            return Err(DragError::NotDraggable {
                address: attachment.address.clone(),
            });
        }
        let source = attachment.address.clone();
        self.session = Some(DragSession {
            source: source.clone(),
            hover: None,
        });
        self.notifications
            .push_back(DragNotification::DragStarted { source });
        Ok(())
    }

    /// `Dragging → Dragging`: reclassify the hovered target.
    ///
    /// Pure with respect to the tree; runs once per pointer sample.
    /// Returns the current classification. Samples while idle, over
    /// unregistered attachments, over non-targets, or over the dragged
    /// subtree itself clear the hover instead.
    pub fn hover(
        &mut self,
        id: AttachmentId,
        pointer: Pointer,
        bounds: Bounds,
    ) -> Option<(NodeAddress, Placement)> {
        let session = self.session.as_ref()?;

        let classified = self.registry.get(id).and_then(|attachment| {
            // Hovering anything inside the dragged subtree can never
            // produce a legal drop; treat it as hovering nothing.
            if session.source().is_prefix_of(&attachment.address) {
                return None;
            }
            classify(attachment, pointer, bounds)
                .map(|placement| (attachment.address.clone(), placement))
        });

        let session = self.session.as_mut()?;
        if classified != session.hover {
            session.hover = classified.clone();
            self.notifications.push_back(match &classified {
                Some((target, placement)) => DragNotification::HoverChanged {
                    target: target.clone(),
                    placement: placement.clone(),
                },
                None => DragNotification::HoverCleared,
            });
        }
        classified
    }

    /// `Dragging → Idle` on drop.
    ///
    /// With a valid hover target, emits and returns the move request;
    /// dropped outside any valid target, behaves as a cancel.
    pub fn finish_drag(&mut self) -> Option<MoveRequest> {
        let session = self.session.take()?;
        match session.hover {
            Some((target, placement)) => {
                let request = MoveRequest {
                    source: session.source,
                    target,
                    placement,
                };
                self.notifications.push_back(DragNotification::Dropped {
                    request: request.clone(),
                });
                Some(request)
            }
            None => {
                self.notifications.push_back(DragNotification::Cancelled);
                None
            }
        }
    }

    /// `Dragging → Idle` on cancel: no emission beyond the
    /// notification, no mutation anywhere.
    pub fn cancel_drag(&mut self) {
        if self.session.take().is_some() {
            self.notifications.push_back(DragNotification::Cancelled);
        }
    }
}

/// Classify one hover sample against one attachment.
fn classify(attachment: &Attachment, pointer: Pointer, bounds: Bounds) -> Option<Placement> {
    if attachment.inside_target {
        return Some(attachment.inside_placement());
    }
    let edge = if pointer.y < bounds.midpoint_y() {
        Edge::Before
    } else {
        Edge::After
    };
    let edge = if attachment.allows(edge) {
        edge
    } else if attachment.allows(edge.opposite()) {
        edge.opposite()
    } else {
        return None;
    };
    Some(edge.placement())
}
