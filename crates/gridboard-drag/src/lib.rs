#![forbid(unsafe_code)]

//! Drag session controller for the gridboard editor core.
//!
//! The host UI registers each rendered node as an [`Attachment`]
//! (address + capability flags), then forwards raw input to one
//! [`DragController`]:
//!
//! - `begin_drag` on drag-start,
//! - `hover` on every pointer sample,
//! - `finish_drag` / `cancel_drag` on drop or escape.
//!
//! Hover handling is pure classification: it computes the hovered target
//! address and an edge (`before`/`after`, from the pointer's position
//! relative to the target's midpoint) or an inside placement, and never
//! touches the layout tree. A drag can therefore be cancelled at any
//! point with zero side effects. On drop, the controller emits a
//! [`MoveRequest`] for the move resolver and resets to idle.
//!
//! Session state is one explicitly owned value inside the controller;
//! there is no ambient singleton and no per-widget callback wiring. One
//! session-wide notification queue delivers `DragStarted` /
//! `HoverChanged` / `Dropped` / `Cancelled` events to the host.

pub mod attach;
pub mod session;

pub use attach::{Attachment, AttachmentId, AttachmentRegistry, Edge};
pub use session::{
    Bounds, DragController, DragError, DragNotification, DragSession, MoveRequest, Pointer,
};
