// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer events delivered through [`Runtime::dispatch_pointer`](crate::Runtime::dispatch_pointer).

use kurbo::Point;

/// What happened to the pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A button was pressed.
    Down,
    /// A button was released.
    Up,
    /// The pointer moved.
    Move,
}

/// A pointer event in root coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Kind of event.
    pub kind: PointerKind,
    /// Position relative to the root's origin.
    pub position: Point,
}

impl PointerEvent {
    /// A [`PointerKind::Down`] event at `position`.
    pub fn down(position: impl Into<Point>) -> Self {
        Self {
            kind: PointerKind::Down,
            position: position.into(),
        }
    }

    /// A [`PointerKind::Up`] event at `position`.
    pub fn up(position: impl Into<Point>) -> Self {
        Self {
            kind: PointerKind::Up,
            position: position.into(),
        }
    }

    /// A [`PointerKind::Move`] event at `position`.
    pub fn moved(position: impl Into<Point>) -> Self {
        Self {
            kind: PointerKind::Move,
            position: position.into(),
        }
    }
}

/// Whether an event keeps bubbling after a handler ran.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventFlow {
    /// Offer the event to the next ancestor.
    #[default]
    Continue,
    /// Stop bubbling.
    Stop,
}

/// Result of [`Runtime::dispatch_pointer`](crate::Runtime::dispatch_pointer).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Whether any primitive was under the pointer.
    pub hit: bool,
    /// Number of handlers invoked.
    pub handlers: usize,
    /// Whether a handler stopped propagation.
    pub stopped: bool,
}
