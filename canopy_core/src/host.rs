// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the reconciler and a host scene graph.

use canopy_layout::{Geometry, MeasureConstraints};
use kurbo::Size;

use crate::error::HostError;
use crate::props::{Primitive, PropChange, Props};

/// Opaque handle of a host node.
///
/// Each handle is owned by exactly one primitive instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostHandle(u64);

impl HostHandle {
    /// Wrap a raw host id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A host scene graph the runtime renders into.
///
/// The runtime calls these methods only during a flush, in this order per
/// pass: creations, updates and destructions while committing, attaches and
/// moves once a parent's children are final, then geometry after layout.
/// A re-render that changes nothing makes no calls at all.
///
/// Newly created nodes are detached until [`HostAdapter::attach`] places them.
pub trait HostAdapter {
    /// Create a node for `primitive` with its initial `props`.
    fn create_node(&mut self, primitive: Primitive, props: &Props) -> Result<HostHandle, HostError>;

    /// Apply visual prop changes. Never called with an empty list.
    fn update_node(&mut self, handle: HostHandle, changes: &[PropChange]);

    /// Release a node. Descendants are destroyed first.
    fn destroy_node(&mut self, handle: HostHandle);

    /// Position and size a node, relative to its parent. Only called when the
    /// geometry changed.
    fn set_geometry(&mut self, handle: HostHandle, geometry: &Geometry);

    /// Intrinsic content size of a text or image node.
    fn measure_intrinsic(&mut self, handle: HostHandle, constraints: MeasureConstraints) -> Size;

    /// Move an attached node to `index` among `parent`'s children (`None` for
    /// the top level). `index` counts siblings with `handle` removed.
    fn reparent(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize);

    /// Place a newly created node at `index` among `parent`'s children.
    fn attach(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize) {
        self.reparent(handle, parent, index);
    }
}
