// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the box tree: node identifiers, flags, and local geometry.

use kurbo::{Affine, Rect, RoundedRect};

/// Identifier for a node in the tree.
///
/// A slot index plus a generation counter. Freeing a slot makes every id that
/// pointed at it stale; reusing the slot bumps the generation, so a stale id
/// never aliases the new node.
///
/// Ids round-trip through a `u64` ([`NodeId::to_bits`] / [`NodeId::from_bits`])
/// so they can be stored as opaque host handles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }

    /// Pack into 64 bits: generation in the high half, slot in the low half.
    pub const fn to_bits(self) -> u64 {
        ((self.1 as u64) << 32) | self.0 as u64
    }

    /// Inverse of [`NodeId::to_bits`].
    ///
    /// Any `u64` yields an id; ids that were never issued are simply not alive.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Each half is exactly 32 bits."
    )]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits as u32, (bits >> 32) as u32)
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible. Invisible nodes hide their whole subtree.
        const VISIBLE  = 0b0000_0001;
        /// Node participates in hit testing.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Local geometry for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local (untransformed) bounds.
    pub local_bounds: Rect,
    /// Transform relative to the parent's space.
    pub local_transform: Affine,
    /// Optional clip applied to this node and its descendants, in local space.
    ///
    /// Queries use the clip's bounding rectangle.
    pub local_clip: Option<RoundedRect>,
    /// Z-order. Higher is on top; equal values fall back to paint order.
    pub z_index: i32,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_bounds: Rect::ZERO,
            local_transform: Affine::IDENTITY,
            local_clip: None,
            z_index: 0,
            flags: NodeFlags::default(),
        }
    }
}
