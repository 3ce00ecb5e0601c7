// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node layout state: computed geometry, dirty flags, and memoised measurements.

use alloc::vec::Vec;
use kurbo::{Rect, Size};

/// Computed box geometry of a node.
///
/// `x` and `y` are relative to the parent's box origin (the parent's padding
/// is already included). `clip` is the clip inherited from `hidden` ancestors,
/// expressed in this node's own coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Horizontal offset from the parent's origin.
    pub x: f64,
    /// Vertical offset from the parent's origin.
    pub y: f64,
    /// Resolved width.
    pub width: f64,
    /// Resolved height.
    pub height: f64,
    /// Effective clip rectangle in local coordinates, if any ancestor clips.
    pub clip: Option<Rect>,
}

impl Geometry {
    /// The node's box in its own coordinate space.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// The node's box in its parent's coordinate space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The resolved size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Inputs of one measurement: parent content size and already-known own sizes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct MeasureKey {
    pub(crate) parent_width: Option<f64>,
    pub(crate) parent_height: Option<f64>,
    pub(crate) known_width: Option<f64>,
    pub(crate) known_height: Option<f64>,
}

const MEASURE_SLOTS: usize = 4;

/// Layout state a [`LayoutTree`](crate::LayoutTree) keeps for each node.
///
/// New caches start dirty. The owner marks a node dirty when its style or
/// intrinsic content changes, and marks every ancestor with
/// [`LayoutCache::mark_descendant_dirty`]. A pass re-measures and re-arranges
/// only dirty subtrees; clean subtrees with unchanged inputs keep their geometry.
#[derive(Clone, Debug)]
pub struct LayoutCache {
    dirty: bool,
    descendant_dirty: bool,
    measured: Vec<(MeasureKey, Size)>,
    arranged: Option<Size>,
    pub(crate) geometry: Geometry,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    /// A fresh, dirty cache.
    pub fn new() -> Self {
        Self {
            dirty: true,
            descendant_dirty: false,
            measured: Vec::new(),
            arranged: None,
            geometry: Geometry::default(),
        }
    }

    /// Mark this node's own layout inputs as changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.measured.clear();
        self.arranged = None;
    }

    /// Mark that some descendant's layout inputs changed.
    pub fn mark_descendant_dirty(&mut self) {
        self.descendant_dirty = true;
        self.measured.clear();
        self.arranged = None;
    }

    /// Returns true if this node's own inputs changed since the last pass.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true if this node or any descendant needs layout.
    pub fn needs_layout(&self) -> bool {
        self.dirty || self.descendant_dirty
    }

    /// The geometry computed by the last pass.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(crate) fn lookup(&self, key: &MeasureKey) -> Option<Size> {
        self.measured
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, size)| *size)
    }

    pub(crate) fn store(&mut self, key: MeasureKey, size: Size) {
        if self.measured.len() == MEASURE_SLOTS {
            self.measured.remove(0);
        }
        self.measured.push((key, size));
    }

    pub(crate) fn can_skip_arrange(&self, size: Size) -> bool {
        !self.needs_layout() && self.arranged == Some(size)
    }

    pub(crate) fn finish_arrange(&mut self, size: Size) {
        self.arranged = Some(size);
        self.dirty = false;
        self.descendant_dirty = false;
    }
}

/// Counters describing how much work a layout pass did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Measurements computed (cache hits are not counted).
    pub measured: usize,
    /// Nodes whose children were re-arranged.
    pub arranged: usize,
}
