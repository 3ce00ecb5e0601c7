// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree abstraction the layout engine runs over.

use kurbo::Size;

use crate::cache::LayoutCache;
use crate::style::Style;

/// Constraints passed to [`LayoutTree::measure_leaf`].
///
/// `known_*` are sizes the leaf must take (already resolved from its style or
/// imposed by its parent). `available_*` are upper bounds content may use, for
/// example for text wrapping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MeasureConstraints {
    /// Content width the leaf will be given, if already decided.
    pub known_width: Option<f64>,
    /// Content height the leaf will be given, if already decided.
    pub known_height: Option<f64>,
    /// Width available for content.
    pub available_width: Option<f64>,
    /// Height available for content.
    pub available_height: Option<f64>,
}

/// Access to a tree of layout nodes.
///
/// The engine reads styles and children, asks leaves for their intrinsic
/// content size, and writes results into each node's [`LayoutCache`].
pub trait LayoutTree {
    /// Identifier of a node.
    type NodeId: Copy + Eq + core::fmt::Debug;

    /// Layout style of `node`.
    fn style(&self, node: Self::NodeId) -> Style;

    /// Number of layout children of `node`.
    fn child_count(&self, node: Self::NodeId) -> usize;

    /// The `index`-th layout child of `node`.
    fn child_at(&self, node: Self::NodeId, index: usize) -> Self::NodeId;

    /// Intrinsic content size of a childless node (excluding padding).
    ///
    /// Return `None` for nodes without intrinsic content; they measure as zero.
    fn measure_leaf(
        &mut self,
        node: Self::NodeId,
        constraints: MeasureConstraints,
    ) -> Option<Size>;

    /// Layout state of `node`.
    fn cache(&self, node: Self::NodeId) -> &LayoutCache;

    /// Mutable layout state of `node`.
    fn cache_mut(&mut self, node: Self::NodeId) -> &mut LayoutCache;
}
