// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Layout: a Kurbo-native flex and stack layout engine.
//!
//! The engine works over any tree that implements [`LayoutTree`]. It reads each
//! node's [`Style`], asks childless nodes for their intrinsic content size, and
//! writes a [`Geometry`] into the node's [`LayoutCache`].
//!
//! - Containers flow children along a [`Direction::Row`] or [`Direction::Column`]
//!   main axis, or overlay them at explicit offsets with [`Direction::Stack`].
//! - Free space is distributed by grow factors (positive) or shrink factors
//!   (negative). Items are clamped to their min/max bounds, and `min` wins over `max`.
//! - [`Justify`], [`Align`] and [`AlignContent`] place items on a line and place
//!   lines in a wrapping container.
//! - [`Overflow::Hidden`] clips descendants to the container's content box. The
//!   effective clip lands in each descendant's [`Geometry::clip`].
//!
//! A pass is two-phase. Measurement runs bottom-up and is memoised per node
//! for a small number of distinct inputs. Arrangement runs top-down. Nodes
//! whose [`LayoutCache`] is clean and whose size did not change keep their
//! previous geometry, so a leaf edit costs work proportional to its ancestors.
//!
//! ## Sizing rules
//!
//! - [`Dimension::Fixed`] is used as-is (after clamping).
//! - [`Dimension::Percent`] resolves against the parent's content size when it
//!   is known, and behaves like `Auto` otherwise.
//! - [`Dimension::Auto`] sizes to content plus padding.
//! - [`Dimension::Fill`] takes the leftover main-axis space (or the full cross
//!   size) of a parent whose own size on that axis is not `Auto`. Inside an
//!   `Auto` parent it resolves to zero.
//!
//! ## Example
//!
//! ```
//! use canopy_layout::{compute_layout, LayoutCache, LayoutTree, MeasureConstraints, Style};
//! use kurbo::Size;
//!
//! struct Flat {
//!     styles: Vec<Style>,
//!     caches: Vec<LayoutCache>,
//! }
//!
//! impl LayoutTree for Flat {
//!     type NodeId = usize;
//!     fn style(&self, node: usize) -> Style { self.styles[node] }
//!     fn child_count(&self, node: usize) -> usize { if node == 0 { self.styles.len() - 1 } else { 0 } }
//!     fn child_at(&self, _: usize, index: usize) -> usize { index + 1 }
//!     fn measure_leaf(&mut self, _: usize, _: MeasureConstraints) -> Option<Size> { None }
//!     fn cache(&self, node: usize) -> &LayoutCache { &self.caches[node] }
//!     fn cache_mut(&mut self, node: usize) -> &mut LayoutCache { &mut self.caches[node] }
//! }
//!
//! let mut tree = Flat {
//!     styles: vec![
//!         Style::row().with_width(200.0).with_gap(10.0),
//!         Style::default().with_width(50.0),
//!         Style::default().with_grow(1.0),
//!     ],
//!     caches: vec![LayoutCache::new(), LayoutCache::new(), LayoutCache::new()],
//! };
//!
//! compute_layout(&mut tree, 0, Size::new(800.0, 600.0));
//! let second = tree.cache(2).geometry();
//! assert_eq!((second.x, second.width), (60.0, 140.0));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
mod compute;
mod flex;
mod style;
mod tree;

pub use cache::{Geometry, LayoutCache, LayoutStats};
pub use compute::compute_layout;
pub use style::{Align, AlignContent, Dimension, Direction, Justify, Overflow, Style, Wrap};
pub use tree::{LayoutTree, MeasureConstraints};
