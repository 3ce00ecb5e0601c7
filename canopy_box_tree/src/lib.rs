// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Box Tree: a Kurbo-native box tree for host scene graphs.
//!
//! This is the reference host scene for Canopy. It works as a standalone
//! building block for UIs and canvas viewers too.
//!
//! - Represents an ordered hierarchy of regions with local transforms, clips, z-order, and flags.
//! - Provides hit testing and rectangle intersection queries over world-space boxes.
//! - Batches updates behind a [`Tree::commit`] step that yields coarse damage regions.
//!
//! ## Not a layout engine
//!
//! This crate does not measure or arrange anything. Upstream code (for example
//! `canopy_layout`) computes positions and sizes and writes them here as local
//! bounds, transforms and clips.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes and their world-space data.
//! - [`LocalNode`]: per-node local data (bounds, transform, optional clip, z, flags).
//! - [`NodeFlags`]: visibility and picking controls. Hiding a node hides its subtree.
//! - [`NodeId`]: generational handle of a node, convertible to and from `u64`.
//! - [`QueryFilter`]: restricts hit/intersect results (visible/pickable).
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::insert_at`] → [`NodeId`]
//! - [`Tree::reparent_at`] moves a node (and its subtree) to a new parent and position.
//! - [`Tree::commit`] → [`Damage`]; updates world transforms, bounds, clips and visibility.
//! - [`Tree::hit_test_point`] and [`Tree::intersect_rect`].
//!
//! Hit testing walks nodes in paint order: depth-first, children in order. The
//! highest `z_index` wins, and ties go to the node painted last. World bounds
//! are conservative under rotation or shear, and rounded clips use their
//! bounding rectangle.
//!
//! ## Example
//!
//! ```
//! use canopy_box_tree::{LocalNode, QueryFilter, Tree};
//! use kurbo::{Affine, Point, Rect, Vec2};
//!
//! let mut tree = Tree::new();
//!
//! let root = tree.insert(
//!     None,
//!     LocalNode { local_bounds: Rect::new(0.0, 0.0, 200.0, 200.0), ..Default::default() },
//! );
//! let a = tree.insert(
//!     Some(root),
//!     LocalNode { local_bounds: Rect::new(10.0, 10.0, 60.0, 60.0), ..Default::default() },
//! );
//! let b = tree.insert(
//!     Some(root),
//!     LocalNode { local_bounds: Rect::new(40.0, 40.0, 120.0, 120.0), z_index: 10, ..Default::default() },
//! );
//! let _ = tree.commit();
//!
//! // Move node A to the right and compute damage.
//! tree.set_local_transform(a, Affine::translate(Vec2::new(20.0, 0.0)));
//! let damage = tree.commit();
//! assert!(damage.union_rect().is_some());
//!
//! // Hit-test prefers the higher z-index (node B).
//! let filter = QueryFilter { visible_only: true, pickable_only: true };
//! let hit = tree.hit_test_point(Point::new(50.0, 50.0), filter).unwrap();
//! assert_eq!(hit.node, b);
//! assert_eq!(hit.path, vec![root, b]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod damage;
mod tree;
mod types;
mod util;

pub use damage::Damage;
pub use tree::{Hit, QueryFilter, Tree};
pub use types::{LocalNode, NodeFlags, NodeId};
