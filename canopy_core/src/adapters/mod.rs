// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made [`HostAdapter`](crate::HostAdapter) implementations.

#[cfg(feature = "box_tree_adapter")]
mod box_tree;

#[cfg(feature = "box_tree_adapter")]
pub use box_tree::{BoxTreeHost, Visual};
