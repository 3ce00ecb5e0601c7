// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs the layout engine over the primitive instances and pushes results to the host.

use canopy_layout::{LayoutCache, LayoutStats, LayoutTree, MeasureConstraints, Style, compute_layout};
use kurbo::Size;
use log::trace;

use crate::host::HostAdapter;
use crate::instance::{Arena, HostInstance, InstanceId};
use crate::props::Props;

/// The primitive instances seen as a [`LayoutTree`].
///
/// Components, boundaries and empty instances are transparent: a primitive's
/// layout children are its nearest primitive descendants.
pub(crate) struct LayoutBridge<'a, H> {
    arena: &'a mut Arena,
    host: &'a mut H,
}

impl<'a, H: HostAdapter> LayoutBridge<'a, H> {
    pub(crate) fn new(arena: &'a mut Arena, host: &'a mut H) -> Self {
        Self { arena, host }
    }

    fn state(&self, node: InstanceId) -> &HostInstance {
        match self.arena.get(node).and_then(|i| i.host()) {
            Some(state) => state,
            None => unreachable!("layout only visits primitive instances"),
        }
    }

    fn props(&self, node: InstanceId) -> &Props {
        match self.arena.get(node).and_then(|i| i.element.props()) {
            Some(props) => props,
            None => unreachable!("layout only visits primitive instances"),
        }
    }

    /// Lay out each top-level primitive in `viewport` and push changed geometry.
    pub(crate) fn run(&mut self, roots: &[InstanceId], viewport: Size) -> LayoutStats {
        let mut stats = LayoutStats::default();
        for &root in roots {
            if !self.state(root).layout.needs_layout() {
                continue;
            }
            let pass = compute_layout(self, root, viewport);
            stats.measured += pass.measured;
            stats.arranged += pass.arranged;
        }
        for &root in roots {
            self.push_geometry(root);
        }
        stats
    }

    /// Send geometry that differs from what the host last received, depth-first.
    fn push_geometry(&mut self, node: InstanceId) {
        let Some(instance) = self.arena.get_mut(node) else {
            return;
        };
        let node_ref = instance.element.props().and_then(Props::node_ref).cloned();
        let Some(state) = instance.host_mut() else {
            return;
        };
        let geometry = *state.layout.geometry();
        if state.sent != Some(geometry) {
            state.sent = Some(geometry);
            trace!("geometry {:?}: {:?}", state.handle, geometry.rect());
            self.host.set_geometry(state.handle, &geometry);
            if let Some(node_ref) = node_ref {
                node_ref.set(Some(geometry));
            }
        }
        let children = state.layout_children.clone();
        for child in children {
            self.push_geometry(child);
        }
    }
}

impl<H: HostAdapter> LayoutTree for LayoutBridge<'_, H> {
    type NodeId = InstanceId;

    fn style(&self, node: InstanceId) -> Style {
        *self.props(node).style()
    }

    fn child_count(&self, node: InstanceId) -> usize {
        self.state(node).layout_children.len()
    }

    fn child_at(&self, node: InstanceId, index: usize) -> InstanceId {
        self.state(node).layout_children[index]
    }

    fn measure_leaf(&mut self, node: InstanceId, constraints: MeasureConstraints) -> Option<Size> {
        match self.props(node) {
            Props::View(_) => None,
            Props::Text(_) | Props::Image(_) => {
                let handle = self.state(node).handle;
                Some(self.host.measure_intrinsic(handle, constraints))
            }
        }
    }

    fn cache(&self, node: InstanceId) -> &LayoutCache {
        &self.state(node).layout
    }

    fn cache_mut(&mut self, node: InstanceId) -> &mut LayoutCache {
        match self.arena.get_mut(node).and_then(|i| i.host_mut()) {
            Some(state) => &mut state.layout,
            None => unreachable!("layout only visits primitive instances"),
        }
    }
}
