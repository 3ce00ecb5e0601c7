// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persistent instance tree behind the element trees.

use alloc::rc::Rc;
use alloc::vec::Vec;

use canopy_layout::{Geometry, LayoutCache};
use slotmap::SlotMap;

use crate::element::{Element, Key};
use crate::error::RenderError;
use crate::hooks::{ComponentFlags, HookStore};
use crate::host::HostHandle;

slotmap::new_key_type! {
    /// Generational id of an instance in the arena.
    pub(crate) struct InstanceId;
}

pub(crate) type Arena = SlotMap<InstanceId, Instance>;

/// One rendered position of the element tree.
#[derive(Debug)]
pub(crate) struct Instance {
    pub(crate) parent: Option<InstanceId>,
    /// Effective key among siblings; duplicates are stored as `None`.
    pub(crate) key: Option<Key>,
    /// The element last committed here.
    pub(crate) element: Element,
    pub(crate) children: Vec<InstanceId>,
    pub(crate) kind: InstanceKind,
}

#[derive(Debug)]
pub(crate) enum InstanceKind {
    Host(HostInstance),
    Component(ComponentInstance),
    Boundary(BoundaryInstance),
    Empty,
}

#[derive(Debug)]
pub(crate) struct HostInstance {
    pub(crate) handle: HostHandle,
    /// Host children in the order the host currently has them.
    pub(crate) attached: Vec<HostHandle>,
    /// Nearest host descendants, in order; the layout tree's children.
    pub(crate) layout_children: Vec<InstanceId>,
    pub(crate) layout: LayoutCache,
    /// Geometry last pushed to the host.
    pub(crate) sent: Option<Geometry>,
}

impl HostInstance {
    pub(crate) fn new(handle: HostHandle) -> Self {
        Self {
            handle,
            attached: Vec::new(),
            layout_children: Vec::new(),
            layout: LayoutCache::new(),
            sent: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ComponentInstance {
    pub(crate) hooks: HookStore,
    pub(crate) flags: Rc<ComponentFlags>,
    /// Flag version the committed hooks were rendered at.
    pub(crate) rendered_version: u64,
}

impl ComponentInstance {
    /// Whether a setter ran since the committed render.
    pub(crate) fn is_dirty(&self) -> bool {
        self.flags.version() != self.rendered_version
    }
}

#[derive(Debug, Default)]
pub(crate) struct BoundaryInstance {
    /// The error whose fallback is showing.
    pub(crate) caught: Option<RenderError>,
}

impl Instance {
    pub(crate) fn host(&self) -> Option<&HostInstance> {
        match &self.kind {
            InstanceKind::Host(host) => Some(host),
            _ => None,
        }
    }

    pub(crate) fn host_mut(&mut self) -> Option<&mut HostInstance> {
        match &mut self.kind {
            InstanceKind::Host(host) => Some(host),
            _ => None,
        }
    }
}

/// Append the nearest host instances at or below `id` to `out`, in order.
///
/// Components, boundaries and empty instances are transparent.
pub(crate) fn collect_hosts(arena: &Arena, id: InstanceId, out: &mut Vec<InstanceId>) {
    let Some(instance) = arena.get(id) else {
        return;
    };
    if instance.host().is_some() {
        out.push(id);
        return;
    }
    for &child in &instance.children {
        collect_hosts(arena, child, out);
    }
}

/// Mark `id`'s own layout dirty and every host ancestor's descendants dirty.
pub(crate) fn mark_layout_dirty(arena: &mut Arena, id: InstanceId) {
    if let Some(host) = arena.get_mut(id).and_then(Instance::host_mut) {
        host.layout.mark_dirty();
    }
    let mut cursor = arena.get(id).and_then(|i| i.parent);
    while let Some(ancestor) = cursor {
        let Some(instance) = arena.get_mut(ancestor) else {
            break;
        };
        if let Some(host) = instance.host_mut() {
            host.layout.mark_descendant_dirty();
        }
        cursor = instance.parent;
    }
}
