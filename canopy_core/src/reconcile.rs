// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-phase reconciliation of element trees against the instance tree.
//!
//! The render phase ([`Renderer`]) walks a new element tree against the
//! committed instances. It calls render functions and matches children, and
//! produces a [`Work`] tree. It reads the arena but never writes it, and it
//! never talks to the host, so a render error leaves everything as it was.
//!
//! The commit phase ([`Committer`]) applies a work tree: it creates, updates,
//! moves and destroys host nodes, swaps in the new hook stores and queues
//! effects. Host failures while committing are routed to the nearest
//! boundary; the failing subtree is rolled back and the old one stays.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::element::{BoundaryElement, ComponentElement, Element, ElementKind, Key};
use crate::error::RenderError;
use crate::hooks::{ComponentFlags, HookStore, PendingEffect, Scope};
use crate::host::{HostAdapter, HostHandle};
use crate::instance::{
    Arena, BoundaryInstance, ComponentInstance, HostInstance, Instance, InstanceId, InstanceKind,
    collect_hosts, mark_layout_dirty,
};
use crate::keyed::{PlacementKind, match_children, plan_placements};
use crate::props::{PropChange, Props};
use crate::scheduler::Shared;

/// Output of one component render, installed at commit.
pub(crate) struct Rendered {
    hooks: HookStore,
    flags: Rc<ComponentFlags>,
    version: u64,
    effects: Vec<PendingEffect>,
}

/// The reconciled form of one element.
pub(crate) struct Work {
    /// Instance updated in place.
    pub(crate) existing: Option<InstanceId>,
    /// Instance of another kind at the same position, destroyed once this
    /// work commits.
    pub(crate) replaced: Option<InstanceId>,
    key: Option<Key>,
    element: Element,
    body: WorkBody,
}

enum WorkBody {
    Host {
        children: Vec<Work>,
        removed: Vec<InstanceId>,
    },
    /// `rendered` is `None` when the component was skipped.
    Component {
        rendered: Option<Rendered>,
        child: Box<Work>,
    },
    /// `caught` is set when `child` is the fallback.
    Boundary {
        child: Box<Work>,
        caught: Option<RenderError>,
    },
    Empty,
}

fn same_children(a: &[Element], b: &[Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.ptr_eq(b))
}

/// The render phase.
pub(crate) struct Renderer<'a> {
    arena: &'a Arena,
    shared: &'a Rc<Shared>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(arena: &'a Arena, shared: &'a Rc<Shared>) -> Self {
        Self { arena, shared }
    }

    /// Reconcile `element` against `candidate`, the instance at its position.
    pub(crate) fn render(
        &self,
        candidate: Option<InstanceId>,
        element: &Element,
        key: Option<Key>,
    ) -> Result<Work, RenderError> {
        let (existing, replaced) = match candidate.and_then(|id| self.arena.get(id).map(|i| (id, i))) {
            Some((id, instance)) if instance.element.same_kind(element) => (Some(id), None),
            Some((id, _)) => (None, Some(id)),
            None => (None, None),
        };
        let body = match element.kind() {
            ElementKind::Host(props) => {
                props.validate()?;
                self.render_host(existing, element)?
            }
            ElementKind::Component(component) => {
                self.render_component(existing, element, component)?
            }
            ElementKind::Boundary(boundary) => self.render_boundary(existing, boundary)?,
            ElementKind::Empty => WorkBody::Empty,
        };
        Ok(Work {
            existing,
            replaced,
            key,
            element: element.clone(),
            body,
        })
    }

    fn only_child(&self, id: Option<InstanceId>) -> Option<InstanceId> {
        id.and_then(|id| self.arena[id].children.first().copied())
    }

    fn render_host(
        &self,
        existing: Option<InstanceId>,
        element: &Element,
    ) -> Result<WorkBody, RenderError> {
        let previous: &[InstanceId] = match existing {
            Some(id) => &self.arena[id].children,
            None => &[],
        };
        let previous_keys: Vec<Option<Key>> =
            previous.iter().map(|&id| self.arena[id].key.clone()).collect();
        let next_keys: Vec<Option<&Key>> = element.children().iter().map(Element::key).collect();
        let matching = match_children(&previous_keys, &next_keys);

        let mut children = Vec::with_capacity(element.children().len());
        let pairs = element.children().iter().zip(matching.matched).zip(matching.keys);
        for ((child, matched), key) in pairs {
            children.push(self.render(matched.map(|i| previous[i]), child, key)?);
        }
        let removed = matching.unmatched.into_iter().map(|i| previous[i]).collect();
        Ok(WorkBody::Host { children, removed })
    }

    fn render_component(
        &self,
        existing: Option<InstanceId>,
        element: &Element,
        component: &ComponentElement,
    ) -> Result<WorkBody, RenderError> {
        let instance = existing.map(|id| &self.arena[id]);
        let state = instance.and_then(|i| match &i.kind {
            InstanceKind::Component(state) => Some(state),
            _ => None,
        });

        if let (Some(instance), Some(state)) = (instance, state)
            && !state.is_dirty()
            && let ElementKind::Component(previous) = instance.element.kind()
            && component.props_match(previous)
            && same_children(element.children(), instance.element.children())
            && let Some(&child) = instance.children.first()
        {
            trace!("{} skipped", component.name());
            let committed = &self.arena[child];
            let work = self.render(Some(child), &committed.element, committed.key.clone())?;
            return Ok(WorkBody::Component {
                rendered: None,
                child: Box::new(work),
            });
        }

        let (mut hooks, flags, previous_len) = match state {
            Some(state) => (state.hooks.clone(), state.flags.clone(), Some(state.hooks.len())),
            None => (
                HookStore::default(),
                Rc::new(ComponentFlags::new(component.name(), Rc::downgrade(self.shared))),
                None,
            ),
        };
        let version = flags.version();
        let mut scope = Scope::new(&mut hooks, &flags, element.children(), previous_len);
        let child_element = match component.call(&mut scope) {
            Ok(output) => output,
            Err(err) => return Err(scope.abort(err)),
        };
        let effects = scope.finish()?;
        let child = self.render(
            self.only_child(existing),
            &child_element,
            child_element.key().cloned(),
        )?;
        Ok(WorkBody::Component {
            rendered: Some(Rendered {
                hooks,
                flags,
                version,
                effects,
            }),
            child: Box::new(child),
        })
    }

    fn render_boundary(
        &self,
        existing: Option<InstanceId>,
        boundary: &BoundaryElement,
    ) -> Result<WorkBody, RenderError> {
        let candidate = self.only_child(existing);
        let child = &boundary.child;
        match self.render(candidate, child, child.key().cloned()) {
            Ok(work) => Ok(WorkBody::Boundary {
                child: Box::new(work),
                caught: None,
            }),
            Err(err) => {
                warn!("boundary caught render error: {err}");
                let fallback = (boundary.fallback)(&err);
                let work = self.render(candidate, &fallback, fallback.key().cloned())?;
                Ok(WorkBody::Boundary {
                    child: Box::new(work),
                    caught: Some(err),
                })
            }
        }
    }
}

/// Attach and move host children so `parent` holds `next`, in order.
pub(crate) fn place<H: HostAdapter>(
    host: &mut H,
    parent: Option<HostHandle>,
    previous: &[HostHandle],
    next: &[HostHandle],
) {
    for placement in plan_placements(previous, next) {
        let (handle, index) = (placement.item, placement.index);
        match placement.kind {
            PlacementKind::Attach => {
                trace!("attach {handle:?} to {parent:?} at {index}");
                host.attach(handle, parent, index);
            }
            PlacementKind::Move => {
                trace!("move {handle:?} within {parent:?} to {index}");
                host.reparent(handle, parent, index);
            }
        }
    }
}

/// The commit phase.
pub(crate) struct Committer<'a, H: HostAdapter> {
    arena: &'a mut Arena,
    host: &'a mut H,
    shared: &'a Rc<Shared>,
    effects: Vec<PendingEffect>,
    /// One slot per boundary being committed, innermost last.
    frames: Vec<Option<RenderError>>,
    uncaught: Option<RenderError>,
}

impl<'a, H: HostAdapter> Committer<'a, H> {
    pub(crate) fn new(arena: &'a mut Arena, host: &'a mut H, shared: &'a Rc<Shared>) -> Self {
        Self {
            arena,
            host,
            shared,
            effects: Vec::new(),
            frames: Vec::new(),
            uncaught: None,
        }
    }

    /// Queued effects in pre-order, and the first error no boundary caught.
    pub(crate) fn finish(self) -> (Vec<PendingEffect>, Option<RenderError>) {
        (self.effects, self.uncaught)
    }

    /// Route an error to the innermost boundary being committed.
    pub(crate) fn record(&mut self, err: RenderError) {
        let slot = match self.frames.last_mut() {
            Some(frame) => frame,
            None => &mut self.uncaught,
        };
        if slot.is_none() {
            *slot = Some(err);
        } else {
            debug!("further render error in the same boundary: {err}");
        }
    }

    /// Fail a fresh instance (rolling it back), or record the error for an
    /// existing one.
    fn escalate(&mut self, id: InstanceId, fresh: bool, err: RenderError) -> Result<(), RenderError> {
        if fresh {
            self.destroy(id);
            Err(err)
        } else {
            self.record(err);
            Ok(())
        }
    }

    /// Apply `work` under `parent`.
    ///
    /// Updating an existing instance never fails: errors below it are
    /// recorded and the old subtree stays. A new instance fails as a whole,
    /// after destroying whatever part of it was created.
    pub(crate) fn commit(
        &mut self,
        work: Work,
        parent: Option<InstanceId>,
    ) -> Result<InstanceId, RenderError> {
        let Work {
            existing,
            replaced,
            key,
            element,
            body,
        } = work;
        let id = match body {
            WorkBody::Host { children, removed } => {
                self.commit_host(existing, parent, key, element, children, removed)?
            }
            WorkBody::Component { rendered, child } => {
                self.commit_component(existing, parent, key, element, rendered, *child)?
            }
            WorkBody::Boundary { child, caught } => {
                self.commit_boundary(existing, parent, key, element, *child, caught)?
            }
            WorkBody::Empty => self.commit_empty(existing, parent, key, element),
        };
        if let Some(old) = replaced {
            self.destroy(old);
        }
        Ok(id)
    }

    fn commit_child(
        &mut self,
        child: Work,
        parent: InstanceId,
        fresh_parent: bool,
    ) -> Result<Option<InstanceId>, RenderError> {
        let keep = child.replaced;
        match self.commit(child, Some(parent)) {
            Ok(id) => Ok(Some(id)),
            Err(err) if fresh_parent => Err(err),
            Err(err) => {
                self.record(err);
                Ok(keep)
            }
        }
    }

    fn insert(
        &mut self,
        parent: Option<InstanceId>,
        key: Option<Key>,
        element: Element,
        kind: InstanceKind,
    ) -> InstanceId {
        self.arena.insert(Instance {
            parent,
            key,
            element,
            children: Vec::new(),
            kind,
        })
    }

    fn commit_host(
        &mut self,
        existing: Option<InstanceId>,
        parent: Option<InstanceId>,
        key: Option<Key>,
        element: Element,
        children: Vec<Work>,
        removed: Vec<InstanceId>,
    ) -> Result<InstanceId, RenderError> {
        let id = match existing {
            Some(id) => {
                self.update_host(id, key, element);
                id
            }
            None => {
                let Some(props) = element.props() else {
                    unreachable!("host work always carries host props");
                };
                let handle = self.host.create_node(props.primitive(), props)?;
                trace!("create {handle:?} ({:?})", props.primitive());
                self.insert(parent, key, element, InstanceKind::Host(HostInstance::new(handle)))
            }
        };
        let fresh = existing.is_none();

        for dead in removed {
            self.destroy(dead);
        }
        let mut committed = Vec::with_capacity(children.len());
        for child in children {
            match self.commit_child(child, id, fresh) {
                Ok(child) => committed.extend(child),
                Err(err) => {
                    for child in committed {
                        self.destroy(child);
                    }
                    self.destroy(id);
                    return Err(err);
                }
            }
        }
        self.arena[id].children = committed;
        self.sync_host_children(id);
        Ok(id)
    }

    fn update_host(&mut self, id: InstanceId, key: Option<Key>, element: Element) {
        let instance = &mut self.arena[id];
        let (Some(old), Some(new)) = (instance.element.props(), element.props()) else {
            unreachable!("host instances hold host elements");
        };
        let Some(state) = instance.host() else {
            unreachable!("host elements live in host instances");
        };
        let (handle, sent) = (state.handle, state.sent);

        let changes = old.diff(new);
        let relayout = old.style() != new.style() || changes.iter().any(PropChange::affects_layout);
        if !changes.is_empty() {
            trace!("update {handle:?}: {changes:?}");
            self.host.update_node(handle, &changes);
        }
        let (old_ref, new_ref) = (old.node_ref(), new.node_ref());
        if old_ref != new_ref {
            if let Some(old_ref) = old_ref {
                old_ref.set(None);
            }
            if let Some(new_ref) = new_ref {
                new_ref.set(sent);
            }
        }

        instance.element = element;
        instance.key = key;
        if relayout {
            mark_layout_dirty(self.arena, id);
        }
    }

    /// Bring the host's child list of `id` in line with its host descendants.
    fn sync_host_children(&mut self, id: InstanceId) {
        let (parent, attached) = match self.arena[id].host() {
            Some(state) => (state.handle, state.attached.clone()),
            None => return,
        };
        let mut hosts = Vec::new();
        for &child in &self.arena[id].children {
            collect_hosts(self.arena, child, &mut hosts);
        }
        let handles: Vec<HostHandle> = hosts
            .iter()
            .filter_map(|&child| self.arena[child].host().map(|h| h.handle))
            .collect();
        if handles == attached {
            return;
        }
        place(self.host, Some(parent), &attached, &handles);
        if let Some(state) = self.arena[id].host_mut() {
            state.attached = handles;
            state.layout_children = hosts;
        }
        mark_layout_dirty(self.arena, id);
    }

    /// Attach the top-level hosts of `root` and return them in order.
    pub(crate) fn sync_root(
        &mut self,
        root: Option<InstanceId>,
        attached: &mut Vec<HostHandle>,
    ) -> Vec<InstanceId> {
        let mut hosts = Vec::new();
        if let Some(root) = root {
            collect_hosts(self.arena, root, &mut hosts);
        }
        let handles: Vec<HostHandle> = hosts
            .iter()
            .filter_map(|&id| self.arena[id].host().map(|h| h.handle))
            .collect();
        if handles != *attached {
            place(self.host, None, attached, &handles);
            *attached = handles;
        }
        hosts
    }

    fn commit_component(
        &mut self,
        existing: Option<InstanceId>,
        parent: Option<InstanceId>,
        key: Option<Key>,
        element: Element,
        rendered: Option<Rendered>,
        child: Work,
    ) -> Result<InstanceId, RenderError> {
        let id = match (existing, rendered) {
            (Some(id), rendered) => {
                let instance = &mut self.arena[id];
                if let Some(rendered) = rendered
                    && let InstanceKind::Component(state) = &mut instance.kind
                {
                    state.hooks = rendered.hooks;
                    state.rendered_version = rendered.version;
                    self.effects.extend(rendered.effects);
                }
                instance.element = element;
                instance.key = key;
                id
            }
            (None, Some(rendered)) => {
                rendered.flags.set_mounted(true);
                self.effects.extend(rendered.effects);
                let state = ComponentInstance {
                    hooks: rendered.hooks,
                    flags: rendered.flags,
                    rendered_version: rendered.version,
                };
                self.insert(parent, key, element, InstanceKind::Component(state))
            }
            (None, None) => unreachable!("a new component always renders"),
        };
        let child = self.commit_child(child, id, existing.is_none());
        match child {
            Ok(child) => {
                self.arena[id].children = child.into_iter().collect();
                Ok(id)
            }
            Err(err) => {
                self.destroy(id);
                Err(err)
            }
        }
    }

    fn commit_boundary(
        &mut self,
        existing: Option<InstanceId>,
        parent: Option<InstanceId>,
        key: Option<Key>,
        element: Element,
        child: Work,
        caught: Option<RenderError>,
    ) -> Result<InstanceId, RenderError> {
        let ElementKind::Boundary(boundary) = element.kind() else {
            unreachable!("boundary work always carries a boundary element");
        };
        let fallback = boundary.fallback.clone();
        let fresh = existing.is_none();
        let id = match existing {
            Some(id) => {
                let instance = &mut self.arena[id];
                instance.element = element;
                instance.key = key;
                id
            }
            None => {
                let state = InstanceKind::Boundary(BoundaryInstance::default());
                self.insert(parent, key, element, state)
            }
        };

        self.frames.push(None);
        let keep = child.replaced;
        let result = self.commit(child, Some(id));
        let recorded = self.frames.pop().flatten();
        let (shown, error) = match (result, recorded) {
            (Ok(child), None) => {
                self.set_boundary(id, Some(child), caught);
                return Ok(id);
            }
            (Ok(child), Some(err)) => (Some(child), err),
            (Err(err), _) => (keep, err),
        };
        self.arena[id].children = shown.into_iter().collect();
        if caught.is_some() {
            // The fallback itself failed; let the next boundary out handle it.
            self.escalate(id, fresh, error)?;
            return Ok(id);
        }

        warn!("boundary caught commit error: {error}");
        let element = fallback(&error);
        let work = Renderer::new(self.arena, self.shared).render(shown, &element, element.key().cloned());
        let work = match work {
            Ok(work) => work,
            Err(err) => {
                self.escalate(id, fresh, err)?;
                return Ok(id);
            }
        };
        let shown = match self.commit_child(work, id, fresh) {
            Ok(shown) => shown,
            Err(err) => {
                self.destroy(id);
                return Err(err);
            }
        };
        self.set_boundary(id, shown, Some(error));
        Ok(id)
    }

    fn set_boundary(&mut self, id: InstanceId, child: Option<InstanceId>, caught: Option<RenderError>) {
        let instance = &mut self.arena[id];
        instance.children = child.into_iter().collect();
        if let InstanceKind::Boundary(state) = &mut instance.kind {
            if state.caught.is_some() && caught.is_none() {
                debug!("boundary recovered");
            }
            state.caught = caught;
        }
    }

    fn commit_empty(
        &mut self,
        existing: Option<InstanceId>,
        parent: Option<InstanceId>,
        key: Option<Key>,
        element: Element,
    ) -> InstanceId {
        match existing {
            Some(id) => {
                let instance = &mut self.arena[id];
                instance.element = element;
                instance.key = key;
                id
            }
            None => self.insert(parent, key, element, InstanceKind::Empty),
        }
    }

    /// Destroy `id` and its subtree, bottom-up.
    ///
    /// Host nodes are released, node refs cleared, and components unmounted
    /// with their effect cleanups run.
    pub(crate) fn destroy(&mut self, id: InstanceId) {
        let Some(instance) = self.arena.remove(id) else {
            return;
        };
        for child in instance.children {
            self.destroy(child);
        }
        match instance.kind {
            InstanceKind::Host(state) => {
                trace!("destroy {:?}", state.handle);
                self.host.destroy_node(state.handle);
                if let Some(node_ref) = instance.element.props().and_then(Props::node_ref) {
                    node_ref.set(None);
                }
            }
            InstanceKind::Component(state) => {
                state.flags.set_mounted(false);
                state.hooks.run_cleanups();
            }
            InstanceKind::Boundary(_) | InstanceKind::Empty => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    use crate::error::PropError;
    use crate::props::{TextProps, ViewProps};
    use crate::testing::{Call, RecordingHost};

    fn row(items: &[&str]) -> Element {
        Element::view(ViewProps::default()).with_children(
            items
                .iter()
                .map(|&k| Element::text(TextProps::new(k)).with_key(k)),
        )
    }

    struct Fixture {
        arena: Arena,
        host: RecordingHost,
        shared: Rc<Shared>,
        root: Option<InstanceId>,
        attached: Vec<HostHandle>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                arena: Arena::with_key(),
                host: RecordingHost::default(),
                shared: Rc::new(Shared::default()),
                root: None,
                attached: Vec::new(),
            }
        }

        fn pass(&mut self, element: &Element) -> Option<RenderError> {
            let work = match Renderer::new(&self.arena, &self.shared).render(self.root, element, None) {
                Ok(work) => work,
                Err(err) => return Some(err),
            };
            let mut committer = Committer::new(&mut self.arena, &mut self.host, &self.shared);
            match committer.commit(work, None) {
                Ok(id) => self.root = Some(id),
                Err(err) => committer.record(err),
            }
            committer.sync_root(self.root, &mut self.attached);
            committer.finish().1
        }
    }

    #[test]
    fn unchanged_tree_issues_no_host_calls() {
        let mut f = Fixture::new();
        assert_eq!(f.pass(&row(&["a", "b"])), None);
        f.host.take_calls();
        assert_eq!(f.pass(&row(&["a", "b"])), None);
        assert!(f.host.take_calls().is_empty());
    }

    #[test]
    fn keyed_swap_moves_without_recreating() {
        let mut f = Fixture::new();
        f.pass(&row(&["a", "b", "c"]));
        let root = f.attached[0];
        f.host.take_calls();
        f.pass(&row(&["c", "b", "a"]));
        let calls = f.host.take_calls();
        let moves = calls.iter().filter(|c| matches!(c, Call::Reparent { .. })).count();
        assert_eq!(moves, 2);
        assert!(
            calls
                .iter()
                .all(|c| !matches!(c, Call::Create { .. } | Call::Destroy(_))),
            "keyed moves must not recreate nodes: {calls:?}"
        );
        assert_eq!(f.host.texts_under(root), ["c", "b", "a"]);
    }

    #[test]
    fn rotating_keyed_children_moves_one_node() {
        let keys: Vec<String> = (0..10).map(|i| format!("k{i}")).collect();
        let mut order: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut f = Fixture::new();
        f.pass(&row(&order));
        let root = f.attached[0];
        f.host.take_calls();

        order.rotate_left(1);
        assert_eq!(f.pass(&row(&order)), None);
        let calls = f.host.take_calls();
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::Reparent { .. })).count(),
            1,
            "{calls:?}"
        );
        assert!(calls.iter().all(|c| !matches!(c, Call::Create { .. } | Call::Destroy(_))));
        assert_eq!(f.host.texts_under(root), order);
    }

    #[test]
    fn out_of_range_props_fail_the_render() {
        let invalid = || {
            Element::view(ViewProps {
                opacity: 5.0,
                ..ViewProps::default()
            })
        };
        let mut f = Fixture::new();
        assert_eq!(
            f.pass(&invalid()),
            Some(RenderError::InvalidProps(PropError::Opacity(5.0)))
        );
        assert!(f.host.take_calls().is_empty());
        assert_eq!(f.root, None);

        f.pass(&row(&["a"]));
        let root = f.attached[0];
        f.host.take_calls();
        let mut text = TextProps::new("a");
        text.font_size = f64::NAN;
        let bad_child = Element::view(ViewProps::default())
            .with_children([Element::text(text).with_key("a")]);
        assert!(matches!(
            f.pass(&bad_child),
            Some(RenderError::InvalidProps(PropError::FontSize(_)))
        ));
        assert!(f.host.take_calls().is_empty());
        assert_eq!(f.host.texts_under(root), ["a"]);
    }

    #[test]
    fn removed_children_are_destroyed_and_new_ones_attached() {
        let mut f = Fixture::new();
        f.pass(&row(&["a", "b", "c"]));
        let root = f.attached[0];
        f.host.take_calls();
        f.pass(&row(&["a", "d", "c"]));
        let calls = f.host.take_calls();
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Destroy(_))).count(), 1);
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Attach { .. })).count(), 1);
        assert_eq!(f.host.texts_under(root), ["a", "d", "c"]);
    }

    #[test]
    fn kind_change_replaces_after_the_new_subtree_commits() {
        let mut f = Fixture::new();
        f.pass(&Element::view(ViewProps::default()).with_children([Element::text(TextProps::new("x"))]));
        f.host.take_calls();
        f.pass(&Element::view(ViewProps::default()).with_children([Element::view(ViewProps::default())]));
        let calls = f.host.take_calls();
        let create = calls.iter().position(|c| matches!(c, Call::Create { .. }));
        let destroy = calls.iter().position(|c| matches!(c, Call::Destroy(_)));
        assert!(create < destroy, "create must precede destroy: {calls:?}");
    }

    #[test]
    fn failed_creation_keeps_the_old_subtree() {
        let mut f = Fixture::new();
        f.pass(&row(&["a", "b"]));
        let root = f.attached[0];
        f.host.fail_creates_of("boom");
        let err = f.pass(&row(&["a", "boom", "b"]));
        assert!(matches!(err, Some(RenderError::Host(_))));
        assert_eq!(f.host.texts_under(root), ["a", "b"]);
        assert_eq!(f.host.live_nodes(), 3);
    }

    #[test]
    fn boundary_absorbs_creation_failures() {
        let mut f = Fixture::new();
        f.host.fail_creates_of("boom");
        let tree = Element::view(ViewProps::default()).with_children([crate::element::boundary(
            row(&["ok", "boom"]),
            |_| Element::text(TextProps::new("fallback")),
        )]);
        assert_eq!(f.pass(&tree), None);
        let root = f.attached[0];
        assert_eq!(f.host.texts_under(root), ["fallback"]);
        // Only the root and the fallback survive; the partial row was rolled back.
        assert_eq!(f.host.live_nodes(), 2);
    }
}
