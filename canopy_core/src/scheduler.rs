// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The runtime: owns the host and the instance tree, batches updates and
//! runs reconcile, layout and effects passes.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use canopy_layout::LayoutStats;
use kurbo::{Point, Rect, Size, Vec2};
use log::{debug, warn};

use crate::element::Element;
use crate::error::{RenderError, RuntimeError};
use crate::event::{DispatchOutcome, EventFlow, PointerEvent};
use crate::hooks::PendingEffect;
use crate::host::{HostAdapter, HostHandle};
use crate::instance::{Arena, InstanceId, mark_layout_dirty};
use crate::layout_bridge::LayoutBridge;
use crate::props::PointerHandler;
use crate::reconcile::{Committer, Renderer};

/// State shared between the runtime and every state setter.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pending: Cell<bool>,
}

impl Shared {
    pub(crate) fn request(&self) {
        self.pending.set(true);
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.pending.get()
    }

    pub(crate) fn take_request(&self) -> bool {
        self.pending.replace(false)
    }
}

/// Runtime settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Passes one flush may run before reporting [`RuntimeError::UpdateLoop`].
    ///
    /// Effects that set state start another pass; this bounds feedback loops.
    pub max_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { max_passes: 32 }
    }
}

/// What a flush did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Reconcile and layout passes run.
    pub passes: usize,
    /// Layout work summed over all passes.
    pub layout: LayoutStats,
    /// Effects run.
    pub effects_run: usize,
}

/// Drives an element tree onto a [`HostAdapter`].
///
/// State setters never render synchronously. They mark their component
/// dirty and request a pass, which runs on the next [`Runtime::flush`], at
/// the end of the outermost [`Runtime::batch`], or after a pointer dispatch.
pub struct Runtime<H: HostAdapter> {
    host: H,
    arena: Arena,
    root: Option<InstanceId>,
    root_element: Option<Element>,
    root_attached: Vec<HostHandle>,
    root_hosts: Vec<InstanceId>,
    shared: Rc<Shared>,
    config: RuntimeConfig,
    viewport: Size,
    relayout: bool,
    batch_depth: usize,
}

impl<H: HostAdapter> fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("mounted", &self.root_element.is_some())
            .field("instances", &self.arena.len())
            .field("viewport", &self.viewport)
            .field("config", &self.config)
            .field("batch_depth", &self.batch_depth)
            .finish_non_exhaustive()
    }
}

fn contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x < rect.x1 && point.y >= rect.y0 && point.y < rect.y1
}

impl<H: HostAdapter> Runtime<H> {
    /// A runtime rendering into `host`, laying out top-level primitives in `viewport`.
    pub fn new(host: H, viewport: Size) -> Self {
        Self::with_config(host, viewport, RuntimeConfig::default())
    }

    /// Like [`Runtime::new`], with explicit settings.
    pub fn with_config(host: H, viewport: Size, config: RuntimeConfig) -> Self {
        Self {
            host,
            arena: Arena::with_key(),
            root: None,
            root_element: None,
            root_attached: Vec::new(),
            root_hosts: Vec::new(),
            shared: Rc::new(Shared::default()),
            config,
            viewport,
            relayout: false,
            batch_depth: 0,
        }
    }

    /// The host adapter.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host adapter, mutably.
    ///
    /// Changes made behind the runtime's back are not tracked.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The size top-level primitives are laid out in.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Whether a tree is mounted.
    pub fn is_mounted(&self) -> bool {
        self.root_element.is_some()
    }

    /// Whether a state update is waiting for a pass.
    pub fn is_pending(&self) -> bool {
        self.shared.is_requested()
    }

    /// Mount `element` as the root, replacing (and unmounting) any current tree.
    pub fn mount(&mut self, element: Element) -> Result<FlushReport, RuntimeError> {
        if self.is_mounted() {
            self.unmount()?;
        }
        debug!("mounting root");
        self.render(element)
    }

    /// Reconcile the mounted tree against a new root element.
    ///
    /// Inside a batch the pass is deferred and an empty report returned.
    pub fn render(&mut self, element: Element) -> Result<FlushReport, RuntimeError> {
        self.root_element = Some(element);
        self.shared.request();
        self.flush_unless_batching()
    }

    /// Destroy the mounted tree: release every host node and run every
    /// pending effect cleanup.
    pub fn unmount(&mut self) -> Result<(), RuntimeError> {
        if self.root_element.take().is_none() {
            return Err(RuntimeError::NotMounted);
        }
        let mut committer = Committer::new(&mut self.arena, &mut self.host, &self.shared);
        if let Some(root) = self.root.take() {
            committer.destroy(root);
        }
        self.root_attached.clear();
        self.root_hosts.clear();
        // Cleanups may have set state on components that no longer exist.
        self.shared.take_request();
        debug!("unmounted root");
        Ok(())
    }

    /// Change the layout viewport.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<FlushReport, RuntimeError> {
        if viewport != self.viewport {
            self.viewport = viewport;
            for &id in &self.root_hosts {
                mark_layout_dirty(&mut self.arena, id);
            }
            self.relayout = true;
        }
        self.flush_unless_batching()
    }

    fn flush_unless_batching(&mut self) -> Result<FlushReport, RuntimeError> {
        if self.batch_depth > 0 {
            Ok(FlushReport::default())
        } else {
            self.flush()
        }
    }

    /// Run passes until no update is pending.
    ///
    /// Each pass reconciles the whole tree (skipping components with nothing
    /// to do), lays out dirty primitives, pushes changed geometry and then
    /// runs queued effects in depth-first order.
    ///
    /// A render error no boundary caught ends the flush with
    /// [`RuntimeError::Render`]. If it happened while rendering, nothing was
    /// committed; if the host failed while committing, the failing subtree
    /// was rolled back and the rest committed.
    pub fn flush(&mut self) -> Result<FlushReport, RuntimeError> {
        let mut report = FlushReport::default();
        while self.shared.is_requested() || self.relayout {
            if report.passes == self.config.max_passes {
                warn!("updates did not settle after {} passes", report.passes);
                self.shared.take_request();
                return Err(RuntimeError::UpdateLoop {
                    passes: report.passes,
                });
            }
            report.passes += 1;
            self.relayout = false;
            let (effects, uncaught) = if self.shared.take_request() {
                self.reconcile().inspect_err(|err| {
                    warn!("render failed, keeping the committed tree: {err}");
                })?
            } else {
                (Vec::new(), None)
            };

            let layout = LayoutBridge::new(&mut self.arena, &mut self.host)
                .run(&self.root_hosts, self.viewport);
            report.layout.measured += layout.measured;
            report.layout.arranged += layout.arranged;

            report.effects_run += effects
                .into_iter()
                .map(PendingEffect::run)
                .filter(|ran| *ran)
                .count();

            if let Some(err) = uncaught {
                warn!("host failure reached the root: {err}");
                return Err(err.into());
            }
        }
        if report.passes > 0 {
            debug!(
                "flush: {} passes, {} measured, {} arranged, {} effects",
                report.passes, report.layout.measured, report.layout.arranged, report.effects_run
            );
        }
        Ok(report)
    }

    fn reconcile(&mut self) -> Result<(Vec<PendingEffect>, Option<RenderError>), RenderError> {
        let Some(element) = self.root_element.clone() else {
            return Ok((Vec::new(), None));
        };
        let work = Renderer::new(&self.arena, &self.shared).render(
            self.root,
            &element,
            element.key().cloned(),
        )?;
        let mut committer = Committer::new(&mut self.arena, &mut self.host, &self.shared);
        match committer.commit(work, None) {
            Ok(root) => self.root = Some(root),
            Err(err) => committer.record(err),
        }
        self.root_hosts = committer.sync_root(self.root, &mut self.root_attached);
        Ok(committer.finish())
    }

    /// Run `f`, deferring every update it raises to one pass at the end of
    /// the outermost batch.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R, RuntimeError> {
        self.batch_depth += 1;
        let out = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush()?;
        }
        Ok(out)
    }

    /// The topmost visible primitive under `point`, in viewport coordinates.
    ///
    /// Uses the geometry of the last pass. Higher z-index wins, then later
    /// paint order (depth-first, children in order). Clips are respected.
    pub fn handle_at(&self, point: Point) -> Option<HostHandle> {
        let target = self.hit_test(point)?;
        self.arena[target].host().map(|state| state.handle)
    }

    fn hit_test(&self, point: Point) -> Option<InstanceId> {
        let mut best = None;
        for &root in &self.root_hosts {
            self.hit_walk(root, Vec2::ZERO, point, &mut best);
        }
        best.map(|(_, id)| id)
    }

    fn hit_walk(
        &self,
        id: InstanceId,
        origin: Vec2,
        point: Point,
        best: &mut Option<(i32, InstanceId)>,
    ) {
        let Some(instance) = self.arena.get(id) else {
            return;
        };
        let (Some(state), Some(props)) = (instance.host(), instance.element.props()) else {
            return;
        };
        let Some(geometry) = state.sent else {
            return;
        };
        if !props.visible() {
            return;
        }
        let rect = geometry.rect() + origin;
        let origin = origin + Vec2::new(geometry.x, geometry.y);
        let clipped = geometry.clip.is_some_and(|clip| !contains(clip + origin, point));
        if !clipped && contains(rect, point) {
            let z = props.z_index();
            if best.is_none_or(|(top, _)| z >= top) {
                *best = Some((z, id));
            }
        }
        for &child in &state.layout_children {
            self.hit_walk(child, origin, point, best);
        }
    }

    /// Deliver a pointer event.
    ///
    /// The event goes to the topmost primitive under the pointer, then
    /// bubbles to each ancestor view's handler until one returns
    /// [`EventFlow::Stop`]. Updates raised by handlers are batched into one
    /// pass.
    pub fn dispatch_pointer(&mut self, event: PointerEvent) -> Result<DispatchOutcome, RuntimeError> {
        if !self.is_mounted() {
            return Err(RuntimeError::NotMounted);
        }
        let Some(target) = self.hit_test(event.position) else {
            return Ok(DispatchOutcome::default());
        };
        let mut handlers: Vec<PointerHandler> = Vec::new();
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            let instance = &self.arena[id];
            if let Some(handler) = instance.element.props().and_then(|p| p.on_pointer()) {
                handlers.push(handler.clone());
            }
            cursor = instance.parent;
        }
        self.batch(|_| {
            let mut outcome = DispatchOutcome {
                hit: true,
                ..DispatchOutcome::default()
            };
            for handler in &handlers {
                outcome.handlers += 1;
                if handler.call(&event) == EventFlow::Stop {
                    outcome.stopped = true;
                    break;
                }
            }
            outcome
        })
    }
}
