// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Core: declarative element trees reconciled onto a host scene graph.
//!
//! Applications describe their UI as an immutable [`Element`] tree built from
//! three primitives (views, text and images), function components and error
//! boundaries. A [`Runtime`] keeps the instances behind the last committed
//! tree, diffs each new tree against them and sends the minimal set of
//! mutations to a [`HostAdapter`].
//!
//! - Children are matched by [`Key`] when they carry one and by position
//!   otherwise. Keyed children that change order are moved, never recreated.
//! - Components keep state across renders through hooks on [`Scope`]:
//!   state, reducers, effects, memoised values, callbacks and refs.
//! - State setters never render synchronously. Updates are batched and
//!   applied by [`Runtime::flush`], which then lays the primitives out with
//!   `canopy_layout` and runs effects.
//! - A render error inside a [`boundary`] shows the boundary's fallback;
//!   anywhere else it leaves the committed tree as it was.
//! - Pointer events are hit-tested against the committed geometry and bubble
//!   through `on_pointer` handlers.
//!
//! ## Example
//!
//! ```
//! use canopy_core::{
//!     BoxTreeHost, Element, EventFlow, PointerEvent, PointerHandler, Runtime, Scope, Style,
//!     TextProps, ViewProps, component,
//! };
//! use kurbo::Size;
//!
//! fn counter(scope: &mut Scope<'_>, _: &()) -> Element {
//!     let (count, set) = scope.use_state(0_u32);
//!     let click = PointerHandler::new(move |_| {
//!         set.update(|n| n + 1);
//!         EventFlow::Stop
//!     });
//!     Element::view(ViewProps::new(Style::row().with_size(120.0, 40.0)).on_pointer(click))
//!         .with_children([Element::text(TextProps::new(format!("clicked {count}")))])
//! }
//!
//! let mut runtime = Runtime::new(BoxTreeHost::new(), Size::new(800.0, 600.0));
//! runtime.mount(component(counter, ())).unwrap();
//! runtime.dispatch_pointer(PointerEvent::down((10.0, 10.0))).unwrap();
//!
//! let root = runtime.host().tree().roots()[0];
//! let label = runtime.host().tree().children(root)[0];
//! let visual = runtime.host().visual(canopy_core::HostHandle::new(label.to_bits()));
//! assert_eq!(visual.and_then(|v| v.content.as_deref()), Some("clicked 1"));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
mod element;
mod error;
mod event;
mod hooks;
mod host;
mod instance;
mod keyed;
mod layout_bridge;
mod props;
mod reconcile;
mod scheduler;

#[cfg(test)]
mod testing;

#[cfg(feature = "box_tree_adapter")]
pub use adapters::{BoxTreeHost, Visual};
pub use element::{
    BoundaryElement, ComponentElement, Element, ElementKind, IntoRenderResult, Key, boundary,
    component, memo_component,
};
pub use error::{HostError, PropError, RenderError, RuntimeError};
pub use event::{DispatchOutcome, EventFlow, PointerEvent, PointerKind};
pub use hooks::{Callback, Dispatch, NodeRef, RefHandle, Scope, SetState};
pub use host::{HostAdapter, HostHandle};
pub use props::{
    Border, Color, ImageProps, PointerHandler, Primitive, PropChange, Props, TextProps, ViewProps,
};
pub use scheduler::{FlushReport, Runtime, RuntimeConfig};

pub use canopy_layout::{
    Align, AlignContent, Dimension, Direction, Geometry, Justify, LayoutStats, MeasureConstraints,
    Overflow, Style, Wrap,
};
