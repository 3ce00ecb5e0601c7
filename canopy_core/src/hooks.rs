// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance hook state and the [`Scope`] render functions call hooks on.
//!
//! A component's hooks live in an ordered list of slots. Every render walks
//! the list from the start, one slot per hook call, so a component must call
//! the same hooks in the same order every time. A different kind, value type
//! or count of hooks is reported as a [`RenderError`] instead of silently
//! handing one hook's state to another.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::cell::{Cell, Ref, RefCell, RefMut};
use core::fmt;

use canopy_layout::Geometry;
use log::{error, warn};

use crate::element::Element;
use crate::error::RenderError;
use crate::scheduler::Shared;

type Cleanup = Box<dyn FnOnce()>;
type CleanupCell = Rc<RefCell<Option<Cleanup>>>;

/// Update signal shared between a component instance and its setters.
pub(crate) struct ComponentFlags {
    name: &'static str,
    version: Cell<u64>,
    mounted: Cell<bool>,
    shared: Weak<Shared>,
}

impl ComponentFlags {
    pub(crate) fn new(name: &'static str, shared: Weak<Shared>) -> Self {
        Self {
            name,
            version: Cell::new(0),
            mounted: Cell::new(false),
            shared,
        }
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.get()
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub(crate) fn set_mounted(&self, mounted: bool) {
        self.mounted.set(mounted);
    }

    /// Invalidate the last render and ask the runtime for a pass.
    fn mark_dirty(&self) {
        self.version.set(self.version.get().wrapping_add(1));
        if let Some(shared) = self.shared.upgrade() {
            shared.request();
        }
    }
}

impl fmt::Debug for ComponentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFlags")
            .field("name", &self.name)
            .field("version", &self.version.get())
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct EffectSlot {
    deps: Rc<dyn Any>,
    cleanup: CleanupCell,
}

#[derive(Clone)]
enum Slot {
    State(Rc<dyn Any>),
    Effect(EffectSlot),
    Memo(Rc<dyn Any>),
    Ref(Rc<dyn Any>),
}

impl Slot {
    fn tag(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
            Self::Effect(_) => "effect",
            Self::Memo(_) => "memo",
            Self::Ref(_) => "ref",
        }
    }
}

/// The hook slots of one component instance.
///
/// Cloning is shallow: state cells and effect cleanups are shared, so a
/// render can work on a clone and the commit can swap it in.
#[derive(Clone, Default)]
pub(crate) struct HookStore {
    slots: Vec<Slot>,
}

impl HookStore {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Run every pending effect cleanup, in slot order.
    pub(crate) fn run_cleanups(&self) {
        for slot in &self.slots {
            if let Slot::Effect(effect) = slot {
                let cleanup = effect.cleanup.borrow_mut().take();
                if let Some(cleanup) = cleanup {
                    cleanup();
                }
            }
        }
    }
}

impl fmt::Debug for HookStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(Slot::tag))
            .finish()
    }
}

/// An effect whose dependencies changed, queued until after layout.
pub(crate) struct PendingEffect {
    flags: Rc<ComponentFlags>,
    cleanup: CleanupCell,
    effect: Box<dyn FnOnce() -> Option<Cleanup>>,
}

impl PendingEffect {
    /// Run the previous cleanup of the slot, then the effect.
    ///
    /// Returns false if the owner was unmounted before the effect got to run.
    pub(crate) fn run(self) -> bool {
        if !self.flags.is_mounted() {
            return false;
        }
        let previous = self.cleanup.borrow_mut().take();
        if let Some(previous) = previous {
            previous();
        }
        let next = (self.effect)();
        *self.cleanup.borrow_mut() = next;
        true
    }
}

impl fmt::Debug for PendingEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEffect")
            .field("owner", &self.flags.name)
            .finish_non_exhaustive()
    }
}

struct MemoCell<D, T> {
    deps: D,
    value: T,
}

/// Hook access for one render of one component.
pub struct Scope<'a> {
    store: &'a mut HookStore,
    flags: &'a Rc<ComponentFlags>,
    children: &'a [Element],
    cursor: usize,
    previous_len: Option<usize>,
    effects: Vec<PendingEffect>,
    error: Option<RenderError>,
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("component", &self.flags.name)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        store: &'a mut HookStore,
        flags: &'a Rc<ComponentFlags>,
        children: &'a [Element],
        previous_len: Option<usize>,
    ) -> Self {
        Self {
            store,
            flags,
            children,
            cursor: 0,
            previous_len,
            effects: Vec::new(),
            error: None,
        }
    }

    /// Children passed to the component element.
    pub fn children(&self) -> &'a [Element] {
        self.children
    }

    fn fail(&mut self, err: RenderError) {
        error!("hook misuse in {}: {err}", self.flags.name);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// The slot for the next hook call if it has the expected tag.
    ///
    /// Advances the cursor. A slot of another kind is reported; the caller
    /// then overwrites it with a fresh one so the render can continue.
    fn next_slot(&mut self, tag: &'static str) -> (usize, Option<Slot>) {
        let index = self.cursor;
        self.cursor += 1;
        match self.store.slots.get(index).cloned() {
            Some(slot) if slot.tag() == tag => (index, Some(slot)),
            Some(slot) => {
                self.fail(RenderError::HookMismatch {
                    index,
                    expected: tag,
                    found: slot.tag(),
                });
                (index, None)
            }
            None => (index, None),
        }
    }

    fn wrong_type<T>(&mut self, index: usize, tag: &'static str) {
        self.fail(RenderError::HookMismatch {
            index,
            expected: type_name::<T>(),
            found: tag,
        });
    }

    fn put(&mut self, index: usize, slot: Slot) {
        if index < self.store.slots.len() {
            self.store.slots[index] = slot;
        } else {
            self.store.slots.push(slot);
        }
    }

    fn state_cell<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let (index, slot) = self.next_slot("state");
        if let Some(Slot::State(any)) = slot {
            match any.downcast::<RefCell<T>>() {
                Ok(cell) => return cell,
                Err(_) => self.wrong_type::<T>(index, "state"),
            }
        }
        let cell = Rc::new(RefCell::new(init()));
        self.put(index, Slot::State(cell.clone()));
        cell
    }

    /// Local state, initialised on the first render.
    ///
    /// Returns the current value and a setter. Setting schedules a re-render
    /// of this component; it never renders synchronously.
    pub fn use_state<T: Clone + 'static>(&mut self, init: T) -> (T, SetState<T>) {
        self.use_state_with(|| init)
    }

    /// Like [`Scope::use_state`], with a lazily computed initial value.
    pub fn use_state_with<T: Clone + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> (T, SetState<T>) {
        let cell = self.state_cell(init);
        let value = cell.borrow().clone();
        let setter = SetState {
            cell: Rc::downgrade(&cell),
            flags: Rc::downgrade(self.flags),
        };
        (value, setter)
    }

    /// State driven by a reducer.
    ///
    /// Each dispatched action replaces the state with `reducer(&state, action)`.
    pub fn use_reducer<S, A, R>(&mut self, init: S, reducer: R) -> (S, Dispatch<A>)
    where
        S: Clone + 'static,
        A: 'static,
        R: Fn(&S, A) -> S + 'static,
    {
        let (state, set) = self.use_state(init);
        let dispatch = Dispatch(Rc::new(move |action: A| {
            set.update(|state| reducer(state, action));
        }));
        (state, dispatch)
    }

    /// Run `effect` after commit and layout when `deps` changed.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() + 'static,
    {
        self.schedule_effect(deps, Box::new(move || {
            effect();
            None
        }));
    }

    /// Like [`Scope::use_effect`], with a cleanup.
    ///
    /// The cleanup runs right before the next run of this effect, or when the
    /// component unmounts.
    pub fn use_effect_with_cleanup<D, F, C>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> C + 'static,
        C: FnOnce() + 'static,
    {
        self.schedule_effect(deps, Box::new(move || Some(Box::new(effect()) as Cleanup)));
    }

    fn schedule_effect<D: PartialEq + 'static>(
        &mut self,
        deps: D,
        effect: Box<dyn FnOnce() -> Option<Cleanup>>,
    ) {
        let (index, slot) = self.next_slot("effect");
        let mut cleanup = None;
        if let Some(Slot::Effect(previous)) = slot {
            match previous.deps.downcast_ref::<D>() {
                Some(old) if *old == deps => return,
                Some(_) => cleanup = Some(previous.cleanup),
                None => self.wrong_type::<D>(index, "effect"),
            }
        }
        let cleanup = cleanup.unwrap_or_default();
        self.put(
            index,
            Slot::Effect(EffectSlot {
                deps: Rc::new(deps),
                cleanup: cleanup.clone(),
            }),
        );
        self.effects.push(PendingEffect {
            flags: self.flags.clone(),
            cleanup,
            effect,
        });
    }

    /// A value recomputed only when `deps` change.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce(&D) -> T) -> T
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        let (index, slot) = self.next_slot("memo");
        if let Some(Slot::Memo(any)) = slot {
            match any.downcast_ref::<MemoCell<D, T>>() {
                Some(memo) if memo.deps == deps => return memo.value.clone(),
                Some(_) => {}
                None => self.wrong_type::<T>(index, "memo"),
            }
        }
        let value = compute(&deps);
        self.put(
            index,
            Slot::Memo(Rc::new(MemoCell {
                deps,
                value: value.clone(),
            })),
        );
        value
    }

    /// A callback whose identity only changes when `deps` change.
    pub fn use_callback<D, A, R>(&mut self, deps: D, f: impl Fn(A) -> R + 'static) -> Callback<A, R>
    where
        D: PartialEq + 'static,
        A: 'static,
        R: 'static,
    {
        self.use_memo(deps, move |_| Callback(Rc::new(f)))
    }

    fn ref_cell<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> T {
        let (index, slot) = self.next_slot("ref");
        if let Some(Slot::Ref(any)) = slot {
            match any.downcast_ref::<T>() {
                Some(handle) => return handle.clone(),
                None => self.wrong_type::<T>(index, "ref"),
            }
        }
        let handle = init();
        self.put(index, Slot::Ref(Rc::new(handle.clone())));
        handle
    }

    /// A mutable cell that survives re-renders.
    ///
    /// Writing to it does not schedule a render.
    pub fn use_ref<T: 'static>(&mut self, init: T) -> RefHandle<T> {
        self.ref_cell(|| RefHandle(Rc::new(RefCell::new(init))))
    }

    /// A [`NodeRef`] to attach to a primitive's props.
    pub fn use_node_ref(&mut self) -> NodeRef {
        self.ref_cell(NodeRef::new)
    }

    /// Close the render: check the hook count and hand back queued effects.
    pub(crate) fn finish(mut self) -> Result<Vec<PendingEffect>, RenderError> {
        if let Some(previous) = self.previous_len
            && previous != self.cursor
        {
            self.fail(RenderError::HookCount {
                previous,
                current: self.cursor,
            });
        }
        self.store.slots.truncate(self.cursor);
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.effects),
        }
    }

    /// Close a render whose component returned an error.
    ///
    /// The hook count of a partial render means nothing, so only a slot-tag
    /// mismatch recorded during the render is reported ahead of `err`.
    pub(crate) fn abort(self, err: RenderError) -> RenderError {
        self.error.unwrap_or(err)
    }
}

/// Setter returned by [`Scope::use_state`].
pub struct SetState<T> {
    cell: Weak<RefCell<T>>,
    flags: Weak<ComponentFlags>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            flags: self.flags.clone(),
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl<T> SetState<T> {
    /// Whether the owning component is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.flags.upgrade().is_some_and(|flags| flags.is_mounted())
    }

    fn live(&self) -> Option<(Rc<RefCell<T>>, Rc<ComponentFlags>)> {
        let Some(flags) = self.flags.upgrade() else {
            warn!("state update on a dropped component ignored");
            return None;
        };
        if !flags.is_mounted() {
            warn!("state update on unmounted component {} ignored", flags.name);
            return None;
        }
        Some((self.cell.upgrade()?, flags))
    }

    /// Replace the state and schedule a re-render.
    ///
    /// Setting an equal value still schedules one.
    pub fn set(&self, value: T) {
        if let Some((cell, flags)) = self.live() {
            *cell.borrow_mut() = value;
            flags.mark_dirty();
        }
    }

    /// Replace the state with `f(&current)` and schedule a re-render.
    ///
    /// Updates apply immediately, so consecutive updates each see the
    /// previous result.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if let Some((cell, flags)) = self.live() {
            let next = {
                let current = cell.borrow();
                f(&current)
            };
            *cell.borrow_mut() = next;
            flags.mark_dirty();
        }
    }
}

/// Action sender returned by [`Scope::use_reducer`].
pub struct Dispatch<A>(Rc<dyn Fn(A)>);

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch(..)")
    }
}

impl<A> Dispatch<A> {
    /// Reduce `action` into the state.
    pub fn dispatch(&self, action: A) {
        (self.0)(action);
    }
}

/// A memoised function returned by [`Scope::use_callback`].
///
/// Compared by identity.
pub struct Callback<A, R = ()>(Rc<dyn Fn(A) -> R>);

impl<A, R> Callback<A, R> {
    /// Invoke the callback.
    pub fn call(&self, arg: A) -> R {
        (self.0)(arg)
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A, R> PartialEq for Callback<A, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A, R> fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Handle returned by [`Scope::use_ref`]. Clones alias the same cell.
pub struct RefHandle<T>(Rc<RefCell<T>>);

impl<T> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for RefHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: fmt::Debug> fmt::Debug for RefHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefHandle").field(&self.0.borrow()).finish()
    }
}

impl<T> RefHandle<T> {
    /// Borrow the value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the value mutably.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Replace the value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> RefHandle<T> {
    /// A copy of the value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

/// Receives the committed geometry of the primitive it is attached to.
///
/// The runtime writes the geometry after every layout pass that changes it,
/// and clears it when the primitive is destroyed. Compared by identity.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<Option<Geometry>>>);

impl NodeRef {
    /// A detached node ref.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last geometry committed for the attached primitive.
    pub fn get(&self) -> Option<Geometry> {
        *self.0.borrow()
    }

    pub(crate) fn set(&self, geometry: Option<Geometry>) {
        *self.0.borrow_mut() = geometry;
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}
