// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element descriptors: the immutable trees that render functions return.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::error::RenderError;
use crate::hooks::Scope;
use crate::props::{ImageProps, Props, TextProps, ViewProps};

/// Identity of an element among its siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// An integer key.
    Int(i64),
    /// A string key.
    Str(Rc<str>),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<Rc<str>> for Key {
    fn from(value: Rc<str>) -> Self {
        Self::Str(value)
    }
}

type RenderFn = dyn Fn(&mut Scope<'_>, &dyn Any) -> Result<Element, RenderError>;

/// A component invocation: a render function plus its props.
#[derive(Clone)]
pub struct ComponentElement {
    type_id: TypeId,
    name: &'static str,
    props: Rc<dyn Any>,
    render: Rc<RenderFn>,
    props_eq: Option<fn(&dyn Any, &dyn Any) -> bool>,
}

impl ComponentElement {
    /// Type name of the render function, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn same_type(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }

    /// Whether `self` may skip rendering given the props it rendered with last time.
    ///
    /// Identical props always match; memoised components also match equal props.
    pub(crate) fn props_match(&self, previous: &Self) -> bool {
        if Rc::ptr_eq(&self.props, &previous.props) {
            return true;
        }
        self.props_eq
            .is_some_and(|eq| eq(&*self.props, &*previous.props))
    }

    pub(crate) fn call(&self, scope: &mut Scope<'_>) -> Result<Element, RenderError> {
        (self.render)(scope, &*self.props)
    }
}

impl fmt::Debug for ComponentElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentElement")
            .field("name", &self.name)
            .field("memo", &self.props_eq.is_some())
            .finish_non_exhaustive()
    }
}

/// An error boundary: renders `child`, or `fallback` if `child` fails.
#[derive(Clone)]
pub struct BoundaryElement {
    pub(crate) child: Element,
    pub(crate) fallback: Rc<dyn Fn(&RenderError) -> Element>,
}

impl fmt::Debug for BoundaryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryElement")
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

/// What an element describes.
#[derive(Clone, Debug)]
pub enum ElementKind {
    /// A host primitive.
    Host(Props),
    /// A component.
    Component(ComponentElement),
    /// An error boundary.
    Boundary(BoundaryElement),
    /// Nothing.
    Empty,
}

#[derive(Clone, Debug)]
struct ElementInner {
    kind: ElementKind,
    key: Option<Key>,
    children: Vec<Element>,
}

/// An immutable description of a piece of UI.
///
/// Elements are cheap to clone; clones share their contents.
#[derive(Clone, Debug)]
pub struct Element(Rc<ElementInner>);

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self(Rc::new(ElementInner {
            kind,
            key: None,
            children: Vec::new(),
        }))
    }

    /// A host primitive element.
    pub fn host(props: impl Into<Props>) -> Self {
        Self::new(ElementKind::Host(props.into()))
    }

    /// A [`Primitive::View`](crate::Primitive::View).
    pub fn view(props: ViewProps) -> Self {
        Self::host(props)
    }

    /// A [`Primitive::Text`](crate::Primitive::Text).
    pub fn text(props: TextProps) -> Self {
        Self::host(props)
    }

    /// A [`Primitive::Image`](crate::Primitive::Image).
    pub fn image(props: ImageProps) -> Self {
        Self::host(props)
    }

    /// An element that renders nothing.
    pub fn empty() -> Self {
        Self::new(ElementKind::Empty)
    }

    /// Give the element a key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        Rc::make_mut(&mut self.0).key = Some(key.into());
        self
    }

    /// Replace the element's children.
    ///
    /// Host children become child primitives. A component receives them
    /// through [`Scope::children`].
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        Rc::make_mut(&mut self.0).children = children.into_iter().collect();
        self
    }

    /// What the element describes.
    pub fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    /// The element's key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.0.key.as_ref()
    }

    /// The element's children.
    pub fn children(&self) -> &[Self] {
        &self.0.children
    }

    /// Host props, if this is a host element.
    pub fn props(&self) -> Option<&Props> {
        match &self.0.kind {
            ElementKind::Host(props) => Some(props),
            _ => None,
        }
    }

    /// Returns true if both elements are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether an instance created for `self` can be updated in place to `other`.
    pub(crate) fn same_kind(&self, other: &Self) -> bool {
        match (self.kind(), other.kind()) {
            (ElementKind::Host(a), ElementKind::Host(b)) => a.primitive() == b.primitive(),
            (ElementKind::Component(a), ElementKind::Component(b)) => a.same_type(b),
            (ElementKind::Boundary(_), ElementKind::Boundary(_))
            | (ElementKind::Empty, ElementKind::Empty) => true,
            _ => false,
        }
    }
}

impl From<ViewProps> for Element {
    fn from(props: ViewProps) -> Self {
        Self::view(props)
    }
}

impl From<TextProps> for Element {
    fn from(props: TextProps) -> Self {
        Self::text(props)
    }
}

impl From<ImageProps> for Element {
    fn from(props: ImageProps) -> Self {
        Self::image(props)
    }
}

/// Values a render function may return.
pub trait IntoRenderResult {
    /// Convert into the reconciler's render result.
    fn into_render_result(self) -> Result<Element, RenderError>;
}

impl IntoRenderResult for Element {
    fn into_render_result(self) -> Result<Element, RenderError> {
        Ok(self)
    }
}

impl IntoRenderResult for Result<Element, RenderError> {
    fn into_render_result(self) -> Self {
        self
    }
}

fn erase<F, P, R>(render: F, props: P, props_eq: Option<fn(&dyn Any, &dyn Any) -> bool>) -> Element
where
    F: Fn(&mut Scope<'_>, &P) -> R + 'static,
    P: 'static,
    R: IntoRenderResult,
{
    let name = core::any::type_name::<F>();
    let erased = move |scope: &mut Scope<'_>, props: &dyn Any| match props.downcast_ref::<P>() {
        Some(props) => render(scope, props).into_render_result(),
        None => Err(RenderError::failed(name)),
    };
    Element::new(ElementKind::Component(ComponentElement {
        type_id: TypeId::of::<F>(),
        name,
        props: Rc::new(props),
        render: Rc::new(erased),
        props_eq,
    }))
}

/// A component element.
///
/// The component's identity is the type of `render`: two elements at the
/// same position update one instance only if they were built from the same
/// function or closure expression.
///
/// ```
/// use canopy_core::{component, Element, Scope, TextProps};
///
/// fn greeting(_: &mut Scope<'_>, name: &&'static str) -> Element {
///     Element::text(TextProps::new(*name))
/// }
///
/// let element = component(greeting, "world");
/// assert!(element.props().is_none());
/// ```
pub fn component<F, P, R>(render: F, props: P) -> Element
where
    F: Fn(&mut Scope<'_>, &P) -> R + 'static,
    P: 'static,
    R: IntoRenderResult,
{
    erase(render, props, None)
}

fn props_eq<P: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<P>(), b.downcast_ref::<P>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// A component element that skips re-rendering when its props compare equal
/// and it has no pending state update.
pub fn memo_component<F, P, R>(render: F, props: P) -> Element
where
    F: Fn(&mut Scope<'_>, &P) -> R + 'static,
    P: PartialEq + 'static,
    R: IntoRenderResult,
{
    erase(render, props, Some(props_eq::<P>))
}

/// An error boundary around `child`.
///
/// A render error anywhere below the boundary replaces `child` with
/// `fallback(&error)`. The next render tries `child` again.
pub fn boundary(child: Element, fallback: impl Fn(&RenderError) -> Element + 'static) -> Element {
    Element::new(ElementKind::Boundary(BoundaryElement {
        child,
        fallback: Rc::new(fallback),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn a(_: &mut Scope<'_>, _: &()) -> Element {
        Element::empty()
    }

    fn b(_: &mut Scope<'_>, _: &()) -> Element {
        Element::empty()
    }

    #[test]
    fn component_identity_is_the_render_function() {
        assert!(component(a, ()).same_kind(&component(a, ())));
        assert!(!component(a, ()).same_kind(&component(b, ())));
        assert!(!component(a, ()).same_kind(&Element::empty()));
    }

    #[test]
    fn host_kinds_compare_by_primitive() {
        let view = Element::view(ViewProps::default());
        let text = Element::text(TextProps::new("x"));
        assert!(view.same_kind(&Element::view(ViewProps::default().with_z_index(3))));
        assert!(!view.same_kind(&text));
    }

    #[test]
    fn keys_and_children_do_not_alias_clones() {
        let base = Element::view(ViewProps::default());
        let keyed = base.clone().with_key("row").with_children(vec![Element::empty()]);
        assert_eq!(base.key(), None);
        assert!(base.children().is_empty());
        assert_eq!(keyed.key(), Some(&Key::from("row")));
        assert_eq!(keyed.children().len(), 1);
    }

    #[test]
    fn memo_props_compare_by_value() {
        let (ElementKind::Component(x), ElementKind::Component(y)) =
            (memo_component(a, ()).kind().clone(), memo_component(a, ()).kind().clone())
        else {
            unreachable!("both are components");
        };
        assert!(x.props_match(&y));
        let (ElementKind::Component(x), ElementKind::Component(y)) =
            (component(a, ()).kind().clone(), component(a, ()).kind().clone())
        else {
            unreachable!("both are components");
        };
        assert!(!x.props_match(&y), "plain components only match identical props");
    }
}
