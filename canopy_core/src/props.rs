// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed props for the host primitives and their shallow diff.
//!
//! Props are a closed record per primitive kind. Builders clamp out-of-range
//! values; the `try_*` constructors reject them with [`PropError`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use canopy_layout::Style;

use crate::error::PropError;
use crate::event::{EventFlow, PointerEvent};
use crate::hooks::NodeRef;

/// Host primitive kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// A box: background, border, children.
    View,
    /// A run of text measured by the host.
    Text,
    /// An image drawn from a host-resolved source.
    Image,
}

/// An 8-bit RGBA color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba8(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb8(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb8(255, 255, 255);

    /// A color from red, green, blue and alpha components.
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }
}

/// A solid border.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Border {
    /// Stroke width in logical pixels.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

/// A pointer handler attached to a view.
///
/// Compared by identity: two handlers are equal only if they are clones of
/// the same handler.
#[derive(Clone)]
pub struct PointerHandler(Rc<dyn Fn(&PointerEvent) -> EventFlow>);

impl PointerHandler {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&PointerEvent) -> EventFlow + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub(crate) fn call(&self, event: &PointerEvent) -> EventFlow {
        (self.0)(event)
    }
}

impl PartialEq for PointerHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PointerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PointerHandler(..)")
    }
}

const DEFAULT_FONT_SIZE: f64 = 14.0;

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

fn check_opacity(opacity: f64) -> Result<f64, PropError> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(opacity)
    } else {
        Err(PropError::Opacity(opacity))
    }
}

fn check_style(style: Style) -> Result<Style, PropError> {
    if style.is_valid() {
        Ok(style)
    } else {
        Err(PropError::Style)
    }
}

/// Props of a [`Primitive::View`].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewProps {
    /// Layout style.
    pub style: Style,
    /// Fill color.
    pub background: Option<Color>,
    /// Border stroke.
    pub border: Option<Border>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Hidden views keep their layout space but are not drawn or hit.
    pub visible: bool,
    /// Paint and hit-test order among overlapping nodes.
    pub z_index: i32,
    /// Receives pointer events that hit this view or bubble up from a descendant.
    pub on_pointer: Option<PointerHandler>,
    /// Receives this view's committed geometry after each layout pass.
    pub node_ref: Option<NodeRef>,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            style: Style::default(),
            background: None,
            border: None,
            opacity: 1.0,
            visible: true,
            z_index: 0,
            on_pointer: None,
            node_ref: None,
        }
    }
}

impl ViewProps {
    /// Default view props with `style`, sanitized.
    pub fn new(style: Style) -> Self {
        Self::default().with_style(style)
    }

    /// Replace the style. Invalid values are replaced by the nearest valid ones.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style.sanitized();
        self
    }

    /// Replace the style, rejecting invalid values.
    pub fn try_with_style(mut self, style: Style) -> Result<Self, PropError> {
        self.style = check_style(style)?;
        Ok(self)
    }

    /// Set the fill color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Set the border. Negative or non-finite widths become `0`.
    pub fn with_border(mut self, width: f64, color: Color) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.border = Some(Border { width, color });
        self
    }

    /// Set the border, rejecting invalid widths.
    pub fn try_with_border(mut self, width: f64, color: Color) -> Result<Self, PropError> {
        if !width.is_finite() || width < 0.0 {
            return Err(PropError::BorderWidth(width));
        }
        self.border = Some(Border { width, color });
        Ok(self)
    }

    /// Set the opacity, clamped to `0.0..=1.0`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Set the opacity, rejecting values outside `0.0..=1.0`.
    pub fn try_with_opacity(mut self, opacity: f64) -> Result<Self, PropError> {
        self.opacity = check_opacity(opacity)?;
        Ok(self)
    }

    /// Show or hide the view.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Attach a pointer handler.
    pub fn on_pointer(mut self, handler: PointerHandler) -> Self {
        self.on_pointer = Some(handler);
        self
    }

    /// Attach a node ref.
    pub fn with_node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }
}

/// Props of a [`Primitive::Text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextProps {
    /// Layout style.
    pub style: Style,
    /// The text.
    pub content: Rc<str>,
    /// Font size in logical pixels.
    pub font_size: f64,
    /// Text color.
    pub color: Color,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Hidden text keeps its layout space but is not drawn or hit.
    pub visible: bool,
    /// Receives this node's committed geometry after each layout pass.
    pub node_ref: Option<NodeRef>,
}

impl TextProps {
    /// Text with default style and font.
    pub fn new(content: impl Into<Rc<str>>) -> Self {
        Self {
            style: Style::default(),
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            opacity: 1.0,
            visible: true,
            node_ref: None,
        }
    }

    /// Text with a checked font size.
    pub fn try_new(content: impl Into<Rc<str>>, font_size: f64) -> Result<Self, PropError> {
        Self::new(content).try_with_font_size(font_size)
    }

    /// Replace the style. Invalid values are replaced by the nearest valid ones.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style.sanitized();
        self
    }

    /// Replace the style, rejecting invalid values.
    pub fn try_with_style(mut self, style: Style) -> Result<Self, PropError> {
        self.style = check_style(style)?;
        Ok(self)
    }

    /// Set the font size. Non-finite sizes fall back to the default, and
    /// sizes below one pixel become one pixel.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = if font_size.is_finite() {
            font_size.max(1.0)
        } else {
            DEFAULT_FONT_SIZE
        };
        self
    }

    /// Set the font size, rejecting non-finite or non-positive sizes.
    pub fn try_with_font_size(mut self, font_size: f64) -> Result<Self, PropError> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(PropError::FontSize(font_size));
        }
        self.font_size = font_size;
        Ok(self)
    }

    /// Set the text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity, clamped to `0.0..=1.0`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Show or hide the text.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Attach a node ref.
    pub fn with_node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }
}

/// Props of a [`Primitive::Image`].
#[derive(Clone, Debug, PartialEq)]
pub struct ImageProps {
    /// Layout style.
    pub style: Style,
    /// Host-resolved image source.
    pub source: Rc<str>,
    /// Optional tint multiplied over the image.
    pub tint: Option<Color>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Hidden images keep their layout space but are not drawn or hit.
    pub visible: bool,
    /// Receives this node's committed geometry after each layout pass.
    pub node_ref: Option<NodeRef>,
}

impl ImageProps {
    /// An image with default style.
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        Self {
            style: Style::default(),
            source: source.into(),
            tint: None,
            opacity: 1.0,
            visible: true,
            node_ref: None,
        }
    }

    /// Replace the style. Invalid values are replaced by the nearest valid ones.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style.sanitized();
        self
    }

    /// Replace the style, rejecting invalid values.
    pub fn try_with_style(mut self, style: Style) -> Result<Self, PropError> {
        self.style = check_style(style)?;
        Ok(self)
    }

    /// Set the tint.
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Set the opacity, clamped to `0.0..=1.0`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Set the opacity, rejecting values outside `0.0..=1.0`.
    pub fn try_with_opacity(mut self, opacity: f64) -> Result<Self, PropError> {
        self.opacity = check_opacity(opacity)?;
        Ok(self)
    }

    /// Show or hide the image.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Attach a node ref.
    pub fn with_node_ref(mut self, node_ref: NodeRef) -> Self {
        self.node_ref = Some(node_ref);
        self
    }
}

/// Props of a host primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Props {
    /// A view.
    View(ViewProps),
    /// A text run.
    Text(TextProps),
    /// An image.
    Image(ImageProps),
}

impl From<ViewProps> for Props {
    fn from(props: ViewProps) -> Self {
        Self::View(props)
    }
}

impl From<TextProps> for Props {
    fn from(props: TextProps) -> Self {
        Self::Text(props)
    }
}

impl From<ImageProps> for Props {
    fn from(props: ImageProps) -> Self {
        Self::Image(props)
    }
}

/// One visual prop that changed between two commits.
#[derive(Clone, Debug, PartialEq)]
pub enum PropChange {
    /// New fill color.
    Background(Option<Color>),
    /// New border.
    Border(Option<Border>),
    /// New opacity.
    Opacity(f64),
    /// New visibility.
    Visible(bool),
    /// New z-index.
    ZIndex(i32),
    /// New text.
    Content(Rc<str>),
    /// New font size.
    FontSize(f64),
    /// New text color.
    Color(Color),
    /// New image source.
    Source(Rc<str>),
    /// New tint.
    Tint(Option<Color>),
}

impl PropChange {
    /// Returns true if the change alters the node's intrinsic size.
    pub fn affects_layout(&self) -> bool {
        matches!(self, Self::Content(_) | Self::FontSize(_) | Self::Source(_))
    }
}

impl Props {
    /// The primitive these props describe.
    pub fn primitive(&self) -> Primitive {
        match self {
            Self::View(_) => Primitive::View,
            Self::Text(_) => Primitive::Text,
            Self::Image(_) => Primitive::Image,
        }
    }

    /// Layout style.
    pub fn style(&self) -> &Style {
        match self {
            Self::View(p) => &p.style,
            Self::Text(p) => &p.style,
            Self::Image(p) => &p.style,
        }
    }

    /// Whether the node is drawn and hit-tested.
    pub fn visible(&self) -> bool {
        match self {
            Self::View(p) => p.visible,
            Self::Text(p) => p.visible,
            Self::Image(p) => p.visible,
        }
    }

    /// Z-index; only views carry one.
    pub fn z_index(&self) -> i32 {
        match self {
            Self::View(p) => p.z_index,
            Self::Text(_) | Self::Image(_) => 0,
        }
    }

    /// Pointer handler, for views that have one.
    pub fn on_pointer(&self) -> Option<&PointerHandler> {
        match self {
            Self::View(p) => p.on_pointer.as_ref(),
            Self::Text(_) | Self::Image(_) => None,
        }
    }

    /// Node ref, if attached.
    pub fn node_ref(&self) -> Option<&NodeRef> {
        match self {
            Self::View(p) => p.node_ref.as_ref(),
            Self::Text(p) => p.node_ref.as_ref(),
            Self::Image(p) => p.node_ref.as_ref(),
        }
    }

    /// Check every value against its valid range.
    pub fn validate(&self) -> Result<(), PropError> {
        check_style(*self.style())?;
        match self {
            Self::View(p) => {
                check_opacity(p.opacity)?;
                if let Some(border) = p.border
                    && (!border.width.is_finite() || border.width < 0.0)
                {
                    return Err(PropError::BorderWidth(border.width));
                }
            }
            Self::Text(p) => {
                check_opacity(p.opacity)?;
                if !p.font_size.is_finite() || p.font_size <= 0.0 {
                    return Err(PropError::FontSize(p.font_size));
                }
            }
            Self::Image(p) => {
                check_opacity(p.opacity)?;
            }
        }
        Ok(())
    }

    /// Visual props of `next` that differ from `self`.
    ///
    /// Style, handlers and node refs never appear: style is consumed by
    /// layout, and the others are not host-visible. Props of different
    /// primitives are never diffed; the reconciler replaces the node instead,
    /// so the result is empty.
    pub fn diff(&self, next: &Self) -> Vec<PropChange> {
        let mut changes = Vec::new();
        let mut push = |changed: bool, change: PropChange| {
            if changed {
                changes.push(change);
            }
        };
        match (self, next) {
            (Self::View(a), Self::View(b)) => {
                push(a.background != b.background, PropChange::Background(b.background));
                push(a.border != b.border, PropChange::Border(b.border));
                push(a.opacity != b.opacity, PropChange::Opacity(b.opacity));
                push(a.visible != b.visible, PropChange::Visible(b.visible));
                push(a.z_index != b.z_index, PropChange::ZIndex(b.z_index));
            }
            (Self::Text(a), Self::Text(b)) => {
                push(a.content != b.content, PropChange::Content(b.content.clone()));
                push(a.font_size != b.font_size, PropChange::FontSize(b.font_size));
                push(a.color != b.color, PropChange::Color(b.color));
                push(a.opacity != b.opacity, PropChange::Opacity(b.opacity));
                push(a.visible != b.visible, PropChange::Visible(b.visible));
            }
            (Self::Image(a), Self::Image(b)) => {
                push(a.source != b.source, PropChange::Source(b.source.clone()));
                push(a.tint != b.tint, PropChange::Tint(b.tint));
                push(a.opacity != b.opacity, PropChange::Opacity(b.opacity));
                push(a.visible != b.visible, PropChange::Visible(b.visible));
            }
            _ => {}
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use canopy_layout::Dimension;

    #[test]
    fn builders_clamp_and_try_rejects() {
        assert_eq!(ViewProps::default().with_opacity(3.0).opacity, 1.0);
        assert_eq!(ViewProps::default().with_opacity(f64::NAN).opacity, 1.0);
        assert_eq!(
            ViewProps::default().try_with_opacity(-0.5),
            Err(PropError::Opacity(-0.5))
        );
        assert_eq!(TextProps::new("a").with_font_size(0.0).font_size, 1.0);
        assert_eq!(
            TextProps::try_new("a", 0.0),
            Err(PropError::FontSize(0.0))
        );
        let bad = Style::default().with_width(Dimension::percent(2.0));
        assert_eq!(
            ViewProps::default().try_with_style(bad),
            Err(PropError::Style)
        );
        assert!(ViewProps::new(bad).style.is_valid());
    }

    #[test]
    fn diff_reports_only_changed_visuals() {
        let a = Props::from(ViewProps::default().with_background(Color::WHITE));
        let b = Props::from(
            ViewProps::default()
                .with_background(Color::BLACK)
                .with_style(Style::row()),
        );
        assert_eq!(a.diff(&b), vec![PropChange::Background(Some(Color::BLACK))]);
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn handlers_compare_by_identity() {
        let h = PointerHandler::new(|_| EventFlow::Continue);
        assert_eq!(h, h.clone());
        assert_ne!(h, PointerHandler::new(|_| EventFlow::Continue));
        // Handlers are not visual, so a new closure alone issues no change.
        let a = Props::from(ViewProps::default().on_pointer(h));
        let b = Props::from(ViewProps::default().on_pointer(PointerHandler::new(|_| EventFlow::Stop)));
        assert!(a.diff(&b).is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn text_changes_affect_layout() {
        let a = Props::from(TextProps::new("hi"));
        let b = Props::from(TextProps::new("hello"));
        let changes = a.diff(&b);
        assert_eq!(changes, vec![PropChange::Content("hello".into())]);
        assert!(changes[0].affects_layout());
    }

    #[test]
    fn validate_checks_every_field() {
        let mut text = TextProps::new("x");
        text.font_size = -1.0;
        assert_eq!(Props::Text(text).validate(), Err(PropError::FontSize(-1.0)));
        assert!(Props::from(ImageProps::new("cat.png")).validate().is_ok());
    }
}
