// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout-relevant style: direction, sizing, spacing, flex factors, and alignment.
//!
//! A [`Style`] is the layout view of a node. It is plain `Copy` data so that a
//! reconciler can diff it cheaply and mark the node dirty only when it changes.

use kurbo::Insets;

/// How a container places its children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Children flow left to right; the main axis is horizontal.
    Row,
    /// Children flow top to bottom; the main axis is vertical.
    #[default]
    Column,
    /// No flow: each child sits at its own [`Style::x`]/[`Style::y`] offset
    /// inside the container's content box.
    Stack,
}

/// Size constraint along one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Dimension {
    /// Size to content: sum of children along the main axis, max along the
    /// cross axis, plus padding. Leaves ask the host for intrinsic content size.
    #[default]
    Auto,
    /// A literal size in logical pixels.
    Fixed(f64),
    /// A fraction (`0.0..=1.0`) of the parent's resolved content size.
    ///
    /// Falls back to [`Dimension::Auto`] when the parent's size is not known.
    Percent(f64),
    /// Zero intrinsically; grows to consume leftover space in the parent.
    ///
    /// A container whose own size on that axis is [`Dimension::Auto`] has no
    /// leftover space, so `Fill` children of such a container resolve to `0`.
    Fill,
}

impl Dimension {
    /// Fixed size in logical pixels.
    pub const fn px(value: f64) -> Self {
        Self::Fixed(value)
    }

    /// Fraction of the parent's content size, e.g. `Dimension::percent(0.5)`.
    pub const fn percent(fraction: f64) -> Self {
        Self::Percent(fraction)
    }

    /// Returns true for [`Dimension::Auto`].
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against a parent size, if that can be done without measuring.
    ///
    /// `Fill` and `Auto` never resolve here; `Percent` resolves only when the
    /// parent size is known.
    pub fn resolve(self, parent: Option<f64>) -> Option<f64> {
        match self {
            Self::Fixed(v) => Some(v),
            Self::Percent(p) => parent.map(|size| size * p),
            Self::Auto | Self::Fill => None,
        }
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

/// Whether flow children may break onto multiple lines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wrap {
    /// All children share one line.
    #[default]
    NoWrap,
    /// Start a new line when the next child would overflow the main axis.
    Wrap,
}

/// Main-axis placement of children within a line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// Pack at the start.
    #[default]
    Start,
    /// Pack around the center.
    Center,
    /// Pack at the end.
    End,
    /// First and last child touch the edges; free space goes between children.
    SpaceBetween,
    /// Each child gets equal free space on both sides.
    SpaceAround,
    /// Equal free space between children and at both edges.
    SpaceEvenly,
}

/// Cross-axis placement of a child within its line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Align to the cross start.
    Start,
    /// Center on the cross axis.
    Center,
    /// Align to the cross end.
    End,
    /// Fill the line's cross size when the child's cross size is `Auto`.
    #[default]
    Stretch,
}

/// Cross-axis placement of lines in a wrapping container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignContent {
    /// Lines packed at the cross start.
    #[default]
    Start,
    /// Lines packed around the center.
    Center,
    /// Lines packed at the cross end.
    End,
    /// Free space between lines.
    SpaceBetween,
    /// Equal free space around each line.
    SpaceAround,
    /// Equal free space between lines and at both edges.
    SpaceEvenly,
    /// Free space added equally to every line's cross size.
    Stretch,
}

/// Whether a container clips its descendants.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    /// No clip is introduced; the inherited clip passes through unchanged.
    #[default]
    Visible,
    /// Descendants are clipped to this container's content box.
    Hidden,
}

/// The layout-relevant subset of a node's props.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Style {
    /// Flow direction for children.
    pub direction: Direction,
    /// Width constraint.
    pub width: Dimension,
    /// Height constraint.
    pub height: Dimension,
    /// Lower width bound. Wins over `max_width` when they conflict.
    pub min_width: Option<f64>,
    /// Upper width bound.
    pub max_width: Option<f64>,
    /// Lower height bound. Wins over `max_height` when they conflict.
    pub min_height: Option<f64>,
    /// Upper height bound.
    pub max_height: Option<f64>,
    /// Inner spacing; shrinks the content box.
    pub padding: Insets,
    /// Outer spacing; separates this node from its computed position.
    pub margin: Insets,
    /// Space between adjacent children along the main axis.
    pub gap: f64,
    /// Space between wrapped lines along the cross axis.
    pub line_gap: f64,
    /// Share of positive free space along the parent's main axis.
    pub flex_grow: f64,
    /// Share of negative free space along the parent's main axis.
    ///
    /// Defaults to `0`: children keep their size and overflow unless they opt in.
    pub flex_shrink: f64,
    /// Main-axis size used as the flex base instead of `width`/`height`.
    pub flex_basis: Dimension,
    /// Line breaking for flow children.
    pub wrap: Wrap,
    /// Main-axis distribution of children.
    pub justify: Justify,
    /// Default cross-axis alignment for children.
    pub align_items: Align,
    /// Per-child override of the parent's `align_items`.
    pub align_self: Option<Align>,
    /// Placement of wrapped lines.
    pub align_content: AlignContent,
    /// Clipping of descendants.
    pub overflow: Overflow,
    /// Horizontal offset, applied when the parent is a [`Direction::Stack`].
    pub x: f64,
    /// Vertical offset, applied when the parent is a [`Direction::Stack`].
    pub y: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Column,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            gap: 0.0,
            line_gap: 0.0,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: Dimension::Auto,
            wrap: Wrap::NoWrap,
            justify: Justify::Start,
            align_items: Align::Stretch,
            align_self: None,
            align_content: AlignContent::Start,
            overflow: Overflow::Visible,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl Style {
    /// A row container.
    pub fn row() -> Self {
        Self {
            direction: Direction::Row,
            ..Self::default()
        }
    }

    /// A column container.
    pub fn column() -> Self {
        Self::default()
    }

    /// A stack container (absolute child offsets).
    pub fn stack() -> Self {
        Self {
            direction: Direction::Stack,
            ..Self::default()
        }
    }

    /// Set the width constraint.
    #[must_use]
    pub fn with_width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    /// Set the height constraint.
    #[must_use]
    pub fn with_height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = height.into();
        self
    }

    /// Set both size constraints.
    #[must_use]
    pub fn with_size(self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.with_width(width).with_height(height)
    }

    /// Set width bounds.
    #[must_use]
    pub fn with_width_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    /// Set height bounds.
    #[must_use]
    pub fn with_height_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_height = min;
        self.max_height = max;
        self
    }

    /// Set padding.
    #[must_use]
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Set margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Set the main-axis gap.
    #[must_use]
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the grow factor.
    #[must_use]
    pub fn with_grow(mut self, grow: f64) -> Self {
        self.flex_grow = grow;
        self
    }

    /// Set the shrink factor.
    #[must_use]
    pub fn with_shrink(mut self, shrink: f64) -> Self {
        self.flex_shrink = shrink;
        self
    }

    /// Enable wrapping with the given gap between lines.
    #[must_use]
    pub fn with_wrap(mut self, line_gap: f64) -> Self {
        self.wrap = Wrap::Wrap;
        self.line_gap = line_gap;
        self
    }

    /// Set main-axis justification.
    #[must_use]
    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    /// Set cross-axis alignment for children.
    #[must_use]
    pub fn with_align_items(mut self, align: Align) -> Self {
        self.align_items = align;
        self
    }

    /// Set clipping.
    #[must_use]
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set the offset used inside a stack parent.
    #[must_use]
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Clamp a width to `min_width`/`max_width`. `min` wins on conflict.
    pub fn clamp_width(&self, width: f64) -> f64 {
        clamp(width, self.min_width, self.max_width)
    }

    /// Clamp a height to `min_height`/`max_height`. `min` wins on conflict.
    pub fn clamp_height(&self, height: f64) -> f64 {
        clamp(height, self.min_height, self.max_height)
    }

    /// Returns true if every numeric field is finite and every size is non-negative.
    pub fn is_valid(&self) -> bool {
        let dims = [self.width, self.height, self.flex_basis];
        let dims_ok = dims.iter().all(|d| match *d {
            Dimension::Fixed(v) => v.is_finite() && v >= 0.0,
            Dimension::Percent(p) => p.is_finite() && (0.0..=1.0).contains(&p),
            Dimension::Auto | Dimension::Fill => true,
        });
        let bounds = [self.min_width, self.max_width, self.min_height, self.max_height];
        let bounds_ok = bounds
            .iter()
            .flatten()
            .all(|v| v.is_finite() && *v >= 0.0);
        let insets = [self.padding, self.margin];
        let insets_ok = insets
            .iter()
            .all(|i| [i.x0, i.y0, i.x1, i.y1].iter().all(|v| v.is_finite()));
        let scalars = [self.gap, self.line_gap, self.flex_grow, self.flex_shrink];
        let scalars_ok = scalars.iter().all(|v| v.is_finite() && *v >= 0.0);
        dims_ok && bounds_ok && insets_ok && scalars_ok && self.x.is_finite() && self.y.is_finite()
    }
}

impl Style {
    /// A copy with every invalid value replaced by the nearest valid one.
    ///
    /// Non-finite numbers fall back to their defaults, negative sizes and
    /// factors become `0`, and percentages are clamped to `0.0..=1.0`.
    pub fn sanitized(self) -> Self {
        fn dim(d: Dimension) -> Dimension {
            match d {
                Dimension::Fixed(v) if !v.is_finite() => Dimension::Auto,
                Dimension::Fixed(v) => Dimension::Fixed(v.max(0.0)),
                Dimension::Percent(p) if !p.is_finite() => Dimension::Auto,
                Dimension::Percent(p) => Dimension::Percent(p.clamp(0.0, 1.0)),
                other => other,
            }
        }
        fn bound(b: Option<f64>) -> Option<f64> {
            b.filter(|v| v.is_finite()).map(|v| v.max(0.0))
        }
        fn scalar(v: f64) -> f64 {
            if v.is_finite() { v.max(0.0) } else { 0.0 }
        }
        fn offset(v: f64) -> f64 {
            if v.is_finite() { v } else { 0.0 }
        }
        fn insets(i: Insets) -> Insets {
            Insets::new(offset(i.x0), offset(i.y0), offset(i.x1), offset(i.y1))
        }
        Self {
            width: dim(self.width),
            height: dim(self.height),
            flex_basis: dim(self.flex_basis),
            min_width: bound(self.min_width),
            max_width: bound(self.max_width),
            min_height: bound(self.min_height),
            max_height: bound(self.max_height),
            padding: insets(self.padding),
            margin: insets(self.margin),
            gap: scalar(self.gap),
            line_gap: scalar(self.line_gap),
            flex_grow: scalar(self.flex_grow),
            flex_shrink: scalar(self.flex_shrink),
            x: offset(self.x),
            y: offset(self.y),
            ..self
        }
    }
}

/// Clamp with `min` taking priority over `max`.
pub(crate) fn clamp(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let mut v = value;
    if let Some(max) = max {
        v = v.min(max);
    }
    if let Some(min) = min {
        v = v.max(min);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_wins_over_max() {
        let style = Style::default().with_width_bounds(Some(80.0), Some(40.0));
        assert_eq!(style.clamp_width(10.0), 80.0);
        assert_eq!(style.clamp_width(100.0), 80.0);
    }

    #[test]
    fn max_clamps_fixed() {
        let style = Style::default().with_width_bounds(None, Some(40.0));
        assert_eq!(style.clamp_width(50.0), 40.0);
    }

    #[test]
    fn percent_needs_known_parent() {
        assert_eq!(Dimension::percent(0.5).resolve(Some(240.0)), Some(120.0));
        assert_eq!(Dimension::percent(0.5).resolve(None), None);
        assert_eq!(Dimension::Fill.resolve(Some(240.0)), None);
    }

    #[test]
    fn sanitized_styles_are_valid() {
        let mut style = Style::row().with_width(-5.0).with_gap(f64::NAN);
        style.height = Dimension::Percent(3.0);
        style.max_width = Some(f64::INFINITY);
        let clean = style.sanitized();
        assert!(clean.is_valid());
        assert_eq!(clean.width, Dimension::Fixed(0.0));
        assert_eq!(clean.height, Dimension::Percent(1.0));
        assert_eq!(clean.max_width, None);
        assert_eq!(clean.direction, Direction::Row);
    }

    #[test]
    fn validation_rejects_negative_and_nan() {
        assert!(Style::row().with_width(10.0).is_valid());
        assert!(!Style::row().with_width(-1.0).is_valid());
        assert!(!Style::row().with_gap(f64::NAN).is_valid());
        assert!(!Style::row().with_width(Dimension::percent(1.5)).is_valid());
    }
}
