// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host backed by [`canopy_box_tree::Tree`].

use alloc::rc::Rc;

use canopy_box_tree::{Damage, LocalNode, NodeFlags, NodeId, QueryFilter, Tree};
use canopy_layout::{Geometry, MeasureConstraints};
use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, RoundedRect, Size};
use log::{trace, warn};

use crate::error::HostError;
use crate::host::{HostAdapter, HostHandle};
use crate::props::{Border, Color, Primitive, PropChange, Props};

/// Advance of one glyph, as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;
/// Line height, as a fraction of the font size.
const LINE_HEIGHT: f64 = 1.2;

/// What a box tree node draws. The box tree itself only knows geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Visual {
    /// Kind of primitive.
    pub primitive: Primitive,
    /// View fill.
    pub background: Option<Color>,
    /// View border.
    pub border: Option<Border>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Text content.
    pub content: Option<Rc<str>>,
    /// Text size in logical pixels.
    pub font_size: f64,
    /// Text color.
    pub color: Color,
    /// Image source.
    pub source: Option<Rc<str>>,
    /// Image tint.
    pub tint: Option<Color>,
}

impl Visual {
    fn from_props(props: &Props) -> Self {
        let mut visual = Self {
            primitive: props.primitive(),
            background: None,
            border: None,
            opacity: 1.0,
            content: None,
            font_size: 0.0,
            color: Color::BLACK,
            source: None,
            tint: None,
        };
        match props {
            Props::View(view) => {
                visual.background = view.background;
                visual.border = view.border;
                visual.opacity = view.opacity;
            }
            Props::Text(text) => {
                visual.content = Some(text.content.clone());
                visual.font_size = text.font_size;
                visual.color = text.color;
                visual.opacity = text.opacity;
            }
            Props::Image(image) => {
                visual.source = Some(image.source.clone());
                visual.tint = image.tint;
                visual.opacity = image.opacity;
            }
        }
        visual
    }

    fn apply(&mut self, change: &PropChange) {
        match change {
            PropChange::Background(c) => self.background = *c,
            PropChange::Border(b) => self.border = *b,
            PropChange::Opacity(o) => self.opacity = *o,
            PropChange::Content(s) => self.content = Some(s.clone()),
            PropChange::FontSize(fs) => self.font_size = *fs,
            PropChange::Color(c) => self.color = *c,
            PropChange::Source(s) => self.source = Some(s.clone()),
            PropChange::Tint(c) => self.tint = *c,
            // Kept on the tree node.
            PropChange::Visible(_) | PropChange::ZIndex(_) => {}
        }
    }
}

fn flags(visible: bool) -> NodeFlags {
    if visible {
        NodeFlags::VISIBLE | NodeFlags::PICKABLE
    } else {
        NodeFlags::PICKABLE
    }
}

/// Monospace text metrics, wrapping at whole glyphs when `max_width` is set.
///
/// A line always holds at least one glyph. Empty text is one line tall.
fn measure_text(content: &str, font_size: f64, max_width: Option<f64>) -> Size {
    let advance = font_size * GLYPH_ADVANCE;
    let line_height = font_size * LINE_HEIGHT;
    let glyphs = content.chars().count();
    if glyphs == 0 || advance <= 0.0 {
        return Size::new(0.0, line_height);
    }
    let per_line = match max_width {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Whole glyphs per line; saturates for huge widths."
        )]
        Some(width) => ((width / advance) as usize).clamp(1, glyphs),
        None => glyphs,
    };
    let lines = glyphs.div_ceil(per_line);
    Size::new(per_line as f64 * advance, lines as f64 * line_height)
}

/// A [`HostAdapter`] that renders into a [`Tree`].
///
/// Handles are [`NodeId::to_bits`]. Created nodes start as the last root of
/// the tree until attached. Call [`BoxTreeHost::commit`] after a flush to
/// update world geometry before hit testing or reading damage.
#[derive(Debug, Default)]
pub struct BoxTreeHost {
    tree: Tree,
    visuals: HashMap<NodeId, Visual>,
    images: HashMap<Rc<str>, Size>,
}

impl BoxTreeHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the natural size of an image source.
    ///
    /// Unregistered sources measure as zero.
    pub fn register_image(&mut self, source: impl Into<Rc<str>>, size: Size) {
        self.images.insert(source.into(), size);
    }

    /// The underlying tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The tree node behind `handle`.
    pub fn node_id(handle: HostHandle) -> NodeId {
        NodeId::from_bits(handle.raw())
    }

    /// What the node behind `handle` draws.
    pub fn visual(&self, handle: HostHandle) -> Option<&Visual> {
        self.visuals.get(&Self::node_id(handle))
    }

    /// Recompute world geometry and return the damaged regions.
    pub fn commit(&mut self) -> Damage {
        self.tree.commit()
    }

    /// The topmost visible node under a world-space point, as of the last commit.
    pub fn hit_test(&self, point: Point) -> Option<HostHandle> {
        let filter = QueryFilter {
            visible_only: true,
            pickable_only: true,
        };
        self.tree
            .hit_test_point(point, filter)
            .map(|hit| HostHandle::new(hit.node.to_bits()))
    }

    fn live(&self, handle: HostHandle) -> Result<NodeId, HostError> {
        let id = Self::node_id(handle);
        if self.tree.is_alive(id) {
            Ok(id)
        } else {
            Err(HostError::UnknownHandle(handle.raw()))
        }
    }
}

impl HostAdapter for BoxTreeHost {
    fn create_node(&mut self, primitive: Primitive, props: &Props) -> Result<HostHandle, HostError> {
        let local = LocalNode {
            z_index: props.z_index(),
            flags: flags(props.visible()),
            ..LocalNode::default()
        };
        let id = self.tree.insert(None, local);
        self.visuals.insert(id, Visual::from_props(props));
        trace!("box tree: created {primitive:?} {id:?}");
        Ok(HostHandle::new(id.to_bits()))
    }

    fn update_node(&mut self, handle: HostHandle, changes: &[PropChange]) {
        let id = match self.live(handle) {
            Ok(id) => id,
            Err(err) => {
                warn!("box tree: update ignored: {err}");
                return;
            }
        };
        for change in changes {
            match change {
                PropChange::Visible(visible) => self.tree.set_flags(id, flags(*visible)),
                PropChange::ZIndex(z) => self.tree.set_z_index(id, *z),
                other => {
                    if let Some(visual) = self.visuals.get_mut(&id) {
                        visual.apply(other);
                    }
                }
            }
        }
    }

    fn destroy_node(&mut self, handle: HostHandle) {
        let id = Self::node_id(handle);
        self.tree.remove(id);
        self.visuals.remove(&id);
    }

    fn set_geometry(&mut self, handle: HostHandle, geometry: &Geometry) {
        let Ok(id) = self.live(handle) else {
            return;
        };
        self.tree
            .set_local_transform(id, Affine::translate((geometry.x, geometry.y)));
        self.tree.set_local_bounds(id, geometry.local_rect());
        self.tree.set_local_clip(
            id,
            geometry.clip.map(|clip: Rect| RoundedRect::from_rect(clip, 0.0)),
        );
    }

    fn measure_intrinsic(&mut self, handle: HostHandle, constraints: MeasureConstraints) -> Size {
        let Some(visual) = self.visual(handle) else {
            return Size::ZERO;
        };
        match visual.primitive {
            Primitive::Text => measure_text(
                visual.content.as_deref().unwrap_or_default(),
                visual.font_size,
                constraints.known_width.or(constraints.available_width),
            ),
            Primitive::Image => visual
                .source
                .as_ref()
                .and_then(|source| self.images.get(source))
                .copied()
                .unwrap_or(Size::ZERO),
            Primitive::View => Size::ZERO,
        }
    }

    fn reparent(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize) {
        let id = Self::node_id(handle);
        self.tree
            .reparent_at(id, parent.map(Self::node_id), index);
    }
}
