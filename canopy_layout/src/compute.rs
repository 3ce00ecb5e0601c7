// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout pass: measure (bottom-up), arrange (top-down), then clip propagation.

use alloc::vec::Vec;
use core::ops::Range;

use kurbo::{Point, Rect, Size, Vec2};

use crate::cache::{LayoutStats, MeasureKey};
use crate::flex::{FlexItem, align_content_spacing, distribute, justify_spacing, used_space};
use crate::style::{Align, Dimension, Direction, Overflow, Style, Wrap, clamp};
use crate::tree::{LayoutTree, MeasureConstraints};

/// A size whose components may still be unknown.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct OptSize {
    width: Option<f64>,
    height: Option<f64>,
}

impl OptSize {
    const NONE: Self = Self {
        width: None,
        height: None,
    };

    fn known(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
        }
    }

    /// Build from main/cross components of a row (`row == true`) or column.
    fn from_axes(row: bool, main: Option<f64>, cross: Option<f64>) -> Self {
        if row {
            Self {
                width: main,
                height: cross,
            }
        } else {
            Self {
                width: cross,
                height: main,
            }
        }
    }
}

fn main_of(row: bool, size: Size) -> f64 {
    if row { size.width } else { size.height }
}

fn cross_of(row: bool, size: Size) -> f64 {
    if row { size.height } else { size.width }
}

fn size_from_axes(row: bool, main: f64, cross: f64) -> Size {
    if row {
        Size::new(main, cross)
    } else {
        Size::new(cross, main)
    }
}

/// Per-axis view of a child's style relative to its parent's flow direction.
#[derive(Copy, Clone, Debug)]
struct AxisStyle {
    main: Dimension,
    cross: Dimension,
    main_min: Option<f64>,
    main_max: Option<f64>,
    cross_min: Option<f64>,
    cross_max: Option<f64>,
    main_margin_start: f64,
    main_margin: f64,
    cross_margin_start: f64,
    cross_margin: f64,
}

impl AxisStyle {
    fn new(row: bool, style: &Style) -> Self {
        let m = style.margin;
        if row {
            Self {
                main: style.width,
                cross: style.height,
                main_min: style.min_width,
                main_max: style.max_width,
                cross_min: style.min_height,
                cross_max: style.max_height,
                main_margin_start: m.x0,
                main_margin: m.x_value(),
                cross_margin_start: m.y0,
                cross_margin: m.y_value(),
            }
        } else {
            Self {
                main: style.height,
                cross: style.width,
                main_min: style.min_height,
                main_max: style.max_height,
                cross_min: style.min_width,
                cross_max: style.max_width,
                main_margin_start: m.y0,
                main_margin: m.y_value(),
                cross_margin_start: m.x0,
                cross_margin: m.x_value(),
            }
        }
    }
}

/// Split outer main sizes into lines no longer than `limit` (a line always
/// holds at least one item).
fn break_lines(outer: &[f64], limit: f64, gap: f64) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut acc = 0.0;
    for (i, &m) in outer.iter().enumerate() {
        if i == start {
            acc = m;
            continue;
        }
        if acc + gap + m > limit {
            lines.push(start..i);
            start = i;
            acc = m;
        } else {
            acc += gap + m;
        }
    }
    if start < outer.len() {
        lines.push(start..outer.len());
    }
    lines
}

/// Compute layout for the subtree rooted at `root` within `available` space.
///
/// The root resolves `Fixed`/`Percent` against `available`, `Fill` takes all
/// of it, and `Auto` sizes to content. Results are written to each node's
/// [`LayoutCache`](crate::LayoutCache); the root is placed at its margin offset.
///
/// Clean subtrees (see [`LayoutCache::needs_layout`](crate::LayoutCache::needs_layout))
/// whose inputs did not change are not re-measured or re-arranged.
pub fn compute_layout<T: LayoutTree>(
    tree: &mut T,
    root: T::NodeId,
    available: Size,
) -> LayoutStats {
    let mut pass = Pass {
        tree,
        stats: LayoutStats::default(),
    };
    let style = pass.tree.style(root);
    let outer = Size::new(
        (available.width - style.margin.x_value()).max(0.0),
        (available.height - style.margin.y_value()).max(0.0),
    );
    let known = OptSize {
        width: match style.width {
            Dimension::Fill => Some(outer.width),
            other => other.resolve(Some(available.width)),
        },
        height: match style.height {
            Dimension::Fill => Some(outer.height),
            other => other.resolve(Some(available.height)),
        },
    };
    let size = pass.measure(root, OptSize::known(available), known);
    {
        let geometry = &mut pass.tree.cache_mut(root).geometry;
        geometry.x = style.margin.x0;
        geometry.y = style.margin.y0;
        geometry.width = size.width;
        geometry.height = size.height;
    }
    pass.arrange(root, size);
    pass.propagate_clip(root, Point::new(style.margin.x0, style.margin.y0), None);
    pass.stats
}

struct Pass<'t, T: LayoutTree> {
    tree: &'t mut T,
    stats: LayoutStats,
}

impl<T: LayoutTree> Pass<'_, T> {
    /// Outer box size of `node` (margins excluded) given its parent's content
    /// size and any sizes already imposed on it.
    ///
    /// `Fill` measures as zero here; only an arranging parent can give it space.
    fn measure(&mut self, node: T::NodeId, parent: OptSize, known: OptSize) -> Size {
        let key = MeasureKey {
            parent_width: parent.width,
            parent_height: parent.height,
            known_width: known.width,
            known_height: known.height,
        };
        if let Some(size) = self.tree.cache(node).lookup(&key) {
            return size;
        }
        self.stats.measured += 1;

        let style = self.tree.style(node);
        let intrinsic = |dim: Dimension, parent: Option<f64>| match dim {
            Dimension::Fill => Some(0.0),
            other => other.resolve(parent),
        };
        let width = known
            .width
            .or_else(|| intrinsic(style.width, parent.width))
            .map(|w| style.clamp_width(w));
        let height = known
            .height
            .or_else(|| intrinsic(style.height, parent.height))
            .map(|h| style.clamp_height(h));

        let size = if let (Some(w), Some(h)) = (width, height) {
            Size::new(w, h)
        } else {
            let pad_x = style.padding.x_value();
            let pad_y = style.padding.y_value();
            let inner = OptSize {
                width: width.map(|w| (w - pad_x).max(0.0)),
                height: height.map(|h| (h - pad_y).max(0.0)),
            };
            let content = if self.tree.child_count(node) == 0 {
                let constraints = MeasureConstraints {
                    known_width: inner.width,
                    known_height: inner.height,
                    available_width: inner.width.or_else(|| {
                        parent
                            .width
                            .map(|pw| (pw - style.margin.x_value() - pad_x).max(0.0))
                    }),
                    available_height: inner.height.or_else(|| {
                        parent
                            .height
                            .map(|ph| (ph - style.margin.y_value() - pad_y).max(0.0))
                    }),
                };
                self.tree
                    .measure_leaf(node, constraints)
                    .unwrap_or(Size::ZERO)
            } else {
                self.measure_content(node, &style, inner)
            };
            Size::new(
                width.unwrap_or_else(|| style.clamp_width(content.width + pad_x)),
                height.unwrap_or_else(|| style.clamp_height(content.height + pad_y)),
            )
        };

        self.tree.cache_mut(node).store(key, size);
        size
    }

    /// Intrinsic content size of a container (padding excluded).
    fn measure_content(&mut self, node: T::NodeId, style: &Style, inner: OptSize) -> Size {
        let count = self.tree.child_count(node);
        if style.direction == Direction::Stack {
            let mut right = 0.0_f64;
            let mut bottom = 0.0_f64;
            for i in 0..count {
                let child = self.tree.child_at(node, i);
                let cs = self.tree.style(child);
                let size = self.measure(child, inner, OptSize::NONE);
                right = right.max(cs.x + cs.margin.x_value() + size.width);
                bottom = bottom.max(cs.y + cs.margin.y_value() + size.height);
            }
            return Size::new(right, bottom);
        }

        let row = style.direction == Direction::Row;
        let inner_main = if row { inner.width } else { inner.height };
        let mut mains = Vec::with_capacity(count);
        let mut crosses = Vec::with_capacity(count);
        for i in 0..count {
            let child = self.tree.child_at(node, i);
            let axes = AxisStyle::new(row, &self.tree.style(child));
            let size = self.measure(child, inner, OptSize::NONE);
            mains.push(main_of(row, size) + axes.main_margin);
            crosses.push(cross_of(row, size) + axes.cross_margin);
        }

        let lines = match (style.wrap, inner_main) {
            (Wrap::Wrap, Some(limit)) => break_lines(&mains, limit, style.gap),
            _ => core::iter::once(0..count).collect(),
        };
        let mut main = 0.0_f64;
        let mut cross = 0.0;
        for (n, line) in lines.iter().enumerate() {
            let len = line.len();
            let gaps = if len > 1 {
                style.gap * (len - 1) as f64
            } else {
                0.0
            };
            let line_main: f64 = mains[line.clone()].iter().sum::<f64>() + gaps;
            let line_cross = crosses[line.clone()].iter().copied().fold(0.0, f64::max);
            main = main.max(line_main);
            cross += line_cross;
            if n > 0 {
                cross += style.line_gap;
            }
        }
        size_from_axes(row, main, cross)
    }

    /// Lay out the children of `node` given its final outer size.
    fn arrange(&mut self, node: T::NodeId, size: Size) {
        if self.tree.cache(node).can_skip_arrange(size) {
            return;
        }
        self.stats.arranged += 1;
        let style = self.tree.style(node);
        let content = Size::new(
            (size.width - style.padding.x_value()).max(0.0),
            (size.height - style.padding.y_value()).max(0.0),
        );
        if self.tree.child_count(node) > 0 {
            match style.direction {
                Direction::Stack => self.arrange_stack(node, &style, content),
                Direction::Row | Direction::Column => self.arrange_flow(node, &style, content),
            }
        }
        self.tree.cache_mut(node).finish_arrange(size);
    }

    fn place(&mut self, node: T::NodeId, x: f64, y: f64, size: Size) {
        {
            let geometry = &mut self.tree.cache_mut(node).geometry;
            geometry.x = x;
            geometry.y = y;
            geometry.width = size.width;
            geometry.height = size.height;
        }
        self.arrange(node, size);
    }

    fn arrange_stack(&mut self, node: T::NodeId, style: &Style, content: Size) {
        let parent = OptSize::known(content);
        let resolve = |dim: Dimension, avail: f64, auto_parent: bool, margin: f64| match dim {
            Dimension::Fill if auto_parent => Some(0.0),
            Dimension::Fill => Some((avail - margin).max(0.0)),
            other => other.resolve(Some(avail)),
        };
        for i in 0..self.tree.child_count(node) {
            let child = self.tree.child_at(node, i);
            let cs = self.tree.style(child);
            let width = resolve(
                cs.width,
                content.width,
                style.width.is_auto(),
                cs.margin.x_value(),
            )
            .map(|w| cs.clamp_width(w));
            let height = resolve(
                cs.height,
                content.height,
                style.height.is_auto(),
                cs.margin.y_value(),
            )
            .map(|h| cs.clamp_height(h));
            let size = match (width, height) {
                (Some(w), Some(h)) => Size::new(w, h),
                _ => self.measure(child, parent, OptSize { width, height }),
            };
            let x = style.padding.x0 + cs.x + cs.margin.x0;
            let y = style.padding.y0 + cs.y + cs.margin.y0;
            self.place(child, x, y, size);
        }
    }

    fn arrange_flow(&mut self, node: T::NodeId, style: &Style, content: Size) {
        let row = style.direction == Direction::Row;
        let count = self.tree.child_count(node);
        let parent = OptSize::known(content);
        let content_main = main_of(row, content);
        let content_cross = cross_of(row, content);
        let (main_auto, cross_auto) = if row {
            (style.width.is_auto(), style.height.is_auto())
        } else {
            (style.height.is_auto(), style.width.is_auto())
        };
        let wrap = style.wrap == Wrap::Wrap;

        let mut children = Vec::with_capacity(count);
        let mut axes = Vec::with_capacity(count);
        let mut aligns = Vec::with_capacity(count);
        let mut items = Vec::with_capacity(count);
        let mut crosses: Vec<Option<f64>> = Vec::with_capacity(count);

        for i in 0..count {
            let child = self.tree.child_at(node, i);
            let cs = self.tree.style(child);
            let ax = AxisStyle::new(row, &cs);
            let align = cs.align_self.unwrap_or(style.align_items);
            let cross = match ax.cross {
                Dimension::Fill if cross_auto => Some(0.0),
                Dimension::Fill => Some((content_cross - ax.cross_margin).max(0.0)),
                Dimension::Auto if align == Align::Stretch && !wrap => {
                    Some((content_cross - ax.cross_margin).max(0.0))
                }
                other => other.resolve(Some(content_cross)),
            }
            .map(|c| clamp(c, ax.cross_min, ax.cross_max));

            let fill = matches!(ax.main, Dimension::Fill);
            let basis = match cs.flex_basis {
                Dimension::Auto | Dimension::Fill => None,
                b => b.resolve(Some(content_main)),
            };
            let base = basis
                .or(match ax.main {
                    Dimension::Fill => Some(0.0),
                    other => other.resolve(Some(content_main)),
                })
                .unwrap_or_else(|| {
                    let known = OptSize::from_axes(row, None, cross);
                    main_of(row, self.measure(child, parent, known))
                });
            let grow = match (fill, main_auto) {
                (true, true) => 0.0,
                (true, false) => cs.flex_grow.max(1.0),
                (false, _) => cs.flex_grow,
            };
            items.push(FlexItem {
                base: clamp(base, ax.main_min, ax.main_max),
                min: ax.main_min,
                max: ax.main_max,
                grow,
                shrink: cs.flex_shrink,
                margin: ax.main_margin,
            });
            children.push(child);
            axes.push(ax);
            aligns.push(align);
            crosses.push(cross);
        }

        let lines = if wrap {
            let outer: Vec<f64> = items.iter().map(|i| i.base + i.margin).collect();
            break_lines(&outer, content_main, style.gap)
        } else {
            core::iter::once(0..count).collect()
        };

        // Main sizes per line, then cross sizes measured against them.
        let mut mains = Vec::with_capacity(count);
        for line in &lines {
            mains.extend(distribute(&items[line.clone()], content_main, style.gap));
        }
        let mut cross_sizes = Vec::with_capacity(count);
        for i in 0..count {
            let cross = crosses[i].unwrap_or_else(|| {
                let known = OptSize::from_axes(row, Some(mains[i]), None);
                let measured = cross_of(row, self.measure(children[i], parent, known));
                clamp(measured, axes[i].cross_min, axes[i].cross_max)
            });
            cross_sizes.push(cross);
        }

        // Line cross sizes and their placement.
        let mut line_crosses: Vec<f64> = if wrap {
            lines
                .iter()
                .map(|line| {
                    line.clone()
                        .map(|i| cross_sizes[i] + axes[i].cross_margin)
                        .fold(0.0, f64::max)
                })
                .collect()
        } else {
            alloc::vec![content_cross]
        };
        let (mut line_pos, line_between) = if wrap {
            let used: f64 = line_crosses.iter().sum::<f64>()
                + style.line_gap * (lines.len().saturating_sub(1)) as f64;
            let (start, between, extra) = align_content_spacing(
                style.align_content,
                content_cross - used,
                lines.len(),
                style.line_gap,
            );
            for lc in &mut line_crosses {
                *lc += extra;
            }
            (start, between)
        } else {
            (0.0, 0.0)
        };

        for (line, &line_cross) in lines.iter().zip(&line_crosses) {
            let line_items = &items[line.clone()];
            let line_mains = &mains[line.clone()];
            let free = content_main - used_space(line_items, line_mains, style.gap);
            let (start, between) = justify_spacing(style.justify, free, line.len(), style.gap);
            let mut cursor = start;
            for i in line.clone() {
                let ax = &axes[i];
                if wrap && aligns[i] == Align::Stretch && ax.cross == Dimension::Auto {
                    cross_sizes[i] = clamp(
                        (line_cross - ax.cross_margin).max(0.0),
                        ax.cross_min,
                        ax.cross_max,
                    );
                }
                let main_size = mains[i];
                let cross_size = cross_sizes[i];
                let main_pos = cursor + ax.main_margin_start;
                cursor += ax.main_margin + main_size + between;

                let slack = line_cross - cross_size - ax.cross_margin;
                let align_offset = match aligns[i] {
                    Align::Start | Align::Stretch => 0.0,
                    Align::Center => slack / 2.0,
                    Align::End => slack,
                };
                let cross_pos = line_pos + ax.cross_margin_start + align_offset;

                let (x, y) = if row {
                    (main_pos, cross_pos)
                } else {
                    (cross_pos, main_pos)
                };
                self.place(
                    children[i],
                    style.padding.x0 + x,
                    style.padding.y0 + y,
                    size_from_axes(row, main_size, cross_size),
                );
            }
            line_pos += line_cross + line_between;
        }
    }

    /// Assign each node the clip inherited from `hidden` ancestors.
    ///
    /// `origin` is the node's position and `inherited` the clip, both in root
    /// coordinates.
    fn propagate_clip(&mut self, node: T::NodeId, origin: Point, inherited: Option<Rect>) {
        let style = self.tree.style(node);
        let (width, height) = {
            let cache = self.tree.cache_mut(node);
            cache.geometry.clip = inherited.map(|r| r - origin.to_vec2());
            (cache.geometry.width, cache.geometry.height)
        };
        let child_clip = match style.overflow {
            Overflow::Visible => inherited,
            Overflow::Hidden => {
                let pad = style.padding;
                let x0 = origin.x + pad.x0;
                let y0 = origin.y + pad.y0;
                let content = Rect::new(
                    x0,
                    y0,
                    (origin.x + width - pad.x1).max(x0),
                    (origin.y + height - pad.y1).max(y0),
                );
                Some(inherited.map_or(content, |clip| clip.intersect(content)))
            }
        };
        for i in 0..self.tree.child_count(node) {
            let child = self.tree.child_at(node, i);
            let geometry = *self.tree.cache(child).geometry();
            let child_origin = origin + Vec2::new(geometry.x, geometry.y);
            self.propagate_clip(child, child_origin, child_clip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LayoutCache;
    use crate::style::{AlignContent, Justify};
    use kurbo::Insets;

    #[derive(Debug)]
    struct Node {
        style: Style,
        children: Vec<usize>,
        content: Option<Size>,
        cache: LayoutCache,
    }

    #[derive(Debug, Default)]
    struct TestTree {
        nodes: Vec<Node>,
        parents: Vec<Option<usize>>,
    }

    impl TestTree {
        fn add(&mut self, parent: Option<usize>, style: Style, content: Option<Size>) -> usize {
            let id = self.nodes.len();
            self.nodes.push(Node {
                style,
                children: Vec::new(),
                content,
                cache: LayoutCache::new(),
            });
            self.parents.push(parent);
            if let Some(p) = parent {
                self.nodes[p].children.push(id);
            }
            id
        }

        fn set_style(&mut self, id: usize, style: Style) {
            self.nodes[id].style = style;
            self.nodes[id].cache.mark_dirty();
            let mut cur = self.parents[id];
            while let Some(p) = cur {
                self.nodes[p].cache.mark_descendant_dirty();
                cur = self.parents[p];
            }
        }

        fn geo(&self, id: usize) -> Geometry {
            *self.nodes[id].cache.geometry()
        }
    }

    use crate::cache::Geometry;

    impl LayoutTree for TestTree {
        type NodeId = usize;

        fn style(&self, node: usize) -> Style {
            self.nodes[node].style
        }

        fn child_count(&self, node: usize) -> usize {
            self.nodes[node].children.len()
        }

        fn child_at(&self, node: usize, index: usize) -> usize {
            self.nodes[node].children[index]
        }

        fn measure_leaf(&mut self, node: usize, _: MeasureConstraints) -> Option<Size> {
            self.nodes[node].content
        }

        fn cache(&self, node: usize) -> &LayoutCache {
            &self.nodes[node].cache
        }

        fn cache_mut(&mut self, node: usize) -> &mut LayoutCache {
            &mut self.nodes[node].cache
        }
    }

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    #[test]
    fn grow_factors_split_free_space() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(300.0), None);
        let a = t.add(Some(root), Style::default().with_grow(1.0), None);
        let b = t.add(Some(root), Style::default().with_grow(2.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(a).width, 100.0);
        assert_eq!(t.geo(b).width, 200.0);
        assert_eq!(t.geo(b).x, 100.0);
    }

    #[test]
    fn row_with_gap_scenario() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(200.0).with_gap(10.0), None);
        let a = t.add(Some(root), Style::default().with_width(50.0), None);
        let b = t.add(Some(root), Style::default().with_grow(1.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!((t.geo(a).x, t.geo(a).width), (0.0, 50.0));
        assert_eq!((t.geo(b).x, t.geo(b).width), (60.0, 140.0));
    }

    #[test]
    fn percent_resolves_against_parent_content() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(240.0), None);
        let half = t.add(
            Some(root),
            Style::default().with_width(Dimension::percent(0.5)),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(half).width, 120.0);
    }

    #[test]
    fn fill_inside_auto_parent_is_zero() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::column().with_width(400.0), None);
        let auto_row = t.add(Some(root), Style::row().with_align_items(Align::Start), None);
        let fill = t.add(
            Some(auto_row),
            Style::default().with_width(Dimension::Fill),
            None,
        );
        let fixed = t.add(Some(auto_row), Style::default().with_width(30.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(fill).width, 0.0, "fill cannot grow an auto container");
        assert_eq!(t.geo(fixed).x, 0.0);
    }

    #[test]
    fn fill_takes_leftover_space_in_definite_parent() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(300.0), None);
        let fixed = t.add(Some(root), Style::default().with_width(100.0), None);
        let fill = t.add(
            Some(root),
            Style::default().with_width(Dimension::Fill),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(fixed).width, 100.0);
        assert_eq!(t.geo(fill).width, 200.0);
    }

    #[test]
    fn max_clamps_fixed_width() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(Dimension::Fill), None);
        let child = t.add(
            Some(root),
            Style::default()
                .with_width(50.0)
                .with_width_bounds(None, Some(40.0)),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(child).width, 40.0);
    }

    #[test]
    fn empty_auto_container_is_padding_only() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::column(), None);
        let empty = t.add(
            Some(root),
            Style::row()
                .with_padding(Insets::new(3.0, 4.0, 5.0, 6.0))
                .with_align_items(Align::Start),
            None,
        );
        let mut root_style = Style::column().with_align_items(Align::Start);
        root_style.width = Dimension::Fixed(100.0);
        t.set_style(root, root_style);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(empty).width, 8.0);
        assert_eq!(t.geo(empty).height, 10.0);
    }

    #[test]
    fn negative_free_space_without_shrink_overflows() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(100.0), None);
        let a = t.add(Some(root), Style::default().with_width(80.0), None);
        let b = t.add(Some(root), Style::default().with_width(80.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(a).width, 80.0);
        assert_eq!(t.geo(b).width, 80.0);
        assert_eq!(t.geo(b).x, 80.0, "second child overflows the container");
    }

    #[test]
    fn shrink_takes_deficit_proportionally() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_width(100.0), None);
        let a = t.add(
            Some(root),
            Style::default().with_width(80.0).with_shrink(1.0),
            None,
        );
        let b = t.add(
            Some(root),
            Style::default().with_width(80.0).with_shrink(3.0),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(a).width, 65.0);
        assert_eq!(t.geo(b).width, 35.0);
    }

    #[test]
    fn auto_container_sums_main_and_maxes_cross() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::column().with_align_items(Align::Start), None);
        let row = t.add(
            Some(root),
            Style::row()
                .with_gap(5.0)
                .with_padding(Insets::uniform(2.0))
                .with_align_items(Align::Start),
            None,
        );
        t.add(Some(row), Style::default(), Some(Size::new(10.0, 20.0)));
        t.add(Some(row), Style::default(), Some(Size::new(30.0, 5.0)));
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(row).width, 10.0 + 5.0 + 30.0 + 4.0);
        assert_eq!(t.geo(row).height, 20.0 + 4.0);
    }

    #[test]
    fn justify_and_align_place_children() {
        let mut t = TestTree::default();
        let root = t.add(
            None,
            Style::row()
                .with_size(100.0, 50.0)
                .with_justify(Justify::SpaceBetween)
                .with_align_items(Align::Center),
            None,
        );
        let a = t.add(Some(root), Style::default().with_size(20.0, 10.0), None);
        let b = t.add(Some(root), Style::default().with_size(20.0, 30.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!((t.geo(a).x, t.geo(a).y), (0.0, 20.0));
        assert_eq!((t.geo(b).x, t.geo(b).y), (80.0, 10.0));
    }

    #[test]
    fn stretch_fills_cross_axis_for_auto_children_only() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_size(100.0, 40.0), None);
        let auto = t.add(Some(root), Style::default().with_width(10.0), None);
        let fixed = t.add(Some(root), Style::default().with_size(10.0, 15.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(auto).height, 40.0);
        assert_eq!(t.geo(fixed).height, 15.0);
    }

    #[test]
    fn margins_separate_children() {
        let mut t = TestTree::default();
        let root = t.add(
            None,
            Style::row()
                .with_width(200.0)
                .with_padding(Insets::new(10.0, 0.0, 0.0, 0.0)),
            None,
        );
        let a = t.add(
            Some(root),
            Style::default()
                .with_width(20.0)
                .with_margin(Insets::new(5.0, 0.0, 5.0, 0.0)),
            None,
        );
        let b = t.add(Some(root), Style::default().with_width(20.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(a).x, 15.0);
        assert_eq!(t.geo(b).x, 40.0);
    }

    #[test]
    fn wrap_breaks_lines_and_stacks_them() {
        let mut t = TestTree::default();
        let mut style = Style::row().with_width(100.0).with_wrap(4.0);
        style.gap = 10.0;
        style.align_items = Align::Start;
        style.align_content = AlignContent::Start;
        let root = t.add(None, style, None);
        let a = t.add(Some(root), Style::default().with_size(40.0, 10.0), None);
        let b = t.add(Some(root), Style::default().with_size(40.0, 20.0), None);
        let c = t.add(Some(root), Style::default().with_size(40.0, 10.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!((t.geo(a).x, t.geo(a).y), (0.0, 0.0));
        assert_eq!((t.geo(b).x, t.geo(b).y), (50.0, 0.0));
        assert_eq!((t.geo(c).x, t.geo(c).y), (0.0, 24.0));
        assert_eq!(t.geo(root).height, 20.0 + 4.0 + 10.0);
    }

    #[test]
    fn stack_uses_offsets_and_bounding_box() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::column().with_align_items(Align::Start), None);
        let stack = t.add(Some(root), Style::stack(), None);
        let a = t.add(
            Some(stack),
            Style::default().with_size(10.0, 10.0).with_offset(5.0, 7.0),
            None,
        );
        let b = t.add(
            Some(stack),
            Style::default().with_size(20.0, 5.0).with_offset(30.0, 0.0),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!((t.geo(a).x, t.geo(a).y), (5.0, 7.0));
        assert_eq!((t.geo(b).x, t.geo(b).y), (30.0, 0.0));
        assert_eq!(t.geo(stack).width, 50.0);
        assert_eq!(t.geo(stack).height, 17.0);
    }

    #[test]
    fn hidden_overflow_clips_descendants() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::column().with_size(200.0, 200.0), None);
        let clipper = t.add(
            Some(root),
            Style::column()
                .with_size(100.0, 50.0)
                .with_padding(Insets::uniform(5.0))
                .with_overflow(Overflow::Hidden),
            None,
        );
        let child = t.add(Some(clipper), Style::default().with_size(300.0, 300.0), None);
        let grandchild = t.add(Some(child), Style::default().with_size(10.0, 10.0), None);
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(root).clip, None);
        assert_eq!(t.geo(clipper).clip, None, "a clipper does not clip itself");
        // The child sits at (5, 5) inside the clipper; the content box is 90x40.
        assert_eq!(t.geo(child).clip, Some(Rect::new(0.0, 0.0, 90.0, 40.0)));
        assert_eq!(t.geo(grandchild).clip, Some(Rect::new(0.0, 0.0, 90.0, 40.0)));
    }

    #[test]
    fn clean_subtrees_are_not_remeasured() {
        let mut t = TestTree::default();
        let root = t.add(None, Style::row().with_size(300.0, 100.0), None);
        let left = t.add(Some(root), Style::column().with_width(100.0), None);
        for _ in 0..5 {
            t.add(Some(left), Style::default(), Some(Size::new(10.0, 10.0)));
        }
        let right = t.add(Some(root), Style::default().with_width(50.0), None);
        let first = compute_layout(&mut t, root, VIEWPORT);
        assert!(first.measured > 0);

        let again = compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(again.arranged, 0, "nothing changed");

        t.set_style(right, Style::default().with_width(60.0));
        let stats = compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(stats.arranged, 2, "only the root and the changed sibling");
        assert_eq!(t.geo(right).width, 60.0);
        assert_eq!(t.geo(left).width, 100.0);
    }

    #[test]
    fn root_fill_takes_available_space() {
        let mut t = TestTree::default();
        let root = t.add(
            None,
            Style::column().with_size(Dimension::Fill, Dimension::Fill),
            None,
        );
        compute_layout(&mut t, root, VIEWPORT);
        assert_eq!(t.geo(root).size(), VIEWPORT);
    }
}
