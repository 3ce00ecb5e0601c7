// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect, RoundedRect};

use crate::damage::Damage;
use crate::types::{LocalNode, NodeFlags, NodeId};
use crate::util::{contains, transform_rect_bbox};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level region tree.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    roots: Vec<NodeId>,
    // Damage from removals, flushed by the next commit.
    pending: Damage,
    epoch: u64,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("roots", &self.roots.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
}

/// Filters applied during hit testing and rectangle intersection.
///
/// Used by [`Tree::hit_test_point`] and [`Tree::intersect_rect`].
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, skip nodes that are hidden (themselves or by an ancestor).
    pub visible_only: bool,
    /// If true, only consider nodes marked [`NodeFlags::PICKABLE`] (hit-test).
    pub pickable_only: bool,
}

#[derive(Clone, Debug, Default)]
struct WorldNode {
    transform: Affine,
    bounds: Rect, // AABB of transformed (and clipped) local bounds
    clip: Option<Rect>,
    visible: bool,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    world: WorldNode,
    dirty: bool,
    committed: bool,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
            dirty: true,
            committed: false,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            pending: Damage::default(),
            epoch: 0,
        }
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        self.insert_at(parent, usize::MAX, local)
    }

    /// Insert a new node at `index` among the children of `parent` (or the roots).
    ///
    /// An index past the end appends. A stale `parent` makes the node a root.
    pub fn insert_at(&mut self, parent: Option<NodeId>, index: usize, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        let parent = parent.filter(|p| self.is_alive(*p));
        self.link(id, parent, index);
        id
    }

    /// Remove a node and its subtree.
    ///
    /// The last committed bounds of removed visible nodes are reported as damage
    /// by the next [`Tree::commit`].
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.unlink(id);
        self.free_subtree(id);
    }

    /// Move `id` to the end of `new_parent`'s children (or the roots).
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        self.reparent_at(id, new_parent, usize::MAX);
    }

    /// Move `id` to `index` among `new_parent`'s children (or the roots).
    ///
    /// `index` counts siblings after `id` has been detached; past the end
    /// appends. Moving a node under itself or one of its descendants is ignored.
    pub fn reparent_at(&mut self, id: NodeId, new_parent: Option<NodeId>, index: usize) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) || self.is_ancestor_or_self(id, p) {
                return;
            }
        }
        self.unlink(id);
        self.link(id, new_parent, index);
        self.node_mut(id).dirty = true;
    }

    /// Update local transform.
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_transform = tf;
            n.dirty = true;
        }
    }

    /// Update local clip.
    pub fn set_local_clip(&mut self, id: NodeId, clip: Option<RoundedRect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_clip = clip;
            n.dirty = true;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.z_index = z;
            n.dirty = true;
        }
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.local_bounds = bounds;
            n.dirty = true;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
            n.dirty = true;
        }
    }

    /// Recompute world transforms, bounds, clips and visibility of changed
    /// subtrees and return the damage since the previous commit.
    pub fn commit(&mut self) -> Damage {
        let mut damage = core::mem::take(&mut self.pending);
        let roots = self.roots.clone();
        for root in roots {
            self.update_world_recursive(root, Affine::IDENTITY, None, true, false, &mut damage);
        }
        self.epoch += 1;
        damage
    }

    /// Number of commits so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Hit test a world-space point and return the topmost node.
    ///
    /// Higher `z_index` wins; among equal z, the node painted later (depth-first,
    /// children in order) wins. Points outside a node's clip never hit it.
    /// Uses data from the last [`Tree::commit`].
    pub fn hit_test_point(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        let mut best: Option<(NodeId, i32)> = None;
        self.for_each_in_paint_order(|id, node| {
            if !node.committed || !contains(node.world.bounds, pt) {
                return;
            }
            if filter.visible_only && !node.world.visible {
                return;
            }
            if filter.pickable_only && !node.local.flags.contains(NodeFlags::PICKABLE) {
                return;
            }
            if let Some(clip) = node.world.clip
                && !contains(clip, pt)
            {
                return;
            }
            let local_pt = node.world.transform.inverse() * pt;
            if !contains(node.local.local_bounds, local_pt) {
                return;
            }
            let z = node.local.z_index;
            if best.is_none_or(|(_, z_best)| z >= z_best) {
                best = Some((id, z));
            }
        });
        best.map(|(node, _)| Hit {
            node,
            path: self.path_to_root(node),
        })
    }

    /// Nodes whose world bounds intersect a world-space rect, in paint order.
    pub fn intersect_rect(&self, rect: Rect, filter: QueryFilter) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.for_each_in_paint_order(|id, node| {
            if !node.committed {
                return;
            }
            if filter.visible_only && !node.world.visible {
                return;
            }
            if filter.pickable_only && !node.local.flags.contains(NodeFlags::PICKABLE) {
                return;
            }
            let hit = node.world.bounds.intersect(rect);
            if hit.width() > 0.0 && hit.height() > 0.0 {
                out.push(id);
            }
        });
        out
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.generation())
    }

    /// Returns the z-index of a node if the identifier is live.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.get(id).map(|n| n.local.z_index)
    }

    /// Local data of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.get(id).map(|n| &n.local)
    }

    /// Parent of a live node; `None` for roots and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a live node in order; empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Root nodes in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// World-space bounds (clipped) as of the last commit.
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        self.get(id).filter(|n| n.committed).map(|n| n.world.bounds)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    // --- internals ---

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.generation())
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.generation())
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(n) => n,
            None => unreachable!("dangling NodeId {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.node_opt_mut(id) {
            Some(n) => n,
            None => unreachable!("dangling NodeId {id:?}"),
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn link(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) {
        let siblings = match parent {
            Some(p) => &mut self.node_mut(p).children,
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        self.node_mut(id).parent = parent;
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node(id).parent;
        let siblings = match parent {
            Some(p) => &mut self.node_mut(p).children,
            None => &mut self.roots,
        };
        siblings.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes[id.idx()].take() else {
            return;
        };
        if node.committed && node.world.visible {
            self.pending.push(node.world.bounds);
        }
        self.free_list.push(id.idx());
        for child in node.children {
            self.free_subtree(child);
        }
    }

    fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            match self.node(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    fn for_each_in_paint_order(&self, mut f: impl FnMut(NodeId, &Node)) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            f(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: Affine,
        parent_clip: Option<Rect>,
        parent_visible: bool,
        parent_changed: bool,
        damage: &mut Damage,
    ) {
        let (changed, world, children) = {
            let node = self.node_mut(id);
            let changed = parent_changed || node.dirty || !node.committed;
            if changed {
                let old = node.world.clone();
                let was_committed = node.committed;
                let transform = parent_tf * node.local.local_transform;
                let own_clip = node
                    .local
                    .local_clip
                    .map(|rr| transform_rect_bbox(transform, rr.rect()));
                let clip = match (own_clip, parent_clip) {
                    (Some(a), Some(b)) => Some(a.intersect(b)),
                    (a, b) => a.or(b),
                };
                let mut bounds = transform_rect_bbox(transform, node.local.local_bounds);
                if let Some(c) = clip {
                    bounds = bounds.intersect(c);
                }
                let visible = parent_visible && node.local.flags.contains(NodeFlags::VISIBLE);
                node.world = WorldNode {
                    transform,
                    bounds,
                    clip,
                    visible,
                };
                node.dirty = false;
                node.committed = true;

                let was_shown = was_committed && old.visible;
                if was_shown != visible || (visible && old.bounds != bounds) {
                    if was_shown {
                        damage.push(old.bounds);
                    }
                    if visible {
                        damage.push(bounds);
                    }
                }
            }
            (changed, node.world.clone(), node.children.clone())
        };

        for child in children {
            self.update_world_recursive(
                child,
                world.transform,
                world.clip,
                world.visible,
                changed,
                damage,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Vec2;

    const ALL: QueryFilter = QueryFilter {
        visible_only: true,
        pickable_only: true,
    };

    fn boxed(x0: f64, y0: f64, x1: f64, y1: f64) -> LocalNode {
        LocalNode {
            local_bounds: Rect::new(x0, y0, x1, y1),
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_hit_test() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 200.0, 200.0));
        let a = tree.insert(Some(root), boxed(10.0, 10.0, 60.0, 60.0));
        let b = tree.insert(
            Some(root),
            LocalNode {
                z_index: 10,
                ..boxed(40.0, 40.0, 120.0, 120.0)
            },
        );
        let _ = tree.commit();

        let hit = tree.hit_test_point(Point::new(50.0, 50.0), ALL);
        assert_eq!(hit.map(|h| h.node), Some(b), "higher z wins");
        let hit = tree.hit_test_point(Point::new(15.0, 15.0), ALL);
        assert_eq!(hit.as_ref().map(|h| h.node), Some(a));
        assert_eq!(hit.map(|h| h.path), Some(vec![root, a]));
    }

    #[test]
    fn equal_z_later_in_paint_order_wins() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 100.0, 100.0));
        let a = tree.insert(Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let b = tree.insert(Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let _ = tree.commit();
        assert_eq!(tree.hit_test_point(Point::new(5.0, 5.0), ALL).map(|h| h.node), Some(b));

        // Moving `a` to the end paints it last.
        tree.reparent_at(a, Some(root), 1);
        let _ = tree.commit();
        assert_eq!(tree.children(root), &[b, a]);
        assert_eq!(tree.hit_test_point(Point::new(5.0, 5.0), ALL).map(|h| h.node), Some(a));
    }

    #[test]
    fn insert_at_orders_children() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let a = tree.insert(Some(root), LocalNode::default());
        let c = tree.insert(Some(root), LocalNode::default());
        let b = tree.insert_at(Some(root), 1, LocalNode::default());
        let first = tree.insert_at(Some(root), 0, LocalNode::default());
        assert_eq!(tree.children(root), &[first, a, b, c]);
        assert_eq!(tree.parent(b), Some(root));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let child = tree.insert(Some(root), LocalNode::default());
        tree.reparent_at(root, Some(child), 0);
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.children(root), &[child]);
    }

    #[test]
    fn transform_and_damage() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 100.0, 100.0));
        let n = tree.insert(Some(root), boxed(0.0, 0.0, 10.0, 10.0));
        let _ = tree.commit();
        tree.set_local_transform(n, Affine::translate(Vec2::new(50.0, 0.0)));
        let dmg = tree.commit();
        assert_eq!(
            dmg.dirty_rects,
            vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 0.0, 60.0, 10.0)]
        );
        assert_eq!(tree.world_bounds(n), Some(Rect::new(50.0, 0.0, 60.0, 10.0)));
    }

    #[test]
    fn unchanged_commit_has_no_damage() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 100.0, 100.0));
        tree.insert(Some(root), boxed(0.0, 0.0, 10.0, 10.0));
        assert!(!tree.commit().is_empty());
        assert!(tree.commit().is_empty());
    }

    #[test]
    fn removal_reports_old_bounds() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 100.0, 100.0));
        let n = tree.insert(Some(root), boxed(5.0, 5.0, 15.0, 15.0));
        let _ = tree.commit();
        tree.remove(n);
        let dmg = tree.commit();
        assert_eq!(dmg.dirty_rects, vec![Rect::new(5.0, 5.0, 15.0, 15.0)]);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn clip_limits_bounds_and_hits() {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            LocalNode {
                local_clip: Some(RoundedRect::from_rect(Rect::new(0.0, 0.0, 50.0, 50.0), 0.0)),
                ..boxed(0.0, 0.0, 50.0, 50.0)
            },
        );
        let wide = tree.insert(Some(root), boxed(0.0, 0.0, 200.0, 20.0));
        let _ = tree.commit();
        assert_eq!(tree.world_bounds(wide), Some(Rect::new(0.0, 0.0, 50.0, 20.0)));
        let hit = tree.hit_test_point(Point::new(100.0, 10.0), ALL);
        assert!(hit.is_none(), "clipped-out region must not hit");
    }

    #[test]
    fn hidden_ancestor_hides_subtree() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 100.0, 100.0));
        let panel = tree.insert(Some(root), boxed(0.0, 0.0, 50.0, 50.0));
        let button = tree.insert(Some(panel), boxed(0.0, 0.0, 20.0, 20.0));
        let _ = tree.commit();
        tree.set_flags(panel, NodeFlags::PICKABLE);
        let dmg = tree.commit();
        assert!(!dmg.is_empty(), "hiding a node damages its area");
        let hit = tree.hit_test_point(Point::new(5.0, 5.0), ALL);
        assert_eq!(hit.map(|h| h.node), Some(root));
        let visible = tree.intersect_rect(Rect::new(0.0, 0.0, 10.0, 10.0), ALL);
        assert!(!visible.contains(&button));
    }

    #[test]
    fn intersect_rect_returns_paint_order() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 1000.0, 1000.0));
        let rows: Vec<NodeId> = (0..10_u32)
            .map(|i| {
                let y = f64::from(i) * 50.0;
                tree.insert(Some(root), boxed(0.0, y, 200.0, y + 40.0))
            })
            .collect();
        let _ = tree.commit();
        let visible = tree.intersect_rect(Rect::new(0.0, 120.0, 200.0, 220.0), ALL);
        assert_eq!(visible, vec![root, rows[2], rows[3], rows[4]]);
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = Tree::new();
        let root = tree.insert(None, boxed(0.0, 0.0, 1.0, 1.0));
        let a = tree.insert(Some(root), boxed(0.0, 0.0, 1.0, 1.0));
        let grandchild = tree.insert(Some(a), boxed(0.0, 0.0, 1.0, 1.0));
        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(grandchild), "removal frees the subtree");

        let b = tree.insert(Some(root), boxed(0.0, 0.0, 1.0, 1.0));
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        assert!(tree.is_alive(NodeId::from_bits(b.to_bits())));
        assert_eq!(tree.z_index(a), None, "stale ids must return None");
    }
}
