// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed child matching and host placement planning.

use alloc::vec;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use log::warn;

use crate::element::Key;

/// How the children of a new render line up with the previous ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ChildMatch {
    /// For each new child, the index of the previous child it updates.
    pub(crate) matched: Vec<Option<usize>>,
    /// For each new child, the key it is stored under.
    pub(crate) keys: Vec<Option<Key>>,
    /// Previous children nothing matched, in order.
    pub(crate) unmatched: Vec<usize>,
}

/// Match new children to previous ones.
///
/// Keyed children match the previous child with the same key. The first
/// occurrence of a key owns it; later duplicates are treated as unkeyed.
/// Unkeyed children match previous unkeyed children by position among the
/// unkeyed.
pub(crate) fn match_children(previous: &[Option<Key>], next: &[Option<&Key>]) -> ChildMatch {
    let mut by_key: HashMap<&Key, usize> = HashMap::new();
    let mut unkeyed = Vec::new();
    for (index, key) in previous.iter().enumerate() {
        match key {
            Some(key) => {
                by_key.insert(key, index);
            }
            None => unkeyed.push(index),
        }
    }

    let mut used = alloc::vec![false; previous.len()];
    let mut seen: HashSet<&Key> = HashSet::new();
    let mut unkeyed = unkeyed.into_iter();
    let mut out = ChildMatch::default();
    for key in next {
        let key = match key {
            Some(key) if seen.insert(*key) => Some(*key),
            Some(key) => {
                warn!("duplicate key {key:?} among siblings; treating it as unkeyed");
                None
            }
            None => None,
        };
        let matched = match key {
            Some(key) => by_key.get(key).copied(),
            None => unkeyed.next(),
        };
        if let Some(index) = matched {
            used[index] = true;
        }
        out.matched.push(matched);
        out.keys.push(key.cloned());
    }
    out.unmatched = (0..previous.len()).filter(|&i| !used[i]).collect();
    out
}

/// Whether a placement introduces a node or moves an attached one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlacementKind {
    Attach,
    Move,
}

/// Put `item` at `index` among its siblings, counted with `item` detached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Placement<T> {
    pub(crate) kind: PlacementKind,
    pub(crate) item: T,
    pub(crate) index: usize,
}

/// The attaches and moves that turn `previous` into `next`.
///
/// Items of `previous` missing from `next` are assumed gone already. The
/// longest run of retained items that kept their relative order stays put and
/// every other retained item is moved, so the plan issues as few moves as the
/// reorder allows. Placements are planned from the back, each item landing
/// just before its new successor.
pub(crate) fn plan_placements<T: Copy + Eq + Hash + core::fmt::Debug>(
    previous: &[T],
    next: &[T],
) -> Vec<Placement<T>> {
    let wanted: HashSet<T> = next.iter().copied().collect();
    let mut current: Vec<T> = previous.iter().copied().filter(|x| wanted.contains(x)).collect();
    let old_rank: HashMap<T, usize> = current.iter().enumerate().map(|(i, &x)| (x, i)).collect();
    let ranks: Vec<Option<usize>> = next.iter().map(|x| old_rank.get(x).copied()).collect();
    let stable = longest_increasing(&ranks);

    let mut plan = Vec::new();
    for (i, &item) in next.iter().enumerate().rev() {
        if stable[i] {
            continue;
        }
        let kind = match ranks[i] {
            Some(_) => PlacementKind::Move,
            None => PlacementKind::Attach,
        };
        if let Some(at) = current.iter().position(|x| *x == item) {
            current.remove(at);
        }
        let index = next
            .get(i + 1)
            .and_then(|after| current.iter().position(|x| x == after))
            .unwrap_or(current.len());
        current.insert(index, item);
        plan.push(Placement { kind, item, index });
    }
    debug_assert_eq!(current, next, "placements must reproduce the new order");
    plan
}

/// Marks one longest strictly increasing subsequence of the known ranks.
fn longest_increasing(ranks: &[Option<usize>]) -> Vec<bool> {
    // `tails[n]` ends the smallest-ending increasing run of length `n + 1`.
    let mut tails: Vec<usize> = Vec::new();
    let mut before: Vec<Option<usize>> = vec![None; ranks.len()];
    for (i, rank) in ranks.iter().enumerate() {
        let Some(rank) = *rank else { continue };
        let len = tails.partition_point(|&t| ranks[t] < Some(rank));
        if len > 0 {
            before[i] = Some(tails[len - 1]);
        }
        if len == tails.len() {
            tails.push(i);
        } else {
            tails[len] = i;
        }
    }
    let mut stable = vec![false; ranks.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        stable[i] = true;
        cursor = before[i];
    }
    stable
}
