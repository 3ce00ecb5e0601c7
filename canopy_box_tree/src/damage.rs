// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage produced by [`Tree::commit`](crate::Tree::commit).

use alloc::vec::Vec;
use kurbo::Rect;

/// World-space regions that changed since the previous commit.
///
/// Moved or resized nodes contribute both their old and new bounds; added
/// nodes contribute their new bounds and removed nodes their last committed
/// bounds. Empty rectangles are never recorded.
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// World-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Returns true if nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }

    pub(crate) fn push(&mut self, rect: Rect) {
        if rect.width() > 0.0 && rect.height() > 0.0 {
            self.dirty_rects.push(rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rects_are_ignored() {
        let mut damage = Damage::default();
        damage.push(Rect::new(5.0, 5.0, 5.0, 10.0));
        assert!(damage.is_empty());
        assert_eq!(damage.union_rect(), None);
    }

    #[test]
    fn union_covers_all_rects() {
        let mut damage = Damage::default();
        damage.push(Rect::new(0.0, 0.0, 10.0, 10.0));
        damage.push(Rect::new(20.0, 5.0, 30.0, 15.0));
        assert_eq!(damage.union_rect(), Some(Rect::new(0.0, 0.0, 30.0, 15.0)));
    }
}
