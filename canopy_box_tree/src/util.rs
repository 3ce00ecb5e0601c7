// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers.

use kurbo::{Affine, Point, Rect};

/// Axis-aligned bounding box of `rect` under `affine`.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Half-open containment: the right and bottom edges belong to the neighbour.
pub(crate) fn contains(rect: Rect, pt: Point) -> bool {
    pt.x >= rect.x0 && pt.x < rect.x1 && pt.y >= rect.y0 && pt.y < rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_4;

    #[test]
    fn rotation_expands_bbox() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let bbox = transform_rect_bbox(Affine::rotate(FRAC_PI_4), r);
        assert!(bbox.width() > 14.0, "rotated square should be wider than its side");
    }

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains(r, Point::new(0.0, 0.0)));
        assert!(!contains(r, Point::new(10.0, 5.0)));
    }
}
