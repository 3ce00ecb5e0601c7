// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-space distribution and main-axis spacing formulas.

use alloc::vec::Vec;

use crate::style::{AlignContent, Justify};

/// One item on a flex line, in main-axis terms.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct FlexItem {
    /// Hypothetical main size, already clamped to `min`/`max`.
    pub(crate) base: f64,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) grow: f64,
    pub(crate) shrink: f64,
    /// Leading plus trailing margin along the main axis.
    pub(crate) margin: f64,
}

/// Total outer main size of `sizes` plus gaps between them.
pub(crate) fn used_space(items: &[FlexItem], sizes: &[f64], gap: f64) -> f64 {
    let content: f64 = sizes.iter().sum();
    let margins: f64 = items.iter().map(|i| i.margin).sum();
    let gaps = if items.len() > 1 {
        gap * (items.len() - 1) as f64
    } else {
        0.0
    };
    content + margins + gaps
}

/// Resolve final main sizes for one line.
///
/// Positive free space goes to items with `grow > 0` in proportion to their
/// factor; negative free space is taken from items with `shrink > 0` in
/// proportion to theirs, never below `max(min, 0)`. An item that hits a bound
/// is frozen there and the rest of the space is redistributed among the others.
/// With nothing to grow or shrink the bases are returned unchanged, so a line
/// may overflow.
pub(crate) fn distribute(items: &[FlexItem], available: f64, gap: f64) -> Vec<f64> {
    let mut sizes: Vec<f64> = items.iter().map(|i| i.base).collect();
    let mut frozen: Vec<bool> = items.iter().map(|_| false).collect();

    let initial_free = available - used_space(items, &sizes, gap);
    let growing = initial_free > 0.0;
    if initial_free == 0.0 {
        return sizes;
    }

    loop {
        let free = available - used_space(items, &sizes, gap);
        let factor = |item: &FlexItem| if growing { item.grow } else { item.shrink };
        let total: f64 = items
            .iter()
            .zip(&frozen)
            .filter(|(item, f)| !**f && factor(item) > 0.0)
            .map(|(item, _)| factor(item))
            .sum();
        if total <= 0.0 || free == 0.0 || (growing && free < 0.0) || (!growing && free > 0.0) {
            break;
        }

        let mut violated = false;
        let mut targets = sizes.clone();
        for (i, item) in items.iter().enumerate() {
            if frozen[i] || factor(item) <= 0.0 {
                continue;
            }
            let target = sizes[i] + free * factor(item) / total;
            if growing {
                if let Some(max) = item.max
                    && target > max
                {
                    // Never below `min`: min wins over max.
                    sizes[i] = max.max(item.min.unwrap_or(0.0)).max(sizes[i]);
                    frozen[i] = true;
                    violated = true;
                    continue;
                }
            } else {
                let floor = item.min.unwrap_or(0.0).max(0.0);
                if target < floor {
                    sizes[i] = floor.min(sizes[i]);
                    frozen[i] = true;
                    violated = true;
                    continue;
                }
            }
            targets[i] = target;
        }

        if !violated {
            sizes = targets;
            break;
        }
    }
    sizes
}

/// Leading offset and spacing between items for `justify` given leftover space.
///
/// Negative free space falls back to `Start` for `SpaceBetween` and to
/// `Center` for `SpaceAround`/`SpaceEvenly`.
pub(crate) fn justify_spacing(justify: Justify, free: f64, count: usize, gap: f64) -> (f64, f64) {
    if count == 0 {
        return (0.0, gap);
    }
    let n = count as f64;
    match justify {
        Justify::Start => (0.0, gap),
        Justify::Center => (free / 2.0, gap),
        Justify::End => (free, gap),
        Justify::SpaceBetween => {
            if count > 1 && free > 0.0 {
                (0.0, gap + free / (n - 1.0))
            } else {
                (0.0, gap)
            }
        }
        Justify::SpaceAround => {
            if free > 0.0 {
                (free / (2.0 * n), gap + free / n)
            } else {
                (free / 2.0, gap)
            }
        }
        Justify::SpaceEvenly => {
            if free > 0.0 {
                (free / (n + 1.0), gap + free / (n + 1.0))
            } else {
                (free / 2.0, gap)
            }
        }
    }
}

/// Leading offset, spacing, and per-line extra cross size for wrapped lines.
pub(crate) fn align_content_spacing(
    align: AlignContent,
    free: f64,
    lines: usize,
    line_gap: f64,
) -> (f64, f64, f64) {
    if lines == 0 {
        return (0.0, line_gap, 0.0);
    }
    let (start, between) = match align {
        AlignContent::Start => (0.0, line_gap),
        AlignContent::Center => (free / 2.0, line_gap),
        AlignContent::End => (free, line_gap),
        AlignContent::SpaceBetween => justify_spacing(Justify::SpaceBetween, free, lines, line_gap),
        AlignContent::SpaceAround => justify_spacing(Justify::SpaceAround, free, lines, line_gap),
        AlignContent::SpaceEvenly => justify_spacing(Justify::SpaceEvenly, free, lines, line_gap),
        AlignContent::Stretch => {
            let extra = if free > 0.0 { free / lines as f64 } else { 0.0 };
            return (0.0, line_gap, extra);
        }
    };
    (start, between, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(base: f64, grow: f64) -> FlexItem {
        FlexItem {
            base,
            min: None,
            max: None,
            grow,
            shrink: 0.0,
            margin: 0.0,
        }
    }

    #[test]
    fn grow_is_proportional() {
        let sizes = distribute(&[item(0.0, 1.0), item(0.0, 2.0)], 300.0, 0.0);
        assert_eq!(sizes, [100.0, 200.0]);
    }

    #[test]
    fn gap_and_fixed_siblings_reduce_free_space() {
        let sizes = distribute(&[item(50.0, 0.0), item(0.0, 1.0)], 200.0, 10.0);
        assert_eq!(sizes, [50.0, 140.0]);
    }

    #[test]
    fn clamped_item_releases_space_to_siblings() {
        let mut capped = item(0.0, 1.0);
        capped.max = Some(50.0);
        let sizes = distribute(&[capped, item(0.0, 1.0)], 300.0, 0.0);
        assert_eq!(sizes, [50.0, 250.0]);
    }

    #[test]
    fn shrink_never_goes_negative() {
        let mut a = item(100.0, 0.0);
        a.shrink = 1.0;
        let mut b = item(300.0, 0.0);
        b.shrink = 1.0;
        // Deficit of 300 split evenly would push `a` to -50; it freezes at 0.
        let sizes = distribute(&[a, b], 100.0, 0.0);
        assert_eq!(sizes, [0.0, 100.0]);
    }

    #[test]
    fn no_shrinkable_items_overflow() {
        let sizes = distribute(&[item(200.0, 0.0), item(200.0, 0.0)], 100.0, 0.0);
        assert_eq!(sizes, [200.0, 200.0]);
    }

    #[test]
    fn justify_formulas() {
        // 3 items, 60 free, gap 0.
        assert_eq!(justify_spacing(Justify::Start, 60.0, 3, 0.0), (0.0, 0.0));
        assert_eq!(justify_spacing(Justify::Center, 60.0, 3, 0.0), (30.0, 0.0));
        assert_eq!(justify_spacing(Justify::End, 60.0, 3, 0.0), (60.0, 0.0));
        assert_eq!(justify_spacing(Justify::SpaceBetween, 60.0, 3, 0.0), (0.0, 30.0));
        assert_eq!(justify_spacing(Justify::SpaceAround, 60.0, 3, 0.0), (10.0, 20.0));
        assert_eq!(justify_spacing(Justify::SpaceEvenly, 60.0, 3, 0.0), (15.0, 15.0));
    }

    #[test]
    fn negative_free_space_fallbacks() {
        assert_eq!(justify_spacing(Justify::SpaceBetween, -20.0, 2, 5.0), (0.0, 5.0));
        assert_eq!(justify_spacing(Justify::SpaceEvenly, -20.0, 2, 5.0), (-10.0, 5.0));
    }

    #[test]
    fn stretch_lines_share_free_space() {
        assert_eq!(
            align_content_spacing(AlignContent::Stretch, 30.0, 3, 4.0),
            (0.0, 4.0, 10.0)
        );
    }
}
