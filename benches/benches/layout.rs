// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_layout::{LayoutCache, LayoutTree, MeasureConstraints, Style, compute_layout};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;

/// A column of wrapping rows, each holding `cols` leaves.
struct Grid {
    styles: Vec<Style>,
    children: Vec<Vec<usize>>,
    caches: Vec<LayoutCache>,
}

impl Grid {
    fn new(rows: usize, cols: usize) -> Self {
        let mut styles = vec![Style::column().with_gap(2.0)];
        let mut children = vec![Vec::new()];
        for _ in 0..rows {
            let row = styles.len();
            styles.push(Style::row().with_gap(4.0).with_wrap(2.0));
            children.push(Vec::new());
            children[0].push(row);
            for c in 0..cols {
                let leaf = styles.len();
                styles.push(if c % 3 == 0 {
                    Style::default().with_grow(1.0)
                } else {
                    Style::default()
                });
                children.push(Vec::new());
                children[row].push(leaf);
            }
        }
        let caches = styles.iter().map(|_| LayoutCache::new()).collect();
        Self {
            styles,
            children,
            caches,
        }
    }

    fn len(&self) -> usize {
        self.styles.len()
    }

    /// Dirty the last leaf of the first row.
    fn touch_leaf(&mut self) {
        let row = self.children[0][0];
        let leaf = *self.children[row].last().unwrap();
        self.caches[leaf].mark_dirty();
        self.caches[row].mark_descendant_dirty();
        self.caches[0].mark_descendant_dirty();
    }
}

impl LayoutTree for Grid {
    type NodeId = usize;

    fn style(&self, node: usize) -> Style {
        self.styles[node]
    }

    fn child_count(&self, node: usize) -> usize {
        self.children[node].len()
    }

    fn child_at(&self, node: usize, index: usize) -> usize {
        self.children[node][index]
    }

    fn measure_leaf(&mut self, node: usize, _: MeasureConstraints) -> Option<Size> {
        Some(Size::new(8.0 + (node % 5) as f64 * 6.0, 12.0))
    }

    fn cache(&self, node: usize) -> &LayoutCache {
        &self.caches[node]
    }

    fn cache_mut(&mut self, node: usize) -> &mut LayoutCache {
        &mut self.caches[node]
    }
}

const VIEWPORT: Size = Size::new(1024.0, 768.0);

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_full");
    for rows in [10_usize, 50, 200] {
        let nodes = Grid::new(rows, 20).len();
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_function(format!("rows{rows}_cols20"), |b| {
            b.iter_batched(
                || Grid::new(rows, 20),
                |mut grid| black_box(compute_layout(&mut grid, 0, VIEWPORT)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_incremental");
    let mut grid = Grid::new(200, 20);
    compute_layout(&mut grid, 0, VIEWPORT);
    group.bench_function("clean_pass", |b| {
        b.iter(|| black_box(compute_layout(&mut grid, 0, VIEWPORT)));
    });
    group.bench_function("leaf_edit", |b| {
        b.iter(|| {
            grid.touch_leaf();
            black_box(compute_layout(&mut grid, 0, VIEWPORT))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_full_pass, bench_incremental);
criterion_main!(benches);
