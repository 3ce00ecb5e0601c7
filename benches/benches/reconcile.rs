// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_core::{
    BoxTreeHost, Element, EventFlow, PointerEvent, PointerHandler, Runtime, Scope, Style,
    TextProps, ViewProps, component,
};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;

const VIEWPORT: Size = Size::new(1024.0, 768.0);

fn list(ids: impl Iterator<Item = usize>) -> Element {
    Element::view(ViewProps::new(Style::column().with_gap(2.0))).with_children(ids.map(|id| {
        Element::text(TextProps::new(format!("item {id}"))).with_key(id as i64)
    }))
}

fn bench_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");
    for n in [100_usize, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("list_n{n}"), |b| {
            b.iter_batched(
                || (Runtime::new(BoxTreeHost::new(), VIEWPORT), list(0..n)),
                |(mut rt, tree)| black_box(rt.mount(tree).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_keyed(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed");
    for n in [100_usize, 1000] {
        let forward = list(0..n);
        let reversed = list((0..n).rev());
        let rotated = list((1..n).chain([0]));
        let mut rt = Runtime::new(BoxTreeHost::new(), VIEWPORT);
        rt.mount(forward.clone()).unwrap();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("reverse_n{n}"), |b| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let next = if flip { &reversed } else { &forward };
                black_box(rt.render(next.clone()).unwrap())
            });
        });
        group.bench_function(format!("rotate_n{n}"), |b| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let next = if flip { &rotated } else { &forward };
                black_box(rt.render(next.clone()).unwrap())
            });
        });
        group.bench_function(format!("unchanged_n{n}"), |b| {
            b.iter(|| black_box(rt.render(list(0..n)).unwrap()));
        });
    }
    group.finish();
}

fn clicker(scope: &mut Scope<'_>, rows: &usize) -> Element {
    let (count, set) = scope.use_state(0_u64);
    let click = PointerHandler::new(move |_| {
        set.update(|n| n + 1);
        EventFlow::Stop
    });
    Element::view(ViewProps::new(Style::column().with_size(400.0, 600.0)).on_pointer(click))
        .with_children(
            (0..*rows).map(|i| Element::text(TextProps::new(format!("row {i} of {count}")))),
        )
}

fn bench_state_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_update");
    let mut rt = Runtime::new(BoxTreeHost::new(), VIEWPORT);
    rt.mount(component(clicker, 50_usize)).unwrap();
    group.bench_function("click_rows50", |b| {
        b.iter(|| black_box(rt.dispatch_pointer(PointerEvent::down((5.0, 5.0))).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_mount, bench_keyed, bench_state_update);
criterion_main!(benches);
