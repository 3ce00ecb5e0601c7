// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flex sizing rules, read back through node refs.
//!
//! Run:
//! - `cargo run -p canopy_demos --example flex_row`

use canopy_core::{
    BoxTreeHost, Dimension, Element, ImageProps, NodeRef, Overflow, Runtime, Style, TextProps,
    ViewProps,
};
use kurbo::Size;

struct Watched {
    name: &'static str,
    node: NodeRef,
}

fn watch(name: &'static str) -> Watched {
    Watched {
        name,
        node: NodeRef::new(),
    }
}

fn print(watched: &[Watched]) {
    for p in watched {
        match p.node.get() {
            Some(g) => println!(
                "  {:<8} x={:>6.1} y={:>6.1} w={:>6.1} h={:>6.1} clip={:?}",
                p.name, g.x, g.y, g.width, g.height, g.clip
            ),
            None => println!("  {:<8} (not laid out)", p.name),
        }
    }
}

fn main() {
    env_logger::init();

    let watched = [
        watch("row"),
        watch("fixed"),
        watch("grow"),
        watch("percent"),
        watch("text"),
        watch("image"),
    ];
    let tree = Element::view(
        ViewProps::new(
            Style::row()
                .with_width(Dimension::percent(0.8))
                .with_height(60.0)
                .with_gap(10.0)
                .with_overflow(Overflow::Hidden),
        )
        .with_node_ref(watched[0].node.clone()),
    )
    .with_children([
        Element::view(
            ViewProps::new(Style::default().with_width(50.0)).with_node_ref(watched[1].node.clone()),
        ),
        Element::view(
            ViewProps::new(Style::default().with_grow(1.0)).with_node_ref(watched[2].node.clone()),
        ),
        Element::view(
            ViewProps::new(Style::default().with_width(Dimension::percent(0.25)))
                .with_node_ref(watched[3].node.clone()),
        ),
        Element::text(TextProps::new("wrapped label").with_node_ref(watched[4].node.clone())),
        Element::image(ImageProps::new("icon").with_node_ref(watched[5].node.clone())),
    ]);

    let mut host = BoxTreeHost::new();
    host.register_image("icon", Size::new(24.0, 24.0));
    let mut runtime = Runtime::new(host, Size::new(500.0, 300.0));

    let report = runtime.mount(tree).expect("mount failed");
    println!("viewport 500x300 (measured {}):", report.layout.measured);
    print(&watched);

    let report = runtime
        .set_viewport(Size::new(300.0, 300.0))
        .expect("relayout failed");
    println!("viewport 300x300 (measured {}):", report.layout.measured);
    print(&watched);

    let damage = runtime.host_mut().commit();
    println!("damage: {:?}", damage.union_rect());
}
