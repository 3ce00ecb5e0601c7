// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed children keep their host nodes across reorders, inserts and removals.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p canopy_demos --example keyed_list`

use canopy_box_tree::NodeId;
use canopy_core::{BoxTreeHost, Element, HostHandle, Runtime, Style, TextProps, ViewProps};
use kurbo::Size;

fn list(items: &[&str]) -> Element {
    Element::view(ViewProps::new(Style::column().with_gap(4.0))).with_children(
        items
            .iter()
            .map(|&item| Element::text(TextProps::new(item)).with_key(item)),
    )
}

/// Each child of the root as `content#slot`, in host order.
fn describe(runtime: &Runtime<BoxTreeHost>) -> String {
    let host = runtime.host();
    let tree = host.tree();
    let Some(&root) = tree.roots().first() else {
        return String::from("(empty)");
    };
    tree.children(root)
        .iter()
        .map(|&node: &NodeId| {
            let content = host
                .visual(HostHandle::new(node.to_bits()))
                .and_then(|v| v.content.as_deref())
                .unwrap_or("?");
            format!("{content}#{}", node.to_bits() & 0xffff_ffff)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    env_logger::init();

    let mut runtime = Runtime::new(BoxTreeHost::new(), Size::new(320.0, 480.0));
    let steps: [(&str, &[&str]); 5] = [
        ("mount", &["apple", "banana", "cherry", "damson"]),
        ("reverse", &["damson", "cherry", "banana", "apple"]),
        ("insert", &["damson", "elder", "cherry", "banana", "apple"]),
        ("remove", &["damson", "elder", "apple"]),
        ("rotate", &["elder", "apple", "damson"]),
    ];
    for (step, items) in steps {
        let report = runtime.render(list(items)).expect("render failed");
        println!(
            "{step:>8}: {}  (passes={}, measured={})",
            describe(&runtime),
            report.passes,
            report.layout.measured
        );
    }
    println!("slots stay with their keys; only new keys get new slots");
}
