// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A click counter: state, an effect with cleanup, and pointer dispatch.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example counter`

use canopy_core::{
    BoxTreeHost, Color, Element, EventFlow, HostHandle, PointerEvent, PointerHandler, Runtime,
    Scope, Style, TextProps, ViewProps, component,
};
use kurbo::{Insets, Size};
use log::info;

fn counter(scope: &mut Scope<'_>, label: &&'static str) -> Element {
    let (count, set) = scope.use_state(0_u32);
    scope.use_effect_with_cleanup(count, move || {
        info!("count is now {count}");
        move || info!("leaving count {count}")
    });
    let click = PointerHandler::new(move |event| {
        info!("click at {:?}", event.position);
        set.update(|n| n + 1);
        EventFlow::Stop
    });
    let background = if count % 2 == 0 {
        Color::rgb8(40, 120, 220)
    } else {
        Color::rgb8(220, 90, 40)
    };
    Element::view(
        ViewProps::new(
            Style::row()
                .with_size(240.0, 48.0)
                .with_padding(Insets::uniform(12.0)),
        )
        .with_background(background)
        .on_pointer(click),
    )
    .with_children([Element::text(
        TextProps::new(format!("{label}: {count}")).with_color(Color::WHITE),
    )])
}

fn label_of(runtime: &Runtime<BoxTreeHost>) -> String {
    let tree = runtime.host().tree();
    let Some(&root) = tree.roots().first() else {
        return String::new();
    };
    tree.children(root)
        .first()
        .and_then(|text| runtime.host().visual(HostHandle::new(text.to_bits())))
        .and_then(|visual| visual.content.as_deref())
        .unwrap_or_default()
        .to_string()
}

fn main() {
    env_logger::init();

    let mut runtime = Runtime::new(BoxTreeHost::new(), Size::new(640.0, 480.0));
    runtime
        .mount(component(counter, "clicks"))
        .expect("mount failed");
    println!("mounted: {}", label_of(&runtime));

    for click in 0..3 {
        let x = 20.0 + f64::from(click) * 50.0;
        let outcome = runtime
            .dispatch_pointer(PointerEvent::down((x, 20.0)))
            .expect("dispatch failed");
        println!(
            "click #{click}: handlers={} stopped={} -> {}",
            outcome.handlers,
            outcome.stopped,
            label_of(&runtime)
        );
    }

    let miss = runtime
        .dispatch_pointer(PointerEvent::down((600.0, 400.0)))
        .expect("dispatch failed");
    println!("click outside: hit={}", miss.hit);

    runtime.unmount().expect("unmount failed");
    println!("unmounted, {} nodes left", runtime.host().tree().len());
}
