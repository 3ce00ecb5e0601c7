// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host adapter that records every call, for tests.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use canopy_layout::{Geometry, MeasureConstraints};
use hashbrown::HashMap;
use kurbo::Size;

use crate::error::HostError;
use crate::host::{HostAdapter, HostHandle};
use crate::props::{Primitive, PropChange, Props};

/// One adapter call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Create {
        handle: HostHandle,
        primitive: Primitive,
    },
    Update {
        handle: HostHandle,
        changes: Vec<PropChange>,
    },
    Destroy(HostHandle),
    Geometry {
        handle: HostHandle,
        geometry: Geometry,
    },
    Attach {
        handle: HostHandle,
        parent: Option<HostHandle>,
        index: usize,
    },
    Reparent {
        handle: HostHandle,
        parent: Option<HostHandle>,
        index: usize,
    },
}

#[derive(Debug)]
struct Node {
    text: Option<String>,
    parent: Option<Option<HostHandle>>,
    geometry: Option<Geometry>,
}

/// Text measures ten pixels per character and twenty pixels tall; images
/// measure 32 by 32.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    next: u64,
    nodes: HashMap<HostHandle, Node>,
    children: HashMap<Option<HostHandle>, Vec<HostHandle>>,
    calls: Vec<Call>,
    fail_text: Option<String>,
}

impl RecordingHost {
    /// Recorded calls since the last take.
    pub(crate) fn take_calls(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }

    /// Make creating a text node with `content` fail.
    pub(crate) fn fail_creates_of(&mut self, content: &str) {
        self.fail_text = Some(content.to_string());
    }

    pub(crate) fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn children(&self, parent: Option<HostHandle>) -> Vec<HostHandle> {
        self.children.get(&parent).cloned().unwrap_or_default()
    }

    /// Contents of the text children of `parent`, in order.
    pub(crate) fn texts_under(&self, parent: HostHandle) -> Vec<String> {
        self.children(Some(parent))
            .iter()
            .filter_map(|h| self.nodes.get(h).and_then(|n| n.text.clone()))
            .collect()
    }

    /// The live text node showing `content`.
    pub(crate) fn find_text(&self, content: &str) -> Option<HostHandle> {
        self.nodes
            .iter()
            .find(|(_, n)| n.text.as_deref() == Some(content))
            .map(|(h, _)| *h)
    }

    pub(crate) fn geometry(&self, handle: HostHandle) -> Option<Geometry> {
        self.nodes.get(&handle).and_then(|n| n.geometry)
    }

    fn detach(&mut self, handle: HostHandle) {
        if let Some(parent) = self.nodes.get(&handle).and_then(|n| n.parent)
            && let Some(list) = self.children.get_mut(&parent)
        {
            list.retain(|h| *h != handle);
        }
    }

    fn place(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize) {
        self.detach(handle);
        let list = self.children.entry(parent).or_default();
        list.insert(index.min(list.len()), handle);
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.parent = Some(parent);
        }
    }
}

impl HostAdapter for RecordingHost {
    fn create_node(&mut self, primitive: Primitive, props: &Props) -> Result<HostHandle, HostError> {
        let text = match props {
            Props::Text(text) => Some(text.content.to_string()),
            _ => None,
        };
        if text.is_some() && text == self.fail_text {
            return Err(HostError::CreateFailed("refused by test host".to_string()));
        }
        self.next += 1;
        let handle = HostHandle::new(self.next);
        self.nodes.insert(
            handle,
            Node {
                text,
                parent: None,
                geometry: None,
            },
        );
        self.calls.push(Call::Create { handle, primitive });
        Ok(handle)
    }

    fn update_node(&mut self, handle: HostHandle, changes: &[PropChange]) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            for change in changes {
                if let PropChange::Content(content) = change {
                    node.text = Some(content.to_string());
                }
            }
        }
        self.calls.push(Call::Update {
            handle,
            changes: changes.to_vec(),
        });
    }

    fn destroy_node(&mut self, handle: HostHandle) {
        self.detach(handle);
        self.nodes.remove(&handle);
        self.children.remove(&Some(handle));
        self.calls.push(Call::Destroy(handle));
    }

    fn set_geometry(&mut self, handle: HostHandle, geometry: &Geometry) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.geometry = Some(*geometry);
        }
        self.calls.push(Call::Geometry {
            handle,
            geometry: *geometry,
        });
    }

    fn measure_intrinsic(&mut self, handle: HostHandle, _: MeasureConstraints) -> Size {
        match self.nodes.get(&handle).and_then(|n| n.text.as_ref()) {
            Some(text) => Size::new(text.chars().count() as f64 * 10.0, 20.0),
            None => Size::new(32.0, 32.0),
        }
    }

    fn reparent(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize) {
        self.place(handle, parent, index);
        self.calls.push(Call::Reparent {
            handle,
            parent,
            index,
        });
    }

    fn attach(&mut self, handle: HostHandle, parent: Option<HostHandle>, index: usize) {
        self.place(handle, parent, index);
        self.calls.push(Call::Attach {
            handle,
            parent,
            index,
        });
    }
}
