// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;

/// A component failed to render.
///
/// Render errors travel to the nearest enclosing [boundary](crate::boundary).
/// Without one they surface from [`Runtime::flush`](crate::Runtime::flush) as
/// [`RuntimeError::Render`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The component reported a failure.
    #[error("component failed: {0}")]
    Failed(String),
    /// A hook was called in a different order than on the previous render.
    #[error("hook {index} was {found} but this render asked for {expected}")]
    HookMismatch {
        /// Position of the hook call.
        index: usize,
        /// Kind of hook this render called.
        expected: &'static str,
        /// Kind of hook stored at that position.
        found: &'static str,
    },
    /// A render called a different number of hooks than the previous one.
    #[error("render called {current} hooks, previous render called {previous}")]
    HookCount {
        /// Hooks called by the previous render.
        previous: usize,
        /// Hooks called by this render.
        current: usize,
    },
    /// A primitive carried props outside their valid range.
    #[error("invalid props: {0}")]
    InvalidProps(#[from] PropError),
    /// The host could not realise a primitive.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl RenderError {
    /// Shorthand for [`RenderError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A host adapter operation failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host refused to create a node.
    #[error("host could not create node: {0}")]
    CreateFailed(String),
    /// The handle does not name a live host node.
    #[error("unknown host handle {0:#x}")]
    UnknownHandle(u64),
}

/// A prop value outside its valid range.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PropError {
    /// Opacity must lie in `0.0..=1.0`.
    #[error("opacity {0} is outside 0..=1")]
    Opacity(f64),
    /// Font size must be finite and positive.
    #[error("font size {0} must be finite and positive")]
    FontSize(f64),
    /// Border width must be finite and non-negative.
    #[error("border width {0} must be finite and non-negative")]
    BorderWidth(f64),
    /// A style field is non-finite, negative, or a percentage outside `0.0..=1.0`.
    #[error("style has a non-finite, negative or out-of-range value")]
    Style,
}

/// A [`Runtime`](crate::Runtime) operation failed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// A render error reached the root without meeting a boundary.
    ///
    /// The last committed tree stays in place.
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    /// Effects kept requesting updates past the configured pass limit.
    #[error("updates did not settle after {passes} passes")]
    UpdateLoop {
        /// Passes run before giving up.
        passes: usize,
    },
    /// The operation needs a mounted tree.
    #[error("no tree is mounted")]
    NotMounted,
}
