// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable configuration errors.
//!
//! Invariant violations (double load, stale ids, cycles) are not represented
//! here; they panic at the point of misuse.

use alloc::string::String;

use crate::surface::Opacity;

/// A failed style, option, or control lookup, or a surface that does not fit
/// the node's opacity class.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No style entry matched at any fallback level.
    #[error("no style `{query}` for kind {kind:?} in context {context:?}")]
    MissingStyle {
        /// The style key.
        query: String,
        /// Style category of the asking node.
        kind: Option<String>,
        /// Effective context of the asking node.
        context: Option<String>,
    },
    /// No option entry matched at any fallback level.
    #[error("no option `{query}` for kind {kind:?} in context {context:?}")]
    MissingOption {
        /// The option key.
        query: String,
        /// Style category of the asking node.
        kind: Option<String>,
        /// Effective context of the asking node.
        context: Option<String>,
    },
    /// No control is bound to the chord in the given context.
    #[error("no control bound for {chord} in context {context:?}")]
    MissingControl {
        /// Human-readable chord.
        chord: String,
        /// Effective context of the asking node.
        context: Option<String>,
    },
    /// The entry exists but holds a different kind of value.
    #[error("`{query}` holds a {found}, expected a {expected}")]
    WrongType {
        /// The style or option key.
        query: String,
        /// Expected value kind.
        expected: &'static str,
        /// Actual value kind.
        found: &'static str,
    },
    /// The background surface cannot be used by a node of this class.
    #[error("{opacity:?} node cannot take this background: {reason}")]
    IncompatibleBackground {
        /// Opacity class of the node.
        opacity: Opacity,
        /// What was wrong with the surface.
        reason: &'static str,
    },
    /// The blending setting introduces transparency the node's class does
    /// not allow, or the node owns no surface to apply it to.
    #[error("{opacity:?} node cannot use {setting}")]
    IncompatibleBlending {
        /// Opacity class of the node.
        opacity: Opacity,
        /// `"a colorkey"` or `"surface alpha"`.
        setting: &'static str,
    },
}
