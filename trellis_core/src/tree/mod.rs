// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component tree.
//!
//! A *node* is an element of an ownership tree held by a [`Gui`]. Each node
//! has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: one parent at most, and children in registration order.
//! - A style category (`kind`) and a style context, inherited from the
//!   nearest ancestor that sets one explicitly.
//! - Behaviour: a boxed [`Component`] whose hooks the tree calls.
//! - Optionally, **graphics**: a rectangle relative to the parent, a z order,
//!   visibility, an [`Opacity`](crate::Opacity) class, background and display
//!   surfaces, pointer [`Capabilities`], dirty-rectangle state, an
//!   optional mouse [`Interaction`](crate::Interaction), and optional
//!   [`Gestures`](crate::Gestures).
//!
//! Plain nodes (no graphics) carry data and timers. They tick and receive
//! messages and key events, but take no part in drawing or pointer routing.
//!
//! # Inherited state
//!
//! Reparenting and context changes mark nodes on the
//! [`INHERIT`](crate::dirty::INHERIT) channel, which propagates to all
//! descendants through child→parent dependency edges. The affected nodes
//! re-resolve their effective context and root attachment right away.
//!
//! # Hooks
//!
//! While a hook runs, its component is checked out of the arena so the hook
//! can mutate the whole tree through its [`Ctx`]. The tree skips hooks of a
//! checked-out component and defers messages addressed to it.

mod component;
mod draw;
mod events;
mod focus;
mod gestures;
mod graphics;
mod id;
mod lifecycle;
mod node;
mod store;
mod traverse;

#[cfg(test)]
pub(crate) mod testing;

pub use component::{Component, Ctx};
pub use id::{INVALID, NodeId};
pub use node::{Capabilities, NodeSpec};
pub use store::Gui;
pub use traverse::{Ancestors, Children};
