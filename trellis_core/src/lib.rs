// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component tree, dirty-rectangle tracking, and input routing for retained
//! 2D GUIs.
//!
//! `trellis_core` keeps a tree of components in struct-of-arrays storage with
//! generational [`NodeId`] handles. It is `no_std` compatible (with `alloc`)
//! and knows nothing about windows or pixels: drawing goes through the
//! [`Surface`] trait and time through the [`Clock`] trait.
//!
//! # Architecture
//!
//! One frame of a host loop looks like this:
//!
//! ```text
//!   InputEvent ──► Gui::dispatch() ──► key / mouse hooks, MouseState steps
//!                                            │
//!   InputState ──► Gui::track() ──► hover enter/exit, held buttons
//!                                            │
//!                  Gui::tick_all() ──► flush Tracked attributes, refresh
//!                                            │
//!                  Gui::draw() ──► Damage (screen rectangles to present)
//! ```
//!
//! **[`tree`]**: the [`Gui`] arena, lifecycle (load, prepare, pause, freeze,
//! tick), focus, input routing, and compositing.
//!
//! **[`dirty`]**: per-node dirty rectangle sets, plus the inheritance channel
//! used to re-resolve contexts after reparenting.
//!
//! **[`attr`]**: [`Tracked`] attributes that report a [`Transition`] once per
//! tick when their value changes.
//!
//! **[`interaction`]**: the IDLE/HOVER/PUSH/PRESS/PULL mouse state machine.
//!
//! **[`gesture`]**: repeated clicks, long hovers, and long key presses.
//!
//! **[`style`]**: style and option lookup by kind, context, and query.
//!
//! **[`timer`]**: [`Delay`] and [`Pulse`] components built on [`Stopwatch`].
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and frame-loop events.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies.
//! - `trace-rich` (disabled by default, implies `trace`): Records per-node
//!   changes during [`Gui::draw`] and gates damage-rect events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod attr;
pub mod damage;
pub mod dirty;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod interaction;
pub mod message;
pub mod style;
pub mod surface;
pub mod time;
pub mod timer;
pub mod trace;
pub mod tree;

pub use attr::{Tracked, Transition};
pub use damage::Damage;
pub use dirty::DirtyRects;
pub use error::ConfigError;
pub use geometry::{Point, Rect, Size, TransitionRects, Vec2, transition_rects};
pub use gesture::{Gesture, GestureDelays, Gestures, Recognized};
pub use input::{
    InputEvent, InputState, KeyChord, KeyEvent, Modifiers, MouseButton, MouseButtons,
};
pub use interaction::{Interaction, MouseState, Steps};
pub use message::{Action, Command, Message, Propagation};
pub use style::{StyleSource, StyleTable, StyleValue};
pub use surface::{Color, Opacity, Surface, SurfaceFactory};
pub use time::{Clock, Duration, HostTime, ManualClock, Timebase};
pub use timer::{Delay, Pulse, Stopwatch};
pub use tree::{Ancestors, Capabilities, Children, Component, Ctx, Gui, INVALID, NodeId, NodeSpec};
