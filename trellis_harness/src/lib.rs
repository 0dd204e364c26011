// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless frame driver and frame statistics for trellis.
//!
//! [`HeadlessDriver`] runs a [`Gui`](trellis_core::Gui) without a platform
//! window. Each [`frame`](HeadlessDriver::frame) goes through these phases:
//!
//! ```text
//!   push_event() ──► queue ──► Input: Gui::dispatch() per event
//!                                │
//!   InputState snapshot ──► Track: Gui::track()
//!                                │
//!                          Tick: Gui::tick_all()
//!                                │
//!                          Draw: Gui::draw() ──► Damage
//!                                │
//!                          Present: damaged rects → screen surface
//!                                │
//!                          FrameStats::observe()
//! ```
//!
//! A [`Window`] component sits at the root. It paints the screen with its
//! `bg-color` style, and [`Message::Exit`](trellis_core::Message::Exit)
//! reaching it ends [`run_until_exit`](HeadlessDriver::run_until_exit).
//! Time comes from any [`Clock`](trellis_core::Clock): [`MonotonicClock`]
//! for live runs, [`ManualClock`](trellis_core::ManualClock) for tests.
//!
//! # Crate features
//!
//! - `trace-rich` (disabled by default): Forwards per-node changes and
//!   damage rectangles to trace sinks.

mod clock;
mod config;
mod driver;
mod logging;
mod stats;
mod window;

pub use clock::MonotonicClock;
pub use config::DriverConfig;
pub use driver::{HeadlessDriver, RunOutcome, STATS_WINDOW};
pub use logging::init_logging;
pub use stats::{FrameStats, RedrawGrade, StatsReport};
pub use window::{WINDOW_KIND, Window};
