// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! [`TraceSink`] has one method per event, each defaulting to a no-op.
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`; without the `trace`
//! feature every `Tracer` method compiles to nothing, and with it each call
//! costs a single `Option` branch.
//!
//! A frame runs the phases of [`PhaseKind`] in order. [`FrameSummaryBuilder`]
//! collects their timestamps and produces a [`FrameSummary`].
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`): gates [`NodeChange`] and [`DamageRect`]
//!   events plus the corresponding `TraceSink` methods.

use crate::damage::Damage;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Routing the queued input events through the tree.
    Input,
    /// Hover reconciliation against the input snapshot.
    Track,
    /// Attribute flushes and per-node tick hooks.
    Tick,
    /// Dirty-region compositing.
    Draw,
    /// Copying damaged regions to the screen.
    Present,
}

impl PhaseKind {
    /// All phases in frame order.
    pub const ALL: [Self; 5] = [
        Self::Input,
        Self::Track,
        Self::Tick,
        Self::Draw,
        Self::Present,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Track => 1,
            Self::Tick => 2,
            Self::Draw => 3,
            Self::Present => 4,
        }
    }
}

/// Why a node was recomposited.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// Position or size changed.
    Geometry,
    /// Shown or hidden.
    Visibility,
    /// Surface content or tracked attributes changed.
    Content,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the driver starts a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time at the start of the frame.
    pub now: HostTime,
    /// Number of input events queued for this frame.
    pub queued_events: u32,
}

/// Marks the beginning of a frame-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame-loop phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after the driver presents (or skips presenting) a frame.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time of the present.
    pub presented_at: HostTime,
    /// Damaged area copied to the screen, in whole pixels.
    pub damage_area: u64,
    /// `true` if nothing changed and the present was skipped.
    pub skipped: bool,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time at the start of the frame.
    pub now: HostTime,
    /// Input phase duration in ticks (0 if not measured).
    pub input_ticks: u64,
    /// Track phase duration in ticks (0 if not measured).
    pub track_ticks: u64,
    /// Tick phase duration in ticks (0 if not measured).
    pub tick_ticks: u64,
    /// Draw phase duration in ticks (0 if not measured).
    pub draw_ticks: u64,
    /// Present phase duration in ticks (0 if not measured).
    pub present_ticks: u64,
    /// Damaged area in whole pixels.
    pub damage_area: u64,
    /// Whether the whole root was redrawn.
    pub full_redraw: bool,
}

/// A per-frame node change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct NodeChange {
    /// Arena index of the node.
    pub node_index: u32,
    /// What changed.
    pub field: NodeField,
}

/// An axis-aligned damage rectangle in screen pixels.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[cfg(feature = "trace-rich")]
impl From<kurbo::Rect> for DamageRect {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "damage rects hold integral pixel coordinates"
    )]
    fn from(r: kurbo::Rect) -> Self {
        Self {
            x: r.x0 as i32,
            y: r.y0 as i32,
            width: r.width().max(0.0) as u32,
            height: r.height().max(0.0) as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after presenting.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with the nodes recomposited this frame (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        _ = (frame_index, changes);
    }

    /// Called with the frame's screen damage (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        _ = (frame_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $($arg:expr),+) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($($arg),+);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = ($($arg),+);
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        dispatch!(self, on_frame_begin, e);
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        dispatch!(self, on_phase_begin, e);
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        dispatch!(self, on_phase_end, e);
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        dispatch!(self, on_present, e);
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        dispatch!(self, on_frame_summary, s);
    }

    /// Emits node changes (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        if let Some(s) = &mut self.sink {
            s.on_node_changes(frame_index, changes);
        }
    }

    /// Emits damage rectangles (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rects(frame_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    begin: FrameBeginEvent,
    phase_starts: [Option<HostTime>; 5],
    phase_ends: [Option<HostTime>; 5],
    damage_area: u64,
    full_redraw: bool,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(begin: &FrameBeginEvent) -> Self {
        Self {
            begin: *begin,
            phase_starts: [None; 5],
            phase_ends: [None; 5],
            damage_area: 0,
            full_redraw: false,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Records the frame's damage.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "damage areas are whole pixels well within u64"
    )]
    pub fn set_damage(&mut self, damage: &Damage) {
        self.damage_area = damage.area().max(0.0) as u64;
        self.full_redraw = matches!(damage, Damage::Full(_));
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.begin.frame_index,
            now: self.begin.now,
            input_ticks: self.phase_duration(PhaseKind::Input),
            track_ticks: self.phase_duration(PhaseKind::Track),
            tick_ticks: self.phase_duration(PhaseKind::Tick),
            draw_ticks: self.phase_duration(PhaseKind::Draw),
            present_ticks: self.phase_duration(PhaseKind::Present),
            damage_area: self.damage_area,
            full_redraw: self.full_redraw,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use kurbo::Rect;

    fn begin() -> FrameBeginEvent {
        FrameBeginEvent {
            frame_index: 42,
            now: HostTime(1_000),
            queued_events: 3,
        }
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.frame_begin(&begin());
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut b = FrameSummaryBuilder::new(&begin());
        let mut t = 1_000;
        for phase in PhaseKind::ALL {
            b.phase_begin(phase, HostTime(t));
            t += 10;
            b.phase_end(phase, HostTime(t));
        }
        b.set_damage(&Damage::Rects(vec![Rect::new(0., 0., 4., 5.)]));
        let s = b.finish();
        assert_eq!(s.frame_index, 42);
        assert_eq!(
            [s.input_ticks, s.track_ticks, s.tick_ticks, s.draw_ticks, s.present_ticks],
            [10; 5]
        );
        assert_eq!(s.damage_area, 20);
        assert!(!s.full_redraw);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let mut b = FrameSummaryBuilder::new(&begin());
        b.set_damage(&Damage::Full(Rect::new(0., 0., 10., 10.)));
        let s = b.finish();
        assert_eq!(s.draw_ticks, 0);
        assert!(s.full_redraw);
        assert_eq!(s.damage_area, 100);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct PhaseLog(Vec<PhaseKind>);
        impl TraceSink for PhaseLog {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.0.push(e.phase);
            }
        }

        let mut sink = PhaseLog(Vec::new());
        let mut tracer = Tracer::new(&mut sink);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Draw,
            timestamp: HostTime(5),
        });
        drop(tracer);
        assert_eq!(sink.0, [PhaseKind::Draw]);
    }
}
