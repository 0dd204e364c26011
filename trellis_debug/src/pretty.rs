// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] writes one line per event to a
//! [`Write`](std::io::Write) destination (default: stderr). Timestamps are
//! shown in microseconds using a [`Timebase`].

use std::io::Write;

use trellis_core::time::{HostTime, Timebase};
use trellis_core::trace::{
    DamageRect, FrameBeginEvent, FrameSummary, NodeChange, NodeField, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, PresentEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Returns the destination, consuming the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn at(&self, t: HostTime) -> f64 {
        self.us(t.ticks())
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Input => "input",
        PhaseKind::Track => "track",
        PhaseKind::Tick => "tick",
        PhaseKind::Draw => "draw",
        PhaseKind::Present => "present",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] {} now={:.1}µs events={}",
            e.frame_index,
            self.at(e.now),
            e.queued_events,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.at(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            self.at(e.timestamp),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        if e.skipped {
            let _ = writeln!(self.writer, "[present] frame={} skipped", e.frame_index);
        } else {
            let _ = writeln!(
                self.writer,
                "[present] frame={} area={}px at {:.1}µs",
                e.frame_index,
                e.damage_area,
                self.at(e.presented_at),
            );
        }
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let redraw = if s.full_redraw { "full" } else { "partial" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} input={:.1}µs track={:.1}µs tick={:.1}µs \
             draw={:.1}µs present={:.1}µs damage={}px ({redraw})",
            s.frame_index,
            self.us(s.input_ticks),
            self.us(s.track_ticks),
            self.us(s.tick_ticks),
            self.us(s.draw_ticks),
            self.us(s.present_ticks),
            s.damage_area,
        );
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        let count = |field| changes.iter().filter(|c| c.field == field).count();
        let _ = writeln!(
            self.writer,
            "[nodes] frame={frame_index} geometry={} visibility={} content={}",
            count(NodeField::Geometry),
            count(NodeField::Visibility),
            count(NodeField::Content),
        );
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        let _ = write!(self.writer, "[damage] frame={frame_index}");
        for r in rects {
            let _ = write!(self.writer, " {}x{}+{}+{}", r.width, r.height, r.x, r.y);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn frame_begin_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            now: HostTime(1_000_000),
            queued_events: 2,
        });
        let out = output(sink);
        assert!(out.starts_with("[frame] 1"), "got: {out}");
        assert!(out.contains("now=1000.0µs"), "got: {out}");
    }

    #[test]
    fn skipped_present() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_present(&PresentEvent {
            frame_index: 4,
            presented_at: HostTime(0),
            damage_area: 0,
            skipped: true,
        });
        assert_eq!(output(sink), "[present] frame=4 skipped\n");
    }

    #[test]
    fn node_changes_are_grouped_by_field() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        let change = |node_index, field| NodeChange { node_index, field };
        sink.on_node_changes(
            3,
            &[
                change(0, NodeField::Content),
                change(1, NodeField::Geometry),
                change(2, NodeField::Content),
            ],
        );
        assert_eq!(
            output(sink),
            "[nodes] frame=3 geometry=1 visibility=0 content=2\n"
        );
    }

    #[test]
    fn damage_rects_are_listed() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_damage_rects(
            9,
            &[DamageRect {
                x: 10,
                y: 20,
                width: 30,
                height: 40,
            }],
        );
        assert_eq!(output(sink), "[damage] frame=9 30x40+10+20\n");
    }
}
