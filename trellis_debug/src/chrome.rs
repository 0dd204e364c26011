// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Frame phases become duration slices; everything else becomes instant
//! events.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use trellis_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Rich events carry no timestamp of their own and are placed at the start
/// of the frame they belong to.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let us = |ticks: u64| timebase.ticks_to_nanos(ticks) as f64 / 1000.0;
    let instant = |name: &str, cat: &str, ts: f64, args: Value| {
        json!({
            "ph": "i",
            "name": name,
            "cat": cat,
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": args,
        })
    };

    let mut events: Vec<Value> = Vec::new();
    let mut frame_start = 0.0;
    for recorded in decode(bytes) {
        let event = match recorded {
            RecordedEvent::FrameBegin(e) => {
                frame_start = us(e.now.ticks());
                instant(
                    "Frame",
                    "Frame",
                    frame_start,
                    json!({
                        "frame_index": e.frame_index,
                        "queued_events": e.queued_events,
                    }),
                )
            }
            RecordedEvent::PhaseBegin(e) => json!({
                "ph": "B",
                "name": format!("{:?}", e.phase),
                "cat": "Phase",
                "ts": us(e.timestamp.ticks()),
                "pid": 0,
                "tid": 0,
                "args": { "frame_index": e.frame_index },
            }),
            RecordedEvent::PhaseEnd(e) => json!({
                "ph": "E",
                "name": format!("{:?}", e.phase),
                "cat": "Phase",
                "ts": us(e.timestamp.ticks()),
                "pid": 0,
                "tid": 0,
                "args": { "frame_index": e.frame_index },
            }),
            RecordedEvent::Present(e) => instant(
                "Present",
                "Frame",
                us(e.presented_at.ticks()),
                json!({
                    "frame_index": e.frame_index,
                    "damage_area": e.damage_area,
                    "skipped": e.skipped,
                }),
            ),
            RecordedEvent::FrameSummary(s) => instant(
                "FrameSummary",
                "Summary",
                us(s.now.ticks()),
                json!({
                    "frame_index": s.frame_index,
                    "input_us": us(s.input_ticks),
                    "track_us": us(s.track_ticks),
                    "tick_us": us(s.tick_ticks),
                    "draw_us": us(s.draw_ticks),
                    "present_us": us(s.present_ticks),
                    "damage_area": s.damage_area,
                    "full_redraw": s.full_redraw,
                }),
            ),
            RecordedEvent::NodeChanges {
                frame_index,
                geometry,
                visibility,
                content,
            } => instant(
                "NodeChanges",
                "Rich",
                frame_start,
                json!({
                    "frame_index": frame_index,
                    "geometry": geometry,
                    "visibility": visibility,
                    "content": content,
                }),
            ),
            RecordedEvent::DamageRects {
                frame_index,
                count,
                area,
            } => instant(
                "DamageRects",
                "Rich",
                frame_start,
                json!({
                    "frame_index": frame_index,
                    "count": count,
                    "area": area,
                }),
            ),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use trellis_core::time::HostTime;
    use trellis_core::trace::{
        FrameBeginEvent, NodeChange, NodeField, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
        TraceSink,
    };

    fn exported(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn phases_become_duration_slices() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            now: HostTime(1_000_000),
            queued_events: 0,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Draw,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Draw,
            timestamp: HostTime(1_000_500),
        });

        let parsed = exported(&rec);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["name"], "Frame");
        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Draw");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 1000.5);
    }

    #[test]
    fn rich_events_sit_at_frame_start() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 2,
            now: HostTime(4_000),
            queued_events: 0,
        });
        rec.on_node_changes(
            2,
            &[NodeChange {
                node_index: 1,
                field: NodeField::Geometry,
            }],
        );

        let parsed = exported(&rec);
        assert_eq!(parsed[1]["name"], "NodeChanges");
        assert_eq!(parsed[1]["ts"], 4.0);
        assert_eq!(parsed[1]["args"]["geometry"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
