// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] encodes events into a `Vec<u8>` as tagged little-endian
//! records. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Rich events are summarized: node changes are stored as a count per
//! [`NodeField`], damage rectangles as a count and a total area.

use trellis_core::time::HostTime;
use trellis_core::trace::{
    DamageRect, FrameBeginEvent, FrameSummary, NodeChange, NodeField, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, PresentEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_PRESENT: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;
const TAG_NODE_CHANGES: u8 = 6;
const TAG_DAMAGE_RECTS: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "counts capped at u32::MAX for recording"
    )]
    fn write_count(&mut self, n: usize) {
        self.write_u32(n.min(u32::MAX as usize) as u32);
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Input => 0,
            PhaseKind::Track => 1,
            PhaseKind::Tick => 2,
            PhaseKind::Draw => 3,
            PhaseKind::Present => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.ticks());
        self.write_u32(e.queued_events);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.write_u8(TAG_PRESENT);
        self.write_u64(e.frame_index);
        self.write_u64(e.presented_at.ticks());
        self.write_u64(e.damage_area);
        self.write_u8(u8::from(e.skipped));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.now.ticks());
        self.write_u64(s.input_ticks);
        self.write_u64(s.track_ticks);
        self.write_u64(s.tick_ticks);
        self.write_u64(s.draw_ticks);
        self.write_u64(s.present_ticks);
        self.write_u64(s.damage_area);
        self.write_u8(u8::from(s.full_redraw));
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        self.write_u8(TAG_NODE_CHANGES);
        self.write_u64(frame_index);
        for field in [NodeField::Geometry, NodeField::Visibility, NodeField::Content] {
            self.write_count(changes.iter().filter(|c| c.field == field).count());
        }
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        self.write_u8(TAG_DAMAGE_RECTS);
        self.write_u64(frame_index);
        self.write_count(rects.len());
        let area = rects
            .iter()
            .map(|r| u64::from(r.width) * u64::from(r.height))
            .sum();
        self.write_u64(area);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Node changes of one frame, counted per field.
    NodeChanges {
        /// Frame counter.
        frame_index: u64,
        /// Nodes that moved or resized.
        geometry: u32,
        /// Nodes shown or hidden.
        visibility: u32,
        /// Nodes redrawn in place.
        content: u32,
    },
    /// Damage rectangles of one frame.
    DamageRects {
        /// Frame counter.
        frame_index: u64,
        /// Number of rectangles.
        count: u32,
        /// Sum of their areas in pixels.
        area: u64,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter { data: bytes }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, rest) = self.data.split_first_chunk::<N>()?;
        self.data = rest;
        Some(*head)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|b| b != 0)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
            queued_events: self.read_u32()?,
        }))
    }

    fn decode_phase(&mut self) -> Option<(u64, PhaseKind, HostTime)> {
        Some((self.read_u64()?, self.read_phase()?, self.read_time()?))
    }

    fn decode_present(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Present(PresentEvent {
            frame_index: self.read_u64()?,
            presented_at: self.read_time()?,
            damage_area: self.read_u64()?,
            skipped: self.read_bool()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            now: self.read_time()?,
            input_ticks: self.read_u64()?,
            track_ticks: self.read_u64()?,
            tick_ticks: self.read_u64()?,
            draw_ticks: self.read_u64()?,
            present_ticks: self.read_u64()?,
            damage_area: self.read_u64()?,
            full_redraw: self.read_bool()?,
        }))
    }

    fn decode_node_changes(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeChanges {
            frame_index: self.read_u64()?,
            geometry: self.read_u32()?,
            visibility: self.read_u32()?,
            content: self.read_u32()?,
        })
    }

    fn decode_damage_rects(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DamageRects {
            frame_index: self.read_u64()?,
            count: self.read_u32()?,
            area: self.read_u64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_PHASE_BEGIN => {
                let (frame_index, phase, timestamp) = self.decode_phase()?;
                Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
                    frame_index,
                    phase,
                    timestamp,
                }))
            }
            TAG_PHASE_END => {
                let (frame_index, phase, timestamp) = self.decode_phase()?;
                Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
                    frame_index,
                    phase,
                    timestamp,
                }))
            }
            TAG_PRESENT => self.decode_present(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_NODE_CHANGES => self.decode_node_changes(),
            TAG_DAMAGE_RECTS => self.decode_damage_rects(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(f: impl FnOnce(&mut RecorderSink)) -> Vec<RecordedEvent> {
        let mut rec = RecorderSink::new();
        f(&mut rec);
        decode(rec.as_bytes()).collect()
    }

    #[test]
    fn phases_of_a_frame_decode_in_order() {
        let events = record(|rec| {
            rec.on_frame_begin(&FrameBeginEvent {
                frame_index: 5,
                now: HostTime(2000),
                queued_events: 1,
            });
            for (i, phase) in PhaseKind::ALL.into_iter().enumerate() {
                let t = HostTime(2000 + 10 * i as u64);
                rec.on_phase_begin(&PhaseBeginEvent {
                    frame_index: 5,
                    phase,
                    timestamp: t,
                });
                rec.on_phase_end(&PhaseEndEvent {
                    frame_index: 5,
                    phase,
                    timestamp: t,
                });
            }
        });
        assert_eq!(events.len(), 11);
        let phases: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::PhaseBegin(b) => Some(b.phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, PhaseKind::ALL);
        match &events[0] {
            RecordedEvent::FrameBegin(e) => {
                assert_eq!(e.frame_index, 5);
                assert_eq!(e.now, HostTime(2000));
                assert_eq!(e.queued_events, 1);
            }
            other => panic!("expected FrameBegin, got {other:?}"),
        }
    }

    #[test]
    fn summary_keeps_every_duration() {
        let events = record(|rec| {
            rec.on_frame_summary(&FrameSummary {
                frame_index: 7,
                now: HostTime(1_000),
                input_ticks: 1,
                track_ticks: 2,
                tick_ticks: 3,
                draw_ticks: 4,
                present_ticks: 5,
                damage_area: 600,
                full_redraw: true,
            });
        });
        match &events[..] {
            [RecordedEvent::FrameSummary(s)] => {
                assert_eq!(
                    [s.input_ticks, s.track_ticks, s.tick_ticks, s.draw_ticks, s.present_ticks],
                    [1, 2, 3, 4, 5]
                );
                assert_eq!(s.damage_area, 600);
                assert!(s.full_redraw);
            }
            other => panic!("expected one FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn rich_events_are_summarized() {
        let events = record(|rec| {
            rec.on_node_changes(
                3,
                &[
                    NodeChange {
                        node_index: 0,
                        field: NodeField::Visibility,
                    },
                    NodeChange {
                        node_index: 4,
                        field: NodeField::Content,
                    },
                ],
            );
            rec.on_damage_rects(
                3,
                &[
                    DamageRect {
                        x: 0,
                        y: 0,
                        width: 10,
                        height: 10,
                    },
                    DamageRect {
                        x: 50,
                        y: 0,
                        width: 2,
                        height: 5,
                    },
                ],
            );
        });
        assert!(matches!(
            events[0],
            RecordedEvent::NodeChanges {
                frame_index: 3,
                geometry: 0,
                visibility: 1,
                content: 1,
            }
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::DamageRects {
                frame_index: 3,
                count: 2,
                area: 110,
            }
        ));
    }

    #[test]
    fn truncated_record_ends_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_present(&PresentEvent {
            frame_index: 1,
            presented_at: HostTime(9),
            damage_area: 0,
            skipped: true,
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes).count(), 1);
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
