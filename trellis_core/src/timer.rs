// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Message-sending timers driven by the tick pass.
//!
//! Timers are plain components. They measure time with a [`Stopwatch`]
//! against the tree's clock, stop while frozen, and send their message up
//! the tree like any other node.

use core::mem;

use tracing::trace;

use crate::message::Message;
use crate::time::{Duration, HostTime};
use crate::tree::{Component, Ctx};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Run {
    #[default]
    Stopped,
    Running(HostTime),
    Paused,
}

/// Accumulates running time between starts, pauses, and resumes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    run: Run,
    accumulated: Duration,
}

impl Stopwatch {
    /// A stopped stopwatch at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts from zero at `now`.
    pub fn start(&mut self, now: HostTime) {
        self.accumulated = Duration::ZERO;
        self.run = Run::Running(now);
    }

    /// Stops accumulating, keeping the elapsed time. No effect unless
    /// running.
    pub fn pause(&mut self, now: HostTime) {
        if let Run::Running(since) = self.run {
            self.accumulated = self.accumulated + now.saturating_duration_since(since);
            self.run = Run::Paused;
        }
    }

    /// Continues after [`pause`](Self::pause). No effect otherwise.
    pub fn resume(&mut self, now: HostTime) {
        if self.run == Run::Paused {
            self.run = Run::Running(now);
        }
    }

    /// Stops and returns to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while accumulating.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.run, Run::Running(_))
    }

    /// Time accumulated up to `now`.
    #[must_use]
    pub fn elapsed(&self, now: HostTime) -> Duration {
        match self.run {
            Run::Running(since) => self.accumulated + now.saturating_duration_since(since),
            Run::Stopped | Run::Paused => self.accumulated,
        }
    }
}

/// Shared timer state: the stopwatch, freeze bookkeeping, and the elapsed
/// time seen by the previous tick.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Schedule {
    watch: Stopwatch,
    frozen: bool,
    seen: Duration,
}

impl Schedule {
    pub(crate) fn start(&mut self, now: HostTime) {
        self.watch.start(now);
        self.seen = Duration::ZERO;
        if self.frozen {
            self.watch.pause(now);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.watch.reset();
        self.seen = Duration::ZERO;
    }

    pub(crate) fn freeze(&mut self, now: HostTime) {
        self.frozen = true;
        self.watch.pause(now);
    }

    pub(crate) fn unfreeze(&mut self, now: HostTime) {
        self.frozen = false;
        self.watch.resume(now);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.watch.is_running()
    }

    /// Returns `true`, and stops, once more than `delay` has elapsed.
    pub(crate) fn expire(&mut self, now: HostTime, delay: Duration) -> bool {
        let expired = self
            .advance(now)
            .is_some_and(|(_, elapsed)| elapsed > delay);
        if expired {
            self.reset();
        }
        expired
    }

    /// Elapsed time at the previous and at this tick.
    pub(crate) fn advance(&mut self, now: HostTime) -> Option<(Duration, Duration)> {
        if !self.watch.is_running() {
            return None;
        }
        let after = self.watch.elapsed(now);
        let before = mem::replace(&mut self.seen, after);
        Some((before, after))
    }
}

/// Sends a message once, when more than `delay` has elapsed since
/// [`start`](Self::start), then stops.
#[derive(Clone, Debug)]
pub struct Delay {
    message: Message,
    delay: Duration,
    autostart: bool,
    schedule: Schedule,
}

impl Delay {
    /// A stopped delay.
    #[must_use]
    pub fn new(message: Message, delay: Duration) -> Self {
        Self {
            message,
            delay,
            autostart: false,
            schedule: Schedule::default(),
        }
    }

    /// Starts counting when the node is loaded.
    #[must_use]
    pub fn autostart(mut self) -> Self {
        self.autostart = true;
        self
    }

    /// Starts counting from zero at `now`.
    pub fn start(&mut self, now: HostTime) {
        self.schedule.start(now);
    }

    /// Stops without sending.
    pub fn reset(&mut self) {
        self.schedule.reset();
    }

    /// Returns `true` while counting.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.schedule.watch.is_running()
    }
}

impl Component for Delay {
    fn on_load(&mut self, cx: &mut Ctx<'_>) {
        if self.autostart {
            self.start(cx.now());
        }
    }

    fn on_tick(&mut self, cx: &mut Ctx<'_>) {
        let Some((_, elapsed)) = self.schedule.advance(cx.now()) else {
            return;
        };
        if elapsed > self.delay {
            trace!(id = ?cx.id(), ?elapsed, "delay expired");
            cx.send_message(self.message.clone());
            self.schedule.reset();
        }
    }

    fn on_freeze(&mut self, cx: &mut Ctx<'_>) {
        self.schedule.freeze(cx.now());
    }

    fn on_unfreeze(&mut self, cx: &mut Ctx<'_>) {
        self.schedule.unfreeze(cx.now());
    }
}

/// Sends a message once per whole `period` elapsed since
/// [`start`](Self::start). A tick that spans several periods sends several
/// messages.
#[derive(Clone, Debug)]
pub struct Pulse {
    message: Message,
    period: Duration,
    autostart: bool,
    schedule: Schedule,
}

impl Pulse {
    /// A stopped pulse.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    #[must_use]
    pub fn new(message: Message, period: Duration) -> Self {
        assert!(period.ticks() > 0, "pulse period must be non-zero");
        Self {
            message,
            period,
            autostart: false,
            schedule: Schedule::default(),
        }
    }

    /// Starts pulsing when the node is loaded.
    #[must_use]
    pub fn autostart(mut self) -> Self {
        self.autostart = true;
        self
    }

    /// Starts pulsing with the first period beginning at `now`.
    pub fn start(&mut self, now: HostTime) {
        self.schedule.start(now);
    }

    /// Stops pulsing.
    pub fn reset(&mut self) {
        self.schedule.reset();
    }

    /// Returns `true` while pulsing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.schedule.watch.is_running()
    }
}

impl Component for Pulse {
    fn on_load(&mut self, cx: &mut Ctx<'_>) {
        if self.autostart {
            self.start(cx.now());
        }
    }

    fn on_tick(&mut self, cx: &mut Ctx<'_>) {
        let Some((before, after)) = self.schedule.advance(cx.now()) else {
            return;
        };
        let period = self.period.ticks();
        let crossed = after.ticks() / period - before.ticks() / period;
        for _ in 0..crossed {
            cx.send_message(self.message.clone());
        }
    }

    fn on_freeze(&mut self, cx: &mut Ctx<'_>) {
        self.schedule.freeze(cx.now());
    }

    fn on_unfreeze(&mut self, cx: &mut Ctx<'_>) {
        self.schedule.unfreeze(cx.now());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Action;
    use crate::style::StyleTable;
    use crate::time::ManualClock;
    use crate::tree::testing::{Log, Spy, gui_with};
    use crate::tree::{Gui, NodeId, NodeSpec};

    const PING: Message = Message::Action(Action(1));

    fn pings(log: &Log) -> usize {
        log.take()
            .iter()
            .filter(|e| e.as_str() == "root.msg Action(Action(1))")
            .count()
    }

    fn scene(timer: impl Component, log: &Log) -> (Gui, ManualClock, NodeId, NodeId) {
        let clock = ManualClock::new();
        let mut gui = gui_with(StyleTable::new(), clock.clone());
        let root = gui.create(NodeSpec::plain(), Spy::new("root", log).handling());
        let timer = gui.create(NodeSpec::plain(), timer);
        gui.set_root(root);
        gui.register(root, timer);
        (gui, clock, root, timer)
    }

    #[test]
    fn stopwatch_accumulates_across_pauses() {
        let mut w = Stopwatch::new();
        w.start(HostTime(0));
        assert_eq!(w.elapsed(HostTime(5)), Duration(5));
        w.pause(HostTime(5));
        assert_eq!(w.elapsed(HostTime(10)), Duration(5));
        w.resume(HostTime(10));
        assert_eq!(w.elapsed(HostTime(12)), Duration(7));
        w.reset();
        assert!(!w.is_running());
        assert_eq!(w.elapsed(HostTime(20)), Duration::ZERO);
    }

    #[test]
    fn resume_does_not_restart_a_reset_stopwatch() {
        let mut w = Stopwatch::new();
        w.resume(HostTime(3));
        assert!(!w.is_running());
    }

    #[test]
    fn delay_fires_once_after_exceeding() {
        let log = Log::default();
        let (mut gui, clock, root, timer) = scene(Delay::new(PING, Duration(10)), &log);
        gui.component_mut::<Delay>(timer).unwrap().start(HostTime(0));

        clock.set(HostTime(10));
        gui.tick(root);
        assert_eq!(pings(&log), 0);

        clock.set(HostTime(11));
        gui.tick(root);
        assert_eq!(pings(&log), 1);
        assert!(!gui.component::<Delay>(timer).unwrap().is_running());

        clock.set(HostTime(50));
        gui.tick(root);
        assert_eq!(pings(&log), 0);
    }

    #[test]
    fn autostart_begins_at_load() {
        let log = Log::default();
        let clock_start = HostTime(100);
        let (mut gui, clock, root, timer) =
            scene(Delay::new(PING, Duration(10)).autostart(), &log);
        clock.set(clock_start);
        gui.load(timer).unwrap();
        clock.set(HostTime(111));
        gui.tick(root);
        assert_eq!(pings(&log), 1);
    }

    #[test]
    fn pulse_sends_once_per_period_crossed() {
        let log = Log::default();
        let (mut gui, clock, root, timer) = scene(Pulse::new(PING, Duration(10)), &log);
        gui.component_mut::<Pulse>(timer).unwrap().start(HostTime(0));

        clock.set(HostTime(25));
        gui.tick(root);
        assert_eq!(pings(&log), 2);

        clock.set(HostTime(29));
        gui.tick(root);
        assert_eq!(pings(&log), 0);

        clock.set(HostTime(31));
        gui.tick(root);
        assert_eq!(pings(&log), 1);
    }

    #[test]
    fn frozen_time_does_not_count() {
        let log = Log::default();
        let (mut gui, clock, root, timer) = scene(Pulse::new(PING, Duration(10)), &log);
        gui.component_mut::<Pulse>(timer).unwrap().start(HostTime(0));

        clock.set(HostTime(5));
        gui.freeze(timer);
        clock.set(HostTime(100));
        gui.unfreeze(timer);

        clock.set(HostTime(104));
        gui.tick(root);
        assert_eq!(pings(&log), 0);

        clock.set(HostTime(106));
        gui.tick(root);
        assert_eq!(pings(&log), 1);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_period_panics() {
        let _ = Pulse::new(PING, Duration::ZERO);
    }
}
