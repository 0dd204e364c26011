// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The headless frame loop.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, trace};
use trellis_core::time::HostTime;
use trellis_core::trace::{
    FrameBeginEvent, FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent,
    TraceSink, Tracer,
};
use trellis_core::{
    Clock, ConfigError, Damage, Gui, InputEvent, InputState, Message, NodeId, NodeSpec, Opacity,
    Point, Rect, StyleSource, Surface, Vec2,
};
use trellis_render::{PixelFactory, PixelSurface};

use crate::config::DriverConfig;
use crate::stats::{FrameStats, StatsReport};
use crate::window::{WINDOW_KIND, Window};

/// Frames kept by the driver's [`FrameStats`].
pub const STATS_WINDOW: usize = 64;

/// How [`HeadlessDriver::run_until_exit`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Frames run.
    pub frames: u32,
    /// `true` if [`Message::Exit`] reached the window.
    pub exited: bool,
}

/// Runs a [`Gui`] without a platform window.
///
/// The driver owns the tree, a [`Window`] root covering the screen, the
/// pending input events, the input snapshot the tree is tracked against,
/// and a screen surface that damaged regions are presented to.
#[derive(Debug)]
pub struct HeadlessDriver {
    gui: Gui,
    root: NodeId,
    screen: PixelSurface,
    input: InputState,
    queue: VecDeque<InputEvent>,
    stats: FrameStats<STATS_WINDOW>,
    last_report: Option<StatsReport>,
    config: DriverConfig,
}

impl HeadlessDriver {
    /// Creates a driver whose tree draws into [`PixelSurface`]s, and loads
    /// its [`Window`] root.
    ///
    /// # Errors
    ///
    /// Fails if the window's `bg-color` style or `title` option has the
    /// wrong type.
    pub fn new(
        config: DriverConfig,
        styles: impl StyleSource + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, ConfigError> {
        let mut gui = Gui::new(styles, PixelFactory, clock);
        let bounds = Rect::from_origin_size(Point::ORIGIN, config.screen);
        let root = gui.create(
            NodeSpec::graphical(bounds, Opacity::Opaque).kind(WINDOW_KIND),
            Window::new(config.clear),
        );
        gui.set_root(root);
        gui.load(root)?;
        Ok(Self {
            gui,
            root,
            screen: PixelSurface::filled(config.screen, false, config.clear),
            input: InputState::default(),
            queue: VecDeque::new(),
            stats: FrameStats::new(),
            last_report: None,
            config,
        })
    }

    /// The tree.
    #[must_use]
    pub fn gui(&self) -> &Gui {
        &self.gui
    }

    /// The tree, mutably.
    pub fn gui_mut(&mut self) -> &mut Gui {
        &mut self.gui
    }

    /// The [`Window`] node at the root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// What has been presented so far.
    #[must_use]
    pub fn screen(&self) -> &PixelSurface {
        &self.screen
    }

    /// The input snapshot the next frame tracks against.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Redraw statistics over recent frames.
    #[must_use]
    pub fn stats(&self) -> &FrameStats<STATS_WINDOW> {
        &self.stats
    }

    /// The statistics report of the latest frame.
    #[must_use]
    pub fn last_report(&self) -> Option<&StatsReport> {
        self.last_report.as_ref()
    }

    /// The configuration the driver was created with.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Queues an event for the next frame and folds it into the input
    /// snapshot.
    pub fn push_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::MouseMotion {
                start,
                end,
                buttons,
            } => {
                self.input.pointer = Some(end);
                self.input.rel += end - start;
                self.input.buttons = buttons;
            }
            InputEvent::MouseDown { pos, button } => {
                self.input.pointer = Some(pos);
                self.input.buttons.insert(button.flag());
            }
            InputEvent::MouseUp { pos, button } => {
                self.input.pointer = Some(pos);
                self.input.buttons.remove(button.flag());
            }
            InputEvent::KeyDown(_) | InputEvent::KeyUp { .. } => {}
        }
        self.queue.push_back(event);
    }

    /// Records that the pointer left the screen.
    pub fn pointer_left(&mut self) {
        self.input.pointer = None;
    }

    /// Takes the messages that reached the window unhandled.
    pub fn take_messages(&mut self) -> Vec<Message> {
        self.gui
            .component_mut::<Window>(self.root)
            .map(Window::take_unhandled)
            .unwrap_or_default()
    }

    /// Runs one frame without tracing.
    pub fn frame(&mut self) -> Damage {
        self.run_frame(Tracer::none())
    }

    /// Runs one frame, reporting its phases to `sink`.
    pub fn frame_traced(&mut self, sink: &mut dyn TraceSink) -> Damage {
        self.run_frame(Tracer::new(sink))
    }

    /// Runs frames until the window receives [`Message::Exit`] or
    /// `max_frames` have run, pacing them to the configured fps.
    pub fn run_until_exit(&mut self, max_frames: u32) -> RunOutcome {
        let interval = self.config.frame_interval();
        let mut frames = 0;
        while frames < max_frames && !self.gui.exit_requested() {
            let started = Instant::now();
            self.frame();
            frames += 1;
            if let Some(budget) = interval
                && let Some(rest) = budget.checked_sub(started.elapsed())
            {
                std::thread::sleep(rest);
            }
        }
        let exited = self.gui.exit_requested();
        debug!(frames, exited, "run finished");
        RunOutcome { frames, exited }
    }

    fn run_frame(&mut self, tracer: Tracer<'_>) -> Damage {
        // `draw` advances the counter, so this frame gets the next index.
        let begin = FrameBeginEvent {
            frame_index: self.gui.frame_index() + 1,
            now: self.gui.now(),
            queued_events: u32::try_from(self.queue.len()).unwrap_or(u32::MAX),
        };
        let mut frame = FrameTrace::begin(tracer, &begin);

        frame.phase_begin(PhaseKind::Input, self.gui.now());
        while let Some(event) = self.queue.pop_front() {
            self.gui.dispatch(&event);
        }
        frame.phase_end(PhaseKind::Input, self.gui.now());

        frame.phase_begin(PhaseKind::Track, self.gui.now());
        self.gui.track(&self.input);
        self.input.rel = Vec2::ZERO;
        frame.phase_end(PhaseKind::Track, self.gui.now());

        frame.phase_begin(PhaseKind::Tick, self.gui.now());
        self.gui.tick_all();
        frame.phase_end(PhaseKind::Tick, self.gui.now());

        frame.phase_begin(PhaseKind::Draw, self.gui.now());
        let damage = self.gui.draw();
        frame.phase_end(PhaseKind::Draw, self.gui.now());

        #[cfg(feature = "trace-rich")]
        {
            use trellis_core::trace::DamageRect;
            let rects: Vec<DamageRect> = damage.rects().map(DamageRect::from).collect();
            frame
                .tracer
                .node_changes(begin.frame_index, self.gui.node_changes());
            frame.tracer.damage_rects(begin.frame_index, &rects);
        }

        frame.phase_begin(PhaseKind::Present, self.gui.now());
        self.present(&damage);
        frame.phase_end(PhaseKind::Present, self.gui.now());
        frame.finish(&damage, self.gui.now());

        let report = self.stats.observe(&damage, self.config.screen.area());
        trace!(
            frame = begin.frame_index,
            grade = report.grade.as_str(),
            "frame done"
        );
        self.last_report = Some(report);
        damage
    }

    /// Copies the damaged screen regions from the root display.
    fn present(&mut self, damage: &Damage) {
        let Some(root) = self.gui.root() else {
            return;
        };
        let Some(display) = self.gui.display(root) else {
            return;
        };
        let origin = self.gui.pos(root).to_vec2();
        for rect in damage.rects() {
            self.screen.blit(display, rect.origin(), rect - origin);
        }
    }
}

/// Phase bookkeeping for one frame: forwards events to the tracer and
/// feeds the summary.
struct FrameTrace<'t> {
    tracer: Tracer<'t>,
    summary: FrameSummaryBuilder,
    frame_index: u64,
}

impl<'t> FrameTrace<'t> {
    fn begin(mut tracer: Tracer<'t>, begin: &FrameBeginEvent) -> Self {
        tracer.frame_begin(begin);
        Self {
            tracer,
            summary: FrameSummaryBuilder::new(begin),
            frame_index: begin.frame_index,
        }
    }

    fn phase_begin(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_begin(phase, timestamp);
        self.tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn phase_end(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_end(phase, timestamp);
        self.tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn finish(mut self, damage: &Damage, presented_at: HostTime) {
        self.summary.set_damage(damage);
        let summary = self.summary.finish();
        self.tracer.present(&PresentEvent {
            frame_index: self.frame_index,
            presented_at,
            damage_area: summary.damage_area,
            skipped: !damage.changed(),
        });
        self.tracer.frame_summary(&summary);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{
        Action, Color, Component, Ctx, ManualClock, MouseButton, MouseButtons, StyleTable,
    };

    const BLUE: Color = Color::rgb(0, 0, 255);

    fn driver() -> (HeadlessDriver, ManualClock) {
        let clock = ManualClock::new();
        let d = HeadlessDriver::new(
            DriverConfig::headless(100.0, 100.0),
            StyleTable::new(),
            clock.clone(),
        )
        .unwrap();
        (d, clock)
    }

    fn add_button(d: &mut HeadlessDriver, action: u32) -> NodeId {
        let root = d.root();
        let gui = d.gui_mut();
        let button = gui.create(
            NodeSpec::graphical(Rect::new(10.0, 10.0, 30.0, 30.0), Opacity::Opaque)
                .interactive(Some(Action(action))),
            (),
        );
        gui.register(root, button);
        gui.set_background(
            button,
            Some(Box::new(PixelSurface::filled(
                trellis_core::Size::new(20.0, 20.0),
                false,
                BLUE,
            ))),
        )
        .unwrap();
        button
    }

    /// Sends [`Message::Exit`] on its n-th tick.
    #[derive(Debug)]
    struct ExitAfter(u32);

    impl Component for ExitAfter {
        fn on_tick(&mut self, cx: &mut Ctx<'_>) {
            self.0 -= 1;
            if self.0 == 0 {
                cx.send_message(Message::Exit);
            }
        }
    }

    #[test]
    fn push_event_updates_the_snapshot() {
        let (mut d, _) = driver();
        d.push_event(InputEvent::MouseMotion {
            start: Point::new(0.0, 0.0),
            end: Point::new(5.0, 2.0),
            buttons: MouseButtons::empty(),
        });
        d.push_event(InputEvent::MouseMotion {
            start: Point::new(5.0, 2.0),
            end: Point::new(6.0, 6.0),
            buttons: MouseButtons::empty(),
        });
        d.push_event(InputEvent::MouseDown {
            pos: Point::new(6.0, 6.0),
            button: MouseButton::Left,
        });
        assert_eq!(d.input().pointer, Some(Point::new(6.0, 6.0)));
        assert_eq!(d.input().rel, Vec2::new(6.0, 6.0));
        assert!(d.input().left_down());

        d.frame();
        assert_eq!(d.input().rel, Vec2::ZERO);
        d.push_event(InputEvent::MouseUp {
            pos: Point::new(6.0, 6.0),
            button: MouseButton::Left,
        });
        assert!(!d.input().left_down());
    }

    #[test]
    fn first_frame_presents_everything_then_idles() {
        let (mut d, _) = driver();
        add_button(&mut d, 1);

        let first = d.frame();
        assert!(matches!(first, Damage::Full(_)));
        assert_eq!(d.screen().pixel(20, 20), Some(BLUE));
        assert_eq!(d.screen().pixel(5, 5), Some(Color::BLACK));

        assert_eq!(d.frame(), Damage::None);
        let report = d.last_report().unwrap();
        assert_eq!(report.total_frames, 2);
        assert_eq!(report.presented_frames, 1);
        assert_eq!(report.full_redraws, 1);
    }

    #[test]
    fn styled_window_paints_the_whole_screen() {
        let mut styles = StyleTable::new();
        styles
            .set_style(WINDOW_KIND, "global", "bg-color", BLUE)
            .set_option(WINDOW_KIND, "global", "title", "demo");
        let mut d =
            HeadlessDriver::new(DriverConfig::headless(40.0, 30.0), styles, ManualClock::new())
                .unwrap();
        let window = d.gui().component::<Window>(d.root()).unwrap();
        assert_eq!(window.background(), BLUE);
        assert_eq!(window.title(), Some("demo"));

        assert!(matches!(d.frame(), Damage::Full(_)));
        assert_eq!(d.screen().pixel(0, 0), Some(BLUE));
        assert_eq!(d.screen().pixel(39, 29), Some(BLUE));
    }

    #[test]
    fn unstyled_window_uses_the_clear_color() {
        let config = DriverConfig {
            clear: Color::WHITE,
            ..DriverConfig::headless(20.0, 20.0)
        };
        let mut d = HeadlessDriver::new(config, StyleTable::new(), ManualClock::new()).unwrap();
        assert_eq!(d.gui().component::<Window>(d.root()).unwrap().title(), None);
        d.frame();
        assert_eq!(d.screen().pixel(10, 10), Some(Color::WHITE));
    }

    #[test]
    fn mistyped_window_style_fails_creation() {
        let mut styles = StyleTable::new();
        styles.set_style(WINDOW_KIND, "global", "bg-color", 3_i64);
        let err = HeadlessDriver::new(DriverConfig::headless(10.0, 10.0), styles, ManualClock::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongType {
                expected: "color",
                ..
            }
        ));
    }

    #[test]
    fn moving_a_child_presents_only_its_old_and_new_rects() {
        let (mut d, _) = driver();
        let button = add_button(&mut d, 1);
        d.frame();

        d.gui_mut().set_pos(button, Point::new(60.0, 60.0));
        let damage = d.frame();
        assert_eq!(
            damage,
            Damage::Rects(vec![
                Rect::new(10.0, 10.0, 30.0, 30.0),
                Rect::new(60.0, 60.0, 80.0, 80.0),
            ])
        );
        assert_eq!(d.screen().pixel(20, 20), Some(Color::BLACK));
        assert_eq!(d.screen().pixel(70, 70), Some(BLUE));
    }

    #[test]
    fn click_reaches_the_window_as_an_action() {
        let (mut d, _) = driver();
        add_button(&mut d, 7);
        let at = Point::new(15.0, 15.0);
        d.push_event(InputEvent::MouseMotion {
            start: Point::new(0.0, 0.0),
            end: at,
            buttons: MouseButtons::empty(),
        });
        d.frame();
        d.push_event(InputEvent::MouseDown {
            pos: at,
            button: MouseButton::Left,
        });
        d.frame();
        assert!(d.take_messages().is_empty());
        d.push_event(InputEvent::MouseUp {
            pos: at,
            button: MouseButton::Left,
        });
        d.frame();
        assert_eq!(d.take_messages(), [Message::Action(Action(7))]);
    }

    #[test]
    fn run_stops_on_exit() {
        let (mut d, _) = driver();
        let root = d.root();
        let gui = d.gui_mut();
        let quitter = gui.create(NodeSpec::plain(), ExitAfter(3));
        gui.register(root, quitter);

        let outcome = d.run_until_exit(10);
        assert_eq!(
            outcome,
            RunOutcome {
                frames: 3,
                exited: true
            }
        );
    }

    #[test]
    fn run_without_exit_stops_at_the_cap() {
        let (mut d, _) = driver();
        let outcome = d.run_until_exit(4);
        assert_eq!(
            outcome,
            RunOutcome {
                frames: 4,
                exited: false
            }
        );
        assert_eq!(d.gui().frame_index(), 4);
    }

    #[test]
    fn traced_frame_reports_every_phase() {
        #[derive(Default)]
        struct Phases(Vec<PhaseKind>, Vec<bool>);
        impl TraceSink for Phases {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.0.push(e.phase);
            }
            fn on_present(&mut self, e: &PresentEvent) {
                self.1.push(e.skipped);
            }
        }

        let (mut d, clock) = driver();
        let mut sink = Phases::default();
        d.frame_traced(&mut sink);
        clock.advance(trellis_core::Duration(16));
        d.frame_traced(&mut sink);
        assert_eq!(sink.0[..5], PhaseKind::ALL);
        assert_eq!(sink.0.len(), 10);
        assert_eq!(sink.1, [false, true]);
    }
}
