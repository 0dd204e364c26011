// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed gestures recognized on top of the mouse state machine.
//!
//! A node built with [`NodeSpec::gestures`](crate::NodeSpec::gestures)
//! counts repeated clicks, and notices when the pointer rests over it or a
//! key is held down for longer than a configured delay. The tree feeds the
//! detector its input and ticks, and reports what it recognizes through the
//! gesture hooks of [`Component`](crate::Component).
//!
//! Delays are read from the node's options on load:
//!
//! | Option                | Default |
//! |-----------------------|---------|
//! | `long-key-down-delay` | 450 ms  |
//! | `long-hover-delay`    | 450 ms  |
//! | `multiple-click-delay`| 250 ms  |

use kurbo::Point;

use crate::attr::Transition;
use crate::input::{KeyEvent, MouseButton};
use crate::interaction::MouseState;
use crate::time::{Duration, HostTime, Timebase};
use crate::timer::Schedule;

/// Option holding the long key press delay.
pub const LONG_KEY_DOWN_DELAY: &str = "long-key-down-delay";
/// Option holding the long hover delay.
pub const LONG_HOVER_DELAY: &str = "long-hover-delay";
/// Option holding the longest gap between clicks of one series.
pub const MULTIPLE_CLICK_DELAY: &str = "multiple-click-delay";

/// How long each gesture takes to register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureDelays {
    /// A key held this long is a long key press.
    pub long_key_down: Duration,
    /// A pointer resting this long over the node is a long hover.
    pub long_hover: Duration,
    /// Clicks closer together than this belong to one series.
    pub multiple_click: Duration,
}

impl GestureDelays {
    /// 450 ms for long presses and hovers, 250 ms between clicks.
    #[must_use]
    pub const fn standard(timebase: Timebase) -> Self {
        Self {
            long_key_down: Duration::from_millis(450, timebase),
            long_hover: Duration::from_millis(450, timebase),
            multiple_click: Duration::from_millis(250, timebase),
        }
    }
}

/// A recognized gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// A key has been held past the long key press delay.
    LongKeyDown(KeyEvent),
    /// A long key press ended.
    LongKeyDownEnd,
    /// The pointer rested over the node, at this local position.
    LongHover(Point),
    /// A long hover ended.
    LongHoverEnd,
    /// The `count`th click of a series landed at `pos`.
    MultipleClick {
        /// Local position of the click.
        pos: Point,
        /// Clicks in the series so far, starting at 1.
        count: u32,
    },
}

/// The gestures recognized by one input step or tick, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Recognized {
    items: [Option<Gesture>; 2],
}

impl Recognized {
    fn push(&mut self, g: Gesture) {
        let slot = usize::from(self.items[0].is_some());
        debug_assert!(self.items[slot].is_none(), "at most two gestures per step");
        self.items[slot] = Some(g);
    }

    /// Iterates over the recognized gestures.
    pub fn iter(&self) -> impl Iterator<Item = Gesture> + '_ {
        self.items.iter().flatten().copied()
    }

    /// Returns `true` if nothing was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items[0].is_none()
    }
}

/// Per-node gesture detector.
#[derive(Clone, Debug)]
pub struct Gestures {
    delays: GestureDelays,
    key: Schedule,
    last_key: Option<KeyEvent>,
    long_key_down: bool,
    hover: Schedule,
    hovering: bool,
    pointer: Point,
    long_hover: bool,
    click: Schedule,
    clicks: u32,
}

impl Gestures {
    /// An idle detector.
    #[must_use]
    pub fn new(delays: GestureDelays) -> Self {
        Self {
            delays,
            key: Schedule::default(),
            last_key: None,
            long_key_down: false,
            hover: Schedule::default(),
            hovering: false,
            pointer: Point::ORIGIN,
            long_hover: false,
            click: Schedule::default(),
            clicks: 0,
        }
    }

    /// The configured delays.
    #[must_use]
    pub fn delays(&self) -> GestureDelays {
        self.delays
    }

    pub(crate) fn set_delays(&mut self, delays: GestureDelays) {
        self.delays = delays;
    }

    /// Clicks in the current series; zero once the series timed out.
    #[must_use]
    pub fn click_count(&self) -> u32 {
        self.clicks
    }

    /// Returns `true` during a long hover.
    #[must_use]
    pub fn is_long_hover(&self) -> bool {
        self.long_hover
    }

    /// Returns `true` during a long key press.
    #[must_use]
    pub fn is_long_key_down(&self) -> bool {
        self.long_key_down
    }

    fn end_long_key_down(&mut self, out: &mut Recognized) {
        if self.long_key_down {
            self.long_key_down = false;
            out.push(Gesture::LongKeyDownEnd);
        }
    }

    fn end_long_hover(&mut self, out: &mut Recognized) {
        if self.long_hover {
            self.long_hover = false;
            out.push(Gesture::LongHoverEnd);
        }
    }

    /// A key was pressed: any long press ends and a new countdown starts.
    pub fn key_down(&mut self, now: HostTime, key: KeyEvent) -> Recognized {
        let mut out = Recognized::default();
        self.end_long_key_down(&mut out);
        self.key.start(now);
        self.last_key = Some(key);
        out
    }

    /// A key was released.
    pub fn key_up(&mut self) -> Recognized {
        let mut out = Recognized::default();
        self.end_long_key_down(&mut out);
        self.key.reset();
        self.last_key = None;
        out
    }

    /// Focus moved away. A pending long press is dropped silently.
    pub fn lose_focus(&mut self) {
        self.long_key_down = false;
        self.key.reset();
        self.last_key = None;
    }

    /// The interaction state changed. Hovering starts the long hover
    /// countdown and leaving the hover state ends it.
    pub fn state_change(&mut self, now: HostTime, change: Transition<MouseState>) -> Recognized {
        let mut out = Recognized::default();
        if change.after == MouseState::Hover {
            self.hovering = true;
            self.hover.start(now);
        } else if change.before == MouseState::Hover {
            self.hovering = false;
            self.hover.reset();
            self.end_long_hover(&mut out);
        }
        out
    }

    /// A button went down at `pos`. The left button extends the click
    /// series.
    pub fn mouse_down(&mut self, now: HostTime, pos: Point, button: MouseButton) -> Recognized {
        let mut out = Recognized::default();
        self.end_long_hover(&mut out);
        if button == MouseButton::Left {
            self.click.start(now);
            self.clicks += 1;
            out.push(Gesture::MultipleClick {
                pos,
                count: self.clicks,
            });
        }
        out
    }

    /// The pointer moved to `pos`, restarting the long hover countdown.
    pub fn mouse_motion(&mut self, now: HostTime, pos: Point) -> Recognized {
        let mut out = Recognized::default();
        self.pointer = pos;
        self.end_long_hover(&mut out);
        if self.hovering {
            self.hover.start(now);
        }
        out
    }

    /// Records where the pointer is, in local coordinates.
    pub fn track(&mut self, pointer: Option<Point>) {
        if let Some(p) = pointer {
            self.pointer = p;
        }
    }

    /// The node was hidden.
    pub fn hide(&mut self) -> Recognized {
        let mut out = Recognized::default();
        self.hover.reset();
        self.end_long_hover(&mut out);
        out
    }

    /// Fires the countdowns that ran out by `now`.
    pub fn tick(&mut self, now: HostTime) -> Recognized {
        let mut out = Recognized::default();
        if self.key.expire(now, self.delays.long_key_down)
            && let Some(key) = self.last_key
        {
            self.long_key_down = true;
            out.push(Gesture::LongKeyDown(key));
        }
        if self.hover.expire(now, self.delays.long_hover) {
            self.long_hover = true;
            out.push(Gesture::LongHover(self.pointer));
        }
        if self.click.expire(now, self.delays.multiple_click) {
            self.clicks = 0;
        }
        out
    }

    /// Stops every countdown.
    pub fn freeze(&mut self, now: HostTime) {
        self.key.freeze(now);
        self.hover.freeze(now);
        self.click.freeze(now);
    }

    /// Resumes the countdowns stopped by [`freeze`](Self::freeze).
    pub fn unfreeze(&mut self, now: HostTime) {
        self.key.unfreeze(now);
        self.hover.unfreeze(now);
        self.click.unfreeze(now);
    }

    /// Returns `true` while any countdown runs.
    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.key.is_running() || self.hover.is_running() || self.click.is_running()
    }
}

impl Default for Gestures {
    fn default() -> Self {
        Self::new(GestureDelays::standard(Timebase::NANOS))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use alloc::vec::Vec;

    const MS: u64 = 1_000_000;

    fn at(ms: u64) -> HostTime {
        HostTime(ms * MS)
    }

    fn all(r: Recognized) -> Vec<Gesture> {
        r.iter().collect()
    }

    const KEY: KeyEvent = KeyEvent {
        text: Some('a'),
        keycode: 4,
        modifiers: Modifiers::empty(),
    };

    fn hovered(now: HostTime) -> Gestures {
        let mut g = Gestures::default();
        g.state_change(
            now,
            Transition {
                before: MouseState::Idle,
                after: MouseState::Hover,
            },
        );
        g
    }

    #[test]
    fn standard_delays_follow_the_timebase() {
        let d = GestureDelays::standard(Timebase::NANOS);
        assert_eq!(d.long_hover, Duration(450 * MS));
        assert_eq!(d.multiple_click, Duration(250 * MS));
    }

    #[test]
    fn clicks_in_quick_succession_form_a_series() {
        let mut g = Gestures::default();
        let p = Point::new(1., 2.);
        let counts: Vec<_> = [0, 100, 200]
            .into_iter()
            .map(|t| {
                let _ = g.tick(at(t));
                all(g.mouse_down(at(t), p, MouseButton::Left))
            })
            .collect();
        assert_eq!(
            counts,
            [1, 2, 3].map(|count| vec_of(Gesture::MultipleClick { pos: p, count }))
        );
        assert!(g.tick(at(451)).is_empty());
        assert_eq!(g.click_count(), 0);
        let again = g.mouse_down(at(500), p, MouseButton::Left);
        assert_eq!(all(again), [Gesture::MultipleClick { pos: p, count: 1 }]);
    }

    fn vec_of(g: Gesture) -> Vec<Gesture> {
        alloc::vec![g]
    }

    #[test]
    fn other_buttons_do_not_count() {
        let mut g = Gestures::default();
        assert!(g.mouse_down(at(0), Point::ORIGIN, MouseButton::Right).is_empty());
        assert_eq!(g.click_count(), 0);
    }

    #[test]
    fn resting_pointer_raises_long_hover_once() {
        let mut g = hovered(at(0));
        g.track(Some(Point::new(3., 4.)));
        assert!(g.tick(at(450)).is_empty());
        assert_eq!(all(g.tick(at(451))), [Gesture::LongHover(Point::new(3., 4.))]);
        assert!(g.is_long_hover());
        assert!(g.tick(at(2000)).is_empty());
    }

    #[test]
    fn motion_ends_long_hover_and_restarts_the_countdown() {
        let mut g = hovered(at(0));
        let _ = g.tick(at(451));
        let moved = g.mouse_motion(at(500), Point::new(5., 5.));
        assert_eq!(all(moved), [Gesture::LongHoverEnd]);
        assert!(g.tick(at(900)).is_empty());
        assert_eq!(all(g.tick(at(951))), [Gesture::LongHover(Point::new(5., 5.))]);
    }

    #[test]
    fn leaving_hover_cancels_the_countdown() {
        let mut g = hovered(at(0));
        let left = g.state_change(
            at(100),
            Transition {
                before: MouseState::Hover,
                after: MouseState::Idle,
            },
        );
        assert!(left.is_empty());
        assert!(g.tick(at(1000)).is_empty());
        assert!(!g.is_counting());
    }

    #[test]
    fn held_key_raises_long_key_down_until_released() {
        let mut g = Gestures::default();
        assert!(g.key_down(at(0), KEY).is_empty());
        assert_eq!(all(g.tick(at(451))), [Gesture::LongKeyDown(KEY)]);
        assert_eq!(all(g.key_up()), [Gesture::LongKeyDownEnd]);
        assert!(!g.is_long_key_down());
    }

    #[test]
    fn short_key_press_raises_nothing() {
        let mut g = Gestures::default();
        let _ = g.key_down(at(0), KEY);
        assert!(g.key_up().is_empty());
        assert!(g.tick(at(1000)).is_empty());
    }

    #[test]
    fn frozen_time_does_not_count() {
        let mut g = hovered(at(0));
        g.freeze(at(400));
        assert!(g.tick(at(5000)).is_empty());
        g.unfreeze(at(5000));
        assert!(g.tick(at(5050)).is_empty());
        assert_eq!(all(g.tick(at(5051))).len(), 1);
    }
}
