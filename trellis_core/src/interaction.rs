// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mouse engagement state machine.
//!
//! ```text
//!          enter        enter        exit     down(left)    up(left)
//!          (button)     (no button)
//! IDLE     PUSH         HOVER        -        HOVER, PRESS  -
//! HOVER    -            -            IDLE     PRESS         -
//! PUSH     -            -            IDLE     -             HOVER
//! PRESS    -            -            PULL     -             HOVER
//! PULL     PRESS        -            -        -             IDLE
//! ```
//!
//! PRESS → HOVER (released while still over the node, having been pressed)
//! is the activation transition.

use crate::attr::{Tracked, Transition};
use crate::input::{MouseButton, MouseButtons};
use crate::message::Action;

/// Where the pointer stands relative to an interactive node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseState {
    /// Not engaged.
    #[default]
    Idle,
    /// Pointer over the node, no button held.
    Hover,
    /// Pointer entered the node with the button already held elsewhere.
    Push,
    /// Button pressed on the node and pointer still over it.
    Press,
    /// Button pressed on the node, pointer dragged off it.
    Pull,
}

/// The state changes caused by one input step, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Steps {
    steps: [Option<Transition<MouseState>>; 2],
}

impl Steps {
    fn push(&mut self, t: Transition<MouseState>) {
        let slot = usize::from(self.steps[0].is_some());
        debug_assert!(self.steps[slot].is_none(), "at most two steps per input");
        self.steps[slot] = Some(t);
    }

    /// Iterates over the recorded changes.
    pub fn iter(&self) -> impl Iterator<Item = Transition<MouseState>> + '_ {
        self.steps.iter().flatten().copied()
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps[0].is_none()
    }

    /// Returns `true` if one of the changes is an activation.
    #[must_use]
    pub fn activated(&self) -> bool {
        self.iter()
            .any(|t| t.before == MouseState::Press && t.after == MouseState::Hover)
    }
}

/// Per-node mouse interaction, optionally firing an [`Action`] on activation.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    state: Tracked<MouseState>,
    action: Option<Action>,
}

impl Interaction {
    /// Creates an idle interaction that fires `action` when activated.
    #[must_use]
    pub fn new(action: Option<Action>) -> Self {
        Self {
            state: Tracked::new(MouseState::Idle),
            action,
        }
    }

    /// The live state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> MouseState {
        *self.state.get()
    }

    /// The action fired on activation.
    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Replaces the action fired on activation.
    pub fn set_action(&mut self, action: Option<Action>) {
        self.action = action;
    }

    fn go(&mut self, to: MouseState, steps: &mut Steps) {
        let before = self.state();
        if before != to {
            self.state.set(to);
            steps.push(Transition { before, after: to });
        }
    }

    /// The pointer entered the node.
    pub fn enter(&mut self, buttons: MouseButtons) -> Steps {
        let mut steps = Steps::default();
        match self.state() {
            MouseState::Idle if buttons.contains(MouseButtons::LEFT) => {
                self.go(MouseState::Push, &mut steps);
            }
            MouseState::Idle => self.go(MouseState::Hover, &mut steps),
            MouseState::Pull => self.go(MouseState::Press, &mut steps),
            _ => {}
        }
        steps
    }

    /// The pointer left the node.
    pub fn exit(&mut self) -> Steps {
        let mut steps = Steps::default();
        match self.state() {
            MouseState::Hover | MouseState::Push => self.go(MouseState::Idle, &mut steps),
            MouseState::Press => self.go(MouseState::Pull, &mut steps),
            _ => {}
        }
        steps
    }

    /// A button was pressed over the node.
    pub fn down(&mut self, button: MouseButton) -> Steps {
        let mut steps = Steps::default();
        if button == MouseButton::Left {
            match self.state() {
                MouseState::Idle => {
                    self.go(MouseState::Hover, &mut steps);
                    self.go(MouseState::Press, &mut steps);
                }
                MouseState::Hover => self.go(MouseState::Press, &mut steps),
                _ => {}
            }
        }
        steps
    }

    /// A button was released over the node.
    pub fn up(&mut self, button: MouseButton) -> Steps {
        let mut steps = Steps::default();
        if button == MouseButton::Left {
            match self.state() {
                MouseState::Press | MouseState::Push => self.go(MouseState::Hover, &mut steps),
                MouseState::Pull => self.go(MouseState::Idle, &mut steps),
                _ => {}
            }
        }
        steps
    }

    /// Per-frame poll: a pull whose button was released off the node (and
    /// so never produced a release event here) falls back to idle.
    pub fn track(&mut self, buttons: MouseButtons) -> Steps {
        let mut steps = Steps::default();
        if self.state() == MouseState::Pull && !buttons.contains(MouseButtons::LEFT) {
            self.go(MouseState::Idle, &mut steps);
        }
        steps
    }

    /// Forces the idle state, as on pause.
    pub fn reset(&mut self) -> Steps {
        let mut steps = Steps::default();
        self.go(MouseState::Idle, &mut steps);
        steps
    }

    /// Reports the net state change since the previous flush.
    pub fn flush(&mut self) -> Option<Transition<MouseState>> {
        self.state.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
