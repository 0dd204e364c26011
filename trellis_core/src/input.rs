// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events and the per-frame input-state snapshot.
//!
//! Discrete events ([`InputEvent`]) are routed through the tree as they
//! arrive. The [`InputState`] snapshot describes the pointer and buttons at
//! the start of the frame and is what the hover-reconciliation pass polls;
//! nothing in the core reads device state on its own.

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::geometry::{Point, Vec2};

bitflags::bitflags! {
    /// Keyboard modifier state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Modifiers: u16 {
        /// Either shift key.
        const SHIFT = 1 << 0;
        /// Either control key.
        const CTRL = 1 << 1;
        /// Either alt / option key.
        const ALT = 1 << 2;
        /// Either meta / command / super key.
        const META = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Which mouse buttons are held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        /// Primary button.
        const LEFT = 1 << 0;
        /// Middle button / wheel click.
        const MIDDLE = 1 << 1;
        /// Secondary button.
        const RIGHT = 1 << 2;
    }
}

/// A single mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Middle button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button, by platform index.
    Other(u8),
}

impl MouseButton {
    /// The matching bit in [`MouseButtons`], if there is one.
    #[must_use]
    pub const fn flag(self) -> MouseButtons {
        match self {
            Self::Left => MouseButtons::LEFT,
            Self::Middle => MouseButtons::MIDDLE,
            Self::Right => MouseButtons::RIGHT,
            Self::Other(_) => MouseButtons::empty(),
        }
    }
}

/// A pressed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Text produced by the key, if any.
    pub text: Option<char>,
    /// Platform key code.
    pub keycode: u32,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

/// A key plus modifiers, the unit control bindings are keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyChord {
    /// Platform key code.
    pub keycode: u32,
    /// Required modifiers.
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Creates a chord.
    #[must_use]
    pub const fn new(keycode: u32, modifiers: Modifiers) -> Self {
        Self { keycode, modifiers }
    }

    pub(crate) fn describe(self) -> String {
        format!("{self}")
    }
}

impl From<&KeyEvent> for KeyChord {
    fn from(e: &KeyEvent) -> Self {
        Self::new(e.keycode, e.modifiers)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, _) in self.modifiers.iter_names() {
            write!(f, "{name}+")?;
        }
        write!(f, "#{}", self.keycode)
    }
}

/// A discrete event delivered by the input driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown(KeyEvent),
    /// A key was released.
    KeyUp {
        /// Platform key code.
        keycode: u32,
        /// Modifiers held at the time.
        modifiers: Modifiers,
    },
    /// The pointer moved from `start` to `end` in screen space.
    MouseMotion {
        /// Previous pointer position.
        start: Point,
        /// New pointer position.
        end: Point,
        /// Buttons held during the motion.
        buttons: MouseButtons,
    },
    /// A mouse button was pressed.
    MouseDown {
        /// Pointer position in screen space.
        pos: Point,
        /// Which button.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseUp {
        /// Pointer position in screen space.
        pos: Point,
        /// Which button.
        button: MouseButton,
    },
}

/// Pointer and button state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    /// Pointer position in screen space, or `None` when outside the window.
    pub pointer: Option<Point>,
    /// Pointer motion since the previous frame.
    pub rel: Vec2,
    /// Buttons currently held.
    pub buttons: MouseButtons,
}

impl InputState {
    /// A snapshot with the pointer at `pos` and nothing held.
    #[must_use]
    pub fn at(pos: Point) -> Self {
        Self {
            pointer: Some(pos),
            ..Self::default()
        }
    }

    /// Returns `true` if the primary button is held.
    #[inline]
    #[must_use]
    pub fn left_down(&self) -> bool {
        self.buttons.contains(MouseButtons::LEFT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_display_lists_modifiers() {
        let chord = KeyChord::new(27, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(chord.describe(), "SHIFT+CTRL+#27");
        assert_eq!(KeyChord::new(13, Modifiers::empty()).describe(), "#13");
    }

    #[test]
    fn chord_from_event_drops_text() {
        let e = KeyEvent {
            text: Some('q'),
            keycode: 81,
            modifiers: Modifiers::CTRL,
        };
        assert_eq!(KeyChord::from(&e), KeyChord::new(81, Modifiers::CTRL));
    }

    #[test]
    fn button_flags() {
        assert_eq!(MouseButton::Left.flag(), MouseButtons::LEFT);
        assert!(MouseButton::Other(4).flag().is_empty());
        let state = InputState {
            buttons: MouseButtons::LEFT | MouseButtons::RIGHT,
            ..InputState::default()
        };
        assert!(state.left_down());
    }
}
