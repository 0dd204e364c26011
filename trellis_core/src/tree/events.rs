// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input routing and hover tracking.
//!
//! Events enter at the root and travel down the tree. Positions are
//! translated into each receiving node's local coordinates on the way.

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use tracing::trace;

use super::Gui;
use super::id::NodeId;
use super::node::Capabilities;
use crate::input::{InputEvent, InputState, KeyChord, KeyEvent, Modifiers, MouseButton, MouseButtons};
use crate::gesture::Gestures;
use crate::interaction::Steps;
use crate::message::Message;

impl Gui {
    /// Routes one input event from the root.
    ///
    /// Does nothing without a root, or while the root is paused.
    pub fn dispatch(&mut self, event: &InputEvent) {
        let Some(root) = self.root else {
            return;
        };
        if self.state[root.idx as usize].paused {
            return;
        }
        let offset = self.origin(root);
        match *event {
            InputEvent::KeyDown(ref key) => self.key_down(root, key),
            InputEvent::KeyUp { keycode, modifiers } => self.key_up(root, keycode, modifiers),
            InputEvent::MouseMotion {
                start,
                end,
                buttons,
            } => self.mouse_motion(root, start - offset, end - offset, buttons),
            InputEvent::MouseDown { pos, button } => self.mouse_down(root, pos - offset, button),
            InputEvent::MouseUp { pos, button } => self.mouse_up(root, pos - offset, button),
        }
    }

    fn origin(&self, id: NodeId) -> Vec2 {
        self.graphics[id.idx as usize]
            .as_ref()
            .map_or(Vec2::ZERO, |g| g.rect.origin().to_vec2())
    }

    /// Whether a child takes part in pointer routing for `cap` at `pos`,
    /// given in the parent's coordinates.
    fn hit(&self, child: u32, cap: Capabilities, pos: Point) -> bool {
        let i = child as usize;
        !self.state[i].paused
            && self.graphics[i]
                .as_ref()
                .is_some_and(|g| g.visible && g.can(cap) && g.rect.contains(pos))
    }

    // -- Keys --

    fn key_down(&mut self, id: NodeId, key: &KeyEvent) {
        if self.state[id.idx as usize].frozen {
            return;
        }
        let command = self
            .styles
            .control(KeyChord::from(key), self.effective_context(id));
        if let Some(command) = command {
            trace!(?id, ?command, "key control");
            self.offer_local(id, Message::Command(command));
        }
        let _ = self.with_component(id, |c, cx| c.on_key_down(cx, key));
        if !self.is_alive(id) {
            return;
        }
        let now = self.now();
        self.feed_gestures(id, |g| g.key_down(now, *key));
        for child in self.child_ids(id) {
            if self.is_alive(child) {
                self.key_down(child, key);
            }
        }
    }

    fn key_up(&mut self, id: NodeId, keycode: u32, modifiers: Modifiers) {
        if self.state[id.idx as usize].frozen {
            return;
        }
        let _ = self.with_component(id, |c, cx| c.on_key_up(cx, keycode, modifiers));
        if !self.is_alive(id) {
            return;
        }
        self.feed_gestures(id, Gestures::key_up);
        for child in self.child_ids(id) {
            if self.is_alive(child) {
                self.key_up(child, keycode, modifiers);
            }
        }
    }

    // -- Mouse --

    fn mouse_down(&mut self, id: NodeId, pos: Point, button: MouseButton) {
        let unhovered = self.graphics[id.idx as usize].as_ref().is_some_and(|g| {
            !g.hovered && g.visible && g.can(Capabilities::HOVER) && g.local_bounds().contains(pos)
        });
        if unhovered {
            // Pressed before any track pass saw the pointer arrive.
            self.set_hovered(id, true, pos, pos, MouseButtons::empty());
            if !self.is_alive(id) {
                return;
            }
        }
        let _ = self.with_component(id, |c, cx| c.on_mouse_down(cx, pos, button));
        if !self.is_alive(id) {
            return;
        }
        let steps = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.interaction.as_mut())
            .map(|i| i.down(button));
        if let Some(steps) = steps {
            self.apply_steps(id, steps);
        }
        let now = self.now();
        self.feed_gestures(id, |g| g.mouse_down(now, pos, button));
        if !self.is_alive(id) {
            return;
        }
        let focusable = self.graphics[id.idx as usize]
            .as_ref()
            .is_some_and(|g| g.can(Capabilities::FOCUS));
        if focusable && !self.is_focused(id) {
            self.give_focus(id);
        }
        let target = self.drawn[id.idx as usize]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.hit(c, Capabilities::CLICK, pos));
        if let Some(c) = target {
            let child = self.id_at(c);
            let local = pos - self.origin(child);
            self.mouse_down(child, local, button);
        }
    }

    fn mouse_up(&mut self, id: NodeId, pos: Point, button: MouseButton) {
        let _ = self.with_component(id, |c, cx| c.on_mouse_up(cx, pos, button));
        if !self.is_alive(id) {
            return;
        }
        let steps = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.interaction.as_mut())
            .map(|i| i.up(button));
        if let Some(steps) = steps {
            self.apply_steps(id, steps);
        }
        for child in self.graphical_children(id).collect::<Vec<_>>() {
            if self.is_alive(child) && self.hit(child.idx, Capabilities::CLICK, pos) {
                let local = pos - self.origin(child);
                self.mouse_up(child, local, button);
            }
        }
    }

    fn mouse_motion(&mut self, id: NodeId, start: Point, end: Point, buttons: MouseButtons) {
        let _ = self.with_component(id, |c, cx| c.on_mouse_motion(cx, start, end, buttons));
        if !self.is_alive(id) {
            return;
        }
        let now = self.now();
        self.feed_gestures(id, |g| g.mouse_motion(now, end));
        if !self.is_alive(id) {
            return;
        }
        for child in self.graphical_children(id).collect::<Vec<_>>() {
            if self.is_alive(child)
                && self.hit(child.idx, Capabilities::HOVER, start)
                && self.hit(child.idx, Capabilities::HOVER, end)
            {
                let o = self.origin(child);
                self.mouse_motion(child, start - o, end - o, buttons);
            }
        }
    }

    // -- Tracking --

    /// Reconciles hover state with the pointer, top-down through the
    /// unpaused tree.
    ///
    /// Fires enter and exit hooks (and interaction changes) for nodes the
    /// pointer moved onto or off of, including nodes that moved or appeared
    /// under a still pointer.
    pub fn track(&mut self, input: &InputState) {
        let Some(root) = self.root else {
            return;
        };
        if self.state[root.idx as usize].paused {
            return;
        }
        self.track_hover(root, input.pointer, input.rel, input.buttons);
        let local = input.pointer.map(|p| p - self.origin(root));
        self.track_node(root, local, input.rel, input.buttons);
    }

    /// `pointer` is in the parent's coordinates.
    fn track_hover(&mut self, id: NodeId, pointer: Option<Point>, rel: Vec2, buttons: MouseButtons) {
        let idx = id.idx as usize;
        let inside = pointer.is_some_and(|p| self.hit(id.idx, Capabilities::HOVER, p));
        let Some(g) = self.graphics[idx].as_ref() else {
            return;
        };
        if g.hovered == inside {
            return;
        }
        let end = pointer.unwrap_or_default() - g.rect.origin().to_vec2();
        self.set_hovered(id, inside, end - rel, end, buttons);
    }

    /// Flips the hover flag, firing the enter or exit hook and stepping the
    /// interaction. Positions are local.
    fn set_hovered(&mut self, id: NodeId, inside: bool, start: Point, end: Point, buttons: MouseButtons) {
        let idx = id.idx as usize;
        if let Some(g) = self.graphics[idx].as_mut() {
            g.hovered = inside;
        }
        if inside {
            let _ = self.with_component(id, |c, cx| c.on_mouse_enter(cx, start, end, buttons));
        } else {
            let _ = self.with_component(id, |c, cx| c.on_mouse_exit(cx, start, end, buttons));
        }
        if !self.is_alive(id) {
            return;
        }
        let steps = self.graphics[idx]
            .as_mut()
            .and_then(|g| g.interaction.as_mut())
            .map(|i| if inside { i.enter(buttons) } else { i.exit() });
        if let Some(steps) = steps {
            self.apply_steps(id, steps);
        }
    }

    /// `pointer` is in the node's own coordinates.
    fn track_node(&mut self, id: NodeId, pointer: Option<Point>, rel: Vec2, buttons: MouseButtons) {
        let _ = self.with_component(id, |c, cx| c.on_track(cx));
        if !self.is_alive(id) {
            return;
        }
        if let Some(g) = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.gestures.as_mut())
        {
            g.track(pointer);
        }
        let steps = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.interaction.as_mut())
            .map(|i| i.track(buttons));
        if let Some(steps) = steps {
            self.apply_steps(id, steps);
        }
        for child in self.graphical_children(id).collect::<Vec<_>>() {
            if !self.is_alive(child) || self.state[child.idx as usize].paused {
                continue;
            }
            self.track_hover(child, pointer, rel, buttons);
            if self.is_alive(child) {
                let local = pointer.map(|p| p - self.origin(child));
                self.track_node(child, local, rel, buttons);
            }
        }
    }

    // -- Interaction --

    /// Reports interaction changes to the component, and sends the node's
    /// action upward on activation.
    pub(crate) fn apply_steps(&mut self, id: NodeId, steps: Steps) {
        for change in steps.iter() {
            if !self.is_alive(id) {
                return;
            }
            trace!(?id, ?change, "mouse state change");
            let _ = self.with_component(id, |c, cx| c.on_mouse_state_change(cx, change));
            let now = self.now();
            self.feed_gestures(id, |g| g.state_change(now, change));
        }
        if !steps.activated() || !self.is_alive(id) {
            return;
        }
        let action = self.graphics[id.idx as usize]
            .as_ref()
            .and_then(|g| g.interaction.as_ref())
            .and_then(|i| i.action());
        if let Some(action) = action {
            trace!(?id, ?action, "activated");
            self.send_message(id, Message::Action(action));
        }
    }

    /// Drops hover and returns the interaction to idle, as when paused.
    pub(crate) fn reset_interaction(&mut self, id: NodeId) {
        let Some(g) = self.graphics[id.idx as usize].as_mut() else {
            return;
        };
        g.hovered = false;
        if let Some(steps) = g.interaction.as_mut().map(|i| i.reset()) {
            self.apply_steps(id, steps);
        }
    }
}
