// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node behaviour: the hook trait and the context hooks run in.

use alloc::boxed::Box;
use core::any::Any;

use kurbo::{Point, Size};

use super::Gui;
use super::id::NodeId;
use crate::attr::Transition;
use crate::error::ConfigError;
use crate::input::{KeyEvent, Modifiers, MouseButton, MouseButtons};
use crate::interaction::MouseState;
use crate::message::{Message, Propagation};
use crate::style::StyleValue;
use crate::surface::Surface;
use crate::time::HostTime;

/// Behaviour attached to a node.
///
/// Every hook has an empty default, so implementors override only what they
/// need. Hooks receive a [`Ctx`] giving access to the whole tree; the tree
/// never re-enters the hooks of a component whose hook is already running,
/// and messages addressed to it meanwhile are delivered once it returns.
///
/// Mouse positions are in the receiving node's local coordinates.
#[expect(unused_variables, reason = "hook defaults ignore their arguments")]
pub trait Component: Any {
    /// Reads styles; runs on load and on every prepare pass, before
    /// [`load_options`](Self::load_options).
    fn load_style(&mut self, cx: &mut Ctx<'_>) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Reads options; runs after [`load_style`](Self::load_style).
    fn load_options(&mut self, cx: &mut Ctx<'_>) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Runs once, after the first style and option load.
    fn on_load(&mut self, cx: &mut Ctx<'_>) {}

    /// Runs bottom-up at the end of a prepare pass.
    fn on_prepare(&mut self, cx: &mut Ctx<'_>) {}

    /// The node was registered under `parent`.
    fn on_new_parent(&mut self, cx: &mut Ctx<'_>, parent: NodeId) {}

    /// The node is about to be detached from `parent`.
    fn on_disowned(&mut self, cx: &mut Ctx<'_>, parent: NodeId) {}

    /// The node was paused.
    fn on_pause(&mut self, cx: &mut Ctx<'_>) {}

    /// The node was unpaused.
    fn on_unpause(&mut self, cx: &mut Ctx<'_>) {}

    /// The node was frozen, directly or through an ancestor.
    fn on_freeze(&mut self, cx: &mut Ctx<'_>) {}

    /// The node was unfrozen, directly or through an ancestor.
    fn on_unfreeze(&mut self, cx: &mut Ctx<'_>) {}

    /// Per-frame update, after the node's children ticked.
    fn on_tick(&mut self, cx: &mut Ctx<'_>) {}

    /// Flushes the component's tracked attributes. Returns `true` if any of
    /// them reported a transition, which marks the node dirty and stale.
    fn flush_transitions(&mut self, cx: &mut Ctx<'_>) -> bool {
        false
    }

    /// Rebuilds visual state (usually the background) after a change.
    fn refresh(&mut self, cx: &mut Ctx<'_>) {}

    /// Offered a message travelling up the tree.
    fn handle_message(
        &mut self,
        cx: &mut Ctx<'_>,
        sender: NodeId,
        message: &Message,
    ) -> Propagation {
        Propagation::Forward
    }

    /// The node became visible.
    fn on_show(&mut self, cx: &mut Ctx<'_>) {}

    /// The node was hidden.
    fn on_hide(&mut self, cx: &mut Ctx<'_>) {}

    /// The node gained input focus.
    fn on_take_focus(&mut self, cx: &mut Ctx<'_>) {}

    /// The node lost input focus.
    fn on_lose_focus(&mut self, cx: &mut Ctx<'_>) {}

    /// A key was pressed.
    fn on_key_down(&mut self, cx: &mut Ctx<'_>, key: &KeyEvent) {}

    /// A key was released.
    fn on_key_up(&mut self, cx: &mut Ctx<'_>, keycode: u32, modifiers: Modifiers) {}

    /// A button was pressed over the node.
    fn on_mouse_down(&mut self, cx: &mut Ctx<'_>, pos: Point, button: MouseButton) {}

    /// A button was released over the node.
    fn on_mouse_up(&mut self, cx: &mut Ctx<'_>, pos: Point, button: MouseButton) {}

    /// The pointer moved within the node.
    fn on_mouse_motion(
        &mut self,
        cx: &mut Ctx<'_>,
        start: Point,
        end: Point,
        buttons: MouseButtons,
    ) {
    }

    /// The pointer entered the node.
    fn on_mouse_enter(
        &mut self,
        cx: &mut Ctx<'_>,
        start: Point,
        end: Point,
        buttons: MouseButtons,
    ) {
    }

    /// The pointer left the node.
    fn on_mouse_exit(
        &mut self,
        cx: &mut Ctx<'_>,
        start: Point,
        end: Point,
        buttons: MouseButtons,
    ) {
    }

    /// Per-frame poll, before hover is reconciled.
    fn on_track(&mut self, cx: &mut Ctx<'_>) {}

    /// The interaction state changed, immediately as input arrives.
    fn on_mouse_state_change(&mut self, cx: &mut Ctx<'_>, change: Transition<MouseState>) {}

    /// The interaction state differs from the previous tick's.
    fn on_mouse_state_transition(&mut self, cx: &mut Ctx<'_>, change: Transition<MouseState>) {}

    // Gesture hooks fire only on nodes built with `NodeSpec::gestures`.

    /// A key has been held past the long key press delay.
    fn on_long_key_down(&mut self, cx: &mut Ctx<'_>, key: &KeyEvent) {}

    /// The long key press ended with a release or another key.
    fn on_long_key_down_end(&mut self, cx: &mut Ctx<'_>) {}

    /// The pointer rested over the node past the long hover delay.
    fn on_long_hover(&mut self, cx: &mut Ctx<'_>, pos: Point) {}

    /// The long hover ended.
    fn on_long_hover_end(&mut self, cx: &mut Ctx<'_>) {}

    /// Second left click of a series.
    fn on_double_click(&mut self, cx: &mut Ctx<'_>, pos: Point) {}

    /// Third left click of a series.
    fn on_triple_click(&mut self, cx: &mut Ctx<'_>, pos: Point) {}

    /// Every left click, with its place in the series. Runs after the
    /// double and triple click hooks.
    fn on_multiple_click(&mut self, cx: &mut Ctx<'_>, pos: Point, count: u32) {}
}

/// The behaviour-less component, for pure grouping nodes.
impl Component for () {}

/// What a hook sees: the tree, and which node it is running for.
#[derive(Debug)]
pub struct Ctx<'a> {
    pub(crate) gui: &'a mut Gui,
    pub(crate) id: NodeId,
}

impl Ctx<'_> {
    /// The node this hook runs for.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The whole tree.
    #[inline]
    #[must_use]
    pub fn gui(&self) -> &Gui {
        self.gui
    }

    /// The whole tree, mutably.
    #[inline]
    pub fn gui_mut(&mut self) -> &mut Gui {
        self.gui
    }

    /// The node's parent.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.gui.parent(self.id)
    }

    /// Current time on the tree's clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.gui.now()
    }

    /// Sends a message up the tree, starting at the node's parent.
    pub fn send_message(&mut self, message: Message) {
        self.gui.send_message(self.id, message);
    }

    /// Looks up a style for this node.
    pub fn style_get(&self, query: &str) -> Result<StyleValue, ConfigError> {
        self.gui.style_get(self.id, query)
    }

    /// Looks up a style for this node, falling back to `default`.
    #[must_use]
    pub fn style_or(&self, query: &str, default: impl Into<StyleValue>) -> StyleValue {
        self.gui
            .style_get(self.id, query)
            .unwrap_or_else(|_| default.into())
    }

    /// Looks up an option for this node.
    pub fn options_get(&self, query: &str) -> Result<StyleValue, ConfigError> {
        self.gui.options_get(self.id, query)
    }

    /// Looks up an option for this node, falling back to `default`.
    #[must_use]
    pub fn option_or(&self, query: &str, default: impl Into<StyleValue>) -> StyleValue {
        self.gui
            .options_get(self.id, query)
            .unwrap_or_else(|_| default.into())
    }

    /// Creates a blank surface through the tree's factory.
    pub fn create_surface(&mut self, size: Size, alpha: bool) -> Box<dyn Surface> {
        self.gui.create_surface(size, alpha)
    }

    /// Replaces this node's background.
    pub fn set_background(&mut self, background: Box<dyn Surface>) -> Result<(), ConfigError> {
        self.gui.set_background(self.id, Some(background))
    }

    /// Marks this node for a full redraw.
    pub fn mark_dirty(&mut self) {
        self.gui.mark_dirty(self.id);
    }

    /// Gives this node input focus.
    pub fn take_focus(&mut self) {
        self.gui.give_focus(self.id);
    }

    /// Asks the driver to stop the frame loop.
    pub fn request_exit(&mut self) {
        self.gui.request_exit();
    }
}
