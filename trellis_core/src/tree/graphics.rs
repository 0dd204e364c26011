// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry, visibility, surfaces, and capabilities of graphical nodes.

use alloc::boxed::Box;

use kurbo::{Point, Rect, Size, Vec2};
use tracing::debug;

use super::Gui;
use super::id::NodeId;
use super::node::{Capabilities, Graphics};
use crate::error::ConfigError;
use crate::gesture::Gestures;
use crate::interaction::MouseState;
use crate::message::Action;
use crate::surface::{Color, Opacity, Surface};

impl Gui {
    pub(crate) fn gfx(&self, id: NodeId) -> &Graphics {
        self.validate(id);
        match &self.graphics[id.idx as usize] {
            Some(g) => g,
            None => panic!("{id:?} is not a graphical node"),
        }
    }

    pub(crate) fn gfx_mut(&mut self, id: NodeId) -> &mut Graphics {
        self.validate(id);
        match &mut self.graphics[id.idx as usize] {
            Some(g) => g,
            None => panic!("{id:?} is not a graphical node"),
        }
    }

    /// Returns `true` if the node has geometry.
    #[must_use]
    pub fn is_graphical(&self, id: NodeId) -> bool {
        self.validate(id);
        self.graphics[id.idx as usize].is_some()
    }

    /// The node's rectangle, relative to its parent.
    ///
    /// # Panics
    ///
    /// This and every other geometry accessor panic on plain nodes.
    #[must_use]
    pub fn rect(&self, id: NodeId) -> Rect {
        self.gfx(id).rect
    }

    /// The node's position, relative to its parent.
    #[must_use]
    pub fn pos(&self, id: NodeId) -> Point {
        self.gfx(id).rect.origin()
    }

    /// The node's size.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.gfx(id).rect.size()
    }

    /// The node's z order among its siblings.
    #[must_use]
    pub fn z(&self, id: NodeId) -> i32 {
        self.gfx(id).z
    }

    /// The node's opacity class.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> Opacity {
        self.gfx(id).opacity
    }

    /// Returns `true` if the node is shown.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.gfx(id).visible
    }

    /// Returns `true` while the pointer is over the node.
    #[must_use]
    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.gfx(id).hovered
    }

    /// The node's pointer capabilities.
    #[must_use]
    pub fn capabilities(&self, id: NodeId) -> Capabilities {
        self.gfx(id).caps
    }

    /// The node's background surface.
    #[must_use]
    pub fn background(&self, id: NodeId) -> Option<&dyn Surface> {
        self.gfx(id).background.as_deref()
    }

    /// The node's display surface: its background with its children
    /// composited on top.
    #[must_use]
    pub fn display(&self, id: NodeId) -> Option<&dyn Surface> {
        self.gfx(id).display.as_deref()
    }

    /// The node's colorkey.
    #[must_use]
    pub fn colorkey(&self, id: NodeId) -> Option<Color> {
        self.gfx(id).colorkey
    }

    /// The node's whole-surface alpha.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> Option<u8> {
        self.gfx(id).alpha
    }

    /// The node's interaction state, if it is interactive.
    #[must_use]
    pub fn mouse_state(&self, id: NodeId) -> Option<MouseState> {
        self.gfx(id).interaction.as_ref().map(|i| i.state())
    }

    /// Replaces the action an interactive node sends on activation.
    ///
    /// # Panics
    ///
    /// Panics if the node has no interaction.
    pub fn set_action(&mut self, id: NodeId, action: Option<Action>) {
        match self.gfx_mut(id).interaction.as_mut() {
            Some(i) => i.set_action(action),
            None => panic!("{id:?} is not interactive"),
        }
    }

    /// Position in screen coordinates: the node's origin plus those of all
    /// its graphical ancestors.
    #[must_use]
    pub fn abs_pos(&self, id: NodeId) -> Point {
        let mut pos = self.pos(id);
        for a in self.ancestors(id) {
            if let Some(g) = &self.graphics[a.idx as usize] {
                pos += g.rect.origin().to_vec2();
            }
        }
        pos
    }

    /// Rectangle in screen coordinates.
    #[must_use]
    pub fn abs_rect(&self, id: NodeId) -> Rect {
        let rect = self.rect(id);
        rect.with_origin(self.abs_pos(id))
    }

    /// Returns `true` if `point`, in the parent's coordinates, lies within
    /// the node.
    #[must_use]
    pub fn contains(&self, id: NodeId, point: Point) -> bool {
        self.rect(id).contains(point)
    }

    // -- Visibility --

    /// Shows the node.
    pub fn show(&mut self, id: NodeId) {
        let g = self.gfx_mut(id);
        if g.visible {
            return;
        }
        g.visible = true;
        debug!(?id, "shown");
        let _ = self.with_component(id, |c, cx| c.on_show(cx));
    }

    /// Hides the node, revoking focus held anywhere in its subtree first.
    pub fn hide(&mut self, id: NodeId) {
        if !self.gfx(id).visible {
            return;
        }
        self.revoke_focus_within(id);
        self.gfx_mut(id).visible = false;
        debug!(?id, "hidden");
        let _ = self.with_component(id, |c, cx| c.on_hide(cx));
        if self.is_alive(id) {
            self.feed_gestures(id, Gestures::hide);
        }
    }

    /// Flips visibility.
    pub fn toggle_show(&mut self, id: NodeId) {
        if self.is_visible(id) {
            self.hide(id);
        } else {
            self.show(id);
        }
    }

    /// Shows and unpauses the node.
    pub fn activate(&mut self, id: NodeId) {
        self.show(id);
        self.unpause(id);
    }

    /// Hides and pauses the node.
    pub fn deactivate(&mut self, id: NodeId) {
        self.hide(id);
        self.pause(id);
    }

    // -- Geometry --

    /// Moves the node within its parent.
    pub fn set_pos(&mut self, id: NodeId, pos: Point) {
        let g = self.gfx_mut(id);
        g.rect = g.rect.with_origin(pos);
    }

    /// Moves the node by `delta`.
    pub fn move_by(&mut self, id: NodeId, delta: Vec2) {
        let pos = self.pos(id) + delta;
        self.set_pos(id, pos);
    }

    /// Resizes the node.
    ///
    /// Surface-owning nodes get new blank surfaces and go stale, so their
    /// refresh hook repaints the background during the next tick.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        let g = self.gfx(id);
        if g.rect.size() == size {
            return;
        }
        let (opacity, colorkey, alpha) = (g.opacity, g.colorkey, g.alpha);
        let background = opacity
            .owns_surface()
            .then(|| self.surfaces.create(size, opacity.has_alpha()));
        let display = self.new_display(size, opacity, colorkey, alpha);
        let g = self.gfx_mut(id);
        g.rect = g.rect.with_size(size);
        g.background = background;
        g.display = display;
        self.state[id.idx as usize].stale = true;
    }

    /// Moves and resizes the node.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        self.set_pos(id, rect.origin());
        self.set_size(id, rect.size());
    }

    /// Changes the node's z order, re-sorting its siblings. The parent is
    /// marked dirty if the drawing order changed.
    pub fn set_z(&mut self, id: NodeId, z: i32) {
        let g = self.gfx_mut(id);
        if g.z == z {
            return;
        }
        g.z = z;
        if let Some(parent) = self.parent(id)
            && self.sort_drawn(parent.idx)
            && self.graphics[parent.idx as usize].is_some()
        {
            self.mark_dirty(parent);
        }
    }

    // -- Surfaces --

    /// Replaces the node's background.
    ///
    /// A surface of a different size resizes the node to match. `None`
    /// leaves the node without a background, which draws as its clear
    /// color.
    ///
    /// # Errors
    ///
    /// Transparent nodes take no background, and opaque nodes reject
    /// surfaces carrying per-pixel alpha or a colorkey.
    pub fn set_background(
        &mut self,
        id: NodeId,
        background: Option<Box<dyn Surface>>,
    ) -> Result<(), ConfigError> {
        let g = self.gfx(id);
        let opacity = g.opacity;
        let incompatible = |reason| ConfigError::IncompatibleBackground { opacity, reason };
        match (opacity, background.as_deref()) {
            (Opacity::Transparent, _) => return Err(incompatible("it owns no surface")),
            (Opacity::Opaque, Some(s)) if s.has_alpha() => {
                return Err(incompatible("the surface has per-pixel alpha"));
            }
            (Opacity::Opaque, Some(s)) if s.colorkey().is_some() => {
                return Err(incompatible("the surface has a colorkey"));
            }
            _ => {}
        }
        if let Some(size) = background.as_ref().map(|s| s.size())
            && size != g.rect.size()
        {
            let (colorkey, alpha) = (g.colorkey, g.alpha);
            let display = self.new_display(size, opacity, colorkey, alpha);
            let g = self.gfx_mut(id);
            g.rect = g.rect.with_size(size);
            g.display = display;
        }
        self.gfx_mut(id).background = background;
        self.mark_dirty(id);
        Ok(())
    }

    /// Sets or clears the colorkey used when the node is composited.
    ///
    /// # Errors
    ///
    /// Only translucent nodes can be colorkeyed.
    pub fn set_colorkey(&mut self, id: NodeId, colorkey: Option<Color>) -> Result<(), ConfigError> {
        let g = self.gfx_mut(id);
        if g.opacity != Opacity::Translucent {
            return Err(ConfigError::IncompatibleBlending {
                opacity: g.opacity,
                setting: "a colorkey",
            });
        }
        if g.colorkey == colorkey {
            return Ok(());
        }
        g.colorkey = colorkey;
        if let Some(display) = g.display.as_mut() {
            display.set_colorkey(colorkey);
        }
        self.mark_dirty(id);
        Ok(())
    }

    /// Sets or clears the whole-surface alpha used when the node is
    /// composited.
    ///
    /// # Errors
    ///
    /// Only translucent nodes can carry surface alpha.
    pub fn set_alpha(&mut self, id: NodeId, alpha: Option<u8>) -> Result<(), ConfigError> {
        let g = self.gfx_mut(id);
        if g.opacity != Opacity::Translucent {
            return Err(ConfigError::IncompatibleBlending {
                opacity: g.opacity,
                setting: "surface alpha",
            });
        }
        if g.alpha == alpha {
            return Ok(());
        }
        g.alpha = alpha;
        if let Some(display) = g.display.as_mut() {
            display.set_alpha(alpha);
        }
        self.mark_dirty(id);
        Ok(())
    }

    pub(crate) fn new_display(
        &mut self,
        size: Size,
        opacity: Opacity,
        colorkey: Option<Color>,
        alpha: Option<u8>,
    ) -> Option<Box<dyn Surface>> {
        if !opacity.owns_surface() {
            return None;
        }
        let mut display = self.surfaces.create(size, opacity.has_alpha());
        display.set_colorkey(colorkey);
        display.set_alpha(alpha);
        Some(display)
    }

    // -- Capabilities --

    /// Enables or disables hover events.
    pub fn set_can_hover(&mut self, id: NodeId, enabled: bool) {
        self.gfx_mut(id).caps.set(Capabilities::HOVER, enabled);
    }

    /// Enables or disables button events.
    pub fn set_can_click(&mut self, id: NodeId, enabled: bool) {
        self.gfx_mut(id).caps.set(Capabilities::CLICK, enabled);
    }

    /// Enables or disables taking focus on click. Disabling revokes focus
    /// the node holds.
    pub fn set_can_focus(&mut self, id: NodeId, enabled: bool) {
        self.gfx_mut(id).caps.set(Capabilities::FOCUS, enabled);
        if !enabled {
            self.revoke_focus(|_, n| n == id);
        }
    }
}
