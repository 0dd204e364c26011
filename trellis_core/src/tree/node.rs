// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node state and construction parameters.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::Rect;

use crate::dirty::DirtyRects;
use crate::gesture::Gestures;
use crate::interaction::Interaction;
use crate::message::Action;
use crate::surface::{Color, Opacity, Surface};

bitflags::bitflags! {
    /// Which pointer interactions a graphical node takes part in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Receives enter, exit, and motion events.
        const HOVER = 1 << 0;
        /// Receives button events and is hit-tested for clicks.
        const CLICK = 1 << 1;
        /// Takes input focus when clicked.
        const FOCUS = 1 << 2;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::HOVER | Self::CLICK
    }
}

/// Lifecycle flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct NodeState {
    pub(crate) loaded: bool,
    pub(crate) paused: bool,
    pub(crate) frozen: bool,
    /// Visual state changed; `refresh` runs on the next tick.
    pub(crate) stale: bool,
}

/// Describes a node to [`Gui::create`](super::Gui::create).
///
/// ```
/// use trellis_core::{NodeSpec, Opacity, Rect};
///
/// let spec = NodeSpec::graphical(Rect::new(0., 0., 80., 24.), Opacity::Opaque)
///     .kind("button")
///     .context("menu")
///     .z(1);
/// # let _ = spec;
/// ```
#[derive(Clone, Debug, Default)]
pub struct NodeSpec {
    pub(crate) kind: Option<String>,
    pub(crate) context: Option<String>,
    pub(crate) graphics: Option<GraphicsSpec>,
}

#[derive(Clone, Debug)]
pub(crate) struct GraphicsSpec {
    pub(crate) rect: Rect,
    pub(crate) z: i32,
    pub(crate) opacity: Opacity,
    pub(crate) visible: bool,
    pub(crate) caps: Capabilities,
    pub(crate) interaction: Option<Interaction>,
    pub(crate) gestures: Option<Gestures>,
}

impl NodeSpec {
    /// A plain node with no geometry, for data and timers.
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }

    /// A visible graphical node with default capabilities (hover and click).
    #[must_use]
    pub fn graphical(rect: Rect, opacity: Opacity) -> Self {
        Self {
            graphics: Some(GraphicsSpec {
                rect,
                z: 0,
                opacity,
                visible: true,
                caps: Capabilities::default(),
                interaction: None,
                gestures: None,
            }),
            ..Self::default()
        }
    }

    /// Sets the style category.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets an explicit style context instead of inheriting the parent's.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn graphics_mut(&mut self) -> &mut GraphicsSpec {
        self.graphics
            .as_mut()
            .expect("only graphical nodes have geometry settings")
    }

    /// Sets the z order among siblings.
    ///
    /// # Panics
    ///
    /// Panics on a plain node.
    #[must_use]
    pub fn z(mut self, z: i32) -> Self {
        self.graphics_mut().z = z;
        self
    }

    /// Starts hidden.
    ///
    /// # Panics
    ///
    /// Panics on a plain node.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.graphics_mut().visible = false;
        self
    }

    /// Replaces the pointer capabilities.
    ///
    /// # Panics
    ///
    /// Panics on a plain node.
    #[must_use]
    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.graphics_mut().caps = caps;
        self
    }

    /// Attaches a mouse interaction state machine that sends `action` on
    /// activation.
    ///
    /// # Panics
    ///
    /// Panics on a plain node.
    #[must_use]
    pub fn interactive(mut self, action: Option<Action>) -> Self {
        self.graphics_mut().interaction = Some(Interaction::new(action));
        self
    }

    /// Recognizes repeated clicks, long hovers, and long key presses,
    /// reported through the gesture hooks of [`Component`](super::Component).
    /// Adds an interaction without an action if there is none yet.
    ///
    /// # Panics
    ///
    /// Panics on a plain node.
    #[must_use]
    pub fn gestures(mut self) -> Self {
        let g = self.graphics_mut();
        g.interaction.get_or_insert_with(|| Interaction::new(None));
        g.gestures = Some(Gestures::default());
        self
    }
}

/// Rendering and input state of a graphical node.
#[derive(Debug)]
pub(crate) struct Graphics {
    pub(crate) rect: Rect,
    pub(crate) z: i32,
    pub(crate) opacity: Opacity,
    pub(crate) visible: bool,
    pub(crate) caps: Capabilities,
    pub(crate) hovered: bool,
    pub(crate) background: Option<Box<dyn Surface>>,
    pub(crate) display: Option<Box<dyn Surface>>,
    pub(crate) colorkey: Option<Color>,
    pub(crate) alpha: Option<u8>,
    pub(crate) dirty: DirtyRects,
    /// Rectangle at the end of the last draw pass.
    pub(crate) old_rect: Rect,
    /// Visibility at the end of the last draw pass; `None` before the first.
    pub(crate) old_visible: Option<bool>,
    pub(crate) interaction: Option<Interaction>,
    pub(crate) gestures: Option<Gestures>,
}

impl Graphics {
    pub(crate) fn new(spec: GraphicsSpec) -> Self {
        Self {
            rect: spec.rect,
            z: spec.z,
            opacity: spec.opacity,
            visible: spec.visible,
            caps: spec.caps,
            hovered: false,
            background: None,
            display: None,
            colorkey: None,
            alpha: None,
            dirty: DirtyRects::default(),
            old_rect: spec.rect,
            old_visible: None,
            interaction: spec.interaction,
            gestures: spec.gestures,
        }
    }

    /// Needs redrawing in full: flagged, moved, resized, shown, or hidden
    /// since the last draw pass, or never drawn while visible.
    pub(crate) fn is_dirty(&self) -> bool {
        match self.old_visible {
            None => self.visible,
            Some(old_visible) => {
                self.dirty.is_full() || old_visible != self.visible || self.old_rect != self.rect
            }
        }
    }

    /// Visible rectangle at the last draw pass, if it was visible.
    pub(crate) fn old_visible_rect(&self) -> Option<Rect> {
        (self.old_visible == Some(true)).then_some(self.old_rect)
    }

    /// Rectangle in local coordinates.
    pub(crate) fn local_bounds(&self) -> Rect {
        self.rect.with_origin(kurbo::Point::ORIGIN)
    }

    pub(crate) fn can(&self, cap: Capabilities) -> bool {
        self.caps.contains(cap)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graphics(visible: bool) -> Graphics {
        let spec = NodeSpec::graphical(Rect::new(0., 0., 10., 10.), Opacity::Opaque);
        let mut spec = spec.graphics.unwrap();
        spec.visible = visible;
        Graphics::new(spec)
    }

    #[test]
    fn never_drawn_is_dirty_iff_visible() {
        assert!(graphics(true).is_dirty());
        assert!(!graphics(false).is_dirty());
    }

    #[test]
    fn move_after_draw_is_dirty() {
        let mut g = graphics(true);
        g.old_visible = Some(true);
        assert!(!g.is_dirty());
        g.rect = g.rect.with_origin((5., 5.));
        assert!(g.is_dirty());
        assert_eq!(g.old_visible_rect(), Some(Rect::new(0., 0., 10., 10.)));
        assert_eq!(g.local_bounds(), Rect::new(0., 0., 10., 10.));
    }

    #[test]
    #[should_panic(expected = "only graphical nodes")]
    fn plain_spec_has_no_z() {
        let _ = NodeSpec::plain().z(3);
    }

    #[test]
    fn default_capabilities() {
        let caps = Capabilities::default();
        assert!(caps.contains(Capabilities::HOVER | Capabilities::CLICK));
        assert!(!caps.contains(Capabilities::FOCUS));
    }
}
