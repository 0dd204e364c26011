// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle bookkeeping and the compositing draw pass.
//!
//! Each graphical node tracks, in local coordinates, either "fully dirty" or
//! a reference-counted set of dirty sub-rectangles whose total area never
//! exceeds the node's own. New rectangles are reflected into the graphical
//! parent (translated by the node's origin); cleaning mirrors that.
//!
//! The draw pass walks the tree top-down but finishes bottom-up: each node
//! first turns its dirty children's transition rectangles into dirty
//! rectangles of its own, recurses into them, and then recomposites its
//! display where it is dirty.

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};
use tracing::trace;

use super::Gui;
use super::id::{INVALID, NodeId};
use crate::damage::Damage;
use crate::dirty::{DirtyRects, Insert};
use crate::geometry::transition_rects;
use crate::input::InputState;
use crate::surface::Surface;

#[cfg(feature = "trace-rich")]
use crate::trace::{NodeChange, NodeField};

impl Gui {
    /// Runs one frame's tree passes: hover tracking, tick, and draw.
    pub fn step(&mut self, input: &InputState) -> Damage {
        self.track(input);
        self.tick_all();
        self.draw()
    }

    /// Ticks the tree from the root, unless the root is paused.
    pub fn tick_all(&mut self) {
        if let Some(root) = self.root
            && !self.state[root.idx as usize].paused
        {
            self.tick(root);
        }
    }

    /// Redraws whatever changed since the previous pass and reports the
    /// damage in screen coordinates.
    ///
    /// A second pass with no changes in between reports [`Damage::None`].
    pub fn draw(&mut self) -> Damage {
        #[cfg(feature = "trace-rich")]
        self.changes.clear();
        self.frame_index += 1;
        let Some(root) = self.root else {
            return Damage::None;
        };
        let Some(origin) = self.graphics[root.idx as usize]
            .as_ref()
            .map(|g| g.rect.origin().to_vec2())
        else {
            return Damage::None;
        };
        let damage = match self.draw_node(root) {
            Damage::None => Damage::None,
            Damage::Full(r) => Damage::Full(r + origin),
            Damage::Rects(rs) => Damage::Rects(rs.into_iter().map(|r| r + origin).collect()),
        };
        trace!(frame = self.frame_index, ?damage, "drawn");
        damage
    }

    /// Draws one node. Returns its damage in local coordinates.
    fn draw_node(&mut self, id: NodeId) -> Damage {
        let idx = id.idx as usize;
        let children = self.drawn[idx].clone();
        for c in children {
            let Some(cg) = self.graphics[c as usize].as_ref() else {
                continue;
            };
            let recurse = cg.visible || cg.old_visible == Some(true);
            let reflect = cg.is_dirty() && !self.graphics[idx].as_ref().is_some_and(|g| g.is_dirty());
            if reflect {
                let rects = transition_rects(cg.old_visible_rect(), cg.visible.then_some(cg.rect));
                for r in rects.iter() {
                    self.add_dirty_rect(id, r);
                }
            }
            if recurse {
                let child = self.id_at(c);
                // Child damage has already reached this node's dirty set.
                let _ = self.draw_node(child);
            }
        }

        #[cfg(feature = "trace-rich")]
        self.record_changes(id.idx);

        let Some(g) = self.graphics[idx].as_ref() else {
            return Damage::None;
        };
        let bounds = g.local_bounds();
        let full = g.is_dirty();
        let rects: Vec<Rect> = if full {
            Vec::from([bounds])
        } else {
            g.dirty.rects().collect()
        };
        if g.visible && g.opacity.owns_surface() {
            for &r in &rects {
                self.redraw_area(id, r);
            }
        }

        let Some(g) = self.graphics[idx].as_mut() else {
            return Damage::None;
        };
        g.old_rect = g.rect;
        g.old_visible = Some(g.visible);
        g.dirty.clear();

        if full {
            Damage::Full(bounds)
        } else if rects.is_empty() {
            Damage::None
        } else {
            Damage::Rects(rects)
        }
    }

    /// Repaints `area` of the node's display: clear, background, then the
    /// visible children on top.
    fn redraw_area(&mut self, id: NodeId, area: Rect) {
        let idx = id.idx as usize;
        let Some(g) = self.graphics[idx].as_mut() else {
            return;
        };
        let Some(mut display) = g.display.take() else {
            return;
        };
        display.fill(g.colorkey.unwrap_or(g.opacity.clear_color()), area);
        if let Some(background) = g.background.as_deref() {
            display.blit(background, area.origin(), area);
        }
        self.composite_children(id.idx, display.as_mut(), area, Vec2::ZERO);
        if let Some(g) = self.graphics[idx].as_mut() {
            g.display = Some(display);
        }
    }

    /// Blits the visible children of `idx` overlapping `area` onto `target`.
    /// `offset` maps the node's local coordinates to the target's.
    /// Transparent children own no display; their own children are spliced
    /// in as if they were children of `idx`.
    fn composite_children(&self, idx: u32, target: &mut dyn Surface, area: Rect, offset: Vec2) {
        for &c in &self.drawn[idx as usize] {
            let Some(cg) = self.graphics[c as usize].as_ref() else {
                continue;
            };
            if !cg.visible {
                continue;
            }
            let rect = cg.rect + offset;
            let clip = area.intersect(rect);
            if clip.width() <= 0. || clip.height() <= 0. {
                continue;
            }
            if cg.opacity.owns_surface() {
                if let Some(display) = cg.display.as_deref() {
                    target.blit(display, clip.origin(), clip - rect.origin().to_vec2());
                }
            } else {
                self.composite_children(c, target, clip, rect.origin().to_vec2());
            }
        }
    }

    // -- Dirty rectangles --

    /// Returns `true` if the node will be redrawn in full by the next pass.
    #[must_use]
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.gfx(id).is_dirty()
    }

    /// The node's pending dirty rectangles.
    #[must_use]
    pub fn dirty_rects(&self, id: NodeId) -> &DirtyRects {
        &self.gfx(id).dirty
    }

    /// Flags the whole node for redrawing.
    ///
    /// Pending sub-rectangles are dropped (and cleaned from the parent), and
    /// the area the node last occupied is dirtied in the parent.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let idx = id.idx as usize;
        let g = self.gfx_mut(id);
        if g.dirty.is_full() {
            return;
        }
        let discarded = g.dirty.collapse();
        let origin = g.rect.origin().to_vec2();
        let old = g.old_visible_rect();
        if let Some(parent) = self.graphical_parent(idx) {
            for r in discarded {
                self.clean_dirty_rect(parent, r + origin);
            }
            if let Some(old) = old {
                self.add_dirty_rect(parent, old);
            }
        }
    }

    /// Marks `rect`, in the node's local coordinates, for redrawing.
    ///
    /// Ignored when empty or when the node is redrawn in full anyway. If
    /// tracking it would push the pending area past the node's own, the
    /// node becomes fully dirty instead.
    pub fn add_dirty_rect(&mut self, id: NodeId, rect: Rect) {
        let idx = id.idx as usize;
        let Some(g) = self.graphics[idx].as_mut() else {
            return;
        };
        let bounds = g.local_bounds();
        let rect = rect.intersect(bounds);
        if rect.width() <= 0. || rect.height() <= 0. || g.is_dirty() {
            return;
        }
        match g.dirty.insert(rect, bounds.area()) {
            Insert::Covered | Insert::Shared => {}
            Insert::Added => {
                let origin = g.rect.origin().to_vec2();
                if let Some(parent) = self.graphical_parent(idx) {
                    self.add_dirty_rect(parent, rect + origin);
                }
            }
            Insert::Overflow => self.mark_dirty(id),
        }
    }

    /// Drops one reference to a rectangle added with
    /// [`add_dirty_rect`](Self::add_dirty_rect), cleaning the parent when it
    /// was the last.
    pub fn clean_dirty_rect(&mut self, id: NodeId, rect: Rect) {
        let idx = id.idx as usize;
        let Some(g) = self.graphics[idx].as_mut() else {
            return;
        };
        let rect = rect.intersect(g.local_bounds());
        if g.dirty.remove(rect) {
            let origin = g.rect.origin().to_vec2();
            if let Some(parent) = self.graphical_parent(idx) {
                self.clean_dirty_rect(parent, rect + origin);
            }
        }
    }

    /// Called when a node leaves its parent: its pending rectangles are
    /// cleaned from the parent and the area it last occupied is dirtied
    /// there. The node is left as never drawn.
    pub(crate) fn release_damage(&mut self, id: NodeId) {
        let idx = id.idx as usize;
        let Some(g) = self.graphics[idx].as_mut() else {
            return;
        };
        let origin = g.rect.origin().to_vec2();
        let pending: Vec<Rect> = g.dirty.rects().collect();
        let old = g.old_visible_rect();
        g.dirty.clear();
        g.old_visible = None;
        if let Some(parent) = self.graphical_parent(idx) {
            for r in pending {
                self.clean_dirty_rect(parent, r + origin);
            }
            if let Some(old) = old {
                self.add_dirty_rect(parent, old);
            }
        }
    }

    fn graphical_parent(&self, idx: usize) -> Option<NodeId> {
        let p = self.parent[idx];
        (p != INVALID && self.graphics[p as usize].is_some()).then(|| self.id_at(p))
    }

    #[cfg(feature = "trace-rich")]
    fn record_changes(&mut self, idx: u32) {
        let Some(g) = self.graphics[idx as usize].as_ref() else {
            return;
        };
        if !g.is_dirty() {
            return;
        }
        let fields = [
            (g.old_visible.is_some() && g.old_rect != g.rect, NodeField::Geometry),
            (g.old_visible != Some(g.visible), NodeField::Visibility),
            (g.dirty.is_full(), NodeField::Content),
        ];
        for (changed, field) in fields {
            if changed {
                self.changes.push(NodeChange {
                    node_index: idx,
                    field,
                });
            }
        }
    }

    /// Nodes the latest draw pass redrew in full, and why.
    #[cfg(feature = "trace-rich")]
    #[must_use]
    pub fn node_changes(&self) -> &[NodeChange] {
        &self.changes
    }
}
