// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty tracking: inherited-state invalidation and per-node damage.
//!
//! Two independent mechanisms live here.
//!
//! # Inherited state
//!
//! A node's effective style context and its attachment to the root are
//! inherited from its ancestors. [`INHERIT`] is an
//! [`understory_dirty`] channel with a dependency edge from every child to
//! its parent; marking a node with
//! [`EagerPolicy`](understory_dirty::EagerPolicy) marks its whole subtree,
//! and the drain after a reparent or context change re-resolves exactly the
//! affected nodes.
//!
//! # Damage
//!
//! [`DirtyRects`] is the per-node damage record: either "fully dirty" or a
//! set of sub-rectangles whose total area never exceeds the node's own area.
//! Propagating entries to ancestors is the tree's job; this type only keeps
//! the local books.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::Channel;

/// Effective context or root attachment must be re-resolved. Propagates to
/// descendants.
pub const INHERIT: Channel = Channel::new(0);

/// Outcome of [`DirtyRects::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Insert {
    /// The node is fully dirty already; nothing recorded.
    Covered,
    /// The rectangle was already tracked; its reference count went up.
    Shared,
    /// A new rectangle was recorded and must be reflected upward.
    Added,
    /// Recording it would exceed the node's area; the caller must collapse
    /// the node to fully dirty.
    Overflow,
}

/// Damage bookkeeping for one node, in the node's local coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirtyRects {
    full: bool,
    rects: Vec<(Rect, u32)>,
    area: f64,
}

impl DirtyRects {
    /// Returns `true` if the whole node must be redrawn.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Returns `true` if there is nothing to redraw.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.full && self.rects.is_empty()
    }

    /// Iterates over the pending sub-rectangles.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rects.iter().map(|&(r, _)| r)
    }

    /// Total area of the pending sub-rectangles.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    pub(crate) fn insert(&mut self, rect: Rect, bound: f64) -> Insert {
        if self.full {
            return Insert::Covered;
        }
        if let Some((_, count)) = self.rects.iter_mut().find(|(r, _)| *r == rect) {
            *count += 1;
            return Insert::Shared;
        }
        if self.area + rect.area() > bound {
            return Insert::Overflow;
        }
        self.rects.push((rect, 1));
        self.area += rect.area();
        Insert::Added
    }

    /// Drops one reference to `rect`. Returns `true` if that was the last one
    /// and the removal must be reflected upward.
    pub(crate) fn remove(&mut self, rect: Rect) -> bool {
        let Some(pos) = self.rects.iter().position(|(r, _)| *r == rect) else {
            return false;
        };
        let count = &mut self.rects[pos].1;
        *count -= 1;
        if *count > 0 {
            return false;
        }
        self.rects.swap_remove(pos);
        self.area -= rect.area();
        if self.rects.is_empty() {
            self.area = 0.0;
        }
        true
    }

    /// Switches to fully dirty and hands back the discarded rectangles so
    /// the caller can clean their upward reflections (one per rectangle, as
    /// only the first reference was reflected).
    pub(crate) fn collapse(&mut self) -> Vec<Rect> {
        self.full = true;
        self.area = 0.0;
        self.rects.drain(..).map(|(r, _)| r).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.full = false;
        self.rects.clear();
        self.area = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size((x, y), (w, h))
    }

    #[test]
    fn area_never_exceeds_bound() {
        let mut d = DirtyRects::default();
        assert_eq!(d.insert(r(0., 0., 10., 10.), 250.), Insert::Added);
        assert_eq!(d.insert(r(20., 0., 10., 10.), 250.), Insert::Added);
        assert_eq!(d.insert(r(40., 0., 10., 10.), 250.), Insert::Overflow);
        assert_eq!(d.area(), 200.);
        assert!(d.area() <= 250.);
        let dropped = d.collapse();
        assert_eq!(dropped.len(), 2);
        assert!(d.is_full());
        assert_eq!(d.rects().count(), 0);
        assert_eq!(d.insert(r(0., 0., 1., 1.), 250.), Insert::Covered);
    }

    #[test]
    fn shared_rects_are_reference_counted() {
        let mut d = DirtyRects::default();
        let a = r(1., 1., 4., 4.);
        assert_eq!(d.insert(a, 100.), Insert::Added);
        assert_eq!(d.insert(a, 100.), Insert::Shared);
        assert_eq!(d.area(), 16.);
        assert!(!d.remove(a));
        assert!(d.remove(a));
        assert!(d.is_clean());
        assert_eq!(d.area(), 0.);
    }

    #[test]
    fn removing_unknown_rect_is_inert() {
        let mut d = DirtyRects::default();
        d.insert(r(0., 0., 2., 2.), 100.);
        assert!(!d.remove(r(5., 5., 2., 2.)));
        assert_eq!(d.rects().count(), 1);
    }

    #[test]
    fn collapse_reports_each_rect_once() {
        let mut d = DirtyRects::default();
        let a = r(0., 0., 2., 2.);
        d.insert(a, 100.);
        d.insert(a, 100.);
        assert_eq!(d.collapse(), [a]);
        d.clear();
        assert!(d.is_clean());
    }
}
