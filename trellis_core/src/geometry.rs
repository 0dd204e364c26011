// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers on top of [`kurbo`].
//!
//! Node rectangles are [`Rect`]s with integral coordinates, expressed in the
//! local space of the node's parent. The root's rectangle is in screen space.

pub use kurbo::{Point, Rect, Size, Vec2};

/// Screen regions that reconcile a node's previous rectangle with its
/// current one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionRects {
    /// Nothing was visible before or after.
    Empty,
    /// A single region: the bounding box of old and new, or whichever one
    /// was visible.
    Single(Rect),
    /// Old and new regions kept apart because their bounding box would be
    /// larger than both combined.
    Pair(Rect, Rect),
}

impl TransitionRects {
    /// Iterates over the regions.
    pub fn iter(self) -> impl Iterator<Item = Rect> {
        let (a, b) = match self {
            Self::Empty => (None, None),
            Self::Single(r) => (Some(r), None),
            Self::Pair(a, b) => (Some(a), Some(b)),
        };
        a.into_iter().chain(b)
    }

    /// Total area covered, counting overlap twice for a pair.
    #[must_use]
    pub fn area(self) -> f64 {
        self.iter().map(|r| r.area()).sum()
    }
}

/// Computes the repaint region for a node whose visible rectangle went from
/// `old` to `new`. `None` means "not visible" on that side.
///
/// When both sides are visible, the bounding box is used only if its area
/// does not exceed the sum of both areas.
#[must_use]
pub fn transition_rects(old: Option<Rect>, new: Option<Rect>) -> TransitionRects {
    match (old, new) {
        (Some(old), Some(new)) => {
            let bounds = old.union(new);
            if bounds.area() <= old.area() + new.area() {
                TransitionRects::Single(bounds)
            } else {
                TransitionRects::Pair(old, new)
            }
        }
        (Some(r), None) | (None, Some(r)) => TransitionRects::Single(r),
        (None, None) => TransitionRects::Empty,
    }
}

/// Returns `true` if the two rectangles share a region of non-zero area.
#[inline]
#[must_use]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_zero_area()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
