// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen damage reported by a draw pass.

use alloc::vec::Vec;

use kurbo::Rect;

/// The screen region a draw pass changed, in screen coordinates.
///
/// Presenters copy only these regions of the root display to the screen,
/// and skip presenting entirely when the damage is [`Damage::None`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Damage {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// The whole root rectangle changed.
    Full(Rect),
    /// Only these rectangles changed.
    Rects(Vec<Rect>),
}

impl Damage {
    /// Returns `true` if something needs presenting.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Iterates over the damaged rectangles.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        let (full, rects) = match self {
            Self::None => (None, &[][..]),
            Self::Full(r) => (Some(*r), &[][..]),
            Self::Rects(rs) => (None, rs.as_slice()),
        };
        full.into_iter().chain(rects.iter().copied())
    }

    /// Sum of the damaged areas (overlaps counted once per rectangle).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rects().map(|r| r.area()).sum()
    }

    /// Smallest rectangle enclosing all damage.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.rects().reduce(|a, b| a.union(b))
    }

    /// Merges another frame's damage into this one, as when several draw
    /// passes happen between two presents.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (_, Self::None) => {}
            (Self::None, _) => *self = other.clone(),
            (Self::Full(a), Self::Full(b)) => *a = a.union(*b),
            (Self::Full(_), Self::Rects(_)) => {}
            (Self::Rects(_), Self::Full(b)) => *self = Self::Full(*b),
            (Self::Rects(a), Self::Rects(b)) => a.extend_from_slice(b),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
