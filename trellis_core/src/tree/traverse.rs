// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::slice;

use super::Gui;
use super::id::{INVALID, NodeId};

/// An iterator over an ordered list of sibling nodes.
///
/// Created by [`Gui::children`] (registration order) and
/// [`Gui::graphical_children`] (z order, back to front).
#[derive(Debug)]
pub struct Children<'a> {
    gui: &'a Gui,
    iter: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(gui: &'a Gui, list: &'a [u32]) -> Self {
        Self {
            gui,
            iter: list.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.iter.next().map(|&idx| self.gui.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.iter.next_back().map(|&idx| self.gui.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// An iterator from a node's parent up to the top of its tree.
///
/// Created by [`Gui::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    gui: &'a Gui,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(gui: &'a Gui, start: u32) -> Self {
        Self {
            gui,
            current: gui.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.gui.parent[idx as usize];
        Some(self.gui.id_at(idx))
    }
}
