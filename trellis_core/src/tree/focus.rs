// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input focus.
//!
//! Focus is a stack: giving focus pushes, removing it pops back to the
//! previous holder. Only the top of the stack is focused.

use alloc::vec::Vec;

use tracing::debug;

use super::Gui;
use super::id::NodeId;

impl Gui {
    /// The node holding input focus.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focus_stack.last().copied()
    }

    /// Returns `true` if the node holds input focus.
    #[must_use]
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.focused() == Some(id)
    }

    /// Gives the node input focus, suspending the previous holder's.
    pub fn give_focus(&mut self, id: NodeId) {
        self.validate(id);
        let old = self.focused();
        if old == Some(id) {
            return;
        }
        if let Some(old) = old {
            self.lose_focus(old);
        }
        self.focus_stack.retain(|&n| n != id);
        self.focus_stack.push(id);
        debug!(?id, "focus given");
        let _ = self.with_component(id, |c, cx| c.on_take_focus(cx));
    }

    /// Removes focus from its holder and returns it to the previous one.
    pub fn remove_focus(&mut self) {
        if let Some(top) = self.focused() {
            self.revoke_focus(|_, n| n == top);
        }
    }

    /// Drops every stack entry matching `pred`. If the holder was dropped,
    /// it loses focus and the new top of the stack regains it.
    pub(crate) fn revoke_focus(&mut self, mut pred: impl FnMut(&Self, NodeId) -> bool) {
        let old = self.focused();
        let kept: Vec<NodeId> = self
            .focus_stack
            .iter()
            .copied()
            .filter(|&n| !pred(self, n))
            .collect();
        if kept.len() == self.focus_stack.len() {
            return;
        }
        self.focus_stack = kept;
        let new = self.focused();
        if old == new {
            return;
        }
        if let Some(old) = old {
            debug!(?old, "focus revoked");
            self.lose_focus(old);
        }
        if let Some(new) = new {
            debug!(?new, "focus restored");
            let _ = self.with_component(new, |c, cx| c.on_take_focus(cx));
        }
    }

    fn lose_focus(&mut self, id: NodeId) {
        if let Some(g) = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.gestures.as_mut())
        {
            g.lose_focus();
        }
        let _ = self.with_component(id, |c, cx| c.on_lose_focus(cx));
    }

    /// Revokes focus from `root` and all its descendants.
    pub(crate) fn revoke_focus_within(&mut self, root: NodeId) {
        self.revoke_focus(|gui, n| n == root || gui.is_ancestor(root, n));
    }
}
