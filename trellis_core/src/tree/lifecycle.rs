// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load, prepare, pause, freeze, and the per-frame tick.

use tracing::{debug, trace};

use super::Gui;
use super::id::NodeId;
use crate::error::ConfigError;

impl Gui {
    /// Returns `true` once the node has been loaded.
    #[must_use]
    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].loaded
    }

    /// Returns `true` while the node is paused.
    #[must_use]
    pub fn is_paused(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].paused
    }

    /// Returns `true` while the node is frozen.
    #[must_use]
    pub fn is_frozen(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].frozen
    }

    /// Loads the node: styles, then options, then the load hook.
    ///
    /// Graphical nodes are refreshed afterwards so their backgrounds reflect
    /// the freshly loaded styles.
    ///
    /// # Panics
    ///
    /// Panics if the node was loaded before.
    pub fn load(&mut self, id: NodeId) -> Result<(), ConfigError> {
        self.validate(id);
        let idx = id.idx as usize;
        assert!(!self.state[idx].loaded, "{id:?} loaded twice");
        self.state[idx].loaded = true;
        debug!(?id, "loading");
        self.load_config(id)?;
        let _ = self.with_component(id, |c, cx| c.on_load(cx));
        if self.graphics[idx].is_some() {
            self.refresh(id);
        }
        Ok(())
    }

    /// Loads the node if needed, then reloads styles and options top-down
    /// through its loaded descendants and runs prepare hooks bottom-up.
    ///
    /// Children not loaded yet are skipped along with their subtrees.
    pub fn prepare(&mut self, id: NodeId) -> Result<(), ConfigError> {
        self.validate(id);
        if !self.state[id.idx as usize].loaded {
            self.load(id)?;
        }
        self.reload(id)?;
        self.prepare_hooks(id);
        Ok(())
    }

    fn load_config(&mut self, id: NodeId) -> Result<(), ConfigError> {
        self.with_component(id, |c, cx| {
            c.load_style(cx)?;
            c.load_options(cx)
        })
        .unwrap_or(Ok(()))?;
        self.load_gesture_delays(id)
    }

    fn reload(&mut self, id: NodeId) -> Result<(), ConfigError> {
        self.load_config(id)?;
        if self.graphics[id.idx as usize].is_some() {
            self.refresh(id);
        }
        for child in self.child_ids(id) {
            if self.is_alive(child) && self.state[child.idx as usize].loaded {
                self.reload(child)?;
            }
        }
        Ok(())
    }

    fn prepare_hooks(&mut self, id: NodeId) {
        for child in self.child_ids(id) {
            if self.is_alive(child) && self.state[child.idx as usize].loaded {
                self.prepare_hooks(child);
            }
        }
        let _ = self.with_component(id, |c, cx| c.on_prepare(cx));
    }

    /// Pauses the node: it stops ticking and receiving input, its
    /// interaction falls back to idle, and its subtree freezes.
    pub fn pause(&mut self, id: NodeId) {
        self.validate(id);
        self.state[id.idx as usize].paused = true;
        debug!(?id, "paused");
        let _ = self.with_component(id, |c, cx| c.on_pause(cx));
        self.reset_interaction(id);
        self.freeze(id);
    }

    /// Unpauses the node and unfreezes its subtree.
    pub fn unpause(&mut self, id: NodeId) {
        self.validate(id);
        self.state[id.idx as usize].paused = false;
        debug!(?id, "unpaused");
        let _ = self.with_component(id, |c, cx| c.on_unpause(cx));
        self.unfreeze(id);
    }

    /// Flips the paused state.
    pub fn toggle_pause(&mut self, id: NodeId) {
        if self.is_paused(id) {
            self.unpause(id);
        } else {
            self.pause(id);
        }
    }

    /// Freezes the node and every descendant, whatever their own state.
    ///
    /// The freeze hook fires only on nodes that were not frozen already.
    pub fn freeze(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx as usize;
        if !self.state[idx].frozen {
            self.state[idx].frozen = true;
            let now = self.now();
            if let Some(g) = self.graphics[idx].as_mut().and_then(|g| g.gestures.as_mut()) {
                g.freeze(now);
            }
            let _ = self.with_component(id, |c, cx| c.on_freeze(cx));
        }
        for child in self.child_ids(id) {
            if self.is_alive(child) {
                self.freeze(child);
            }
        }
    }

    /// Unfreezes the node and every descendant, whatever their own state.
    pub fn unfreeze(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx as usize;
        if self.state[idx].frozen {
            self.state[idx].frozen = false;
            let now = self.now();
            if let Some(g) = self.graphics[idx].as_mut().and_then(|g| g.gestures.as_mut()) {
                g.unfreeze(now);
            }
            let _ = self.with_component(id, |c, cx| c.on_unfreeze(cx));
        }
        for child in self.child_ids(id) {
            if self.is_alive(child) {
                self.unfreeze(child);
            }
        }
    }

    /// Runs one tick on the node's subtree.
    ///
    /// Pending attribute transitions are flushed first, so a stale node is
    /// refreshed before its children tick; unpaused children tick next, and
    /// the node's own gestures and tick hook run last.
    pub fn tick(&mut self, id: NodeId) {
        self.validate(id);
        self.flush_node(id);
        for child in self.child_ids(id) {
            if self.is_alive(child)
                && self.parent[child.idx as usize] == id.idx
                && !self.state[child.idx as usize].paused
            {
                self.tick(child);
            }
        }
        if !self.is_alive(id) {
            return;
        }
        let now = self.now();
        self.feed_gestures(id, |g| g.tick(now));
        if self.is_alive(id) {
            let _ = self.with_component(id, |c, cx| c.on_tick(cx));
        }
    }

    /// Flushes tracked attributes and refreshes the node if it went stale.
    pub(crate) fn flush_node(&mut self, id: NodeId) {
        let idx = id.idx as usize;
        let mouse = self.graphics[idx]
            .as_mut()
            .and_then(|g| g.interaction.as_mut())
            .and_then(|i| i.flush());
        if let Some(change) = mouse {
            trace!(?id, ?change, "mouse state transition");
            let _ = self.with_component(id, |c, cx| c.on_mouse_state_transition(cx, change));
        }
        let own = self
            .with_component(id, |c, cx| c.flush_transitions(cx))
            .unwrap_or(false);
        if !self.is_alive(id) {
            return;
        }
        if mouse.is_some() || own {
            self.state[idx].stale = true;
            if self.graphics[idx].is_some() {
                self.mark_dirty(id);
            }
        }
        if self.state[idx].stale {
            self.refresh(id);
        }
    }

    /// Runs the refresh hook and clears the stale flag.
    pub fn refresh(&mut self, id: NodeId) {
        self.validate(id);
        self.state[id.idx as usize].stale = false;
        let _ = self.with_component(id, |c, cx| c.refresh(cx));
    }

    /// Flags the node for a refresh during the next tick.
    pub fn mark_stale(&mut self, id: NodeId) {
        self.validate(id);
        self.state[id.idx as usize].stale = true;
    }
}
