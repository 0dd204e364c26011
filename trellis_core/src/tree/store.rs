// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage: allocation, topology, inherited state,
//! hook dispatch, and message routing.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::Size;
use tracing::{debug, trace};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::component::{Component, Ctx};
use super::id::{INVALID, NodeId};
use super::node::{Graphics, NodeSpec, NodeState};
use super::traverse::{Ancestors, Children};
use crate::dirty;
use crate::error::ConfigError;
use crate::message::{Message, Propagation};
use crate::style::{StyleSource, StyleValue};
use crate::surface::{Surface, SurfaceFactory};
use crate::time::{Clock, HostTime};

/// A message waiting for its busy recipient to return from a hook.
#[derive(Debug)]
pub(crate) struct Deferred {
    pub(crate) target: NodeId,
    pub(crate) sender: NodeId,
    pub(crate) message: Message,
}

/// The component tree.
///
/// Nodes are addressed by [`NodeId`] handles into parallel arrays. Destroyed
/// nodes are recycled through a free list, and generation counters make
/// stale handles panic instead of aliasing a new node.
pub struct Gui {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    /// Registration order.
    pub(crate) children: Vec<Vec<u32>>,
    /// Graphical children by ascending z, registration order breaking ties.
    pub(crate) drawn: Vec<Vec<u32>>,

    // -- Configuration --
    pub(crate) kind: Vec<Option<String>>,
    pub(crate) context: Vec<Option<String>>,

    // -- Inherited (resolved from ancestors) --
    pub(crate) effective_context: Vec<Option<String>>,
    pub(crate) attached: Vec<bool>,

    // -- Behaviour and rendering --
    pub(crate) state: Vec<NodeState>,
    pub(crate) components: Vec<Option<Box<dyn Component>>>,
    pub(crate) graphics: Vec<Option<Graphics>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Application --
    pub(crate) root: Option<NodeId>,
    pub(crate) focus_stack: Vec<NodeId>,
    pub(crate) deferred: Vec<Deferred>,
    pub(crate) styles: Box<dyn StyleSource>,
    pub(crate) surfaces: Box<dyn SurfaceFactory>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) frame_index: u64,
    pub(crate) exit_requested: bool,

    #[cfg(feature = "trace-rich")]
    pub(crate) changes: Vec<crate::trace::NodeChange>,
}

impl fmt::Debug for Gui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gui")
            .field("nodes", &(self.len as usize - self.free_list.len()))
            .field("root", &self.root)
            .field("focused", &self.focused())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Gui {
    /// Creates an empty tree drawing through `surfaces`, configured by
    /// `styles`, and timed by `clock`.
    pub fn new(
        styles: impl StyleSource + 'static,
        surfaces: impl SurfaceFactory + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            drawn: Vec::new(),
            kind: Vec::new(),
            context: Vec::new(),
            effective_context: Vec::new(),
            attached: Vec::new(),
            state: Vec::new(),
            components: Vec::new(),
            graphics: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            root: None,
            focus_stack: Vec::new(),
            deferred: Vec::new(),
            styles: Box::new(styles),
            surfaces: Box::new(surfaces),
            clock: Box::new(clock),
            frame_index: 0,
            exit_requested: false,
            #[cfg(feature = "trace-rich")]
            changes: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached node.
    ///
    /// Translucent and opaque nodes get blank background and display
    /// surfaces of their rectangle's size.
    pub fn create(&mut self, spec: NodeSpec, component: impl Component) -> NodeId {
        let graphics = spec.graphics.map(|g| {
            let mut g = Graphics::new(g);
            if g.opacity.owns_surface() {
                let size = g.rect.size();
                let alpha = g.opacity.has_alpha();
                g.background = Some(self.surfaces.create(size, alpha));
                g.display = Some(self.surfaces.create(size, alpha));
            }
            g
        });
        let component: Box<dyn Component> = Box::new(component);

        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.drawn[i].clear();
            self.kind[i] = spec.kind;
            self.effective_context[i] = spec.context.clone();
            self.context[i] = spec.context;
            self.attached[i] = false;
            self.state[i] = NodeState::default();
            self.components[i] = Some(component);
            self.graphics[i] = graphics;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.drawn.push(Vec::new());
            self.kind.push(spec.kind);
            self.effective_context.push(spec.context.clone());
            self.context.push(spec.context);
            self.attached.push(false);
            self.state.push(NodeState::default());
            self.components.push(Some(component));
            self.graphics.push(graphics);
            self.generation.push(0);
            idx
        };
        let id = self.id_at(idx);
        trace!(?id, "created");
        id
    }

    /// Destroys a detached or registered node, freeing its slot.
    ///
    /// Children are never destroyed implicitly.
    ///
    /// # Panics
    ///
    /// Panics if the node still has children or the handle is stale.
    pub fn destroy(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx as usize;
        assert!(
            self.children[idx].is_empty(),
            "cannot destroy {id:?}: it still has children"
        );
        if let Some(parent) = self.parent(id) {
            self.unregister(parent, id);
        } else {
            self.revoke_focus_within(id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.dirty.remove_key(id.idx);
        self.deferred
            .retain(|d| d.target != id && d.sender != id);
        self.components[idx] = None;
        self.graphics[idx] = None;
        self.generation[idx] += 1;
        self.free_list.push(id.idx);
        trace!(?id, "destroyed");
    }

    /// Returns whether the handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Makes `id` the application root: the node input is dispatched to and
    /// drawing starts from. Nodes are attached iff they descend from it.
    ///
    /// # Panics
    ///
    /// Panics if the node has a parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize] == INVALID,
            "the root cannot have a parent"
        );
        if let Some(old) = self.root.replace(id) {
            self.dirty.mark_with(old.idx, dirty::INHERIT, &EagerPolicy);
        }
        self.dirty.mark_with(id.idx, dirty::INHERIT, &EagerPolicy);
        self.resolve_inherited();
        debug!(?id, "root set");
    }

    /// The application root, if set.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    // -- Topology API --

    /// Registers `child` under `parent`, moving it out of its current parent
    /// first if it has one.
    ///
    /// The child's subtree inherits the root attachment, and the effective
    /// context wherever no explicit context is set.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` is `parent` or one of
    /// its ancestors.
    pub fn register(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            parent != child && !self.is_ancestor(child, parent),
            "registering {child:?} under {parent:?} would create a cycle"
        );
        if let Some(old) = self.parent(child) {
            self.unregister(old, child);
        }
        let (p, c) = (parent.idx, child.idx);
        self.parent[c as usize] = p;
        self.children[p as usize].push(c);
        self.sort_drawn(p);

        let _ = self.dirty.add_dependency(c, p, dirty::INHERIT);
        self.dirty.mark_with(c, dirty::INHERIT, &EagerPolicy);
        self.resolve_inherited();

        debug!(?parent, ?child, "registered");
        let _ = self.with_component(child, |c, cx| c.on_new_parent(cx, parent));
    }

    /// Registers each of `children` under `parent`, in order.
    pub fn register_all(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.register(parent, child);
        }
    }

    /// Registers `child` under `parent`, then loads it.
    pub fn register_load(&mut self, parent: NodeId, child: NodeId) -> Result<(), ConfigError> {
        self.register(parent, child);
        self.load(child)
    }

    /// Detaches `child` from `parent`.
    ///
    /// Focus held in the child's subtree is revoked first. The former parent
    /// is dirtied where the child was last drawn, and the disowned hook runs
    /// while the child is still attached. The child keeps its explicit
    /// context; inherited state is cleared.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of `parent`.
    pub fn unregister(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        assert!(
            self.parent[c as usize] == p,
            "{child:?} is not a child of {parent:?}"
        );

        self.revoke_focus_within(child);
        self.release_damage(child);
        let _ = self.with_component(child, |c, cx| c.on_disowned(cx, parent));

        // The hook may have moved the child already.
        if self.parent[c as usize] != p {
            return;
        }
        self.children[p as usize].retain(|&x| x != c);
        self.drawn[p as usize].retain(|&x| x != c);
        self.parent[c as usize] = INVALID;
        self.dirty.remove_dependency(c, p, dirty::INHERIT);
        self.dirty.mark_with(c, dirty::INHERIT, &EagerPolicy);
        self.resolve_inherited();
        debug!(?parent, ?child, "unregistered");
    }

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns the children of a node in registration order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the graphical children of a node, back to front.
    #[must_use]
    pub fn graphical_children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.drawn[id.idx as usize])
    }

    /// Returns the ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Returns `true` if the node descends from (or is) the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.validate(id);
        self.attached[id.idx as usize]
    }

    // -- Configuration API --

    /// The node's style category.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.kind[id.idx as usize].as_deref()
    }

    /// The node's explicit context, if set.
    #[must_use]
    pub fn context(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.context[id.idx as usize].as_deref()
    }

    /// The context style lookups use: the explicit one, or the nearest
    /// ancestor's.
    #[must_use]
    pub fn effective_context(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.effective_context[id.idx as usize].as_deref()
    }

    /// Sets or clears the explicit context and re-resolves the subtree.
    pub fn set_context(&mut self, id: NodeId, context: Option<&str>) {
        self.validate(id);
        self.context[id.idx as usize] = context.map(ToString::to_string);
        self.dirty.mark_with(id.idx, dirty::INHERIT, &EagerPolicy);
        self.resolve_inherited();
    }

    /// Looks up a style for the node with its kind and effective context.
    pub fn style_get(&self, id: NodeId, query: &str) -> Result<StyleValue, ConfigError> {
        let (kind, context) = (self.kind(id), self.effective_context(id));
        self.styles
            .style(query, kind, context)
            .ok_or_else(|| ConfigError::MissingStyle {
                query: query.to_string(),
                kind: kind.map(ToString::to_string),
                context: context.map(ToString::to_string),
            })
    }

    /// Looks up an option for the node with its kind and effective context.
    pub fn options_get(&self, id: NodeId, query: &str) -> Result<StyleValue, ConfigError> {
        let (kind, context) = (self.kind(id), self.effective_context(id));
        self.styles
            .option(query, kind, context)
            .ok_or_else(|| ConfigError::MissingOption {
                query: query.to_string(),
                kind: kind.map(ToString::to_string),
                context: context.map(ToString::to_string),
            })
    }

    // -- Component access --

    /// Borrows the node's component as `T`.
    ///
    /// Returns `None` if it is of another type or is running a hook.
    #[must_use]
    pub fn component<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.validate(id);
        let c: &dyn Any = self.components[id.idx as usize].as_deref()?;
        c.downcast_ref()
    }

    /// Mutably borrows the node's component as `T`.
    pub fn component_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.validate(id);
        let c: &mut dyn Any = self.components[id.idx as usize].as_deref_mut()?;
        c.downcast_mut()
    }

    // -- Services --

    /// Current time on the tree's clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.clock.now()
    }

    /// The tree's clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Creates a blank surface through the tree's factory.
    pub fn create_surface(&mut self, size: Size, alpha: bool) -> Box<dyn Surface> {
        self.surfaces.create(size, alpha)
    }

    /// Number of draw passes run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Asks the driver to stop the frame loop.
    pub fn request_exit(&mut self) {
        debug!("exit requested");
        self.exit_requested = true;
    }

    /// Returns `true` once something asked the frame loop to stop.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    // -- Messages --

    /// Sends a message up the tree from `from`, starting at its parent.
    ///
    /// Each ancestor handles it or forwards it; a message no ancestor
    /// handles is dropped at the top. Returns nothing: delivery to a
    /// component busy running a hook happens when it returns.
    pub fn send_message(&mut self, from: NodeId, message: Message) {
        match self.parent(from) {
            Some(parent) => self.offer(parent, from, message),
            None => debug!(?from, ?message, "message dropped at the root"),
        }
    }

    /// Offers `message` to `target`, then to its ancestors while forwarded.
    pub(crate) fn offer(&mut self, mut target: NodeId, mut sender: NodeId, message: Message) {
        loop {
            if self.components[target.idx as usize].is_none() {
                trace!(?target, ?message, "recipient busy, deferring");
                self.deferred.push(Deferred {
                    target,
                    sender,
                    message,
                });
                return;
            }
            let outcome = self.with_component(target, |c, cx| c.handle_message(cx, sender, &message));
            if outcome == Some(Propagation::Handled) || !self.is_alive(target) {
                return;
            }
            match self.parent(target) {
                Some(parent) => {
                    sender = target;
                    target = parent;
                }
                None => {
                    debug!(?target, ?message, "message dropped at the root");
                    return;
                }
            }
        }
    }

    /// Offers `message` to `target` alone.
    pub(crate) fn offer_local(&mut self, target: NodeId, message: Message) -> Propagation {
        self.with_component(target, |c, cx| c.handle_message(cx, target, &message))
            .unwrap_or_default()
    }

    // -- Hook dispatch --

    /// Runs `f` with the node's component checked out of the arena.
    ///
    /// Returns `None`, without running `f`, if the component is already
    /// checked out further up the stack.
    pub(crate) fn with_component<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Component, &mut Ctx<'_>) -> R,
    ) -> Option<R> {
        let idx = id.idx as usize;
        let Some(mut component) = self.components[idx].take() else {
            trace!(?id, "hook skipped: component busy");
            return None;
        };
        let out = f(component.as_mut(), &mut Ctx { gui: self, id });
        if self.generation[idx] == id.generation {
            self.components[idx] = Some(component);
            self.deliver_deferred(id);
        }
        Some(out)
    }

    fn deliver_deferred(&mut self, id: NodeId) {
        while let Some(pos) = self.deferred.iter().position(|d| d.target == id) {
            let d = self.deferred.remove(pos);
            self.offer(d.target, d.sender, d.message);
        }
    }

    // -- Internals --

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Snapshot of a child list, for loops whose bodies run hooks that may
    /// change it.
    pub(crate) fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    /// Re-resolves effective context and attachment for every node marked
    /// on the inherit channel.
    pub(crate) fn resolve_inherited(&mut self) {
        let affected: Vec<u32> = self
            .dirty
            .drain(dirty::INHERIT)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in affected {
            if idx >= self.len || self.free_list.contains(&idx) {
                continue;
            }
            let mut context = None;
            let mut top = idx;
            let mut cur = idx;
            while cur != INVALID {
                if context.is_none() {
                    context.clone_from(&self.context[cur as usize]);
                }
                top = cur;
                cur = self.parent[top as usize];
            }
            let i = idx as usize;
            self.effective_context[i] = context;
            self.attached[i] = self.root.is_some_and(|r| r.idx == top);
        }
    }

    /// Rebuilds the z-ordered graphical child list of `p`. Returns `true` if
    /// the order changed.
    pub(crate) fn sort_drawn(&mut self, p: u32) -> bool {
        let mut order: Vec<u32> = self.children[p as usize]
            .iter()
            .copied()
            .filter(|&c| self.graphics[c as usize].is_some())
            .collect();
        order.sort_by_key(|&c| self.graphics[c as usize].as_ref().map_or(0, |g| g.z));
        let changed = order != self.drawn[p as usize];
        self.drawn[p as usize] = order;
        changed
    }
}
