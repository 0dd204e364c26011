// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording doubles for tree tests.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;

use kurbo::{Point, Rect, Size};

use super::{Component, Ctx, Gui, NodeId};
use crate::attr::Transition;
use crate::error::ConfigError;
use crate::input::{KeyEvent, MouseButton, MouseButtons};
use crate::interaction::MouseState;
use crate::message::{Message, Propagation};
use crate::style::StyleTable;
use crate::surface::{Color, Surface, SurfaceFactory};
use crate::time::ManualClock;

/// A drawing operation seen by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Fill(Color, Rect),
    Blit { dest: Point, area: Rect },
}

/// A surface that remembers what was done to it instead of drawing.
#[derive(Debug)]
pub(crate) struct RecordingSurface {
    pub(crate) size: Size,
    pub(crate) alpha_channel: bool,
    pub(crate) colorkey: Option<Color>,
    pub(crate) alpha: Option<u8>,
    pub(crate) ops: RefCell<Vec<Op>>,
}

impl RecordingSurface {
    pub(crate) fn new(size: Size, alpha_channel: bool) -> Self {
        Self {
            size,
            alpha_channel,
            colorkey: None,
            alpha: None,
            ops: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn take_ops(&self) -> Vec<Op> {
        self.ops.take()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn has_alpha(&self) -> bool {
        self.alpha_channel
    }

    fn colorkey(&self) -> Option<Color> {
        self.colorkey
    }

    fn set_colorkey(&mut self, key: Option<Color>) {
        self.colorkey = key;
    }

    fn alpha(&self) -> Option<u8> {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: Option<u8>) {
        self.alpha = alpha;
    }

    fn fill(&mut self, color: Color, area: Rect) {
        self.ops.borrow_mut().push(Op::Fill(color, area));
    }

    fn blit(&mut self, _source: &dyn Surface, dest: Point, area: Rect) {
        self.ops.borrow_mut().push(Op::Blit { dest, area });
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingFactory;

impl SurfaceFactory for RecordingFactory {
    fn create(&mut self, size: Size, alpha: bool) -> Box<dyn Surface> {
        Box::new(RecordingSurface::new(size, alpha))
    }
}

/// Downcasts a node's display to the recording double.
pub(crate) fn recorded(gui: &Gui, id: NodeId) -> &RecordingSurface {
    let display: &dyn Any = gui.display(id).unwrap();
    display.downcast_ref().unwrap()
}

pub(crate) fn gui() -> Gui {
    gui_with(StyleTable::new(), ManualClock::new())
}

pub(crate) fn gui_with(styles: StyleTable, clock: ManualClock) -> Gui {
    Gui::new(styles, RecordingFactory, clock)
}

/// A shared, append-only event log.
#[derive(Clone, Debug, Default)]
pub(crate) struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    /// Returns and clears the entries so far.
    pub(crate) fn take(&self) -> Vec<String> {
        self.0.take()
    }
}

/// A component that logs every hook it receives as `"name.hook"`.
#[derive(Debug)]
pub(crate) struct Spy {
    pub(crate) name: &'static str,
    pub(crate) log: Log,
    /// Handle messages instead of forwarding them.
    pub(crate) handles: bool,
}

impl Spy {
    pub(crate) fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            handles: false,
        }
    }

    pub(crate) fn handling(mut self) -> Self {
        self.handles = true;
        self
    }

    fn note(&self, hook: &str) {
        self.log.push(format!("{}.{hook}", self.name));
    }
}

impl Component for Spy {
    fn load_style(&mut self, _: &mut Ctx<'_>) -> Result<(), ConfigError> {
        self.note("style");
        Ok(())
    }

    fn load_options(&mut self, _: &mut Ctx<'_>) -> Result<(), ConfigError> {
        self.note("options");
        Ok(())
    }

    fn on_load(&mut self, _: &mut Ctx<'_>) {
        self.note("load");
    }

    fn on_prepare(&mut self, _: &mut Ctx<'_>) {
        self.note("prepare");
    }

    fn on_new_parent(&mut self, _: &mut Ctx<'_>, _: NodeId) {
        self.note("new_parent");
    }

    fn on_disowned(&mut self, cx: &mut Ctx<'_>, parent: NodeId) {
        assert_eq!(cx.parent(), Some(parent), "disowned runs while attached");
        self.note("disowned");
    }

    fn on_pause(&mut self, _: &mut Ctx<'_>) {
        self.note("pause");
    }

    fn on_unpause(&mut self, _: &mut Ctx<'_>) {
        self.note("unpause");
    }

    fn on_freeze(&mut self, _: &mut Ctx<'_>) {
        self.note("freeze");
    }

    fn on_unfreeze(&mut self, _: &mut Ctx<'_>) {
        self.note("unfreeze");
    }

    fn on_tick(&mut self, _: &mut Ctx<'_>) {
        self.note("tick");
    }

    fn handle_message(&mut self, _: &mut Ctx<'_>, _: NodeId, message: &Message) -> Propagation {
        self.note(&format!("msg {message:?}"));
        if self.handles {
            Propagation::Handled
        } else {
            Propagation::Forward
        }
    }

    fn on_show(&mut self, _: &mut Ctx<'_>) {
        self.note("show");
    }

    fn on_hide(&mut self, _: &mut Ctx<'_>) {
        self.note("hide");
    }

    fn on_take_focus(&mut self, _: &mut Ctx<'_>) {
        self.note("take_focus");
    }

    fn on_lose_focus(&mut self, _: &mut Ctx<'_>) {
        self.note("lose_focus");
    }

    fn on_key_down(&mut self, _: &mut Ctx<'_>, key: &KeyEvent) {
        self.note(&format!("key {}", key.keycode));
    }

    fn on_mouse_down(&mut self, _: &mut Ctx<'_>, pos: Point, _: MouseButton) {
        self.note(&format!("down {},{}", pos.x, pos.y));
    }

    fn on_mouse_up(&mut self, _: &mut Ctx<'_>, pos: Point, _: MouseButton) {
        self.note(&format!("up {},{}", pos.x, pos.y));
    }

    fn on_mouse_enter(&mut self, _: &mut Ctx<'_>, _: Point, _: Point, _: MouseButtons) {
        self.note("enter");
    }

    fn on_mouse_exit(&mut self, _: &mut Ctx<'_>, _: Point, _: Point, _: MouseButtons) {
        self.note("exit");
    }

    fn on_mouse_state_change(&mut self, _: &mut Ctx<'_>, change: Transition<MouseState>) {
        self.note(&format!("state {:?}->{:?}", change.before, change.after));
    }

    fn on_long_key_down(&mut self, _: &mut Ctx<'_>, key: &KeyEvent) {
        self.note(&format!("long_key {}", key.keycode));
    }

    fn on_long_key_down_end(&mut self, _: &mut Ctx<'_>) {
        self.note("long_key_end");
    }

    fn on_long_hover(&mut self, _: &mut Ctx<'_>, pos: Point) {
        self.note(&format!("long_hover {},{}", pos.x, pos.y));
    }

    fn on_long_hover_end(&mut self, _: &mut Ctx<'_>) {
        self.note("long_hover_end");
    }

    fn on_double_click(&mut self, _: &mut Ctx<'_>, _: Point) {
        self.note("double_click");
    }

    fn on_triple_click(&mut self, _: &mut Ctx<'_>, _: Point) {
        self.note("triple_click");
    }

    fn on_multiple_click(&mut self, _: &mut Ctx<'_>, _: Point, count: u32) {
        self.note(&format!("click {count}"));
    }
}
