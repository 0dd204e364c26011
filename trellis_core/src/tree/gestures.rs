// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feeding gesture detectors and reporting what they recognize.

use tracing::trace;

use super::Gui;
use super::id::NodeId;
use crate::error::ConfigError;
use crate::gesture::{
    Gesture, GestureDelays, Gestures, LONG_HOVER_DELAY, LONG_KEY_DOWN_DELAY,
    MULTIPLE_CLICK_DELAY, Recognized,
};
use crate::time::Duration;

impl Gui {
    /// The node's gesture detector, if it was built with one.
    #[must_use]
    pub fn gestures(&self, id: NodeId) -> Option<&Gestures> {
        self.validate(id);
        self.graphics[id.idx as usize]
            .as_ref()
            .and_then(|g| g.gestures.as_ref())
    }

    /// Runs `f` on the node's detector and reports the result.
    pub(crate) fn feed_gestures(&mut self, id: NodeId, f: impl FnOnce(&mut Gestures) -> Recognized) {
        let recognized = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.gestures.as_mut())
            .map(f);
        if let Some(recognized) = recognized {
            self.report_gestures(id, recognized);
        }
    }

    fn report_gestures(&mut self, id: NodeId, recognized: Recognized) {
        for gesture in recognized.iter() {
            if !self.is_alive(id) {
                return;
            }
            trace!(?id, ?gesture, "gesture");
            let _ = self.with_component(id, |c, cx| match gesture {
                Gesture::LongKeyDown(key) => c.on_long_key_down(cx, &key),
                Gesture::LongKeyDownEnd => c.on_long_key_down_end(cx),
                Gesture::LongHover(pos) => c.on_long_hover(cx, pos),
                Gesture::LongHoverEnd => c.on_long_hover_end(cx),
                Gesture::MultipleClick { pos, count } => {
                    match count {
                        2 => c.on_double_click(cx, pos),
                        3 => c.on_triple_click(cx, pos),
                        _ => {}
                    }
                    c.on_multiple_click(cx, pos, count);
                }
            });
        }
    }

    /// Reads the gesture delays from the node's options.
    pub(crate) fn load_gesture_delays(&mut self, id: NodeId) -> Result<(), ConfigError> {
        if self.gestures(id).is_none() {
            return Ok(());
        }
        let standard = GestureDelays::standard(self.clock.timebase());
        let delays = GestureDelays {
            long_key_down: self.delay_option(id, LONG_KEY_DOWN_DELAY, standard.long_key_down)?,
            long_hover: self.delay_option(id, LONG_HOVER_DELAY, standard.long_hover)?,
            multiple_click: self.delay_option(id, MULTIPLE_CLICK_DELAY, standard.multiple_click)?,
        };
        if let Some(g) = self.graphics[id.idx as usize]
            .as_mut()
            .and_then(|g| g.gestures.as_mut())
        {
            g.set_delays(delays);
        }
        Ok(())
    }

    fn delay_option(&self, id: NodeId, query: &str, default: Duration) -> Result<Duration, ConfigError> {
        match self.options_get(id, query) {
            Ok(value) => value.to_duration(query),
            Err(ConfigError::MissingOption { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }
}
