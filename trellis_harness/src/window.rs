// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The root component of a driven tree.

use tracing::{debug, info, warn};
use trellis_core::{Color, Component, ConfigError, Ctx, Message, NodeId, Propagation, Rect};

/// Style category the window's node is created with.
pub const WINDOW_KIND: &str = "window";

/// Sits at the root of the tree. [`Message::Exit`] stops the frame loop;
/// any other message that reaches the window is kept for the host to
/// collect.
///
/// The window paints its whole area with the `bg-color` style, falling
/// back to the color it was created with, and reads an optional `title`
/// option.
#[derive(Debug)]
pub struct Window {
    background: Color,
    fallback: Color,
    title: Option<String>,
    unhandled: Vec<Message>,
}

impl Default for Window {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl Window {
    /// Creates a window painted `background` unless styled otherwise.
    #[must_use]
    pub fn new(background: Color) -> Self {
        Self {
            background,
            fallback: background,
            title: None,
            unhandled: Vec::new(),
        }
    }

    /// The color the window currently paints.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// The `title` option, if one was set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Takes the messages that no node handled.
    pub fn take_unhandled(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.unhandled)
    }
}

impl Component for Window {
    fn load_style(&mut self, cx: &mut Ctx<'_>) -> Result<(), ConfigError> {
        let color = cx.style_or("bg-color", self.fallback).to_color("bg-color")?;
        if color != self.background {
            self.background = color;
            let id = cx.id();
            cx.gui_mut().mark_stale(id);
        }
        Ok(())
    }

    fn load_options(&mut self, cx: &mut Ctx<'_>) -> Result<(), ConfigError> {
        self.title = match cx.options_get("title") {
            Ok(value) => Some(value.to_text("title")?.to_owned()),
            Err(ConfigError::MissingOption { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(())
    }

    fn on_load(&mut self, _cx: &mut Ctx<'_>) {
        info!(title = self.title.as_deref(), "window loaded");
    }

    fn refresh(&mut self, cx: &mut Ctx<'_>) {
        let size = cx.gui().size(cx.id());
        let mut surface = cx.create_surface(size, false);
        surface.fill(self.background, Rect::from_origin_size((0.0, 0.0), size));
        if let Err(e) = cx.set_background(surface) {
            warn!(%e, "window background rejected");
        }
    }

    fn handle_message(&mut self, cx: &mut Ctx<'_>, sender: NodeId, message: &Message) -> Propagation {
        if *message == Message::Exit {
            info!(?sender, "exit requested");
            cx.request_exit();
        } else {
            debug!(?sender, ?message, "unhandled message reached the window");
            self.unhandled.push(message.clone());
        }
        Propagation::Handled
    }
}

