// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Messages travelling up the component tree.
//!
//! A message starts at a node and is offered to each ancestor in turn. Every
//! ancestor either handles it or forwards it to its own parent; a message
//! that reaches the root unhandled is dropped.

use alloc::string::String;

/// An application-defined action identifier, typically fired by a widget's
/// activation (a press released while hovered).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action(pub u32);

/// A named command produced by a key binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Command(pub String);

impl Command {
    /// Creates a command from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The command's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The closed set of messages nodes exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    /// Ask the application to stop its frame loop.
    Exit,
    /// A widget was activated.
    Action(Action),
    /// A bound key chord was pressed.
    Command(Command),
}

/// What a node did with a message offered to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// Stop here.
    Handled,
    /// Offer the message to this node's parent.
    #[default]
    Forward,
}
