// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style, option, and control lookup.
//!
//! The tree consumes configuration only through [`StyleSource`]. A node asks
//! with its style category (`kind`) and its effective context; the source
//! resolves that through a fallback chain. [`StyleTable`] is an in-memory
//! source with the standard chain:
//!
//! 1. `(kind, context)`
//! 2. `(kind, "global")`
//! 3. `("global", context)`
//! 4. `(kind, "default")`
//! 5. `("default", context)`
//! 6. `("default", "default")`
//! 7. `("global", "global")`
//!
//! and, failing all of those, the same chain in its default style pack.
//! Control bindings are looked up in the `"global"`, then the node's, then
//! the `"default"` context.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use crate::error::ConfigError;
use crate::input::KeyChord;
use crate::message::Command;
use crate::surface::Color;
use crate::time::Duration;

/// Scope name that applies everywhere and wins over defaults.
pub const GLOBAL: &str = "global";
/// Scope name used when nothing more specific matches.
pub const DEFAULT: &str = "default";

/// A configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A real number.
    Float(f64),
    /// A color.
    Color(Color),
    /// A string.
    Text(String),
    /// A duration in clock ticks.
    Duration(Duration),
}

impl StyleValue {
    /// Name of the variant, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Duration(_) => "duration",
        }
    }

    fn wrong(&self, query: &str, expected: &'static str) -> ConfigError {
        ConfigError::WrongType {
            query: query.to_string(),
            expected,
            found: self.kind_name(),
        }
    }

    /// Reads a flag.
    pub fn to_bool(&self, query: &str) -> Result<bool, ConfigError> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(self.wrong(query, "bool")),
        }
    }

    /// Reads an integer.
    pub fn to_int(&self, query: &str) -> Result<i64, ConfigError> {
        match self {
            Self::Int(i) => Ok(*i),
            _ => Err(self.wrong(query, "int")),
        }
    }

    /// Reads a real number; integers are widened.
    pub fn to_float(&self, query: &str) -> Result<f64, ConfigError> {
        match self {
            Self::Float(f) => Ok(*f),
            Self::Int(i) => Ok(*i as f64),
            _ => Err(self.wrong(query, "float")),
        }
    }

    /// Reads a color.
    pub fn to_color(&self, query: &str) -> Result<Color, ConfigError> {
        match self {
            Self::Color(c) => Ok(*c),
            _ => Err(self.wrong(query, "color")),
        }
    }

    /// Reads a string.
    pub fn to_text(&self, query: &str) -> Result<&str, ConfigError> {
        match self {
            Self::Text(t) => Ok(t),
            _ => Err(self.wrong(query, "text")),
        }
    }

    /// Reads a duration.
    pub fn to_duration(&self, query: &str) -> Result<Duration, ConfigError> {
        match self {
            Self::Duration(d) => Ok(*d),
            _ => Err(self.wrong(query, "duration")),
        }
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for StyleValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for StyleValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Color> for StyleValue {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Duration> for StyleValue {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

/// The narrow lookup interface the tree consumes configuration through.
///
/// `kind` and `context` are `None` when the asking node has none; sources
/// decide how to treat that.
pub trait StyleSource: fmt::Debug {
    /// Resolves a style entry.
    fn style(&self, query: &str, kind: Option<&str>, context: Option<&str>) -> Option<StyleValue>;

    /// Resolves an option entry.
    fn option(&self, query: &str, kind: Option<&str>, context: Option<&str>)
    -> Option<StyleValue>;

    /// Resolves the command bound to a key chord.
    fn control(&self, chord: KeyChord, context: Option<&str>) -> Option<Command>;
}

type Entries = BTreeMap<String, BTreeMap<String, BTreeMap<String, StyleValue>>>;

/// An in-memory [`StyleSource`] with the standard fallback chain.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    styles: Entries,
    options: Entries,
    controls: BTreeMap<String, BTreeMap<KeyChord, Command>>,
    pack: Option<Box<StyleTable>>,
}

impl StyleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the default style pack consulted when this table has no
    /// match at any level.
    #[must_use]
    pub fn with_pack(mut self, pack: Self) -> Self {
        self.pack = Some(Box::new(pack));
        self
    }

    /// Sets a style entry for `(kind, context)`.
    pub fn set_style(
        &mut self,
        kind: &str,
        context: &str,
        query: &str,
        value: impl Into<StyleValue>,
    ) -> &mut Self {
        insert(&mut self.styles, kind, context, query, value.into());
        self
    }

    /// Sets an option entry for `(kind, context)`.
    pub fn set_option(
        &mut self,
        kind: &str,
        context: &str,
        query: &str,
        value: impl Into<StyleValue>,
    ) -> &mut Self {
        insert(&mut self.options, kind, context, query, value.into());
        self
    }

    /// Binds `chord` to `command` in `context`.
    pub fn bind(&mut self, context: &str, chord: KeyChord, command: Command) -> &mut Self {
        self.controls
            .entry(context.to_string())
            .or_default()
            .insert(chord, command);
        self
    }
}

fn insert(entries: &mut Entries, kind: &str, context: &str, query: &str, value: StyleValue) {
    entries
        .entry(kind.to_string())
        .or_default()
        .entry(context.to_string())
        .or_default()
        .insert(query.to_string(), value);
}

/// The `(kind, context)` pairs tried, most specific first.
fn chain<'a>(kind: Option<&'a str>, context: Option<&'a str>) -> [(&'a str, &'a str); 7] {
    let kind = kind.unwrap_or(DEFAULT);
    let context = context.unwrap_or(DEFAULT);
    [
        (kind, context),
        (kind, GLOBAL),
        (GLOBAL, context),
        (kind, DEFAULT),
        (DEFAULT, context),
        (DEFAULT, DEFAULT),
        (GLOBAL, GLOBAL),
    ]
}

fn resolve<'e>(
    entries: &'e Entries,
    query: &str,
    kind: Option<&str>,
    context: Option<&str>,
) -> Option<&'e StyleValue> {
    chain(kind, context)
        .into_iter()
        .find_map(|(k, c)| entries.get(k)?.get(c)?.get(query))
}

impl StyleSource for StyleTable {
    fn style(&self, query: &str, kind: Option<&str>, context: Option<&str>) -> Option<StyleValue> {
        resolve(&self.styles, query, kind, context)
            .cloned()
            .or_else(|| self.pack.as_ref()?.style(query, kind, context))
    }

    fn option(
        &self,
        query: &str,
        kind: Option<&str>,
        context: Option<&str>,
    ) -> Option<StyleValue> {
        resolve(&self.options, query, kind, context)
            .cloned()
            .or_else(|| self.pack.as_ref()?.option(query, kind, context))
    }

    fn control(&self, chord: KeyChord, context: Option<&str>) -> Option<Command> {
        [GLOBAL, context.unwrap_or(DEFAULT), DEFAULT]
            .into_iter()
            .find_map(|c| self.controls.get(c)?.get(&chord))
            .cloned()
            .or_else(|| self.pack.as_ref()?.control(chord, context))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    #[test]
    fn most_specific_entry_wins() {
        let mut t = StyleTable::new();
        t.set_style("button", "menu", "fill", Color::WHITE)
            .set_style("button", GLOBAL, "fill", Color::BLACK)
            .set_style(DEFAULT, DEFAULT, "fill", Color::rgb(1, 2, 3));
        assert_eq!(
            t.style("fill", Some("button"), Some("menu")),
            Some(StyleValue::Color(Color::WHITE))
        );
        assert_eq!(
            t.style("fill", Some("button"), Some("dialog")),
            Some(StyleValue::Color(Color::BLACK))
        );
        assert_eq!(
            t.style("fill", Some("label"), Some("dialog")),
            Some(StyleValue::Color(Color::rgb(1, 2, 3)))
        );
    }

    #[test]
    fn global_context_beats_kind_default() {
        let mut t = StyleTable::new();
        t.set_option(GLOBAL, "menu", "speed", 2)
            .set_option("button", DEFAULT, "speed", 1);
        assert_eq!(
            t.option("speed", Some("button"), Some("menu")),
            Some(StyleValue::Int(2))
        );
    }

    #[test]
    fn pack_is_last_resort() {
        let mut pack = StyleTable::new();
        pack.set_style(DEFAULT, DEFAULT, "font", "mono")
            .set_style(DEFAULT, DEFAULT, "size", 10);
        let mut t = StyleTable::new();
        t.set_style(GLOBAL, GLOBAL, "size", 12);
        let t = t.with_pack(pack);
        assert_eq!(t.style("size", None, None), Some(StyleValue::Int(12)));
        assert_eq!(
            t.style("font", Some("x"), Some("y")),
            Some(StyleValue::Text("mono".into()))
        );
        assert_eq!(t.style("missing", None, None), None);
    }

    #[test]
    fn controls_prefer_global_then_context_then_default() {
        let esc = KeyChord::new(27, Modifiers::empty());
        let enter = KeyChord::new(13, Modifiers::empty());
        let mut t = StyleTable::new();
        t.bind(DEFAULT, esc, Command::new("back"))
            .bind("menu", esc, Command::new("close"))
            .bind(DEFAULT, enter, Command::new("accept"));
        assert_eq!(t.control(esc, Some("menu")), Some(Command::new("close")));
        assert_eq!(t.control(esc, Some("game")), Some(Command::new("back")));
        t.bind(GLOBAL, esc, Command::new("quit"));
        assert_eq!(t.control(esc, Some("menu")), Some(Command::new("quit")));
        assert_eq!(t.control(enter, None), Some(Command::new("accept")));
        assert_eq!(t.control(KeyChord::new(1, Modifiers::ALT), None), None);
    }

    #[test]
    fn typed_reads_report_mismatch() {
        let v = StyleValue::from(3);
        assert_eq!(v.to_int("n"), Ok(3));
        assert_eq!(v.to_float("n"), Ok(3.0));
        assert_eq!(
            v.to_color("n"),
            Err(ConfigError::WrongType {
                query: "n".into(),
                expected: "color",
                found: "int",
            })
        );
    }
}
