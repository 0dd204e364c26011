// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pixel-surface abstraction the compositor draws through.
//!
//! The core never touches pixels. It issues [`fill`](Surface::fill) and
//! [`blit`](Surface::blit) commands against rectangles, and creates surfaces
//! through a [`SurfaceFactory`] supplied by the host.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::geometry::{Point, Rect, Size};

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 is opaque).
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// How a graphical node participates in compositing. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opacity {
    /// Owns no surface; its children are composited straight into the
    /// nearest non-transparent ancestor.
    Transparent,
    /// Owns a surface with per-pixel alpha.
    Translucent,
    /// Owns a surface without any transparency.
    Opaque,
}

impl Opacity {
    /// Returns `true` if nodes of this class own background and display
    /// surfaces.
    #[inline]
    #[must_use]
    pub const fn owns_surface(self) -> bool {
        !matches!(self, Self::Transparent)
    }

    /// Returns `true` if surfaces of this class carry per-pixel alpha.
    #[inline]
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Translucent)
    }

    /// The color a display is cleared to before compositing.
    #[inline]
    #[must_use]
    pub const fn clear_color(self) -> Color {
        match self {
            Self::Translucent | Self::Transparent => Color::TRANSPARENT,
            Self::Opaque => Color::BLACK,
        }
    }
}

/// A 2D pixel buffer owned by exactly one node.
pub trait Surface: Any + fmt::Debug {
    /// Size in pixels.
    fn size(&self) -> Size;

    /// Whether the surface stores per-pixel alpha.
    fn has_alpha(&self) -> bool;

    /// Color treated as transparent when this surface is blitted elsewhere.
    fn colorkey(&self) -> Option<Color>;

    /// Sets or clears the colorkey.
    fn set_colorkey(&mut self, key: Option<Color>);

    /// Whole-surface alpha applied when this surface is blitted elsewhere.
    fn alpha(&self) -> Option<u8>;

    /// Sets or clears the whole-surface alpha.
    fn set_alpha(&mut self, alpha: Option<u8>);

    /// Fills `area` (clipped to the surface) with `color`, replacing pixels.
    fn fill(&mut self, color: Color, area: Rect);

    /// Composites the `area` of `source` onto this surface with its top-left
    /// corner at `dest`, honoring the source's colorkey and alpha.
    fn blit(&mut self, source: &dyn Surface, dest: Point, area: Rect);

    /// The surface's own rectangle, anchored at the origin.
    fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size())
    }
}

/// Creates blank surfaces on behalf of the tree.
pub trait SurfaceFactory: fmt::Debug {
    /// Creates a surface of the given size, cleared to transparent if
    /// `alpha` is set and to black otherwise.
    fn create(&mut self, size: Size, alpha: bool) -> Box<dyn Surface>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transparent_has_no_surface() {
        assert!(!Opacity::Transparent.owns_surface());
        assert!(Opacity::Translucent.owns_surface());
        assert!(Opacity::Opaque.owns_surface());
        assert!(Opacity::Translucent.has_alpha());
        assert!(!Opacity::Opaque.has_alpha());
    }

    #[test]
    fn clear_colors() {
        assert_eq!(Opacity::Opaque.clear_color(), Color::BLACK);
        assert_eq!(Opacity::Translucent.clear_color().a, 0);
    }
}
