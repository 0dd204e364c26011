// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory RGBA surfaces.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;

use trellis_core::{Color, Point, Rect, Size, Surface, SurfaceFactory};

use crate::blend::{source_over, with_surface_alpha};

/// Integer pixel span `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug)]
struct Span {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Span {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rounded coordinates of on-screen rectangles fit in i64"
    )]
    fn of(rect: Rect) -> Self {
        let r = rect.round();
        Self {
            x0: r.x0 as i64,
            y0: r.y0 as i64,
            x1: r.x1 as i64,
            y1: r.y1 as i64,
        }
    }

    fn clip(self, width: u32, height: u32) -> Self {
        Self {
            x0: self.x0.max(0),
            y0: self.y0.max(0),
            x1: self.x1.min(i64::from(width)),
            y1: self.y1.min(i64::from(height)),
        }
    }

    fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// A heap-allocated 8-bit RGBA pixel buffer.
///
/// Surfaces without an alpha channel keep every pixel opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    alpha_channel: bool,
    colorkey: Option<Color>,
    alpha: Option<u8>,
    pixels: Vec<Color>,
}

impl PixelSurface {
    /// Creates a surface cleared to transparent if `alpha_channel` is set,
    /// and to black otherwise. Fractional sizes round to whole pixels.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "surface sizes are clamped to u32 first"
    )]
    pub fn new(size: Size, alpha_channel: bool) -> Self {
        let dim = |v: f64| v.round().clamp(0.0, f64::from(u32::MAX)) as u32;
        let (width, height) = (dim(size.width), dim(size.height));
        let clear = if alpha_channel {
            Color::TRANSPARENT
        } else {
            Color::BLACK
        };
        Self {
            width,
            height,
            alpha_channel,
            colorkey: None,
            alpha: None,
            pixels: vec![clear; width as usize * height as usize],
        }
    }

    /// Creates a surface filled with `color`.
    #[must_use]
    pub fn filled(size: Size, alpha_channel: bool, color: Color) -> Self {
        let mut s = Self::new(size, alpha_channel);
        let bounds = s.bounds();
        s.fill(color, bounds);
        s
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites one pixel. Returns `false` outside the surface.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) -> bool {
        let color = self.stored(color);
        match self.offset(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    fn stored(&self, color: Color) -> Color {
        if self.alpha_channel {
            color
        } else {
            Color { a: 255, ..color }
        }
    }

    fn keyed(&self, c: Color) -> bool {
        self.colorkey
            .is_some_and(|k| (k.r, k.g, k.b) == (c.r, c.g, c.b))
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
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
        let color = self.stored(color);
        let s = Span::of(area).clip(self.width, self.height);
        if s.is_empty() {
            return;
        }
        let w = self.width as usize;
        for y in s.y0..s.y1 {
            let row = y as usize * w;
            self.pixels[row + s.x0 as usize..row + s.x1 as usize].fill(color);
        }
    }

    /// Only other [`PixelSurface`]s can be blitted; other sources are
    /// ignored.
    fn blit(&mut self, source: &dyn Surface, dest: Point, area: Rect) {
        let Some(src) = (source as &dyn Any).downcast_ref::<Self>() else {
            return;
        };
        let from = Span::of(area);
        let clipped = from.clip(src.width, src.height);
        if clipped.is_empty() {
            return;
        }
        let to = Span::of(Rect::from_origin_size(dest, Size::ZERO));
        // Destination position of the clipped source's top-left pixel.
        let (dx, dy) = (
            to.x0 + clipped.x0 - from.x0,
            to.y0 + clipped.y0 - from.y0,
        );
        let target = Span {
            x0: dx,
            y0: dy,
            x1: dx + clipped.x1 - clipped.x0,
            y1: dy + clipped.y1 - clipped.y0,
        }
        .clip(self.width, self.height);
        for y in target.y0..target.y1 {
            for x in target.x0..target.x1 {
                let sx = clipped.x0 + x - dx;
                let sy = clipped.y0 + y - dy;
                let Some(c) = src.pixel(sx, sy) else {
                    continue;
                };
                if src.keyed(c) {
                    continue;
                }
                let c = with_surface_alpha(c, src.alpha);
                if let Some(i) = self.offset(x, y) {
                    self.pixels[i] = source_over(self.pixels[i], c, self.alpha_channel);
                }
            }
        }
    }
}

/// Creates [`PixelSurface`]s for a tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct PixelFactory;

impl SurfaceFactory for PixelFactory {
    fn create(&mut self, size: Size, alpha: bool) -> Box<dyn Surface> {
        Box::new(PixelSurface::new(size, alpha))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
