// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight-alpha compositing arithmetic.

use trellis_core::Color;

/// `x / 255`, rounded to nearest.
#[inline]
fn div255(x: u32) -> u32 {
    (x + 127) / 255
}

#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "channel arithmetic stays within 0..=255"
)]
fn channel(x: u32) -> u8 {
    x.min(255) as u8
}

/// Composites `src` over `dst`, both with straight (non-premultiplied)
/// alpha.
///
/// When `keep_alpha` is false the destination stores no alpha: it is treated
/// as opaque and the result is opaque.
#[must_use]
pub fn source_over(dst: Color, src: Color, keep_alpha: bool) -> Color {
    let sa = u32::from(src.a);
    if sa == 255 {
        return Color { a: 255, ..src };
    }
    if sa == 0 {
        return dst;
    }
    let da = if keep_alpha { u32::from(dst.a) } else { 255 };
    let rest = div255(da * (255 - sa));
    let out_a = sa + rest;
    if out_a == 0 {
        return Color::TRANSPARENT;
    }
    let mix = |s: u8, d: u8| channel((u32::from(s) * sa + u32::from(d) * rest + out_a / 2) / out_a);
    Color {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: if keep_alpha { channel(out_a) } else { 255 },
    }
}

/// Scales a pixel's alpha by a whole-surface alpha.
#[inline]
#[must_use]
pub(crate) fn with_surface_alpha(c: Color, alpha: Option<u8>) -> Color {
    match alpha {
        Some(a) => Color {
            a: channel(div255(u32::from(c.a) * u32::from(a))),
            ..c
        },
        None => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces() {
        let out = source_over(Color::BLACK, Color::rgb(1, 2, 3), true);
        assert_eq!(out, Color::rgb(1, 2, 3));
    }

    #[test]
    fn clear_source_keeps_destination() {
        let dst = Color::rgba(9, 9, 9, 40);
        assert_eq!(source_over(dst, Color::rgba(200, 0, 0, 0), true), dst);
    }

    #[test]
    fn half_alpha_over_opaque_mixes() {
        let out = source_over(Color::BLACK, Color::rgba(255, 255, 255, 128), false);
        assert_eq!(out.a, 255);
        assert!((127..=129).contains(&out.r), "got {out:?}");
    }

    #[test]
    fn over_transparent_keeps_source_color() {
        let out = source_over(Color::TRANSPARENT, Color::rgba(200, 100, 50, 128), true);
        assert_eq!(out, Color::rgba(200, 100, 50, 128));
    }

    #[test]
    fn surface_alpha_scales() {
        let c = with_surface_alpha(Color::rgb(1, 1, 1), Some(128));
        assert_eq!(c.a, 128);
        assert_eq!(with_surface_alpha(c, None), c);
    }
}
