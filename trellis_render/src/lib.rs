// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software RGBA pixel surfaces for trellis.
//!
//! This crate implements [`trellis_core`]'s [`Surface`](trellis_core::Surface)
//! and [`SurfaceFactory`](trellis_core::SurfaceFactory) traits over plain
//! memory. It provides:
//!
//! - [`PixelSurface`]: an 8-bit RGBA buffer with colorkey and whole-surface
//!   alpha, blitting with straight-alpha source-over
//! - [`PixelFactory`]: creates cleared [`PixelSurface`]s for a tree
//!
//! It is enough to run a tree headless and inspect what it drew.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod blend;
mod pixel;

pub use blend::source_over;
pub use pixel::{PixelFactory, PixelSurface};
