// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiled framebuffer readback for accretion render outputs.
//!
//! Renderers write pixels in 8×8 tiles rather than scanlines. This crate
//! provides:
//!
//! - [`Tiler`]: maps linear pixel coordinates to offsets in a tiled buffer
//! - [`Fb`]: the tiled render, odd-sample render, pixel-info, heat-map and
//!   weight buffers of one frame, with per-pixel getters
//! - [`RenderColor`]: a plain RGBA float pixel, castable to bytes
//!
//! An [`Fb`] is usually sized from a resolved
//! [`Viewport`](accretion_core::viewport::Viewport), for example the rezed
//! region window of the scene variables.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod fb;
mod tiler;

pub use fb::{Fb, RenderColor};
pub use tiler::{TILE_SIZE, Tiler};
